//! Repositories for database operations
//!
//! Each repository owns a handle to the pool and exposes the statements the
//! handlers need. Every operation is a single statement; the store's
//! per-statement atomicity is all the concurrency control this service
//! relies on.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::error::{UQ_SESSIONS_TOKEN, is_unique_violation};
use crate::models::employee::{EMPLOYEE_KIND, Employee, EmployeeProfile, EmployeeUpdate, NewEmployee};
use crate::models::session::{ClientInfo, Session};
use crate::pagination::{self, Direction, Page, PageToken};
use crate::token;

/// Column list shared across employee queries
const EMPLOYEE_COLUMNS: &str = "id, email_address, password_digest, first_name, last_name, \
                                date_of_birth, phone_number, created_at, updated_at";

/// Column list shared across session queries
const SESSION_COLUMNS: &str = "id, user_id, token, user_agent, ip_address, created_at";

/// How many times session creation regenerates after a token collision
const TOKEN_ATTEMPTS: u32 = 3;

fn employee_from_row(row: &PgRow) -> Result<Employee, sqlx::Error> {
    Ok(Employee {
        id: row.try_get("id")?,
        email_address: row.try_get("email_address")?,
        password_digest: row.try_get("password_digest")?,
        profile: EmployeeProfile {
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            date_of_birth: row.try_get("date_of_birth")?,
            phone_number: row.try_get("phone_number")?,
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn session_from_row(row: &PgRow) -> Result<Session, sqlx::Error> {
    Ok(Session {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        token: row.try_get("token")?,
        user_agent: row.try_get("user_agent")?,
        ip_address: row.try_get("ip_address")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Employee repository for database operations
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    /// Create a new employee repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new employee, returning the created row
    pub async fn create(&self, new: &NewEmployee) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (kind, email_address, password_digest, first_name, last_name, \
                                date_of_birth, phone_number)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {EMPLOYEE_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(EMPLOYEE_KIND)
            .bind(&new.email_address)
            .bind(&new.password_digest)
            .bind(&new.profile.first_name)
            .bind(&new.profile.last_name)
            .bind(new.profile.date_of_birth)
            .bind(&new.profile.phone_number)
            .fetch_one(&self.pool)
            .await?;

        employee_from_row(&row)
    }

    /// Find an employee by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, sqlx::Error> {
        let query =
            format!("SELECT {EMPLOYEE_COLUMNS} FROM users WHERE id = $1 AND kind = $2");

        let row = sqlx::query(&query)
            .bind(id)
            .bind(EMPLOYEE_KIND)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(employee_from_row).transpose()
    }

    /// Find an employee by normalized email address
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM users WHERE email_address = $1 AND kind = $2"
        );

        let row = sqlx::query(&query)
            .bind(email)
            .bind(EMPLOYEE_KIND)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(employee_from_row).transpose()
    }

    /// Whether a normalized email is already held by another identity
    ///
    /// Uniqueness spans all identity kinds. The unique index remains the
    /// backstop for races between this check and the insert.
    pub async fn email_taken(
        &self,
        email: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let row = sqlx::query(
            "SELECT EXISTS (
                 SELECT 1 FROM users
                 WHERE email_address = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             ) AS taken",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        row.try_get("taken")
    }

    /// Apply a validated update, returning the new row
    ///
    /// A `None` password digest keeps the stored one.
    pub async fn update(
        &self,
        id: i64,
        changes: &EmployeeUpdate,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "UPDATE users
             SET email_address = $1,
                 password_digest = COALESCE($2, password_digest),
                 first_name = $3,
                 last_name = $4,
                 date_of_birth = $5,
                 phone_number = $6,
                 updated_at = now()
             WHERE id = $7 AND kind = $8
             RETURNING {EMPLOYEE_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(&changes.email_address)
            .bind(&changes.password_digest)
            .bind(&changes.profile.first_name)
            .bind(&changes.profile.last_name)
            .bind(changes.profile.date_of_birth)
            .bind(&changes.profile.phone_number)
            .bind(id)
            .bind(EMPLOYEE_KIND)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(employee_from_row).transpose()
    }

    /// Delete an employee. Returns `true` if a row was removed.
    ///
    /// Sessions owned by the employee cascade away with the row.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND kind = $2")
            .bind(id)
            .bind(EMPLOYEE_KIND)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch one page of employees ordered by ascending id
    ///
    /// Keyset queries with strict inequalities: a boundary key deleted after
    /// its token was issued simply resolves to the nearest surviving key
    /// instead of erroring. Fetches `limit + 1` rows so the assembler can
    /// tell whether another page exists, plus a one-row probe on the far
    /// side of the origin boundary so continuation tokens appear only when
    /// records actually remain past that edge.
    pub async fn page(
        &self,
        limit: usize,
        origin: Option<&PageToken>,
    ) -> Result<Page<Employee>, sqlx::Error> {
        let lookahead = (limit + 1) as i64;

        let rows = match origin {
            None => {
                let query = format!(
                    "SELECT {EMPLOYEE_COLUMNS} FROM users
                     WHERE kind = $1 ORDER BY id ASC LIMIT $2"
                );
                sqlx::query(&query)
                    .bind(EMPLOYEE_KIND)
                    .bind(lookahead)
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(token) if token.direction == Direction::Forward => {
                let query = format!(
                    "SELECT {EMPLOYEE_COLUMNS} FROM users
                     WHERE kind = $1 AND id > $2 ORDER BY id ASC LIMIT $3"
                );
                sqlx::query(&query)
                    .bind(EMPLOYEE_KIND)
                    .bind(token.key)
                    .bind(lookahead)
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(token) => {
                let query = format!(
                    "SELECT {EMPLOYEE_COLUMNS} FROM users
                     WHERE kind = $1 AND id < $2 ORDER BY id DESC LIMIT $3"
                );
                sqlx::query(&query)
                    .bind(EMPLOYEE_KIND)
                    .bind(token.key)
                    .bind(lookahead)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let employees = rows
            .iter()
            .map(employee_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let beyond_origin = match origin {
            None => false,
            Some(token) => {
                // The first fetched row sits at the page's origin edge in
                // both directions; with no rows, fall back to the boundary
                // itself so stale tokens still re-enter the collection.
                let (cmp, bound) = match token.direction {
                    Direction::Forward => (
                        "<",
                        employees
                            .first()
                            .map(|e| e.id)
                            .unwrap_or_else(|| token.key.saturating_add(1)),
                    ),
                    Direction::Backward => (
                        ">",
                        employees
                            .first()
                            .map(|e| e.id)
                            .unwrap_or_else(|| token.key.saturating_sub(1)),
                    ),
                };

                let query = format!(
                    "SELECT EXISTS (SELECT 1 FROM users WHERE kind = $1 AND id {cmp} $2) AS beyond"
                );
                sqlx::query(&query)
                    .bind(EMPLOYEE_KIND)
                    .bind(bound)
                    .fetch_one(&self.pool)
                    .await?
                    .try_get("beyond")?
            }
        };

        Ok(pagination::assemble(
            employees,
            |e| e.id,
            limit,
            origin,
            beyond_origin,
        ))
    }
}

/// Session repository for database operations
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Start a session for a user and return it with its raw token
    ///
    /// The token comes from the OS RNG; on the rare collision the unique
    /// index rejects the insert and a fresh token is generated. Any other
    /// failure surfaces immediately.
    pub async fn create(
        &self,
        user_id: i64,
        client: &ClientInfo,
    ) -> Result<Session, sqlx::Error> {
        let mut attempts = TOKEN_ATTEMPTS;

        loop {
            let token = token::generate();

            match self.insert(user_id, &token, client).await {
                Ok(session) => return Ok(session),
                Err(e) if attempts > 1 && is_unique_violation(&e, UQ_SESSIONS_TOKEN) => {
                    tracing::warn!("Session token collision, regenerating");
                    attempts -= 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn insert(
        &self,
        user_id: i64,
        token: &str,
        client: &ClientInfo,
    ) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, token, user_agent, ip_address)
             VALUES ($1, $2, $3, $4)
             RETURNING {SESSION_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(token)
            .bind(&client.user_agent)
            .bind(&client.ip_address)
            .fetch_one(&self.pool)
            .await?;

        session_from_row(&row)
    }

    /// Look up a session by exact token match
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE token = $1");

        let row = sqlx::query(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    /// Delete the session holding `token`. Returns `true` if a row existed.
    ///
    /// Logout is idempotent from the caller's perspective; the boolean is
    /// informational only.
    pub async fn delete_by_token(&self, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
