//! API service routes
//!
//! Protected handlers take [`CurrentSession`] as an argument; everything
//! under `/v1/employees` is bearer-gated, the auth endpoints and the health
//! probe are public.

use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{BearerToken, ClientMeta, CurrentSession},
    models::{
        EmployeeDraft, EmployeePageResponse, EmployeeResponse, ListParams, LoginRequest,
        employee::{EmployeeUpdate, NewEmployee, normalize_email},
    },
    pagination::{PAGE_SIZE, PageToken},
    password,
    state::AppState,
    validation,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/logout", delete(logout))
        .route("/v1/auth/registrations", post(register))
        .route("/v1/employees", get(list_employees).post(create_employee))
        .route(
            "/v1/employees/:id",
            get(show_employee)
                .put(update_employee)
                .delete(delete_employee),
        )
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "employees-api"
    }))
}

/// Exchange credentials for a fresh session token
///
/// Failures are uniform: an unknown email and a wrong password produce the
/// same response, so callers cannot enumerate identities.
pub async fn login(
    State(state): State<AppState>,
    client: ClientMeta,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = normalize_email(&payload.email_address);

    let employee = state
        .employee_repository
        .find_by_email(&email)
        .await?
        .filter(|e| password::verify(&payload.password, &e.password_digest))
        .ok_or(ApiError::InvalidCredentials)?;

    let session = state
        .session_repository
        .create(employee.id, &client.0)
        .await?;

    tracing::info!(employee_id = employee.id, "Login succeeded");

    Ok(Json(json!({ "token": session.token })))
}

/// Revoke the presented session token
///
/// Idempotent: a well-formed token that no longer has a session still logs
/// out successfully. A structurally invalid or missing bearer credential is
/// rejected by the extractor instead.
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<impl IntoResponse> {
    state.session_repository.delete_by_token(&token).await?;

    Ok(Json(json!({ "message": "Logged out" })))
}

/// Register a new employee and log them in
pub async fn register(
    State(state): State<AppState>,
    client: ClientMeta,
    Json(draft): Json<EmployeeDraft>,
) -> ApiResult<impl IntoResponse> {
    let employee = insert_employee(&state, &draft).await?;

    let session = state
        .session_repository
        .create(employee.id, &client.0)
        .await?;

    tracing::info!(employee_id = employee.id, "Employee registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": session.token,
            "employee": EmployeeResponse::from(employee),
        })),
    ))
}

/// List employees one page at a time
pub async fn list_employees(
    current: CurrentSession,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(
        employee_id = current.employee.id,
        session_id = %current.session.id,
        "Listing employees"
    );

    let origin = params
        .page_token
        .as_deref()
        .map(PageToken::decode)
        .transpose()?;

    let page = state
        .employee_repository
        .page(PAGE_SIZE, origin.as_ref())
        .await?;

    Ok(Json(EmployeePageResponse::from(page)))
}

/// Create an employee on behalf of an authenticated caller
pub async fn create_employee(
    _session: CurrentSession,
    State(state): State<AppState>,
    Json(draft): Json<EmployeeDraft>,
) -> ApiResult<impl IntoResponse> {
    let employee = insert_employee(&state, &draft).await?;

    Ok((StatusCode::CREATED, Json(EmployeeResponse::from(employee))))
}

/// Fetch a single employee
pub async fn show_employee(
    _session: CurrentSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let employee = state
        .employee_repository
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(EmployeeResponse::from(employee)))
}

/// Apply a partial update to an employee
pub async fn update_employee(
    _session: CurrentSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<EmployeeDraft>,
) -> ApiResult<impl IntoResponse> {
    let existing = state
        .employee_repository
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let changes = validation::validate_update(&existing, &draft, &state.country_codes)
        .map_err(ApiError::Validation)?;

    if changes.email_address != existing.email_address
        && state
            .employee_repository
            .email_taken(&changes.email_address, Some(id))
            .await?
    {
        return Err(ApiError::Validation(vec![
            validation::EMAIL_TAKEN.to_string(),
        ]));
    }

    let password_digest = match changes.password {
        Some(password) => Some(
            password::hash(&password)
                .map_err(|e| anyhow!("Failed to hash password: {e}"))?,
        ),
        None => None,
    };

    let updated = state
        .employee_repository
        .update(
            id,
            &EmployeeUpdate {
                email_address: changes.email_address,
                password_digest,
                profile: changes.profile,
            },
        )
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(EmployeeResponse::from(updated)))
}

/// Delete an employee and cascade away their sessions
pub async fn delete_employee(
    _session: CurrentSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    if !state.employee_repository.delete(id).await? {
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({ "message": "Employee deleted successfully" })))
}

/// Validate a draft, hash its password, and insert the employee
///
/// The validation-time uniqueness check gives the friendly message; a
/// concurrent registration slipping past it hits the unique index, which the
/// error layer folds into the same 422 shape.
async fn insert_employee(
    state: &AppState,
    draft: &EmployeeDraft,
) -> Result<crate::models::employee::Employee, ApiError> {
    let valid =
        validation::validate_new(draft, &state.country_codes).map_err(ApiError::Validation)?;

    if state
        .employee_repository
        .email_taken(&valid.email_address, None)
        .await?
    {
        return Err(ApiError::Validation(vec![
            validation::EMAIL_TAKEN.to_string(),
        ]));
    }

    let password_digest =
        password::hash(&valid.password).map_err(|e| anyhow!("Failed to hash password: {e}"))?;

    let employee = state
        .employee_repository
        .create(&NewEmployee {
            email_address: valid.email_address,
            password_digest,
            profile: valid.profile,
        })
        .await?;

    Ok(employee)
}
