//! Employee domain model
//!
//! Employees are user identities tagged with the `Employee` kind plus a
//! group of role-specific profile fields. Email addresses are stored
//! normalized so the unique index enforces case-insensitive uniqueness.

use chrono::{DateTime, NaiveDate, Utc};

/// Kind tag stored for employee identities
pub const EMPLOYEE_KIND: &str = "Employee";

/// Normalize an email address for storage and lookup
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Role-specific fields carried by every employee
#[derive(Debug, Clone)]
pub struct EmployeeProfile {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
}

/// A persisted employee identity
#[derive(Debug, Clone)]
pub struct Employee {
    pub id: i64,
    pub email_address: String,
    pub password_digest: String,
    pub profile: EmployeeProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated attributes for inserting a new employee
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub email_address: String,
    pub password_digest: String,
    pub profile: EmployeeProfile,
}

/// Final attribute set for an employee update
///
/// A `None` password digest keeps the stored one.
#[derive(Debug, Clone)]
pub struct EmployeeUpdate {
    pub email_address: String,
    pub password_digest: Option<String>,
    pub profile: EmployeeProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  John@Example.COM  "), "john@example.com");
        assert_eq!(normalize_email("plain@example.com"), "plain@example.com");
        assert_eq!(normalize_email("   "), "");
    }
}
