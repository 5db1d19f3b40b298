//! API models for request and response payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::employee::{EMPLOYEE_KIND, Employee};
use crate::pagination::Page;

pub mod employee;
pub mod session;

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub password: String,
}

/// Draft employee attributes as submitted by clients
///
/// Everything is optional at the wire level; the validation layer decides
/// what a given operation requires and reports all violations together.
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeDraft {
    pub email_address: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub phone_number: Option<String>,
    pub international_code: Option<String>,
}

/// Query parameters for the employees index
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page_token: Option<String>,
}

/// Employee as rendered in responses
///
/// The password digest never appears here.
#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    pub id: i64,
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            email_address: employee.email_address,
            first_name: employee.profile.first_name,
            last_name: employee.profile.last_name,
            date_of_birth: employee.profile.date_of_birth,
            phone_number: employee.profile.phone_number,
            created_at: employee.created_at,
            updated_at: employee.updated_at,
            kind: EMPLOYEE_KIND,
        }
    }
}

/// Pagination metadata for a page of employees
#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub page_records: usize,
    pub next_page_token: Option<String>,
    pub previous_page_token: Option<String>,
}

/// Page envelope for the employees collection
#[derive(Debug, Serialize)]
pub struct EmployeePageResponse {
    pub page_info: PageInfo,
    pub employees: Vec<EmployeeResponse>,
}

impl From<Page<Employee>> for EmployeePageResponse {
    fn from(page: Page<Employee>) -> Self {
        Self {
            page_info: PageInfo {
                page_records: page.records.len(),
                next_page_token: page.next_token,
                previous_page_token: page.prev_token,
            },
            employees: page.records.into_iter().map(EmployeeResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_employee() -> Employee {
        Employee {
            id: 1,
            email_address: "john@example.com".to_string(),
            password_digest: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            profile: employee::EmployeeProfile {
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
                phone_number: "+52 55 1234 5678".to_string(),
            },
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_employee_response_shape() {
        let response = EmployeeResponse::from(sample_employee());
        let json = serde_json::to_value(&response).expect("Failed to serialize employee");

        assert_eq!(json["id"], 1);
        assert_eq!(json["email_address"], "john@example.com");
        assert_eq!(json["first_name"], "John");
        assert_eq!(json["last_name"], "Doe");
        assert_eq!(json["date_of_birth"], "1990-01-15");
        assert_eq!(json["phone_number"], "+52 55 1234 5678");
        assert_eq!(json["type"], "Employee");
        assert!(json.get("password_digest").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_page_envelope_shape() {
        let page = Page {
            records: vec![sample_employee()],
            next_token: Some("next".to_string()),
            prev_token: None,
        };

        let json = serde_json::to_value(EmployeePageResponse::from(page))
            .expect("Failed to serialize page");

        assert_eq!(json["page_info"]["page_records"], 1);
        assert_eq!(json["page_info"]["next_page_token"], "next");
        assert_eq!(json["page_info"]["previous_page_token"], serde_json::Value::Null);
        assert_eq!(json["employees"][0]["email_address"], "john@example.com");
    }
}
