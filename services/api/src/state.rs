//! Application state shared across handlers

use crate::config::CountryCodes;
use crate::repositories::{EmployeeRepository, SessionRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub employee_repository: EmployeeRepository,
    pub session_repository: SessionRepository,
    pub country_codes: CountryCodes,
}
