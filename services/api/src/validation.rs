//! Employee attribute validation
//!
//! Checks drafts against the rules the records must satisfy and reports
//! every violation together rather than stopping at the first. Uniqueness
//! is the one rule not handled here; it needs the store and lives with the
//! handlers (with the unique index as a backstop).

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::config::CountryCodes;
use crate::models::EmployeeDraft;
use crate::models::employee::{Employee, EmployeeProfile, normalize_email};
use crate::phone;

/// Uniqueness violation message, shared with the error layer
pub const EMAIL_TAKEN: &str = "Email address has already been taken";

/// Default formatting country when no international code is given
const DEFAULT_COUNTRY: &str = "MX";
const DEFAULT_DIALING_CODE: &str = "52";

const PASSWORD_MIN_CHARS: usize = 6;

/// Validated attributes for a new employee
#[derive(Debug)]
pub struct ValidEmployee {
    /// Normalized email address
    pub email_address: String,
    /// Plaintext password, still to be hashed
    pub password: String,
    /// Profile with the phone number already formatted
    pub profile: EmployeeProfile,
}

/// Validated attribute set for an update
#[derive(Debug)]
pub struct EmployeeChanges {
    pub email_address: String,
    /// New plaintext password, `None` when unchanged
    pub password: Option<String>,
    pub profile: EmployeeProfile,
}

/// Whether an email address has a valid shape
pub fn email_format_valid(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^[^@\s]+@(?:[-a-z0-9]+\.)+[a-z]{2,}$")
            .expect("Failed to compile email regex")
    });

    regex.is_match(email)
}

/// Validate a draft for registration or create
///
/// Every field is required. Returns the validated attributes or the full
/// list of violation messages.
pub fn validate_new(
    draft: &EmployeeDraft,
    codes: &CountryCodes,
) -> Result<ValidEmployee, Vec<String>> {
    let mut messages = Vec::new();

    let email_address = normalize_email(draft.email_address.as_deref().unwrap_or(""));
    check_email(&email_address, &mut messages);

    let first_name = required_text(draft.first_name.as_deref(), "First name", &mut messages);
    let last_name = required_text(draft.last_name.as_deref(), "Last name", &mut messages);
    let date_of_birth = required_date(draft.date_of_birth.as_deref(), &mut messages);

    let country = checked_country(draft.international_code.as_deref(), codes, &mut messages);
    let phone_number = required_phone(draft.phone_number.as_deref(), country, codes, &mut messages);

    let password = check_password(
        draft.password.as_deref(),
        draft.password_confirmation.as_deref(),
        true,
        &mut messages,
    );

    match (first_name, last_name, date_of_birth, phone_number, password) {
        (Some(first_name), Some(last_name), Some(date_of_birth), Some(phone_number), Some(password))
            if messages.is_empty() =>
        {
            Ok(ValidEmployee {
                email_address,
                password,
                profile: EmployeeProfile {
                    first_name,
                    last_name,
                    date_of_birth,
                    phone_number,
                },
            })
        }
        _ => Err(messages),
    }
}

/// Validate a partial update against an existing employee
///
/// Only fields present in the draft are revalidated; everything else keeps
/// its stored value.
pub fn validate_update(
    existing: &Employee,
    draft: &EmployeeDraft,
    codes: &CountryCodes,
) -> Result<EmployeeChanges, Vec<String>> {
    let mut messages = Vec::new();

    let email_address = match draft.email_address.as_deref() {
        Some(raw) => {
            let normalized = normalize_email(raw);
            check_email(&normalized, &mut messages);
            normalized
        }
        None => existing.email_address.clone(),
    };

    let first_name = match draft.first_name.as_deref() {
        Some(raw) => required_text(Some(raw), "First name", &mut messages)
            .unwrap_or_else(|| existing.profile.first_name.clone()),
        None => existing.profile.first_name.clone(),
    };

    let last_name = match draft.last_name.as_deref() {
        Some(raw) => required_text(Some(raw), "Last name", &mut messages)
            .unwrap_or_else(|| existing.profile.last_name.clone()),
        None => existing.profile.last_name.clone(),
    };

    let date_of_birth = match draft.date_of_birth.as_deref() {
        Some(raw) => required_date(Some(raw), &mut messages)
            .unwrap_or(existing.profile.date_of_birth),
        None => existing.profile.date_of_birth,
    };

    let country = checked_country(draft.international_code.as_deref(), codes, &mut messages);

    // A stored phone number is already formatted; only a newly submitted
    // one goes through normalization again.
    let phone_number = match draft.phone_number.as_deref() {
        Some(raw) => required_phone(Some(raw), country, codes, &mut messages)
            .unwrap_or_else(|| existing.profile.phone_number.clone()),
        None => existing.profile.phone_number.clone(),
    };

    let password = check_password(
        draft.password.as_deref(),
        draft.password_confirmation.as_deref(),
        false,
        &mut messages,
    );

    if messages.is_empty() {
        Ok(EmployeeChanges {
            email_address,
            password,
            profile: EmployeeProfile {
                first_name,
                last_name,
                date_of_birth,
                phone_number,
            },
        })
    } else {
        Err(messages)
    }
}

fn check_email(normalized: &str, messages: &mut Vec<String>) {
    if normalized.is_empty() {
        messages.push("Email address can't be blank".to_string());
    } else if !email_format_valid(normalized) {
        messages.push("Email address is not a valid email address".to_string());
    }
}

fn required_text(value: Option<&str>, field: &str, messages: &mut Vec<String>) -> Option<String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Some(v.to_string()),
        None => {
            messages.push(format!("{} can't be blank", field));
            None
        }
    }
}

fn required_date(value: Option<&str>, messages: &mut Vec<String>) -> Option<NaiveDate> {
    let parsed = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok());

    if parsed.is_none() {
        messages.push("Date of birth can't be blank".to_string());
    }

    parsed
}

/// Check the international code against the whitelist and hand back the
/// country to format phone numbers under
fn checked_country<'a>(
    value: Option<&'a str>,
    codes: &CountryCodes,
    messages: &mut Vec<String>,
) -> &'a str {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(country) => {
            if !codes.is_supported(country) {
                messages.push("International code is not a supported country".to_string());
            }
            country
        }
        None => DEFAULT_COUNTRY,
    }
}

fn required_phone(
    value: Option<&str>,
    country: &str,
    codes: &CountryCodes,
    messages: &mut Vec<String>,
) -> Option<String> {
    let raw = match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw,
        None => {
            messages.push("Phone number can't be blank".to_string());
            return None;
        }
    };

    let dialing = codes.dialing_code(country).unwrap_or(DEFAULT_DIALING_CODE);
    match phone::format(raw, dialing) {
        Some(formatted) => Some(formatted),
        None => {
            messages.push("Phone number is not a valid phone number".to_string());
            None
        }
    }
}

fn check_password(
    password: Option<&str>,
    confirmation: Option<&str>,
    required: bool,
    messages: &mut Vec<String>,
) -> Option<String> {
    let password = match password {
        Some(p) => p,
        None => {
            if required {
                messages.push("Password can't be blank".to_string());
            }
            return None;
        }
    };

    let mut valid = true;

    if password.is_empty() && required {
        messages.push("Password can't be blank".to_string());
        valid = false;
    }

    if password.chars().count() < PASSWORD_MIN_CHARS {
        messages.push("Password is too short (minimum is 6 characters)".to_string());
        valid = false;
    }

    // Confirmation is only checked when the client sent one.
    if let Some(confirmation) = confirmation {
        if confirmation != password {
            messages.push("Password confirmation doesn't match Password".to_string());
            valid = false;
        }
    }

    valid.then(|| password.to_string())
}
