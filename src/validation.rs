//! Field-level input checks that collect every failure before reporting.

use chrono::NaiveDate;
use std::str::FromStr;

use crate::error::{ApiError, FieldError};
use crate::types::NumberOrText;

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// `Err` with every collected failure, `Ok` when there are none
    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(self.errors))
        }
    }

    pub fn into_error(self) -> ApiError {
        ApiError::validation_error(self.errors)
    }

    /// Present and non-blank; returns the trimmed value
    pub fn required_text(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                self.push(field, format!("{} is required", field));
                None
            }
        }
    }

    /// Absent is fine; present must be non-blank
    pub fn optional_text(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let v = v.trim();
            if v.is_empty() {
                self.push(field, format!("{} cannot be empty", field));
                None
            } else {
                Some(v.to_string())
            }
        })
    }

    /// Trimmed, at least `min` characters
    pub fn min_length(&mut self, field: &str, value: Option<&str>, min: usize) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if v.chars().count() >= min => Some(v.to_string()),
            _ => {
                self.push(field, format!("{} must be at least {} characters", field, min));
                None
            }
        }
    }

    /// Untrimmed length check for secrets
    pub fn password(&mut self, field: &str, value: Option<String>, min: usize) -> Option<String> {
        match value {
            Some(v) if v.chars().count() >= min => Some(v),
            _ => {
                self.push(field, format!("Password must be at least {} characters", min));
                None
            }
        }
    }

    /// Well-formed address; returns it trimmed and lower-cased
    pub fn email(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(normalize_email) {
            Some(v) if is_valid_email(&v) => Some(v),
            _ => {
                self.push(field, "A valid email is required");
                None
            }
        }
    }

    pub fn optional_email(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        value.and_then(|v| self.email(field, Some(v)))
    }

    /// Calendar date in `YYYY-MM-DD` form
    pub fn date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        let parsed = value.and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok());
        if parsed.is_none() {
            self.push(field, format!("{} must be a date in YYYY-MM-DD format", field));
        }
        parsed
    }

    pub fn optional_date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        value.and_then(|v| self.date(field, Some(v)))
    }

    /// Absent is fine; present must parse into one of the enumerated values
    pub fn optional_enum<T: FromStr<Err = String>>(&mut self, field: &str, value: Option<&str>) -> Option<T> {
        value.and_then(|v| match v.trim().parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.push(field, format!("{} {}", field, e));
                None
            }
        })
    }

    pub fn required_enum<T: FromStr<Err = String>>(&mut self, field: &str, value: Option<&str>) -> Option<T> {
        if non_blank(value).is_none() {
            self.push(field, format!("{} is required", field));
            return None;
        }
        self.optional_enum(field, value)
    }

    pub fn non_negative(&mut self, field: &str, value: Option<f64>) -> Option<f64> {
        match value {
            Some(v) if !v.is_finite() || v < 0.0 => {
                self.push(field, format!("{} must be a non-negative number", field));
                None
            }
            other => other,
        }
    }

    /// Number from a JSON number or numeric text; blank text is absent
    pub fn optional_number(&mut self, field: &str, value: Option<NumberOrText>) -> Option<f64> {
        let parsed = match value? {
            NumberOrText::Integer(i) => Some(i as f64),
            NumberOrText::Float(f) => Some(f),
            NumberOrText::Text(text) => match non_blank(Some(text.as_str())) {
                None => return None,
                Some(raw) => raw.parse::<f64>().ok(),
            },
        };
        if parsed.is_none() {
            self.push(field, format!("{} must be a number", field));
        }
        parsed
    }

    /// Row id from a JSON integer or integer text; blank text is absent
    pub fn optional_id(&mut self, field: &str, value: Option<NumberOrText>) -> Option<i64> {
        let parsed = match value? {
            NumberOrText::Integer(i) => Some(i),
            NumberOrText::Float(_) => None,
            NumberOrText::Text(text) => match non_blank(Some(text.as_str())) {
                None => return None,
                Some(raw) => raw.parse::<i64>().ok(),
            },
        };
        if parsed.is_none() {
            self.push(field, format!("{} must be an integer", field));
        }
        parsed
    }
}

/// Treat empty and whitespace-only values as absent
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Pragmatic address check: one `@`, non-empty local part, dotted domain
/// with non-empty labels, no whitespace.
pub fn is_valid_email(value: &str) -> bool {
    if value.len() > 254 || value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    let tld_ok = labels.last().map(|t| t.len() >= 2).unwrap_or(false);
    tld_ok
        && labels
            .iter()
            .all(|l| !l.is_empty() && !l.starts_with('-') && !l.ends_with('-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;

    #[test]
    fn accepts_and_normalizes_emails() {
        let mut v = Validator::new();
        assert_eq!(v.email("email", Some("  Jane.Doe@Example.COM ")), Some("jane.doe@example.com".to_string()));
        assert!(v.is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["", "plain", "a@b", "@example.com", "a@@example.com", "a b@example.com", "a@example.c", "a@.com"] {
            assert!(!is_valid_email(bad), "accepted {:?}", bad);
        }
    }

    #[test]
    fn collects_every_failure() {
        let mut v = Validator::new();
        v.min_length("username", Some("ab"), 3);
        v.email("email", Some("nope"));
        v.min_length("password", None, 6);
        let err = v.finish().unwrap_err();
        match err {
            ApiError::ValidationError(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["username", "email", "password"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn optional_fields_accept_absence() {
        let mut v = Validator::new();
        assert_eq!(v.optional_text("phone", None), None);
        assert_eq!(v.optional_date("due_date", None), None);
        assert_eq!(v.optional_enum::<TaskStatus>("status", None), None);
        assert!(v.is_ok());
    }

    #[test]
    fn numbers_accept_form_text() {
        let mut v = Validator::new();
        assert_eq!(v.optional_number("salary", Some(NumberOrText::Text(" 95000 ".into()))), Some(95000.0));
        assert_eq!(v.optional_number("salary", Some(NumberOrText::Text(String::new()))), None);
        assert_eq!(v.optional_number("salary", Some(NumberOrText::Integer(70000))), Some(70000.0));
        assert_eq!(v.optional_id("employee_id", Some(NumberOrText::Text("3".into()))), Some(3));
        assert_eq!(v.optional_id("employee_id", None), None);
        assert!(v.is_ok());

        assert_eq!(v.optional_number("salary", Some(NumberOrText::Text("lots".into()))), None);
        assert_eq!(v.optional_id("employee_id", Some(NumberOrText::Float(2.5))), None);
        match v.finish().unwrap_err() {
            ApiError::ValidationError(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["salary", "employee_id"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn dates_must_be_calendar_dates() {
        let mut v = Validator::new();
        assert_eq!(v.date("hire_date", Some("2024-02-29")), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(v.date("hire_date", Some("2023-02-29")), None);
        assert_eq!(v.date("hire_date", Some("29/02/2024")), None);
        assert!(!v.is_ok());
    }

    #[test]
    fn enum_errors_name_the_allowed_values() {
        let mut v = Validator::new();
        assert_eq!(v.optional_enum::<TaskStatus>("status", Some("done")), None);
        let err = v.into_error().to_json();
        assert!(err["errors"][0]["message"].as_str().unwrap().contains("in_progress"));
    }
}
