//! Shared input validation helpers.
//!
//! Every helper returns [`CoreError::Validation`] naming the offending field.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Reject empty or whitespace-only strings.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Reject an optional string that is present but blank.
pub fn reject_blank(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) => require_non_empty(field, v),
        None => Ok(()),
    }
}

/// Validate an optional email address. `None` is accepted.
pub fn validate_email(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(email) if !email.validate_email() => Err(CoreError::Validation(format!(
            "{field} is not a valid email address: {email}"
        ))),
        _ => Ok(()),
    }
}

/// Reject negative amounts (prices, costs, fees, discounts).
pub fn validate_non_negative(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be zero or positive, got {value}"
        )));
    }
    Ok(())
}

/// Reject negative integer quantities (stock levels).
pub fn validate_non_negative_int(field: &str, value: i64) -> Result<(), CoreError> {
    if value < 0 {
        return Err(CoreError::Validation(format!(
            "{field} must be zero or positive, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_rejected() {
        assert!(require_non_empty("name", "   ").is_err());
        assert!(require_non_empty("name", "Ana").is_ok());
        assert!(reject_blank("name", Some("")).is_err());
        assert!(reject_blank("name", None).is_ok());
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("email", Some("ana@example.com")).is_ok());
        assert!(validate_email("email", None).is_ok());
        let err = validate_email("email", Some("not-an-email")).unwrap_err();
        assert!(err.to_string().contains("not a valid email"));
    }

    #[test]
    fn negative_amounts_rejected() {
        assert!(validate_non_negative("price", 0.0).is_ok());
        assert!(validate_non_negative("price", 12.5).is_ok());
        assert!(validate_non_negative("price", -0.01).is_err());
        assert!(validate_non_negative("price", f64::NAN).is_err());
        assert!(validate_non_negative_int("stock", -1).is_err());
    }
}
