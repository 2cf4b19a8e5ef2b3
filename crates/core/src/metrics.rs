//! Ratio and rounding helpers shared by the reporting layer.

use crate::error::CoreError;

/// Round `value` to `places` decimal places (half away from zero).
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Round a monetary amount to cents.
pub fn round_money(value: f64) -> f64 {
    round_to(value, 2)
}

/// `part / whole * 100`, rounded to one decimal. Zero when `whole` is zero.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, 1)
}

/// Validate a `(year, month)` reporting period.
pub fn validate_period(year: i32, month: u32) -> Result<(), CoreError> {
    if !(1..=12).contains(&month) {
        return Err(CoreError::Validation(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    if !(2000..=9999).contains(&year) {
        return Err(CoreError::Validation(format!(
            "year must be between 2000 and 9999, got {year}"
        )));
    }
    Ok(())
}

/// Human-readable `MM/YYYY` label for a reporting period.
pub fn period_label(year: i32, month: u32) -> String {
    format!("{month:02}/{year}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_of_zero_whole_is_zero() {
        assert_eq!(percentage(3, 0), 0.0);
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(4, 4), 100.0);
    }

    #[test]
    fn round_money_keeps_cents() {
        assert_eq!(round_money(10.005_1), 10.01);
        assert_eq!(round_money(3.0 * 19.9), 59.7);
    }

    #[test]
    fn period_validation() {
        assert!(validate_period(2025, 1).is_ok());
        assert!(validate_period(2025, 12).is_ok());
        assert!(validate_period(2025, 0).is_err());
        assert!(validate_period(2025, 13).is_err());
        assert!(validate_period(1999, 5).is_err());
    }

    #[test]
    fn period_label_is_zero_padded() {
        assert_eq!(period_label(2025, 8), "08/2025");
    }
}
