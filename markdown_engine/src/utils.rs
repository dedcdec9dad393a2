//! Shared validation and date helpers

use chrono::NaiveDate;

/// Validate a finite value within an inclusive range
pub fn validate_range(value: f64, min: f64, max: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || value < min || value > max {
        return Err(format!("{} must be between {} and {}, got {}", name, min, max, value));
    }
    Ok(())
}

/// Validate a finite value is zero or greater
pub fn validate_non_negative(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} must be a non-negative number, got {}", name, value));
    }
    Ok(())
}

/// Validate a finite value is strictly positive
pub fn validate_positive(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("{} must be positive, got {}", name, value));
    }
    Ok(())
}

/// Fractional weeks from `from` to `to`; negative when `to` is earlier
pub fn fractional_weeks(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / 7.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validators() {
        assert!(validate_range(0.5, 0.0, 1.0, "pct").is_ok());
        assert!(validate_range(1.5, 0.0, 1.0, "pct").is_err());
        assert!(validate_range(f64::NAN, 0.0, 1.0, "pct").is_err());
        assert!(validate_non_negative(0.0, "stock").is_ok());
        assert!(validate_non_negative(-0.1, "stock").is_err());
        assert!(validate_positive(0.0, "multiplier").is_err());
    }

    #[test]
    fn test_fractional_weeks() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        assert!((fractional_weeks(a, b) - 10.0 / 7.0).abs() < 1e-12);
        assert!(fractional_weeks(b, a) < 0.0);
    }
}
