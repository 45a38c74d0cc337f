//! Client-side parameter checks
//!
//! Anything rejected here never reaches the backend.

use crate::core::error::{Error, Result};

/// Upper bound for impact scores and thresholds
pub const MAX_SCORE: f64 = 10.0;

/// `-1` (whole graph) or a positive depth
pub fn max_level(value: i64) -> Result<i64> {
    if value == -1 || value > 0 {
        Ok(value)
    } else {
        Err(Error::invalid(
            "max_level",
            format!("must be -1 or a positive integer, got {}", value),
        ))
    }
}

/// Score in `[0, 10]`
pub fn score(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=MAX_SCORE).contains(&value) {
        Ok(value)
    } else {
        Err(Error::invalid(
            field,
            format!("must be between 0 and {}, got {}", MAX_SCORE, value),
        ))
    }
}

pub fn limit(value: u32) -> Result<u32> {
    if value > 0 {
        Ok(value)
    } else {
        Err(Error::invalid("limit", "must be greater than zero"))
    }
}

pub fn thresholds(min: f64, max: f64) -> Result<(f64, f64)> {
    let min = score("min_threshold", min)?;
    let max = score("max_threshold", max)?;
    if min > max {
        return Err(Error::invalid(
            "min_threshold",
            format!("must not exceed max_threshold ({} > {})", min, max),
        ));
    }
    Ok((min, max))
}

pub fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::invalid(field, "is required")),
    }
}

/// Identifier safe to embed in a URL path segment
pub fn path_id<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = required(field, Some(value))?;
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        Ok(value)
    } else {
        Err(Error::invalid(field, "contains unsupported characters"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_level() {
        assert_eq!(max_level(-1).unwrap(), -1);
        assert_eq!(max_level(3).unwrap(), 3);
        assert!(max_level(0).is_err());
        assert!(max_level(-2).is_err());
    }

    #[test]
    fn test_score_bounds() {
        assert!(score("impact", 0.0).is_ok());
        assert!(score("impact", 10.0).is_ok());
        assert!(score("impact", 10.01).is_err());
        assert!(score("impact", -0.5).is_err());
        assert!(score("impact", f64::NAN).is_err());
    }

    #[test]
    fn test_thresholds_order() {
        assert!(thresholds(2.0, 8.0).is_ok());
        let err = thresholds(9.0, 1.0).unwrap_err();
        assert_eq!(err.code(), "invalid_parameter");
    }

    #[test]
    fn test_path_id() {
        assert!(path_id("vex_id", "65f0c0ffee").is_ok());
        assert!(path_id("vex_id", "../etc").is_err());
        assert!(path_id("vex_id", "  ").is_err());
    }
}
