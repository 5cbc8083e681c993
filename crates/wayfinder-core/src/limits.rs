//! Fixed model constants and input validation limits

/// Turn costs are measured on `[0, MAX_DEFLECTION_DEGREES]`
pub const MAX_DEFLECTION_DEGREES: f64 = 180.0;

/// Half-width of the direction cone a gateway must fall into (±140°)
pub const GATEWAY_CONE_DEGREES: f64 = 140.0;

/// Aperture of the view field used to spot barriers (70°)
pub const VIEW_FIELD_APERTURE_DEGREES: f64 = 70.0;

/// Discount applied to distant landmarks that do not anchor the destination
pub const UNANCHORED_LANDMARK_DISCOUNT: f64 = 0.90;

/// Ids are stored as `u32`
pub const MAX_WORLD_ELEMENTS: usize = u32::MAX as usize;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    NonPositiveMean { name: String, mean: f64 },
    NegativeSpread { name: String, sd: f64 },
    FractionOutOfRange { name: String, value: f64 },
    NegativeDistance { name: String, value: f64 },
    TooManyElements { kind: &'static str, count: usize, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveMean { name, mean } => {
                write!(f, "{} mean must be positive and finite, got {}", name, mean)
            }
            Self::NegativeSpread { name, sd } => {
                write!(f, "{} standard deviation must be non-negative and finite, got {}", name, sd)
            }
            Self::FractionOutOfRange { name, value } => {
                write!(f, "{} must lie in [0, 1], got {}", name, value)
            }
            Self::NegativeDistance { name, value } => {
                write!(f, "{} must be a non-negative distance, got {}", name, value)
            }
            Self::TooManyElements { kind, count, max } => {
                write!(f, "Too many {}: {} (max {})", kind, count, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate the parameters of a perception-error distribution
pub fn validate_perception(name: &str, mean: f64, sd: f64) -> Result<(), ValidationError> {
    if !(mean.is_finite() && mean > 0.0) {
        return Err(ValidationError::NonPositiveMean {
            name: name.to_string(),
            mean,
        });
    }
    if !(sd.is_finite() && sd >= 0.0) {
        return Err(ValidationError::NegativeSpread {
            name: name.to_string(),
            sd,
        });
    }
    Ok(())
}

/// Validate a value expected in `[0, 1]` (percentiles, weights, thresholds)
pub fn validate_fraction(name: &str, value: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::FractionOutOfRange {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

/// Validate a distance-like parameter
pub fn validate_distance(name: &str, value: f64) -> Result<(), ValidationError> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(ValidationError::NegativeDistance {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

/// Validate that an arena fits `u32` ids
pub fn validate_arena_size(kind: &'static str, count: usize) -> Result<(), ValidationError> {
    if count > MAX_WORLD_ELEMENTS {
        return Err(ValidationError::TooManyElements {
            kind,
            count,
            max: MAX_WORLD_ELEMENTS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_perception() {
        assert!(validate_perception("error", 1.0, 0.1).is_ok());
        assert!(validate_perception("error", 0.0, 0.1).is_err());
        assert!(validate_perception("error", 1.0, -0.1).is_err());
        assert!(validate_perception("error", f64::NAN, 0.1).is_err());
    }

    #[test]
    fn test_validate_fraction() {
        assert!(validate_fraction("percentile", 0.75).is_ok());
        assert!(validate_fraction("percentile", 1.5).is_err());
        assert!(validate_fraction("percentile", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_distance() {
        assert!(validate_distance("threshold", 300.0).is_ok());
        assert!(validate_distance("threshold", -1.0).is_err());
    }
}
