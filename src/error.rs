use thiserror::Error;

/// Error raised while calculating a single entity (stream, process, precursor...).
///
/// Engines never propagate these past the entity that produced them; they are
/// rendered into that entity's error list and its siblings keep calculating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    #[error("missing required input: {0}")]
    MissingInput(String),

    #[error("{field} produced a non-finite value")]
    NonFinite { field: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: String },

    #[error("method {0} is calculated in its own table")]
    DelegatedMethod(String),
}

impl CalculationError {
    pub fn non_finite(field: &str) -> Self {
        CalculationError::NonFinite {
            field: field.to_string(),
        }
    }

    pub fn missing(field: &str) -> Self {
        CalculationError::MissingInput(field.to_string())
    }
}

/// Unwraps an optional input the current method cannot do without.
pub fn require_input(field: &str, value: Option<f64>) -> Result<f64, CalculationError> {
    value.ok_or_else(|| CalculationError::missing(field))
}

/// Checks that a derived value is usable before it is written back.
pub fn ensure_finite(field: &str, value: f64) -> Result<f64, CalculationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalculationError::non_finite(field))
    }
}

/// Error raised when loading a [`crate::config::CalculationConfig`].
#[derive(Error, Debug, Clone, PartialEq, uniffi::Error)]
#[uniffi(flat_error)]
pub enum ConfigError {
    #[error("invalid configuration json: {0}")]
    Json(String),

    #[error("invalid tolerance band {name}: warning {warning} must not exceed error {error}")]
    InvertedBand {
        name: String,
        warning: f64,
        error: f64,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculation_error_display() {
        let err = CalculationError::MissingInput("emission factor".to_string());
        assert_eq!(err.to_string(), "missing required input: emission factor");

        let err = CalculationError::non_finite("total emissions");
        assert_eq!(err.to_string(), "total emissions produced a non-finite value");

        let err = CalculationError::NotPositive {
            field: "current efficiency".to_string(),
        };
        assert_eq!(err.to_string(), "current efficiency must be greater than zero");

        let err = CalculationError::DelegatedMethod("PFC".to_string());
        assert_eq!(err.to_string(), "method PFC is calculated in its own table");
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("x", 1.5), Ok(1.5));
        assert!(ensure_finite("x", f64::NAN).is_err());
        assert!(ensure_finite("x", f64::INFINITY).is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvertedBand {
            name: "direct".to_string(),
            warning: 70.0,
            error: 60.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid tolerance band direct: warning 70 must not exceed error 60"
        );
    }
}
