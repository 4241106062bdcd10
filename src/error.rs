//! Error types shared by configuration loading and the step function.

use thiserror::Error;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.energy_mwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Reasons a step request is rejected before any state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StepError {
    /// `dt` was zero, negative, or not finite.
    #[error("dt must be a finite value > 0 s, got {0}")]
    NonPositiveDt(f64),
    /// No configuration has been supplied to the engine yet.
    #[error("simulation is not initialized")]
    NotInitialized,
}

/// Top-level error returned by the simulation operations.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid or contradictory configuration, detected at initialize time.
    #[error("invalid configuration: {}", join_config_errors(.0))]
    Config(Vec<ConfigError>),
    /// Bad `dt` or uninitialized state. Recoverable by correcting the call.
    #[error("invalid step: {0}")]
    InvalidStep(#[from] StepError),
    /// A clamped quantity came out non-finite.
    #[error("numeric overflow in {0}")]
    NumericOverflow(&'static str),
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        Self::Config(vec![err])
    }
}

fn join_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_names_field() {
        let e = ConfigError::new("system.f0_hz", "must be > 0");
        assert_eq!(e.to_string(), "config error: system.f0_hz: must be > 0");
    }

    #[test]
    fn sim_error_joins_all_config_errors() {
        let err = SimError::Config(vec![
            ConfigError::new("a", "bad"),
            ConfigError::new("b", "worse"),
        ]);
        let s = err.to_string();
        assert!(s.contains("a: bad"));
        assert!(s.contains("b: worse"));
    }

    #[test]
    fn step_error_converts_into_sim_error() {
        let err: SimError = StepError::NonPositiveDt(-1.0).into();
        assert!(matches!(
            err,
            SimError::InvalidStep(StepError::NonPositiveDt(_))
        ));
    }
}
