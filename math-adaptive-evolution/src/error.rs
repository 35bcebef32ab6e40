//! Error types for the adaptive evolution harness.

use math_differential_evolution::DEError;
use thiserror::Error;

/// Errors raised while configuring or running an experiment.
///
/// The search loop itself is total once configured; these come from
/// validation, configuration files and the underlying DE solver.
#[derive(Debug, Error)]
pub enum AdaptiveError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// The selector has no action to choose from.
    #[error("action space is empty")]
    EmptyActionSpace,

    /// The selector returned an index outside the action space.
    #[error("action index {index} out of range for {len} strategies")]
    ActionOutOfRange {
        /// Returned index
        index: usize,
        /// Size of the action space
        len: usize,
    },

    /// Failure reported by the differential evolution solver.
    #[error(transparent)]
    Solver(#[from] DEError),

    /// Reading a configuration file failed.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file is not valid JSON for `ExperimentConfig`.
    #[error("cannot parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for harness operations.
pub type Result<T> = std::result::Result<T, AdaptiveError>;

impl AdaptiveError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        AdaptiveError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Returns `true` for configuration problems (bad values or unreadable files).
    pub fn is_config_error(&self) -> bool {
        match self {
            AdaptiveError::InvalidConfig { .. }
            | AdaptiveError::EmptyActionSpace
            | AdaptiveError::Io(_)
            | AdaptiveError::Json(_) => true,
            AdaptiveError::Solver(e) => e.is_config_error() || e.is_bounds_error(),
            AdaptiveError::ActionOutOfRange { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdaptiveError::invalid("num_runs", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid configuration: num_runs must be at least 1"
        );
        let err = AdaptiveError::ActionOutOfRange { index: 7, len: 6 };
        assert_eq!(err.to_string(), "action index 7 out of range for 6 strategies");
    }

    #[test]
    fn test_solver_errors_are_wrapped() {
        let err: AdaptiveError = DEError::PopulationTooSmall { pop_size: 2 }.into();
        assert!(err.is_config_error());
        assert_eq!(err.to_string(), "popsize multiplier 2 is below 4");
        assert!(!AdaptiveError::ActionOutOfRange { index: 1, len: 1 }.is_config_error());
    }
}
