//! Failures of solver setup.
//!
//! Once a [`DifferentialEvolution`](crate::DifferentialEvolution) exists the
//! solve itself cannot fail; everything here is caught by the constructor or
//! by [`DEConfigBuilder::build`](crate::DEConfigBuilder::build).

use thiserror::Error;

/// Rejected bounds or settings.
#[derive(Debug, Error)]
pub enum DEError {
    /// `lower` and `upper` describe a different number of coordinates.
    #[error("bounds describe {lower_len} lower and {upper_len} upper coordinates")]
    BoundsMismatch {
        /// Coordinates in the lower bound vector
        lower_len: usize,
        /// Coordinates in the upper bound vector
        upper_len: usize,
    },

    /// Coordinate `index` has an empty interval.
    #[error("coordinate {index} has lower bound {lower} above upper bound {upper}")]
    InvalidBounds {
        /// Coordinate position
        index: usize,
        /// Lower end
        lower: f64,
        /// Upper end
        upper: f64,
    },

    /// The `popsize` multiplier is below 4.
    #[error("popsize multiplier {pop_size} is below 4")]
    PopulationTooSmall {
        /// Requested multiplier
        pop_size: usize,
    },

    /// A fixed factor or range end lies outside [0, 2].
    #[error("mutation factor {factor} lies outside [0, 2]")]
    InvalidMutationFactor {
        /// Offending factor
        factor: f64,
    },

    /// A dithering range whose lower end is not strictly below its upper end.
    #[error("mutation range [{min}, {max}) is empty")]
    EmptyMutationRange {
        /// Lower end
        min: f64,
        /// Upper end
        max: f64,
    },

    /// Recombination probability outside [0, 1].
    #[error("recombination {rate} lies outside [0, 1]")]
    InvalidCrossoverRate {
        /// Offending probability
        rate: f64,
    },

    /// No strategy answers to this name.
    #[error("no strategy named '{name}'")]
    UnknownStrategy {
        /// Name as given
        name: String,
    },
}

/// Solver result alias.
pub type Result<T> = std::result::Result<T, DEError>;

impl DEError {
    /// The bounds handed to the solver were malformed.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            DEError::BoundsMismatch { .. } | DEError::InvalidBounds { .. }
        )
    }

    /// A setting of [`DEConfig`](crate::DEConfig) or a strategy name was rejected.
    pub fn is_config_error(&self) -> bool {
        !self.is_bounds_error()
    }
}
