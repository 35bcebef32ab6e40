use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DEError, Result};
use crate::parallel_eval::ParallelConfig;
use crate::strategy::Strategy;
use crate::{CallbackAction, DEIntermediate};

/// Per-generation hook; returning [`CallbackAction::Stop`] ends the solve.
pub type CallbackFn = Box<dyn FnMut(&DEIntermediate) -> CallbackAction>;

/// Differential weight F.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    /// The same F for every generation, within [0, 2].
    Factor(f64),
    /// Dithering: F drawn from `[min, max)` once per generation.
    Range {
        /// Inclusive lower end.
        min: f64,
        /// Exclusive upper end.
        max: f64,
    },
}

impl Default for Mutation {
    fn default() -> Self {
        Mutation::Range { min: 0.5, max: 1.0 }
    }
}

impl Mutation {
    pub(crate) fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Mutation::Factor(factor) => factor,
            Mutation::Range { min, max } => rng.random_range(min..max),
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        let outside = |factor: f64| !(0.0..=2.0).contains(&factor);
        match *self {
            Mutation::Factor(factor) | Mutation::Range { min: factor, .. } if outside(factor) => {
                Err(DEError::InvalidMutationFactor { factor })
            }
            Mutation::Range { max, .. } if outside(max) => {
                Err(DEError::InvalidMutationFactor { factor: max })
            }
            Mutation::Range { min, max } if min >= max => {
                Err(DEError::EmptyMutationRange { min, max })
            }
            _ => Ok(()),
        }
    }
}

/// How the first population is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Init {
    /// One point per stratum in every coordinate.
    #[default]
    LatinHypercube,
    /// Independent uniform draws.
    Random,
}

/// Compass-search refinement of the final best point.
#[derive(Debug, Clone)]
pub struct PolishConfig {
    /// Run the refinement at all.
    pub enabled: bool,
    /// Evaluation budget, never more than `200 * n`.
    pub maxeval: usize,
}

/// Solver settings. Field names follow SciPy's `differential_evolution`.
pub struct DEConfig {
    /// Generation budget.
    pub maxiter: usize,
    /// Population multiplier: `popsize * n_free` members, at least
    /// [`MIN_POPULATION`](crate::MIN_POPULATION).
    pub popsize: usize,
    /// Relative part of the stopping threshold `atol + tol * |mean energy|`.
    pub tol: f64,
    /// Absolute part of the stopping threshold.
    pub atol: f64,
    /// Differential weight.
    pub mutation: Mutation,
    /// Crossover probability CR.
    pub recombination: f64,
    /// Mutation base and crossover.
    pub strategy: Strategy,
    /// Layout of the first population.
    pub init: Init,
    /// Fixed seed; `None` seeds from the thread RNG.
    pub seed: Option<u64>,
    /// Debug-log every generation.
    pub disp: bool,
    /// Hook run after each generation.
    pub callback: Option<CallbackFn>,
    /// Refinement of the final best point.
    pub polish: Option<PolishConfig>,
    /// When to fan evaluations out to rayon.
    pub parallel: ParallelConfig,
}

impl Default for DEConfig {
    fn default() -> Self {
        Self {
            maxiter: 1000,
            popsize: 15,
            tol: 1e-2,
            atol: 0.0,
            mutation: Mutation::default(),
            recombination: 0.7,
            strategy: Strategy::Best1Bin,
            init: Init::LatinHypercube,
            seed: None,
            disp: false,
            callback: None,
            polish: None,
            parallel: ParallelConfig::default(),
        }
    }
}

/// Checked construction of a [`DEConfig`].
///
/// ```rust
/// use math_differential_evolution::{DEConfigBuilder, Mutation, Strategy};
///
/// let config = DEConfigBuilder::new()
///     .maxiter(1)
///     .popsize(20)
///     .strategy(Strategy::Rand2Exp)
///     .mutation(Mutation::Range { min: 0.5, max: 1.0 })
///     .seed(7)
///     .build()
///     .unwrap();
/// assert_eq!(config.strategy, Strategy::Rand2Exp);
/// assert!(DEConfigBuilder::new().recombination(1.2).build().is_err());
/// ```
#[derive(Default)]
pub struct DEConfigBuilder {
    config: DEConfig,
}

impl DEConfigBuilder {
    /// Starts from [`DEConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation budget.
    pub fn maxiter(mut self, generations: usize) -> Self {
        self.config.maxiter = generations;
        self
    }

    /// Population multiplier, at least 4.
    pub fn popsize(mut self, multiplier: usize) -> Self {
        self.config.popsize = multiplier;
        self
    }

    /// Relative stopping tolerance.
    pub fn tol(mut self, relative: f64) -> Self {
        self.config.tol = relative;
        self
    }

    /// Absolute stopping tolerance.
    pub fn atol(mut self, absolute: f64) -> Self {
        self.config.atol = absolute;
        self
    }

    /// Differential weight, fixed or dithered.
    pub fn mutation(mut self, weight: Mutation) -> Self {
        self.config.mutation = weight;
        self
    }

    /// Crossover probability CR in [0, 1].
    pub fn recombination(mut self, probability: f64) -> Self {
        self.config.recombination = probability;
        self
    }

    /// Mutation base and crossover.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Layout of the first population.
    pub fn init(mut self, layout: Init) -> Self {
        self.config.init = layout;
        self
    }

    /// Makes the solve reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Debug-log every generation.
    pub fn disp(mut self, verbose: bool) -> Self {
        self.config.disp = verbose;
        self
    }

    /// Hook run after each generation.
    pub fn callback(mut self, hook: CallbackFn) -> Self {
        self.config.callback = Some(hook);
        self
    }

    /// Refine the final best point.
    pub fn polish(mut self, refinement: PolishConfig) -> Self {
        self.config.polish = Some(refinement);
        self
    }

    /// Evaluate populations on the rayon pool.
    pub fn enable_parallel(mut self, on: bool) -> Self {
        self.config.parallel.enabled = on;
        self
    }

    /// Validates and returns the settings.
    ///
    /// # Errors
    ///
    /// [`DEError::PopulationTooSmall`] below a multiplier of 4,
    /// [`DEError::InvalidCrossoverRate`] outside [0, 1], and the mutation
    /// errors for a weight outside [0, 2] or an empty range.
    pub fn build(self) -> Result<DEConfig> {
        let config = self.config;
        if config.popsize < 4 {
            return Err(DEError::PopulationTooSmall {
                pop_size: config.popsize,
            });
        }
        if !(0.0..=1.0).contains(&config.recombination) {
            return Err(DEError::InvalidCrossoverRate {
                rate: config.recombination,
            });
        }
        config.mutation.check()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popsize_floor_is_four() {
        assert!(matches!(
            DEConfigBuilder::new().popsize(3).build(),
            Err(DEError::PopulationTooSmall { pop_size: 3 })
        ));
        assert!(DEConfigBuilder::new().popsize(4).build().is_ok());
    }

    #[test]
    fn mutation_settings_are_checked() {
        assert!(Mutation::Factor(0.8).check().is_ok());
        assert!(Mutation::Range { min: 0.0, max: 2.0 }.check().is_ok());
        assert!(matches!(
            Mutation::Factor(2.5).check(),
            Err(DEError::InvalidMutationFactor { .. })
        ));
        assert!(matches!(
            Mutation::Range { min: 0.2, max: 2.5 }.check(),
            Err(DEError::InvalidMutationFactor { factor }) if factor == 2.5
        ));
        assert!(matches!(
            Mutation::Range { min: 1.0, max: 0.5 }.check(),
            Err(DEError::EmptyMutationRange { .. })
        ));
    }

    #[test]
    fn range_draws_stay_inside() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(4);
        let range = Mutation::Range { min: 0.5, max: 1.0 };
        for _ in 0..100 {
            let f = range.draw(&mut rng);
            assert!((0.5..1.0).contains(&f));
        }
        assert_eq!(Mutation::Factor(0.3).draw(&mut rng), 0.3);
    }
}
