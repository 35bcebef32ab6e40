//! Experiment configuration.
//!
//! Every constant of the reference experiment lives in [`ExperimentConfig`];
//! `Default` reproduces it. Components receive the parts they need at
//! construction time, and randomness flows from a single root RNG built with
//! [`seeded_rng`] at the entry point.

use std::fs;
use std::path::Path;

use math_differential_evolution::Strategy;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{AdaptiveError, Result};

/// Whether the policy and the archive carry over between the runs of one experiment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunIsolation {
    /// Keep learning and accumulating across runs.
    #[default]
    Shared,
    /// Restore the initial policy and clear the archive before every run.
    PerRun,
}

/// Convergence-speed measure used by the strategy benchmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceMetric {
    /// First coordinate index `i` of the final solution with `x[i] <= 1.05 * fun`.
    ///
    /// Indexes the solution vector as if it were a time series, so it measures
    /// dimensionality rather than generations. Kept as the default so results
    /// stay comparable with earlier reports.
    #[default]
    SolutionIndexProxy,
    /// First generation whose best-so-far fitness is within 5% of the final best.
    GenerationTrace,
}

/// Hyper-parameters of the learned strategy selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Adam learning rate of the value network.
    pub learning_rate: f64,
    /// Discount applied to the next state's best value.
    pub discount: f64,
    /// Initial exploration rate.
    pub epsilon_start: f64,
    /// Exploration floor.
    pub epsilon_min: f64,
    /// Multiplicative exploration decay per training call.
    pub epsilon_decay: f64,
    /// Replay buffer capacity (oldest transitions evicted first).
    pub replay_capacity: usize,
    /// Transitions sampled per training call.
    pub batch_size: usize,
    /// Width of both hidden layers.
    pub hidden_units: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            discount: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            replay_capacity: 2000,
            batch_size: 32,
            hidden_units: 24,
        }
    }
}

/// Settings of one differential evolution generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Population size multiplier (individuals = multiplier * dimensions).
    pub population_size: usize,
    /// Crossover probability.
    pub recombination: f64,
    /// Relative convergence tolerance.
    pub tol: f64,
    /// Dithering range of the mutation factor.
    pub mutation: (f64, f64),
    /// Run the bounded compass-search polish on the step's best.
    pub polish: bool,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            recombination: 0.7,
            tol: 0.01,
            mutation: (0.5, 1.0),
            polish: true,
        }
    }
}

impl StepConfig {
    /// `fields` names the population size and mutation range in errors.
    fn validate(&self, fields: (&'static str, &'static str)) -> Result<()> {
        if self.population_size == 0 {
            return Err(AdaptiveError::invalid(fields.0, "must be at least 1"));
        }
        let (f_min, f_max) = self.mutation;
        if !(0.0 <= f_min && f_min < f_max && f_max <= 2.0) {
            return Err(AdaptiveError::invalid(
                fields.1,
                "must satisfy 0 <= min < max <= 2",
            ));
        }
        Ok(())
    }

    /// SciPy's `differential_evolution` defaults, as used by the strategy benchmark.
    pub fn scipy_defaults() -> Self {
        Self {
            population_size: 15,
            ..Self::default()
        }
    }
}

/// Full configuration of an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Action space of the selector, in action-index order.
    pub strategies: Vec<Strategy>,
    /// Elite archive capacity.
    pub archive_capacity: usize,
    /// Generations per adaptive run; also the iteration budget of benchmark runs.
    pub max_generations: usize,
    /// Independent runs per experiment and per benchmarked strategy.
    pub num_runs: usize,
    /// Search-space bounds, one `(low, high)` pair per dimension.
    pub bounds: Vec<(f64, f64)>,
    /// Strategy selector settings.
    pub policy: PolicyConfig,
    /// Generation step settings.
    pub step: StepConfig,
    /// DE settings of the fixed-strategy benchmark runs.
    pub benchmark_step: StepConfig,
    /// Initial step size of the CMA sampler.
    pub cma_step_size: f64,
    /// Reset granularity between runs.
    pub isolation: RunIsolation,
    /// Convergence measure reported by the benchmark.
    pub convergence_metric: ConvergenceMetric,
    /// Root seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

/// The six strategies of the reference experiment.
pub const DEFAULT_STRATEGIES: [Strategy; 6] = [
    Strategy::Best1Bin,
    Strategy::Rand1Bin,
    Strategy::Rand2Bin,
    Strategy::CurrentToBest1Bin,
    Strategy::Best1Exp,
    Strategy::Rand1Exp,
];

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            strategies: DEFAULT_STRATEGIES.to_vec(),
            archive_capacity: 50,
            max_generations: 100,
            num_runs: 10,
            bounds: vec![(-5.0, 5.0), (-5.0, 5.0)],
            policy: PolicyConfig::default(),
            step: StepConfig::default(),
            benchmark_step: StepConfig::scipy_defaults(),
            cma_step_size: 0.3,
            isolation: RunIsolation::default(),
            convergence_metric: ConvergenceMetric::default(),
            seed: None,
        }
    }
}

impl ExperimentConfig {
    /// Loads a JSON configuration; missing fields take their default value.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: ExperimentConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            return Err(AdaptiveError::EmptyActionSpace);
        }
        for (field, value) in [
            ("archive_capacity", self.archive_capacity),
            ("max_generations", self.max_generations),
            ("num_runs", self.num_runs),
            ("policy.replay_capacity", self.policy.replay_capacity),
            ("policy.batch_size", self.policy.batch_size),
            ("policy.hidden_units", self.policy.hidden_units),
        ] {
            if value == 0 {
                return Err(AdaptiveError::invalid(field, "must be at least 1"));
            }
        }
        if self.bounds.is_empty() {
            return Err(AdaptiveError::invalid("bounds", "must not be empty"));
        }
        if let Some((i, (lo, hi))) = self
            .bounds
            .iter()
            .enumerate()
            .find(|(_, (lo, hi))| !(lo.is_finite() && hi.is_finite() && lo <= hi))
        {
            return Err(AdaptiveError::invalid(
                "bounds",
                format!("pair {i} = ({lo}, {hi}) is not a finite low <= high interval"),
            ));
        }

        let p = &self.policy;
        if !(p.learning_rate > 0.0) {
            return Err(AdaptiveError::invalid("policy.learning_rate", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&p.discount) {
            return Err(AdaptiveError::invalid("policy.discount", "must lie in [0, 1]"));
        }
        for (field, value) in [
            ("policy.epsilon_start", p.epsilon_start),
            ("policy.epsilon_min", p.epsilon_min),
            ("policy.epsilon_decay", p.epsilon_decay),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(AdaptiveError::invalid(field, "must lie in (0, 1]"));
            }
        }
        if p.epsilon_min > p.epsilon_start {
            return Err(AdaptiveError::invalid(
                "policy.epsilon_min",
                "must not exceed policy.epsilon_start",
            ));
        }

        self.step.validate(("step.population_size", "step.mutation"))?;
        self.benchmark_step.validate((
            "benchmark_step.population_size",
            "benchmark_step.mutation",
        ))?;
        if !(self.cma_step_size > 0.0) {
            return Err(AdaptiveError::invalid("cma_step_size", "must be > 0"));
        }
        Ok(())
    }

    /// Number of search dimensions.
    pub fn dimensions(&self) -> usize {
        self.bounds.len()
    }
}

/// Builds the root RNG of an experiment. Call once at the entry point and fork
/// component RNGs from it with `StdRng::from_rng`.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_experiment() {
        let config = ExperimentConfig::default();
        assert_eq!(config.strategies.len(), 6);
        assert_eq!(config.strategies[3], Strategy::CurrentToBest1Bin);
        assert_eq!(config.archive_capacity, 50);
        assert_eq!(config.max_generations, 100);
        assert_eq!(config.num_runs, 10);
        assert_eq!(config.bounds, vec![(-5.0, 5.0); 2]);
        assert_eq!(config.policy.replay_capacity, 2000);
        assert_eq!(config.step.population_size, 20);
        assert_eq!(config.benchmark_step.population_size, 15);
        assert_eq!(config.benchmark_step.recombination, config.step.recombination);
        assert_eq!(config.isolation, RunIsolation::Shared);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ExperimentConfig::default();
        config.num_runs = 0;
        assert!(config.validate().unwrap_err().is_config_error());

        let mut config = ExperimentConfig::default();
        config.strategies.clear();
        assert!(matches!(
            config.validate(),
            Err(AdaptiveError::EmptyActionSpace)
        ));

        let mut config = ExperimentConfig::default();
        config.bounds = vec![(1.0, -1.0)];
        assert!(config.validate().is_err());

        let mut config = ExperimentConfig::default();
        config.policy.epsilon_decay = 1.5;
        assert!(config.validate().is_err());

        let mut config = ExperimentConfig::default();
        config.step.mutation = (1.0, 0.5);
        assert!(config.validate().is_err());

        let mut config = ExperimentConfig::default();
        config.benchmark_step.population_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("benchmark_step.population_size"));
    }

    #[test]
    fn test_partial_json_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"strategies": ["rand2exp", "best1bin"], "num_runs": 3,
                "isolation": "per_run", "policy": {{"batch_size": 8}}, "seed": 11}}"#
        )
        .unwrap();

        let config = ExperimentConfig::from_json_file(file.path()).unwrap();
        assert_eq!(
            config.strategies,
            vec![Strategy::Rand2Exp, Strategy::Best1Bin]
        );
        assert_eq!(config.num_runs, 3);
        assert_eq!(config.isolation, RunIsolation::PerRun);
        assert_eq!(config.policy.batch_size, 8);
        assert_eq!(config.policy.discount, 0.95);
        assert_eq!(config.max_generations, 100);
        assert_eq!(config.seed, Some(11));
    }

    #[test]
    fn test_invalid_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"strategies": ["best9bin"]}}"#).unwrap();
        let err = ExperimentConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, AdaptiveError::Json(_)));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a: u64 = seeded_rng(Some(9)).random();
        let b: u64 = seeded_rng(Some(9)).random();
        assert_eq!(a, b);
    }
}
