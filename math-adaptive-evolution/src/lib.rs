#![doc = include_str!("../README.md")]

pub mod archive;
pub mod benchmark;
pub mod cma;
pub mod config;
pub mod error;
pub mod experiment;
pub mod generation;
pub mod policy;
pub mod report;
pub mod search;
pub mod stats;

pub use archive::EliteArchive;
pub use benchmark::{StrategyBenchmark, StrategyMetrics, rank_strategies};
pub use cma::CmaSampler;
pub use config::{
    ConvergenceMetric, DEFAULT_STRATEGIES, ExperimentConfig, PolicyConfig, RunIsolation,
    StepConfig, seeded_rng,
};
pub use error::{AdaptiveError, Result};
pub use experiment::{ExperimentMetrics, ExperimentResult, MultiRunExperiment};
pub use generation::{Candidate, DeGenerationStep, GenerationStep, ObjectiveFn, StepOutcome};
pub use math_differential_evolution::Strategy;
pub use policy::{
    QNetwork, ReplayBuffer, StrategySelectionPolicy, StrategySelector, Transition, ValueModel,
};
pub use search::{AdaptiveSearch, DefaultSearch, RunResult};

use rand::rngs::StdRng;

/// Builds the default search from `config` and runs a full experiment on `objective`.
pub fn run_adaptive_experiment(
    config: &ExperimentConfig,
    objective: &ObjectiveFn,
    rng: &mut StdRng,
) -> Result<ExperimentResult> {
    let search = DefaultSearch::from_config(config, rng)?;
    MultiRunExperiment::new(config, search).run(objective)
}

/// Builds the DE benchmark from `config` and ranks every configured strategy.
pub fn run_strategy_benchmark(
    config: &ExperimentConfig,
    objective: &ObjectiveFn,
    rng: &mut StdRng,
) -> Result<Vec<StrategyMetrics>> {
    StrategyBenchmark::from_config(config, rng)?.run(objective)
}
