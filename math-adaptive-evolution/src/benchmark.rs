//! Fixed-strategy comparison: full runs per strategy, then a combined ranking.

use math_differential_evolution::Strategy;
use ndarray::Array1;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::config::{ConvergenceMetric, ExperimentConfig};
use crate::error::{AdaptiveError, Result};
use crate::generation::{DeGenerationStep, GenerationStep, ObjectiveFn, StepOutcome};
use crate::stats;

/// Aggregated and ranked metrics of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyMetrics {
    pub strategy: Strategy,
    /// Average objective value over runs.
    pub aov: f64,
    /// Mean convergence speed over runs (lower is faster).
    pub convergence_speed: f64,
    /// Mean standard deviation of the final solution coordinates.
    pub quality: f64,
    pub aov_rank: usize,
    pub convergence_rank: usize,
    pub quality_rank: usize,
    /// Unweighted mean of the three ranks; lower is better.
    pub average_rank: f64,
}

/// Ranks strategies on `(strategy, aov, convergence_speed, quality)` rows.
///
/// Every metric ranks ascending from 0; equal values rank in input order.
pub fn rank_strategies(rows: &[(Strategy, f64, f64, f64)]) -> Vec<StrategyMetrics> {
    let aov: Vec<f64> = rows.iter().map(|r| r.1).collect();
    let speed: Vec<f64> = rows.iter().map(|r| r.2).collect();
    let quality: Vec<f64> = rows.iter().map(|r| r.3).collect();
    let (aov_ranks, speed_ranks, quality_ranks) =
        (stats::ranks(&aov), stats::ranks(&speed), stats::ranks(&quality));

    rows.iter()
        .enumerate()
        .map(|(i, &(strategy, aov, convergence_speed, quality))| StrategyMetrics {
            strategy,
            aov,
            convergence_speed,
            quality,
            aov_rank: aov_ranks[i],
            convergence_rank: speed_ranks[i],
            quality_rank: quality_ranks[i],
            average_rank: (aov_ranks[i] + speed_ranks[i] + quality_ranks[i]) as f64 / 3.0,
        })
        .collect()
}

/// Convergence speed of one finished run.
pub fn convergence_speed(
    metric: ConvergenceMetric,
    outcome: &StepOutcome,
    max_generations: usize,
) -> usize {
    let fun = outcome.candidate.fitness;
    match metric {
        ConvergenceMetric::SolutionIndexProxy => outcome
            .candidate
            .solution
            .iter()
            .position(|&v| v <= 1.05 * fun)
            .unwrap_or(max_generations),
        ConvergenceMetric::GenerationTrace => {
            let threshold = fun + 0.05 * fun.abs();
            outcome
                .trace
                .iter()
                .position(|&f| f <= threshold)
                .map_or(max_generations, |g| g + 1)
        }
    }
}

fn coordinate_spread(solution: &Array1<f64>) -> f64 {
    solution.std(0.0)
}

/// Runs every strategy `num_runs` times with a full iteration budget.
pub struct StrategyBenchmark<G> {
    strategies: Vec<Strategy>,
    bounds: Vec<(f64, f64)>,
    num_runs: usize,
    max_generations: usize,
    metric: ConvergenceMetric,
    step: G,
}

impl StrategyBenchmark<DeGenerationStep> {
    /// DE runs of `max_generations` iterations with `benchmark_step` settings, seeded from `rng`.
    pub fn from_config(config: &ExperimentConfig, rng: &mut StdRng) -> Result<Self> {
        config.validate()?;
        let step = DeGenerationStep::with_iterations(
            config.benchmark_step.clone(),
            config.max_generations,
            rng,
        );
        Self::new(config, step)
    }
}

impl<G: GenerationStep> StrategyBenchmark<G> {
    pub fn new(config: &ExperimentConfig, step: G) -> Result<Self> {
        if config.strategies.is_empty() {
            return Err(AdaptiveError::EmptyActionSpace);
        }
        Ok(Self {
            strategies: config.strategies.clone(),
            bounds: config.bounds.clone(),
            num_runs: config.num_runs,
            max_generations: config.max_generations,
            metric: config.convergence_metric,
            step,
        })
    }

    pub fn run(&mut self, objective: &ObjectiveFn) -> Result<Vec<StrategyMetrics>> {
        let mut rows = Vec::with_capacity(self.strategies.len());
        for &strategy in &self.strategies {
            let mut fitness = Vec::with_capacity(self.num_runs);
            let mut speed = Vec::with_capacity(self.num_runs);
            let mut quality = Vec::with_capacity(self.num_runs);
            for _ in 0..self.num_runs {
                let outcome = self.step.step(objective, &self.bounds, strategy)?;
                fitness.push(outcome.candidate.fitness);
                speed.push(convergence_speed(self.metric, &outcome, self.max_generations) as f64);
                quality.push(coordinate_spread(&outcome.candidate.solution));
            }
            let row = (
                strategy,
                stats::mean(&fitness),
                stats::mean(&speed),
                stats::mean(&quality),
            );
            log::info!(
                "{strategy}: AOV {:.4e}, C_s {:.2}, Q {:.4e}",
                row.1,
                row.2,
                row.3
            );
            rows.push(row);
        }
        Ok(rank_strategies(&rows))
    }
}
