//! Repeated adaptive runs and their aggregate statistics.

use ndarray::Array1;
use serde::Serialize;

use crate::config::{ExperimentConfig, RunIsolation};
use crate::error::Result;
use crate::generation::{Candidate, GenerationStep, ObjectiveFn};
use crate::policy::StrategySelector;
use crate::search::{AdaptiveSearch, RunResult};
use crate::stats;

/// Summary metrics of an experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentMetrics {
    /// Lowest per-run best fitness.
    pub best_fitness: f64,
    /// Mean of the per-run best fitness values.
    pub mean_best_fitness: f64,
    /// Standard deviation of the per-run best fitness values.
    pub std_best_fitness: f64,
    /// Mean over runs of the first generation reaching
    /// `best + 0.1 * (worst_run_best - best)`.
    pub avg_convergence_generation: f64,
    /// Mean of every recorded fitness value.
    pub mean_fitness: f64,
    /// Standard deviation of every recorded fitness value.
    pub std_fitness: f64,
}

impl ExperimentMetrics {
    /// Computes the metrics from per-run histories. Runs that never reach the
    /// convergence threshold count as `max_generations`.
    pub fn from_histories(histories: &[Vec<f64>], max_generations: usize) -> Self {
        let run_best: Vec<f64> = histories.iter().map(|h| stats::min(h)).collect();
        let best = stats::min(&run_best);
        let threshold = best + 0.1 * (stats::max(&run_best) - best);
        let convergence: Vec<f64> = histories
            .iter()
            .map(|h| {
                h.iter()
                    .position(|&f| f <= threshold)
                    .unwrap_or(max_generations) as f64
            })
            .collect();
        let all: Vec<f64> = histories.iter().flatten().copied().collect();

        Self {
            best_fitness: best,
            mean_best_fitness: stats::mean(&run_best),
            std_best_fitness: stats::std_dev(&run_best),
            avg_convergence_generation: stats::mean(&convergence),
            mean_fitness: stats::mean(&all),
            std_fitness: stats::std_dev(&all),
        }
    }
}

/// Outcome of a multi-run experiment.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentResult {
    /// Best candidate of the last run.
    pub best: Option<Candidate>,
    /// Best candidate over all runs.
    pub overall_best: Option<Candidate>,
    /// Mean of every per-generation fitness value of every run.
    pub mean_fitness: f64,
    /// Largest per-generation fitness value of any run.
    pub max_fitness: f64,
    /// Standard deviation of every per-generation fitness value of every run.
    pub std_fitness: f64,
    /// One fitness history per run, in run order.
    pub all_runs_fitness_history: Vec<Vec<f64>>,
    /// Number of archived candidates at the end.
    pub archive_size: usize,
    /// Coordinate mean of the archive at the end.
    pub archive_summary: Option<Array1<f64>>,
    pub metrics: ExperimentMetrics,
}

/// Runs the adaptive search `num_runs` times.
///
/// With [`RunIsolation::Shared`] the selector keeps learning and the archive
/// keeps accumulating from one run to the next; with
/// [`RunIsolation::PerRun`] both are restored before every run.
pub struct MultiRunExperiment<P, G> {
    search: AdaptiveSearch<P, G>,
    num_runs: usize,
    isolation: RunIsolation,
}

impl<P: StrategySelector, G: GenerationStep> MultiRunExperiment<P, G> {
    pub fn new(config: &ExperimentConfig, search: AdaptiveSearch<P, G>) -> Self {
        Self {
            search,
            num_runs: config.num_runs,
            isolation: config.isolation,
        }
    }

    pub fn run(&mut self, objective: &ObjectiveFn) -> Result<ExperimentResult> {
        let mut runs: Vec<RunResult> = Vec::with_capacity(self.num_runs);
        for run in 0..self.num_runs {
            if self.isolation == RunIsolation::PerRun {
                self.search.reset();
            }
            let result = self.search.run(objective)?;
            log::info!(
                "run {}/{}: best fitness {:.6e}, archive size {}",
                run + 1,
                self.num_runs,
                result.best_fitness(),
                self.search.archive().len()
            );
            runs.push(result);
        }

        let overall_best = runs
            .iter()
            .filter_map(|r| r.best.as_ref())
            .reduce(|a, b| if b.fitness < a.fitness { b } else { a })
            .cloned();
        let all_runs_fitness_history: Vec<Vec<f64>> =
            runs.iter().map(|r| r.fitness_history.clone()).collect();
        let flat: Vec<f64> = all_runs_fitness_history.iter().flatten().copied().collect();
        let metrics = ExperimentMetrics::from_histories(
            &all_runs_fitness_history,
            self.search.max_generations(),
        );

        Ok(ExperimentResult {
            best: runs.last().and_then(|r| r.best.clone()),
            overall_best,
            mean_fitness: stats::mean(&flat),
            max_fitness: stats::max(&flat),
            std_fitness: stats::std_dev(&flat),
            all_runs_fitness_history,
            archive_size: self.search.archive().len(),
            archive_summary: self.search.archive().extract_summary(),
            metrics,
        })
    }

    pub fn search(&self) -> &AdaptiveSearch<P, G> {
        &self.search
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::StepOutcome;
    use crate::policy::Transition;
    use approx::assert_relative_eq;
    use math_differential_evolution::Strategy;
    use std::sync::Arc;

    /// Replays a fixed list of fitness values, one per call, cycling.
    struct Scripted {
        values: Vec<f64>,
        calls: usize,
    }

    impl GenerationStep for Scripted {
        fn step(
            &mut self,
            _objective: &ObjectiveFn,
            _bounds: &[(f64, f64)],
            _strategy: Strategy,
        ) -> Result<StepOutcome> {
            let fitness = self.values[self.calls % self.values.len()];
            self.calls += 1;
            Ok(StepOutcome {
                candidate: Candidate {
                    solution: Array1::from_elem(2, fitness),
                    fitness,
                },
                trace: Vec::new(),
                evaluations: 1,
            })
        }
    }

    /// Counts resets and training calls.
    #[derive(Default)]
    struct Counting {
        resets: usize,
        trains: usize,
    }

    impl StrategySelector for Counting {
        fn select_action(&mut self, _state: &[f64]) -> usize {
            0
        }
        fn remember(&mut self, _transition: Transition) {}
        fn train(&mut self) -> Option<f64> {
            self.trains += 1;
            None
        }
        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn experiment(
        isolation: RunIsolation,
        values: Vec<f64>,
    ) -> MultiRunExperiment<Counting, Scripted> {
        let config = ExperimentConfig {
            max_generations: 3,
            num_runs: 2,
            archive_capacity: 4,
            isolation,
            ..ExperimentConfig::default()
        };
        let search = AdaptiveSearch::new(
            &config,
            Counting::default(),
            Scripted { values, calls: 0 },
        )
        .unwrap();
        MultiRunExperiment::new(&config, search)
    }

    #[test]
    fn test_aggregates_over_flattened_histories() {
        let mut exp = experiment(RunIsolation::Shared, vec![3.0, 1.0, 2.0, 6.0, 5.0, 4.0]);
        let objective: ObjectiveFn = Arc::new(math_test_functions::sphere);
        let result = exp.run(&objective).unwrap();

        assert_eq!(
            result.all_runs_fitness_history,
            vec![vec![3.0, 1.0, 2.0], vec![6.0, 5.0, 4.0]]
        );
        assert_relative_eq!(result.mean_fitness, 3.5);
        assert_eq!(result.max_fitness, 6.0);
        assert_relative_eq!(result.std_fitness, (17.5f64 / 6.0).sqrt());
        // last run best vs overall best
        assert_eq!(result.best.as_ref().unwrap().fitness, 4.0);
        assert_eq!(result.overall_best.as_ref().unwrap().fitness, 1.0);
        // shared archive kept the four best of six
        assert_eq!(result.archive_size, 4);
        assert_eq!(exp.search().policy().resets, 0);
        assert_eq!(exp.search().policy().trains, 6);
    }

    #[test]
    fn test_per_run_isolation_resets_before_each_run() {
        let mut exp = experiment(RunIsolation::PerRun, vec![3.0, 1.0, 2.0, 6.0, 5.0, 4.0]);
        let objective: ObjectiveFn = Arc::new(math_test_functions::sphere);
        let result = exp.run(&objective).unwrap();

        assert_eq!(exp.search().policy().resets, 2);
        // archive only holds the last run
        assert_eq!(result.archive_size, 3);
        let summary = result.archive_summary.unwrap();
        assert_relative_eq!(summary[0], 5.0);
    }

    #[test]
    fn test_metrics() {
        let histories = vec![vec![5.0, 2.0, 1.0], vec![4.0, 4.0, 3.0], vec![9.0, 9.0, 9.0]];
        let metrics = ExperimentMetrics::from_histories(&histories, 3);

        assert_eq!(metrics.best_fitness, 1.0);
        assert_relative_eq!(metrics.mean_best_fitness, 13.0 / 3.0);
        assert_relative_eq!(metrics.std_best_fitness, (104.0f64 / 9.0).sqrt());
        // threshold = 1 + 0.1 * (9 - 1) = 1.8: only run 0 reaches it (at 2)
        assert_relative_eq!(metrics.avg_convergence_generation, (2.0 + 3.0 + 3.0) / 3.0);
        assert_relative_eq!(metrics.mean_fitness, 46.0 / 9.0);
    }
}
