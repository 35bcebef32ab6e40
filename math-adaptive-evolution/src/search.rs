//! One adaptive run: the selector picks a strategy for every generation.

use math_differential_evolution::Strategy;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::archive::EliteArchive;
use crate::config::ExperimentConfig;
use crate::error::{AdaptiveError, Result};
use crate::generation::{Candidate, DeGenerationStep, GenerationStep, ObjectiveFn};
use crate::policy::{StrategySelectionPolicy, StrategySelector, Transition};

/// Outcome of one adaptive run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// Best candidate of the run, `None` when no step returned a fitness below `+inf`.
    pub best: Option<Candidate>,
    /// Fitness returned by the step at each generation.
    pub fitness_history: Vec<f64>,
    /// Strategy index chosen at each generation.
    pub actions: Vec<usize>,
}

impl RunResult {
    /// Best fitness of the run, `+inf` when there is none.
    pub fn best_fitness(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |c| c.fitness)
    }
}

/// The adaptive search loop with its selector, generation step and elite archive.
///
/// The selector and the archive persist across calls to [`run`](Self::run);
/// [`reset`](Self::reset) restores both.
pub struct AdaptiveSearch<P, G> {
    strategies: Vec<Strategy>,
    bounds: Vec<(f64, f64)>,
    max_generations: usize,
    policy: P,
    step: G,
    archive: EliteArchive,
}

/// The search as configured by default: Q-network selector and a single-iteration DE step.
pub type DefaultSearch = AdaptiveSearch<StrategySelectionPolicy, DeGenerationStep>;

impl DefaultSearch {
    /// Builds the selector and the step from `config`, forking their RNGs from `rng`.
    pub fn from_config(config: &ExperimentConfig, rng: &mut StdRng) -> Result<Self> {
        config.validate()?;
        let policy =
            StrategySelectionPolicy::with_network(1, config.strategies.len(), &config.policy, rng)?;
        let step = DeGenerationStep::single(config.step.clone(), rng);
        Self::new(config, policy, step)
    }
}

impl<P: StrategySelector, G: GenerationStep> AdaptiveSearch<P, G> {
    pub fn new(config: &ExperimentConfig, policy: P, step: G) -> Result<Self> {
        if config.strategies.is_empty() {
            return Err(AdaptiveError::EmptyActionSpace);
        }
        Ok(Self {
            strategies: config.strategies.clone(),
            bounds: config.bounds.clone(),
            max_generations: config.max_generations,
            policy,
            step,
            archive: EliteArchive::new(config.archive_capacity),
        })
    }

    /// Runs `max_generations` generations on `objective`.
    pub fn run(&mut self, objective: &ObjectiveFn) -> Result<RunResult> {
        let mut best: Option<Candidate> = None;
        let mut best_fitness = f64::INFINITY;
        let mut fitness_history = Vec::with_capacity(self.max_generations);
        let mut actions = Vec::with_capacity(self.max_generations);

        for generation in 0..self.max_generations {
            let state = vec![generation as f64];
            let action = self.policy.select_action(&state);
            let strategy =
                *self
                    .strategies
                    .get(action)
                    .ok_or(AdaptiveError::ActionOutOfRange {
                        index: action,
                        len: self.strategies.len(),
                    })?;

            let outcome = self.step.step(objective, &self.bounds, strategy)?;
            let candidate = outcome.candidate;
            let fitness = candidate.fitness;

            // NaN and +inf never beat the starting value
            if fitness < best_fitness {
                best_fitness = fitness;
                best = Some(candidate.clone());
            }
            self.archive.add(candidate.solution, fitness);
            fitness_history.push(fitness);
            actions.push(action);

            self.policy.remember(Transition {
                state,
                action,
                reward: -fitness,
                next_state: vec![(generation + 1) as f64],
            });
            let loss = self.policy.train();

            log::debug!(
                "generation {generation}: {strategy} f={fitness:.6e} eps={:.4} loss={loss:?}",
                self.policy.exploration_rate()
            );
        }

        Ok(RunResult {
            best,
            fitness_history,
            actions,
        })
    }

    /// Restores the selector and clears the archive.
    pub fn reset(&mut self) {
        self.policy.reset();
        self.archive.clear();
    }

    pub fn archive(&self) -> &EliteArchive {
        &self.archive
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn max_generations(&self) -> usize {
        self.max_generations
    }
}
