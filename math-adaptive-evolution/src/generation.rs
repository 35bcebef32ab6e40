//! The generation step: one bounded differential evolution call for a given strategy.

use std::sync::Arc;

use math_differential_evolution::{
    DEConfigBuilder, Mutation, PolishConfig, Strategy, differential_evolution,
};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::StepConfig;
use crate::error::Result;

/// Objective function shared between the search loop and the step.
pub type ObjectiveFn = Arc<dyn Fn(&Array1<f64>) -> f64 + Send + Sync>;

/// A point of the search space with its fitness (lower is better).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Coordinates, one per dimension.
    pub solution: Array1<f64>,
    /// Objective value at `solution`.
    pub fitness: f64,
}

/// What a generation step reports back.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Best candidate found by the step.
    pub candidate: Candidate,
    /// Best-so-far fitness after each internal generation (may be empty).
    pub trace: Vec<f64>,
    /// Objective evaluations spent.
    pub evaluations: usize,
}

/// Proposes and evaluates a population with one named strategy.
pub trait GenerationStep {
    /// Runs the step on `objective` within `bounds` using `strategy`.
    fn step(
        &mut self,
        objective: &ObjectiveFn,
        bounds: &[(f64, f64)],
        strategy: Strategy,
    ) -> Result<StepOutcome>;
}

/// [`GenerationStep`] backed by the differential evolution solver.
///
/// Each call draws a fresh solver seed from the step's own RNG, so a seeded
/// step replays the same sequence of populations.
#[derive(Debug, Clone)]
pub struct DeGenerationStep {
    settings: StepConfig,
    iterations: usize,
    rng: StdRng,
}

impl DeGenerationStep {
    /// A single-iteration step, as driven by the adaptive search.
    pub fn single(settings: StepConfig, rng: &mut StdRng) -> Self {
        Self::with_iterations(settings, 1, rng)
    }

    /// A full run of `iterations` generations, as used by the benchmark.
    pub fn with_iterations(settings: StepConfig, iterations: usize, rng: &mut StdRng) -> Self {
        Self {
            settings,
            iterations,
            rng: StdRng::from_rng(rng),
        }
    }

    /// Iteration budget of each call.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl GenerationStep for DeGenerationStep {
    fn step(
        &mut self,
        objective: &ObjectiveFn,
        bounds: &[(f64, f64)],
        strategy: Strategy,
    ) -> Result<StepOutcome> {
        let (f_min, f_max) = self.settings.mutation;
        let mut builder = DEConfigBuilder::new()
            .maxiter(self.iterations)
            .popsize(self.settings.population_size)
            .recombination(self.settings.recombination)
            .tol(self.settings.tol)
            .mutation(Mutation::Range {
                min: f_min,
                max: f_max,
            })
            .strategy(strategy)
            .seed(self.rng.random());
        if self.settings.polish {
            builder = builder.polish(PolishConfig {
                enabled: true,
                maxeval: 200 * bounds.len(),
            });
        }

        let objective = objective.as_ref();
        let report = differential_evolution(objective, bounds, builder.build()?)?;
        Ok(StepOutcome {
            candidate: Candidate {
                solution: report.x,
                fitness: report.fun,
            },
            trace: report.history,
            evaluations: report.nfev,
        })
    }
}
