#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod error;
pub use error::{DEError, Result};

use std::fmt;

use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;

mod argmin;
mod config;
mod crossover;
#[cfg(test)]
mod de_tests;
/// `differential_evolution(func, bounds, config)`, the SciPy-shaped entry point.
pub mod differential_evolution;
mod distinct_indices;
mod impl_helpers;
mod init;
/// Mutant construction for each strategy base.
pub mod mutation;
/// Sequential or rayon evaluation of populations.
pub mod parallel_eval;
mod strategy;

pub use config::{CallbackFn, DEConfig, DEConfigBuilder, Init, Mutation, PolishConfig};
pub use differential_evolution::differential_evolution;
pub use mutation::MutationBase;
pub use parallel_eval::ParallelConfig;
pub use strategy::{Crossover, Strategy};

use impl_helpers::Population;

/// Smallest population every strategy can draw its partner vectors from
/// (`rand2` needs five besides the target).
pub const MIN_POPULATION: usize = 6;

/// Outcome of a solve, with SciPy's field names.
#[derive(Clone)]
pub struct DEReport {
    /// Best point found (after polishing, if enabled).
    pub x: Array1<f64>,
    /// Objective at `x`.
    pub fun: f64,
    /// `true` when the energy spread fell below the threshold or a callback stopped the run.
    pub success: bool,
    /// Why the run ended.
    pub message: String,
    /// Generations run.
    pub nit: usize,
    /// Objective evaluations, polishing included.
    pub nfev: usize,
    /// Best energy after each generation, `nit` entries, never increasing.
    pub history: Vec<f64>,
    /// Final members, one per row.
    pub population: Array2<f64>,
    /// Energies of `population`.
    pub population_energies: Array1<f64>,
}

impl fmt::Debug for DEReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.population.dim();
        f.debug_struct("DEReport")
            .field("fun", &self.fun)
            .field("x", &self.x)
            .field("nit", &self.nit)
            .field("nfev", &self.nfev)
            .field("success", &self.success)
            .field("message", &self.message)
            .field("population", &format_args!("{rows}x{cols}"))
            .finish_non_exhaustive()
    }
}

/// Snapshot handed to the callback after every generation.
pub struct DEIntermediate {
    /// Best point so far.
    pub x: Array1<f64>,
    /// Its energy.
    pub fun: f64,
    /// Std of the population energies.
    pub convergence: f64,
    /// 1-based generation number.
    pub iter: usize,
}

/// Callback verdict.
pub enum CallbackAction {
    /// Keep going.
    Continue,
    /// End the run now; the report counts as successful.
    Stop,
}

/// A bounded minimisation problem plus its solver settings.
///
/// Build with [`new`](Self::new), adjust [`config_mut`](Self::config_mut),
/// then [`solve`](Self::solve). Most callers want
/// [`differential_evolution`](crate::differential_evolution()) instead.
pub struct DifferentialEvolution<'a, F>
where
    F: Fn(&Array1<f64>) -> f64 + Sync + ?Sized,
{
    func: &'a F,
    lower: Array1<f64>,
    upper: Array1<f64>,
    config: DEConfig,
}

impl<'a, F> DifferentialEvolution<'a, F>
where
    F: Fn(&Array1<f64>) -> f64 + Sync + ?Sized,
{
    /// Pairs `func` with the box `[lower, upper]` and default settings.
    ///
    /// # Errors
    ///
    /// [`DEError::BoundsMismatch`] when the vectors differ in length,
    /// [`DEError::InvalidBounds`] for the first coordinate with `lower > upper`.
    pub fn new(func: &'a F, lower: Array1<f64>, upper: Array1<f64>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(DEError::BoundsMismatch {
                lower_len: lower.len(),
                upper_len: upper.len(),
            });
        }
        let inverted = lower.iter().zip(&upper).position(|(lo, hi)| lo > hi);
        if let Some(index) = inverted {
            return Err(DEError::InvalidBounds {
                index,
                lower: lower[index],
                upper: upper[index],
            });
        }
        Ok(Self {
            func,
            lower,
            upper,
            config: DEConfig::default(),
        })
    }

    /// Settings used by the next [`solve`](Self::solve).
    pub fn config_mut(&mut self) -> &mut DEConfig {
        &mut self.config
    }

    fn pinned_report(&self) -> DEReport {
        let x = self.lower.clone();
        let fun = (self.func)(&x);
        DEReport {
            population: x.clone().insert_axis(ndarray::Axis(0)),
            population_energies: Array1::from_elem(1, fun),
            x,
            fun,
            success: true,
            message: "every coordinate is pinned by its bounds".to_string(),
            nit: 0,
            nfev: 1,
            history: Vec::new(),
        }
    }

    /// Runs generations until the energy spread drops to
    /// `atol + tol * |mean energy|`, the callback stops, or `maxiter` is spent.
    pub fn solve(&mut self) -> DEReport {
        let free: Vec<bool> = self
            .lower
            .iter()
            .zip(&self.upper)
            .map(|(lo, hi)| hi > lo)
            .collect();
        let n_free = free.iter().filter(|&&f| f).count();
        if n_free == 0 {
            return self.pinned_report();
        }

        let size = (self.config.popsize * n_free).max(MIN_POPULATION);
        let strategy = self.config.strategy;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        if self.config.disp {
            log::debug!(
                "DE start: {} free of {} coordinates, {} members, {} generations, {}",
                n_free,
                self.lower.len(),
                size,
                self.config.maxiter,
                strategy
            );
        }

        let members = init::initial_population(
            self.config.init,
            size,
            &self.lower,
            &self.upper,
            &free,
            &mut rng,
        );
        let energies =
            parallel_eval::evaluate_population(&members, self.func, &self.config.parallel);
        let mut population = Population::new(members, energies);
        let mut nfev = size;
        let mut history = Vec::with_capacity(self.config.maxiter);
        let mut nit = 0;
        let mut ending = None;

        while nit < self.config.maxiter {
            nit += 1;
            let weight = self.config.mutation.draw(&mut rng);
            let trials = self.breed(&population, strategy, weight, &mut rng);
            let energies =
                parallel_eval::evaluate_trials(&trials, self.func, &self.config.parallel);
            nfev += trials.len();
            let replaced = population.select(trials, energies);
            history.push(population.best_energy());

            let (spread, threshold) = population.spread(self.config.tol, self.config.atol);
            if self.config.disp {
                log::debug!(
                    "DE gen {nit:4}: best {:.6e}, spread {spread:.3e}, replaced {replaced}/{size}",
                    population.best_energy()
                );
            }

            if let Some(hook) = self.config.callback.as_mut() {
                let snapshot = DEIntermediate {
                    x: population.best_member(),
                    fun: population.best_energy(),
                    convergence: spread,
                    iter: nit,
                };
                if matches!(hook(&snapshot), CallbackAction::Stop) {
                    ending = Some("stopped by callback".to_string());
                    break;
                }
            }
            if spread <= threshold {
                ending = Some(format!(
                    "converged: energy spread {spread:.3e} <= {threshold:.3e}"
                ));
                break;
            }
        }

        let success = ending.is_some();
        let message = ending.unwrap_or_else(|| format!("generation budget of {nit} spent"));
        if self.config.disp {
            log::debug!("DE end: {message}");
        }

        let (x, fun) = (population.best_member(), population.best_energy());
        let (x, fun) = match &self.config.polish {
            Some(polish) if polish.enabled => {
                let (x, fun, spent) = self.polish(x, fun, polish.maxeval);
                nfev += spent;
                (x, fun)
            }
            _ => (x, fun),
        };

        DEReport {
            x,
            fun,
            success,
            message,
            nit,
            nfev,
            history,
            population: population.members,
            population_energies: population.energies,
        }
    }
}
