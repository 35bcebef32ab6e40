use ndarray::{Array1, Array2};
use rayon::prelude::*;

/// When population evaluation moves to the rayon pool.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Allow the pool at all.
    pub enabled: bool,
    /// Below this many members evaluation stays on the calling thread.
    pub min_population: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_population: 32,
        }
    }
}

impl ParallelConfig {
    fn pooled(&self, members: usize) -> bool {
        self.enabled && members >= self.min_population
    }
}

/// Energies of `points`, in order. Pooled or not, the output is identical so
/// seeded runs reproduce.
pub fn evaluate_trials<F>(points: &[Array1<f64>], func: &F, config: &ParallelConfig) -> Vec<f64>
where
    F: Fn(&Array1<f64>) -> f64 + Sync + ?Sized,
{
    if config.pooled(points.len()) {
        points.par_iter().map(|p| func(p)).collect()
    } else {
        points.iter().map(|p| func(p)).collect()
    }
}

/// Energies of every row of `members`.
pub fn evaluate_population<F>(
    members: &Array2<f64>,
    func: &F,
    config: &ParallelConfig,
) -> Array1<f64>
where
    F: Fn(&Array1<f64>) -> f64 + Sync + ?Sized,
{
    let rows: Vec<Array1<f64>> = members.rows().into_iter().map(|r| r.to_owned()).collect();
    Array1::from(evaluate_trials(&rows, func, config))
}
