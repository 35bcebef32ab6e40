use ndarray::{Array1, Array2, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distinct_indices::distinct_indices;

/// How the mutant vector is assembled from the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationBase {
    /// `best + F * (r0 - r1)`
    Best1,
    /// `r0 + F * (r1 - r2)`
    Rand1,
    /// `r0 + F * (r1 + r2 - r3 - r4)`
    Rand2,
    /// `x_i + F * (best - x_i + r0 - r1)`
    CurrentToBest1,
}

impl MutationBase {
    /// Number of distinct random partners (besides the target) the base needs.
    pub fn partners(self) -> usize {
        match self {
            MutationBase::Best1 | MutationBase::CurrentToBest1 => 2,
            MutationBase::Rand1 => 3,
            MutationBase::Rand2 => 5,
        }
    }
}

/// Builds the mutant for target `i`. The target itself never serves as a partner.
pub(crate) fn build_mutant<R: Rng + ?Sized>(
    base: MutationBase,
    i: usize,
    pop: &Array2<f64>,
    best_idx: usize,
    f: f64,
    rng: &mut R,
) -> Array1<f64> {
    let r = distinct_indices(i, base.partners(), pop.nrows(), rng);
    match base {
        MutationBase::Best1 => Zip::from(pop.row(best_idx))
            .and(pop.row(r[0]))
            .and(pop.row(r[1]))
            .map_collect(|&best, &x0, &x1| best + f * (x0 - x1)),
        MutationBase::Rand1 => Zip::from(pop.row(r[0]))
            .and(pop.row(r[1]))
            .and(pop.row(r[2]))
            .map_collect(|&x0, &x1, &x2| x0 + f * (x1 - x2)),
        MutationBase::Rand2 => {
            let diff = Zip::from(pop.row(r[1]))
                .and(pop.row(r[2]))
                .and(pop.row(r[3]))
                .and(pop.row(r[4]))
                .map_collect(|&x1, &x2, &x3, &x4| x1 + x2 - x3 - x4);
            &pop.row(r[0]) + &(diff * f)
        }
        MutationBase::CurrentToBest1 => Zip::from(pop.row(i))
            .and(pop.row(best_idx))
            .and(pop.row(r[0]))
            .and(pop.row(r[1]))
            .map_collect(|&curr, &best, &x0, &x1| curr + f * (best - curr + x0 - x1)),
    }
}
