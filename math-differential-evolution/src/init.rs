use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::Init;

/// `size` points inside `[lower, upper]`, one per row. Coordinates that are
/// not `free` sit at their lower bound.
pub(crate) fn initial_population<R: Rng + ?Sized>(
    layout: Init,
    size: usize,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    free: &[bool],
    rng: &mut R,
) -> Array2<f64> {
    let mut members = Array2::zeros((size, lower.len()));
    for (j, mut column) in members.axis_iter_mut(Axis(1)).enumerate() {
        if !free[j] {
            column.fill(lower[j]);
            continue;
        }
        let mut unit: Vec<f64> = match layout {
            // one draw inside each of the `size` equal strata, then shuffled
            Init::LatinHypercube => (0..size)
                .map(|k| (k as f64 + rng.random::<f64>()) / size as f64)
                .collect(),
            Init::Random => (0..size).map(|_| rng.random::<f64>()).collect(),
        };
        if layout == Init::LatinHypercube {
            unit.shuffle(rng);
        }
        let width = upper[j] - lower[j];
        for (cell, u) in column.iter_mut().zip(unit) {
            *cell = lower[j] + u * width;
        }
    }
    members
}
