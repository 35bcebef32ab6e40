use std::f64::consts::TAU;

use ndarray::Array1;

/// `10 n + sum(x_i^2 - 10 cos(2 pi x_i))`: every integer point is a local
/// minimum, the global one is the origin with value 0. Usual box `[-5.12, 5.12]^n`.
pub fn rastrigin(x: &Array1<f64>) -> f64 {
    x.iter()
        .map(|&v| v * v + 10.0 * (1.0 - (TAU * v).cos()))
        .sum()
}
