use std::f64::consts::PI;

use ndarray::Array1;

/// Two-dimensional egg crate on a bowl:
/// `sin(5 pi x0) sin(5 pi x1) + x0^2 + x1^2`.
///
/// The ripple's troughs reach -1, and the two nearest the origin
/// (about `(0.0992, -0.0992)` and its mirror) are the global minima at -0.980161.
pub fn sinusoidal(x: &Array1<f64>) -> f64 {
    let ripple = (5.0 * PI * x[0]).sin() * (5.0 * PI * x[1]).sin();
    ripple + x.dot(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn origin_is_a_saddle_at_zero() {
        assert_abs_diff_eq!(sinusoidal(&array![0.0, 0.0]), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn trough_next_to_origin_goes_negative() {
        assert_abs_diff_eq!(sinusoidal(&array![0.1, -0.1]), -0.98, epsilon = 1e-12);
        assert_eq!(sinusoidal(&array![0.1, -0.1]), sinusoidal(&array![-0.1, 0.1]));
    }
}
