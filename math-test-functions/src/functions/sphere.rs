use ndarray::Array1;

/// `sum(x_i^2)`, convex with its only minimum 0 at the origin.
pub fn sphere(x: &Array1<f64>) -> f64 {
    x.dot(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn squared_norm() {
        assert_eq!(sphere(&array![0.0, 0.0]), 0.0);
        assert_eq!(sphere(&array![3.0, -4.0]), 25.0);
        assert_eq!(sphere(&array![-1.5]), 2.25);
    }
}
