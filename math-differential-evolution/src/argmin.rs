use ndarray::Array1;

/// Position and value of the lowest energy; ties go to the earliest position.
pub(crate) fn argmin(energies: &Array1<f64>) -> (usize, f64) {
    let mut lowest = (0, f64::INFINITY);
    for (i, &e) in energies.iter().enumerate() {
        if e < lowest.1 {
            lowest = (i, e);
        }
    }
    lowest
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn earliest_minimum_wins() {
        assert_eq!(argmin(&array![3.0, 1.0, 1.0, 2.0]), (1, 1.0));
        assert_eq!(argmin(&array![-2.0]), (0, -2.0));
    }
}
