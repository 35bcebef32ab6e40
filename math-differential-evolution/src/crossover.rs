use ndarray::Array1;
use rand::Rng;

use crate::Crossover;

/// Trial vector built from `target` and `mutant`. At least one coordinate
/// always comes from the mutant, whatever `cr` is.
pub(crate) fn crossover<R: Rng + ?Sized>(
    kind: Crossover,
    target: &Array1<f64>,
    mutant: &Array1<f64>,
    cr: f64,
    rng: &mut R,
) -> Array1<f64> {
    let n = target.len();
    let mut inherit = vec![false; n];
    let start = rng.random_range(0..n);
    inherit[start] = true;
    match kind {
        Crossover::Binomial => {
            for (j, slot) in inherit.iter_mut().enumerate() {
                // one uniform draw per coordinate, the forced one included
                let hit = rng.random::<f64>() < cr;
                *slot |= hit && j != start;
            }
        }
        Crossover::Exponential => {
            // extend the run from `start`, wrapping around, while draws stay below cr
            let mut len = 1;
            while len < n && rng.random::<f64>() < cr {
                inherit[(start + len) % n] = true;
                len += 1;
            }
        }
    }
    Array1::from_shape_fn(n, |j| if inherit[j] { mutant[j] } else { target[j] })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn from_mutant(trial: &Array1<f64>, mutant: &Array1<f64>) -> usize {
        trial.iter().zip(mutant).filter(|(t, m)| t == m).count()
    }

    #[test]
    fn zero_rate_takes_exactly_one_coordinate() {
        let target = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let mutant = array![10.0, 20.0, 30.0, 40.0, 50.0];
        let mut rng = StdRng::seed_from_u64(42);
        for kind in [Crossover::Binomial, Crossover::Exponential] {
            for _ in 0..20 {
                let trial = crossover(kind, &target, &mutant, 0.0, &mut rng);
                assert_eq!(from_mutant(&trial, &mutant), 1, "{kind:?}");
            }
        }
    }

    #[test]
    fn full_rate_is_the_mutant() {
        let target = array![1.0, 2.0, 3.0];
        let mutant = array![7.0, 8.0, 9.0];
        let mut rng = StdRng::seed_from_u64(9);
        for kind in [Crossover::Binomial, Crossover::Exponential] {
            assert_eq!(crossover(kind, &target, &mutant, 1.0, &mut rng), mutant);
        }
    }

    #[test]
    fn exponential_inherits_one_wrapping_run() {
        let target = Array1::<f64>::zeros(6);
        let mutant = Array1::<f64>::ones(6);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let trial = crossover(Crossover::Exponential, &target, &mutant, 0.6, &mut rng);
            let starts = (0..6)
                .filter(|&j| trial[j] == 1.0 && trial[(j + 5) % 6] == 0.0)
                .count();
            assert!(starts <= 1, "broken run: {trial}");
        }
    }
}
