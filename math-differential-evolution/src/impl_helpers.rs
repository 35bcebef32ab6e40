use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::argmin::argmin;
use crate::crossover::crossover;
use crate::mutation::build_mutant;
use crate::{DifferentialEvolution, Strategy};

/// Members, their energies and the index of the lowest energy.
pub(crate) struct Population {
    pub(crate) members: Array2<f64>,
    pub(crate) energies: Array1<f64>,
    best: usize,
}

impl Population {
    pub(crate) fn new(members: Array2<f64>, energies: Array1<f64>) -> Self {
        let (best, _) = argmin(&energies);
        Self {
            members,
            energies,
            best,
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.members.nrows()
    }

    pub(crate) fn best_energy(&self) -> f64 {
        self.energies[self.best]
    }

    pub(crate) fn best_member(&self) -> Array1<f64> {
        self.members.row(self.best).to_owned()
    }

    /// Population std of the energies (ddof 0) and the stopping threshold
    /// `atol + tol * |mean|`.
    pub(crate) fn spread(&self, tol: f64, atol: f64) -> (f64, f64) {
        let mean = self.energies.mean().unwrap_or(0.0);
        (self.energies.std(0.0), atol + tol * mean.abs())
    }

    /// Greedy one-to-one selection: trial `i` takes slot `i` when it is no
    /// worse. Returns how many slots changed hands.
    pub(crate) fn select(&mut self, trials: Vec<Array1<f64>>, energies: Vec<f64>) -> usize {
        let mut replaced = 0;
        for (slot, (trial, energy)) in trials.into_iter().zip(energies).enumerate() {
            if energy <= self.energies[slot] {
                self.members.row_mut(slot).assign(&trial);
                self.energies[slot] = energy;
                replaced += 1;
            }
        }
        self.best = argmin(&self.energies).0;
        replaced
    }
}

impl<F> DifferentialEvolution<'_, F>
where
    F: Fn(&Array1<f64>) -> f64 + Sync + ?Sized,
{
    /// One trial per member: mutate, cross over with the member, clip to the box.
    pub(crate) fn breed<R: Rng + ?Sized>(
        &self,
        population: &Population,
        strategy: Strategy,
        weight: f64,
        rng: &mut R,
    ) -> Vec<Array1<f64>> {
        let recombination = self.config.recombination;
        (0..population.size())
            .map(|i| {
                let mutant = build_mutant(
                    strategy.base(),
                    i,
                    &population.members,
                    population.best,
                    weight,
                    rng,
                );
                let target = population.members.row(i).to_owned();
                let mut trial =
                    crossover(strategy.crossover(), &target, &mutant, recombination, rng);
                Zip::from(&mut trial)
                    .and(&self.lower)
                    .and(&self.upper)
                    .for_each(|x, &lo, &hi| *x = x.clamp(lo, hi));
                trial
            })
            .collect()
    }

    /// Compass search around `start`: try `+step` then `-step` along each
    /// coordinate, keep the first improvement, halve the step after a sweep
    /// without one. The result is never worse than `start`.
    pub(crate) fn polish(
        &self,
        start: Array1<f64>,
        energy: f64,
        budget: usize,
    ) -> (Array1<f64>, f64, usize) {
        let budget = budget.min(200 * start.len());
        let widths: Vec<f64> = (0..start.len())
            .map(|j| (self.upper[j] - self.lower[j]).max(1.0))
            .collect();
        let mut point = start;
        let mut energy = energy;
        let mut spent = 0;
        let mut step = 0.1;

        while step > 1e-8 && spent < budget {
            let mut moved = false;
            for j in 0..point.len() {
                let origin = point[j];
                for direction in [1.0, -1.0] {
                    if spent == budget {
                        break;
                    }
                    point[j] = (origin + direction * step * widths[j])
                        .clamp(self.lower[j], self.upper[j]);
                    let moved_energy = (self.func)(&point);
                    spent += 1;
                    if moved_energy < energy {
                        energy = moved_energy;
                        moved = true;
                        break;
                    }
                    point[j] = origin;
                }
            }
            if !moved {
                step /= 2.0;
            }
        }
        (point, energy, spent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn selection_keeps_ties_and_tracks_best() {
        let mut population = Population::new(
            array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]],
            array![5.0, 3.0, 4.0],
        );
        assert_eq!(population.best_energy(), 3.0);

        let replaced = population.select(
            vec![array![9.0, 9.0], array![8.0, 8.0], array![7.0, 7.0]],
            vec![5.0, 3.5, 1.0],
        );
        assert_eq!(replaced, 2);
        assert_eq!(population.energies, array![5.0, 3.0, 1.0]);
        assert_eq!(population.members.row(0), array![9.0, 9.0]);
        assert_eq!(population.best_member(), array![7.0, 7.0]);
    }

    #[test]
    fn spread_uses_population_std() {
        let population = Population::new(Array2::zeros((2, 1)), array![1.0, 3.0]);
        let (std, threshold) = population.spread(0.5, 0.1);
        assert_eq!(std, 1.0);
        assert!((threshold - 1.1).abs() < 1e-12);
    }
}
