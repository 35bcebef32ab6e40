//! Covariance-adapting Gaussian sampler.
//!
//! Draws populations from `N(mean, step_size * C)` and re-estimates `C` from
//! fitness-weighted populations. The mean stays where it was constructed; only
//! the shape and scale of the distribution adapt. Numerical failures never
//! propagate: a covariance that is not positive definite is replaced by the
//! identity and the step size by its initial value.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

use crate::config::ExperimentConfig;

/// Normalisation guard for constant-ish fitness.
const FITNESS_EPS: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct CmaSampler {
    mean: DVector<f64>,
    covariance: DMatrix<f64>,
    step_size: f64,
    initial_step_size: f64,
    rng: StdRng,
}

impl CmaSampler {
    /// Zero mean, identity covariance.
    pub fn new(dim: usize, step_size: f64, rng: &mut StdRng) -> Self {
        Self {
            mean: DVector::zeros(dim),
            covariance: DMatrix::identity(dim, dim),
            step_size,
            initial_step_size: step_size,
            rng: StdRng::from_rng(rng),
        }
    }

    /// One dimension per bound pair, starting at `cma_step_size`.
    pub fn from_config(config: &ExperimentConfig, rng: &mut StdRng) -> Self {
        Self::new(config.dimensions(), config.cma_step_size, rng)
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Lower Cholesky factor of `step_size * C`, if that matrix is positive definite.
    fn sampling_factor(&self) -> Option<DMatrix<f64>> {
        let scaled = &self.covariance * self.step_size;
        if !is_positive_definite(&scaled) {
            return None;
        }
        scaled.cholesky().map(|c| c.l())
    }

    /// `size x dim` samples, one per row.
    pub fn sample_population(&mut self, size: usize) -> Array2<f64> {
        let factor = match self.sampling_factor() {
            Some(l) => l,
            None => {
                log::warn!(
                    "CMA covariance is not positive definite (step size {:.3e}), resetting",
                    self.step_size
                );
                self.reset();
                self.sampling_factor()
                    .unwrap_or_else(|| DMatrix::identity(self.dim(), self.dim()))
            }
        };

        let dim = self.dim();
        let rng = &mut self.rng;
        let z = DMatrix::<f64>::from_fn(size, dim, |_, _| StandardNormal.sample(&mut *rng));
        let samples = z * factor.transpose();
        Array2::from_shape_fn((size, dim), |(i, j)| samples[(i, j)] + self.mean[j])
    }

    /// Re-estimates the covariance and step size from an evaluated population.
    ///
    /// Constant fitness leaves the sampler untouched.
    pub fn update_covariance(&mut self, population: &Array2<f64>, fitness: &[f64]) {
        let lo = fitness.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if fitness.is_empty() || hi - lo == 0.0 {
            return;
        }

        let (n, dim) = population.dim();
        let members = DMatrix::from_row_iterator(n, dim, population.iter().copied());
        let normalised =
            DVector::from_iterator(n, fitness.iter().map(|f| (f - lo) / (hi - lo + FITNESS_EPS)));
        let raw = normalised.map(|f| (-f).exp());
        let weights = &raw / raw.sum();

        let weighted_mean = members.transpose() * &weights;
        let centred = DMatrix::from_fn(n, dim, |i, j| members[(i, j)] - weighted_mean[j]);
        let scaled = DMatrix::from_fn(n, dim, |i, j| centred[(i, j)] * weights[i]);

        // unbiased for reliability weights summing to 1
        let v2 = weights.norm_squared();
        self.covariance = centred.transpose() * scaled / (1.0 - v2);
        self.step_size *= (0.2 * (normalised.mean() - 1.0)).exp();

        if !is_positive_definite(&self.covariance) {
            log::warn!("adapted CMA covariance is not positive definite, using identity");
            self.covariance = DMatrix::identity(dim, dim);
        }
    }

    /// Identity covariance and the initial step size.
    pub fn reset(&mut self) {
        let dim = self.dim();
        self.covariance = DMatrix::identity(dim, dim);
        self.step_size = self.initial_step_size;
    }
}

/// Every eigenvalue strictly positive. Non-finite entries fail the check.
fn is_positive_definite(matrix: &DMatrix<f64>) -> bool {
    if !matrix.iter().all(|v| v.is_finite()) {
        return false;
    }
    SymmetricEigen::new(matrix.clone())
        .eigenvalues
        .iter()
        .all(|&v| v > 0.0)
}
