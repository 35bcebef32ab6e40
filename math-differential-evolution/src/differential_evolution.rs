use ndarray::Array1;

use crate::{DEConfig, DEReport, DifferentialEvolution, Result};

/// Minimises `func` over the box given as `(lower, upper)` pairs.
///
/// # Errors
///
/// [`DEError::InvalidBounds`](crate::DEError::InvalidBounds) for the first
/// pair with `upper < lower`.
///
/// ```rust
/// use math_differential_evolution::{DEConfigBuilder, differential_evolution};
/// use ndarray::Array1;
///
/// let booth = |x: &Array1<f64>| {
///     (x[0] + 2.0 * x[1] - 7.0).powi(2) + (2.0 * x[0] + x[1] - 5.0).powi(2)
/// };
/// let config = DEConfigBuilder::new().maxiter(300).tol(0.0).seed(1).build().unwrap();
/// let report = differential_evolution(&booth, &[(-10.0, 10.0); 2], config).unwrap();
/// assert!((report.x[0] - 1.0).abs() < 1e-2 && (report.x[1] - 3.0).abs() < 1e-2);
/// ```
pub fn differential_evolution<F>(
    func: &F,
    bounds: &[(f64, f64)],
    config: DEConfig,
) -> Result<DEReport>
where
    F: Fn(&Array1<f64>) -> f64 + Sync + ?Sized,
{
    let (lower, upper): (Vec<f64>, Vec<f64>) = bounds.iter().copied().unzip();
    let mut solver = DifferentialEvolution::new(func, Array1::from(lower), Array1::from(upper))?;
    *solver.config_mut() = config;
    Ok(solver.solve())
}
