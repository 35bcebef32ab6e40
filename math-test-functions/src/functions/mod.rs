//! Objective function implementations, one per file.

mod rastrigin;
mod sinusoidal;
mod sphere;

pub use rastrigin::rastrigin;
pub use sinusoidal::sinusoidal;
pub use sphere::sphere;
