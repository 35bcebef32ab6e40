//! Adam optimiser state for dense parameters.

use ndarray::{Array, Dimension, Zip};

/// Adam hyper-parameters, shared by every parameter of a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

/// First and second moment estimates of one parameter tensor.
#[derive(Debug, Clone)]
pub struct Moments<D: Dimension> {
    m: Array<f64, D>,
    v: Array<f64, D>,
}

impl<D: Dimension> Moments<D> {
    pub fn zeros_like(param: &Array<f64, D>) -> Self {
        Self {
            m: Array::zeros(param.raw_dim()),
            v: Array::zeros(param.raw_dim()),
        }
    }

    /// Applies one bias-corrected Adam update; `step` counts from 1.
    pub fn apply(
        &mut self,
        opt: &Adam,
        step: i32,
        param: &mut Array<f64, D>,
        grad: &Array<f64, D>,
    ) {
        let correction1 = 1.0 - opt.beta1.powi(step);
        let correction2 = 1.0 - opt.beta2.powi(step);
        Zip::from(param)
            .and(grad)
            .and(&mut self.m)
            .and(&mut self.v)
            .for_each(|p, &g, m, v| {
                *m = opt.beta1 * *m + (1.0 - opt.beta1) * g;
                *v = opt.beta2 * *v + (1.0 - opt.beta2) * g * g;
                let m_hat = *m / correction1;
                let v_hat = *v / correction2;
                *p -= opt.learning_rate * m_hat / (v_hat.sqrt() + opt.epsilon);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        // with bias correction the first update is lr * sign(g)
        let opt = Adam::new(0.01);
        let mut param = array![1.0, -2.0, 0.5];
        let mut moments = Moments::zeros_like(&param);
        moments.apply(&opt, 1, &mut param, &array![3.0, -0.2, 0.0]);
        assert_abs_diff_eq!(param[0], 0.99, epsilon = 1e-6);
        assert_abs_diff_eq!(param[1], -1.99, epsilon = 1e-6);
        assert_abs_diff_eq!(param[2], 0.5);
    }

    #[test]
    fn test_minimises_quadratic() {
        let opt = Adam::new(0.05);
        let mut param = array![[4.0, -3.0]];
        let mut moments = Moments::zeros_like(&param);
        for step in 1..=2000 {
            let grad = param.mapv(|p| 2.0 * p);
            moments.apply(&opt, step, &mut param, &grad);
        }
        assert!(param.iter().all(|p| p.abs() < 1e-2));
    }
}
