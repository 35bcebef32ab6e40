//! Small fully connected action-value network trained one sample at a time.

use ndarray::{Array1, Array2, ArrayView1, Axis, Ix1, Ix2};
use rand::Rng;

use super::adam::{Adam, Moments};

/// Trainable estimator mapping a state to one value per action.
pub trait ValueModel {
    /// Size of the action space.
    fn n_actions(&self) -> usize;

    /// Estimated value of every action in `state`.
    fn predict(&self, state: &[f64]) -> Array1<f64>;

    /// One optimisation step towards `target` for `state`; returns the loss before the step.
    fn fit(&mut self, state: &[f64], target: &Array1<f64>) -> f64;
}

#[derive(Debug, Clone)]
struct Dense {
    weights: Array2<f64>,
    bias: Array1<f64>,
    weights_moments: Moments<Ix2>,
    bias_moments: Moments<Ix1>,
}

impl Dense {
    /// Glorot-uniform weights (`outputs x inputs`), zero bias.
    fn new<R: Rng>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (inputs + outputs) as f64).sqrt();
        let weights = Array2::from_shape_fn((outputs, inputs), |_| rng.random_range(-limit..limit));
        let bias = Array1::zeros(outputs);
        Self {
            weights_moments: Moments::zeros_like(&weights),
            bias_moments: Moments::zeros_like(&bias),
            weights,
            bias,
        }
    }

    fn forward(&self, input: ArrayView1<f64>) -> Array1<f64> {
        self.weights.dot(&input) + &self.bias
    }
}

/// `state -> hidden -> hidden -> actions` MLP with ReLU hidden layers, a linear
/// output, MSE loss and Adam.
#[derive(Debug, Clone)]
pub struct QNetwork {
    layers: Vec<Dense>,
    optimizer: Adam,
    steps: i32,
}

impl QNetwork {
    pub fn new<R: Rng>(
        state_dim: usize,
        n_actions: usize,
        hidden_units: usize,
        learning_rate: f64,
        rng: &mut R,
    ) -> Self {
        let layers = vec![
            Dense::new(state_dim, hidden_units, rng),
            Dense::new(hidden_units, hidden_units, rng),
            Dense::new(hidden_units, n_actions, rng),
        ];
        Self {
            layers,
            optimizer: Adam::new(learning_rate),
            steps: 0,
        }
    }

    /// Input width.
    pub fn state_dim(&self) -> usize {
        self.layers[0].weights.ncols()
    }

    /// Number of optimisation steps taken so far.
    pub fn steps(&self) -> i32 {
        self.steps
    }

    /// Layer inputs (`activations[l]` feeds layer `l`, the last entry is the
    /// output) and pre-activations of every layer.
    fn forward_cached(&self, state: &[f64]) -> (Vec<Array1<f64>>, Vec<Array1<f64>>) {
        let last = self.layers.len() - 1;
        let mut activations = vec![Array1::from(state.to_vec())];
        let mut pre = Vec::with_capacity(self.layers.len());
        for (l, layer) in self.layers.iter().enumerate() {
            let z = layer.forward(activations[l].view());
            let a = if l == last { z.clone() } else { z.mapv(relu) };
            pre.push(z);
            activations.push(a);
        }
        (activations, pre)
    }
}

fn relu(x: f64) -> f64 {
    x.max(0.0)
}

fn outer(column: &Array1<f64>, row: &Array1<f64>) -> Array2<f64> {
    column
        .view()
        .insert_axis(Axis(1))
        .dot(&row.view().insert_axis(Axis(0)))
}

impl ValueModel for QNetwork {
    fn n_actions(&self) -> usize {
        self.layers.last().map_or(0, |l| l.bias.len())
    }

    fn predict(&self, state: &[f64]) -> Array1<f64> {
        let last = self.layers.len() - 1;
        let mut a = Array1::from(state.to_vec());
        for (l, layer) in self.layers.iter().enumerate() {
            let z = layer.forward(a.view());
            a = if l == last { z } else { z.mapv(relu) };
        }
        a
    }

    fn fit(&mut self, state: &[f64], target: &Array1<f64>) -> f64 {
        let (activations, pre) = self.forward_cached(state);
        let output = &activations[self.layers.len()];
        let diff = output - target;
        let n_out = diff.len() as f64;
        let loss = diff.mapv(|d| d * d).sum() / n_out;

        // gradients for every layer before touching any weight
        let mut delta = diff * (2.0 / n_out);
        let mut grads = Vec::with_capacity(self.layers.len());
        for l in (0..self.layers.len()).rev() {
            grads.push((outer(&delta, &activations[l]), delta.clone()));
            if l > 0 {
                let back = self.layers[l].weights.t().dot(&delta);
                delta = back * &pre[l - 1].mapv(|z| if z > 0.0 { 1.0 } else { 0.0 });
            }
        }
        grads.reverse();

        self.steps += 1;
        let opt = self.optimizer;
        for (layer, (grad_w, grad_b)) in self.layers.iter_mut().zip(grads) {
            layer
                .weights_moments
                .apply(&opt, self.steps, &mut layer.weights, &grad_w);
            layer
                .bias_moments
                .apply(&opt, self.steps, &mut layer.bias, &grad_b);
        }
        loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn network(seed: u64) -> QNetwork {
        QNetwork::new(1, 6, 24, 0.001, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_shapes_and_zero_bias_init() {
        let net = network(0);
        assert_eq!(net.state_dim(), 1);
        assert_eq!(net.n_actions(), 6);
        assert_eq!(net.predict(&[3.0]).len(), 6);
        // zero input with zero biases gives a zero output
        assert!(net.predict(&[0.0]).iter().all(|&q| q == 0.0));
        let limit = (6.0f64 / 25.0).sqrt();
        assert!(net.layers[0].weights.iter().all(|w| w.abs() <= limit));
    }

    #[test]
    fn test_cached_forward_matches_predict() {
        let net = network(1);
        let (activations, pre) = net.forward_cached(&[0.7]);
        assert_eq!(activations.len(), 4);
        assert_eq!(pre.len(), 3);
        assert_eq!(activations[3], net.predict(&[0.7]));
    }

    #[test]
    fn test_analytic_gradient_matches_finite_difference() {
        let net = network(2);
        let state = [0.9];
        let target = array![1.0, -1.0, 0.5, 0.0, 2.0, -0.3];
        let loss_of = |n: &QNetwork| {
            let out = n.predict(&state);
            (&out - &target).mapv(|d| d * d).sum() / out.len() as f64
        };

        // first-layer backprop gradient against central differences
        let (activations, pre) = net.forward_cached(&state);
        let diff = &activations[3] - &target;
        let mut delta = diff * (2.0 / 6.0);
        for l in (1..3).rev() {
            let back = net.layers[l].weights.t().dot(&delta);
            delta = back * &pre[l - 1].mapv(|z| if z > 0.0 { 1.0 } else { 0.0 });
        }
        let analytic = outer(&delta, &activations[0]);

        let h = 1e-6;
        for j in 0..24 {
            let mut plus = net.clone();
            plus.layers[0].weights[[j, 0]] += h;
            let mut minus = net.clone();
            minus.layers[0].weights[[j, 0]] -= h;
            let numeric = (loss_of(&plus) - loss_of(&minus)) / (2.0 * h);
            assert_relative_eq!(analytic[[j, 0]], numeric, epsilon = 1e-5, max_relative = 1e-3);
        }
    }

    #[test]
    fn test_repeated_fit_reduces_loss() {
        let mut net = QNetwork::new(1, 3, 24, 0.01, &mut StdRng::seed_from_u64(4));
        let target = array![1.0, -2.0, 0.5];
        let first = net.fit(&[0.5], &target);
        let mut last = first;
        for _ in 0..300 {
            last = net.fit(&[0.5], &target);
        }
        assert_eq!(net.steps(), 301);
        assert!(last < first * 0.05, "loss went from {first} to {last}");
    }

    #[test]
    fn test_clone_is_independent() {
        let mut net = network(5);
        let snapshot = net.clone();
        net.fit(&[1.0], &array![1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_ne!(net.predict(&[1.0]), snapshot.predict(&[1.0]));
        assert_eq!(snapshot.steps(), 0);
    }
}
