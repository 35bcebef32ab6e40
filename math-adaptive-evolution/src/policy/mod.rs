//! Learned strategy selection.
//!
//! [`StrategySelectionPolicy`] is an epsilon-greedy controller over the
//! strategy indices. It learns online from an experience replay buffer: each
//! [`train`](StrategySelector::train) call samples a batch of stored
//! transitions and fits the value model once per transition towards the
//! one-step target `reward + discount * max_a Q(next_state, a)`.

mod adam;
mod network;
mod replay;

pub use adam::{Adam, Moments};
pub use network::{QNetwork, ValueModel};
pub use replay::{ReplayBuffer, Transition};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::PolicyConfig;
use crate::error::{AdaptiveError, Result};

/// Chooses a strategy index for each generation and learns from the outcome.
pub trait StrategySelector {
    /// Index of the strategy to run in `state`.
    fn select_action(&mut self, state: &[f64]) -> usize;

    /// Stores a transition for later training.
    fn remember(&mut self, transition: Transition);

    /// One training round. Returns the mean loss, or `None` when nothing was trained.
    fn train(&mut self) -> Option<f64>;

    /// Restores the selector to its freshly constructed state.
    fn reset(&mut self);

    /// Current exploration rate; selectors that never explore report 0.
    fn exploration_rate(&self) -> f64 {
        0.0
    }
}

/// Epsilon-greedy selector backed by a trainable [`ValueModel`].
#[derive(Debug, Clone)]
pub struct StrategySelectionPolicy<M: ValueModel + Clone = QNetwork> {
    model: M,
    initial_model: M,
    config: PolicyConfig,
    epsilon: f64,
    memory: ReplayBuffer,
    rng: StdRng,
}

impl StrategySelectionPolicy<QNetwork> {
    /// A policy over `n_actions` strategies driven by a fresh [`QNetwork`].
    pub fn with_network(
        state_dim: usize,
        n_actions: usize,
        config: &PolicyConfig,
        rng: &mut StdRng,
    ) -> Result<Self> {
        let model = QNetwork::new(
            state_dim,
            n_actions,
            config.hidden_units,
            config.learning_rate,
            rng,
        );
        Self::new(model, config, rng)
    }
}

impl<M: ValueModel + Clone> StrategySelectionPolicy<M> {
    /// Wraps `model`; its current parameters are what [`reset`](StrategySelector::reset) restores.
    pub fn new(model: M, config: &PolicyConfig, rng: &mut StdRng) -> Result<Self> {
        if model.n_actions() == 0 {
            return Err(AdaptiveError::EmptyActionSpace);
        }
        Ok(Self {
            initial_model: model.clone(),
            model,
            config: config.clone(),
            epsilon: config.epsilon_start,
            memory: ReplayBuffer::new(config.replay_capacity),
            rng: StdRng::from_rng(rng),
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn n_actions(&self) -> usize {
        self.model.n_actions()
    }
}

/// Index of the largest value, first one on ties.
pub(crate) fn argmax<'a>(values: impl IntoIterator<Item = &'a f64>) -> usize {
    values
        .into_iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| {
            if v > bv { (i, v) } else { (bi, bv) }
        })
        .0
}

impl<M: ValueModel + Clone> StrategySelector for StrategySelectionPolicy<M> {
    fn select_action(&mut self, state: &[f64]) -> usize {
        if self.rng.random::<f64>() < self.epsilon {
            return self.rng.random_range(0..self.model.n_actions());
        }
        let values = self.model.predict(state);
        argmax(&values)
    }

    fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    fn train(&mut self) -> Option<f64> {
        let batch = self.memory.sample(self.config.batch_size, &mut self.rng)?;
        let mut total_loss = 0.0;
        for t in &batch {
            let best_next = self
                .model
                .predict(&t.next_state)
                .fold(f64::NEG_INFINITY, |acc, &q| acc.max(q));
            let target = t.reward + self.config.discount * best_next;
            let mut target_values = self.model.predict(&t.state);
            target_values[t.action] = target;
            total_loss += self.model.fit(&t.state, &target_values);
        }

        if self.epsilon > self.config.epsilon_min {
            self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        }
        Some(total_loss / batch.len() as f64)
    }

    fn reset(&mut self) {
        self.model = self.initial_model.clone();
        self.epsilon = self.config.epsilon_start;
        self.memory.clear();
    }

    fn exploration_rate(&self) -> f64 {
        self.epsilon
    }
}
