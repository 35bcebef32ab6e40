use std::collections::VecDeque;

use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// One decision of the search loop, as stored for experience replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Observation the action was chosen from.
    pub state: Vec<f64>,
    /// Index of the chosen strategy.
    pub action: usize,
    /// Negative fitness returned by the step.
    pub reward: f64,
    /// Observation after the step.
    pub next_state: Vec<f64>,
}

/// Bounded FIFO of transitions; the oldest one is evicted when full.
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    items: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(transition);
    }

    /// Draws `count` distinct transitions uniformly, or `None` if fewer are stored.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Option<Vec<&Transition>> {
        if self.items.len() < count {
            return None;
        }
        Some(
            index::sample(rng, self.items.len(), count)
                .into_iter()
                .map(|i| &self.items[i])
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn transition(k: usize) -> Transition {
        Transition {
            state: vec![k as f64],
            action: k % 6,
            reward: -(k as f64),
            next_state: vec![k as f64 + 1.0],
        }
    }

    #[test]
    fn test_fifo_eviction_keeps_most_recent() {
        let mut buffer = ReplayBuffer::new(2000);
        for k in 0..2500 {
            buffer.push(transition(k));
        }
        assert_eq!(buffer.len(), 2000);
        let kept: Vec<f64> = buffer.iter().map(|t| t.state[0]).collect();
        assert_eq!(kept.first(), Some(&500.0));
        assert_eq!(kept.last(), Some(&2499.0));
        assert!(kept.windows(2).all(|w| w[1] == w[0] + 1.0));
    }

    #[test]
    fn test_sample_is_distinct_within_a_batch() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut buffer = ReplayBuffer::new(100);
        for k in 0..40 {
            buffer.push(transition(k));
        }
        assert!(buffer.sample(41, &mut rng).is_none());

        let batch = buffer.sample(32, &mut rng).unwrap();
        assert_eq!(batch.len(), 32);
        let mut states: Vec<f64> = batch.iter().map(|t| t.state[0]).collect();
        states.sort_by(f64::total_cmp);
        states.dedup();
        assert_eq!(states.len(), 32);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut buffer = ReplayBuffer::new(0);
        buffer.push(transition(1));
        assert!(buffer.is_empty());
    }
}
