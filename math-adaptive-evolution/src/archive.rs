//! Bounded elite archive with worst-replacement eviction.

use ndarray::Array1;
use serde::Serialize;

use crate::generation::Candidate;

/// Keeps up to `max_size` of the best candidates seen, in insertion order.
///
/// While not full every candidate is kept. Once full, a candidate replaces the
/// current worst entry (highest fitness, first one on ties) in place, and only
/// when it is strictly better; otherwise it is dropped.
#[derive(Debug, Clone, Serialize)]
pub struct EliteArchive {
    entries: Vec<Candidate>,
    max_size: usize,
}

impl EliteArchive {
    /// Creates an empty archive holding at most `max_size` candidates.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_size),
            max_size,
        }
    }

    /// Offers a candidate. Returns whether it was stored.
    pub fn add(&mut self, solution: Array1<f64>, fitness: f64) -> bool {
        if self.entries.len() < self.max_size {
            self.entries.push(Candidate { solution, fitness });
            return true;
        }
        match self.worst_index() {
            Some(worst) if fitness < self.entries[worst].fitness => {
                self.entries[worst] = Candidate { solution, fitness };
                true
            }
            _ => false,
        }
    }

    /// Coordinate-wise mean of the stored solutions, `None` when empty.
    pub fn extract_summary(&self) -> Option<Array1<f64>> {
        let first = self.entries.first()?;
        let mut sum = Array1::<f64>::zeros(first.solution.len());
        for entry in &self.entries {
            sum += &entry.solution;
        }
        Some(sum / self.entries.len() as f64)
    }

    /// Entry with the lowest fitness (first one on ties).
    pub fn best(&self) -> Option<&Candidate> {
        self.entries
            .iter()
            .reduce(|best, c| if c.fitness < best.fitness { c } else { best })
    }

    /// Stored entries in insertion order.
    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    /// Stored fitness values in insertion order.
    pub fn fitness_values(&self) -> Vec<f64> {
        self.entries.iter().map(|c| c.fitness).collect()
    }

    /// Number of stored candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of stored candidates.
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Drops every entry, keeping the capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn worst_index(&self) -> Option<usize> {
        let mut worst: Option<usize> = None;
        for (i, c) in self.entries.iter().enumerate() {
            match worst {
                Some(w) if c.fitness <= self.entries[w].fitness => {}
                _ => worst = Some(i),
            }
        }
        worst
    }
}
