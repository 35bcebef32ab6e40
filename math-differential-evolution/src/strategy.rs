use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DEError;
use crate::mutation::MutationBase;

/// How a trial vector inherits coordinates from its mutant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crossover {
    /// Each coordinate independently with probability CR.
    #[default]
    Binomial,
    /// One wrapping run of coordinates, continued with probability CR.
    Exponential,
}

/// A mutation base paired with a crossover, named like SciPy does
/// (`best1bin`, `rand2exp`, `currenttobest1bin`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Strategy {
    Best1Bin,
    Best1Exp,
    Rand1Bin,
    Rand1Exp,
    Rand2Bin,
    Rand2Exp,
    CurrentToBest1Bin,
    CurrentToBest1Exp,
}

impl Strategy {
    /// Every supported strategy, binomial variants first.
    pub const ALL: [Strategy; 8] = [
        Strategy::Best1Bin,
        Strategy::Rand1Bin,
        Strategy::Rand2Bin,
        Strategy::CurrentToBest1Bin,
        Strategy::Best1Exp,
        Strategy::Rand1Exp,
        Strategy::Rand2Exp,
        Strategy::CurrentToBest1Exp,
    ];

    fn parts(self) -> (MutationBase, Crossover) {
        use Crossover::{Binomial, Exponential};
        match self {
            Strategy::Best1Bin => (MutationBase::Best1, Binomial),
            Strategy::Best1Exp => (MutationBase::Best1, Exponential),
            Strategy::Rand1Bin => (MutationBase::Rand1, Binomial),
            Strategy::Rand1Exp => (MutationBase::Rand1, Exponential),
            Strategy::Rand2Bin => (MutationBase::Rand2, Binomial),
            Strategy::Rand2Exp => (MutationBase::Rand2, Exponential),
            Strategy::CurrentToBest1Bin => (MutationBase::CurrentToBest1, Binomial),
            Strategy::CurrentToBest1Exp => (MutationBase::CurrentToBest1, Exponential),
        }
    }

    /// How the mutant's base vector and difference vectors are chosen.
    pub fn base(self) -> MutationBase {
        self.parts().0
    }

    /// Crossover applied after mutation.
    pub fn crossover(self) -> Crossover {
        self.parts().1
    }

    /// SciPy name of the strategy.
    pub fn name(self) -> &'static str {
        let (base, crossover) = self.parts();
        match (base, crossover) {
            (MutationBase::Best1, Crossover::Binomial) => "best1bin",
            (MutationBase::Best1, Crossover::Exponential) => "best1exp",
            (MutationBase::Rand1, Crossover::Binomial) => "rand1bin",
            (MutationBase::Rand1, Crossover::Exponential) => "rand1exp",
            (MutationBase::Rand2, Crossover::Binomial) => "rand2bin",
            (MutationBase::Rand2, Crossover::Exponential) => "rand2exp",
            (MutationBase::CurrentToBest1, Crossover::Binomial) => "currenttobest1bin",
            (MutationBase::CurrentToBest1, Crossover::Exponential) => "currenttobest1exp",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive; `-` and `_` are ignored and a missing crossover suffix
/// means binomial, so `Current_To_Best1` parses as `currenttobest1bin`.
impl FromStr for Strategy {
    type Err = DEError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        if !key.ends_with("bin") && !key.ends_with("exp") {
            key.push_str("bin");
        }
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == key)
            .ok_or_else(|| DEError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}
