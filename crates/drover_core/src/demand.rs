use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

type Vector = SmallVec<[f64; 3]>;

/// Cargo demand along up to three independently tracked dimensions.
///
/// A pickup records a positive demand; the paired drop-off records the exact
/// negation, which is how the solver accounts for onboard load without an
/// explicit carry variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand(Vector);

impl Demand {
    pub fn from_slice(values: &[f64]) -> Self {
        debug_assert!(values.len() <= 3);
        Demand(SmallVec::from_slice(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        self.0.get(index).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    pub fn negated(&self) -> Demand {
        Demand(self.0.iter().map(|value| -value).collect())
    }

    pub fn fits_within(&self, capacity: &Demand) -> bool {
        let dimensions = self.len().max(capacity.len());
        (0..dimensions).all(|dimension| self.get(dimension) <= capacity.get(dimension))
    }
}
