//! Dual and tight simulation over pattern and data graphs.

pub use dual::{dual_sim, refine, result_graph};
pub use tight::{dual_filter, filter_subsumed, tight_sim};

mod dual;
mod tight;

use crate::types::VId;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

static EMPTY_SET: Lazy<HashSet<VId>> = Lazy::new(HashSet::new);

/// Which refinement the simulation fixpoint applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimVariant {
    /// Plain dual simulation.
    Plain,
    /// Dual simulation followed by the cardinality/label-multiset filter;
    /// strictly more precise and more expensive per pass.
    Cardinality,
}

/// A dual-simulation relation: each pattern vertex mapped to the set of data
/// vertices matching it.
///
/// The empty relation is the "no match" terminal state; a converged
/// non-empty relation never maps a pattern vertex to an empty set.  "Not yet
/// computed" is expressed as `Option<DualRelation>` at call sites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DualRelation(HashMap<VId, HashSet<VId>>);

impl DualRelation {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(map: HashMap<VId, HashSet<VId>>) -> Self {
        Self(map)
    }

    pub(crate) fn into_map(self) -> HashMap<VId, HashSet<VId>> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The data vertices matching pattern vertex `u`; empty when `u` is
    /// unmatched or unknown.
    pub fn matches(&self, u: VId) -> &HashSet<VId> {
        self.0.get(&u).unwrap_or(&EMPTY_SET)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VId, &HashSet<VId>)> + '_ {
        self.0.iter().map(|(&u, matched)| (u, matched))
    }

    /// The union of all matched sets: every data vertex the relation touches.
    pub fn image(&self) -> HashSet<VId> {
        self.0.values().flatten().copied().collect()
    }
}
