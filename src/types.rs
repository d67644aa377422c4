//! Various types related to graph matching.

use std::collections::BTreeSet;

/// The vertex id type.
///
/// Dense graphs address the contiguous range `[0, n)`; sparse graphs key
/// their maps with arbitrary ids.
pub type VId = usize;

/// The vertex label type.
pub type VLabel = i64;

/// The set of (parent-label, child-label) pairs over a graph's edges.
///
/// A structural fingerprint independent of the exact topology, used by the
/// query cache for fast candidate pruning.
pub type Signature = BTreeSet<(VLabel, VLabel)>;
