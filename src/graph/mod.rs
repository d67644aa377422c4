//! Graph representations and structural utilities.
//!
//! Two representations share one read seam: [`DataGraph`] is dense and
//! index-addressed for the large, static data graph; [`PatternGraph`] is
//! sparse and map-addressed for small, mutable query graphs, polytrees,
//! balls and cached induced subgraphs.

pub use ball::Ball;
pub use data_graph::DataGraph;
pub use pattern_graph::{Classification, EdgeDirection, PatternGraph};
pub use util::{induced_subgraph, polytree, shuffle, subgraph_bfs};

mod ball;
mod data_graph;
mod pattern_graph;
mod util;

use crate::types::{VId, VLabel};

/// Read access shared by the dense and the sparse graph representation.
///
/// The simulation engine is written once against this trait and runs
/// unchanged over the full data graph, a cached induced subgraph, or a ball.
/// Absent adjacency is an empty collection, never a missing-entry signal.
pub trait GraphAccess {
    fn has_vertex(&self, vid: VId) -> bool;

    /// The label of `vid`.  Panics on an unknown id: referencing a vertex
    /// outside the graph is a programming error, not a recoverable state.
    fn vertex_label(&self, vid: VId) -> VLabel;

    fn out_neighbors(&self, vid: VId) -> Vec<VId>;

    fn in_neighbors(&self, vid: VId) -> Vec<VId>;

    fn with_label(&self, label: VLabel) -> Vec<VId>;
}
