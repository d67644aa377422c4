//! The error type shared across the crate.
//!
//! An empty simulation relation is *not* an error: "no match" is an ordinary
//! terminal value.  Errors cover invariant violations (out-of-range vertex
//! ids), queries that cannot be matched at all (disconnected), and invalid
//! configuration.

use crate::types::VId;
use derive_more::Display;

#[derive(Debug, Display, PartialEq, Eq)]
pub enum Error {
    /// An edge or operation referenced a vertex id outside the graph.
    #[display(
        fmt = "vertex id {} out of range (graph has {} vertices)",
        vid,
        num_vertices
    )]
    VertexOutOfRange { vid: VId, num_vertices: usize },

    /// A vertex was added twice to a sparse graph.
    #[display(fmt = "vertex {} is already in the graph", _0)]
    DuplicateVertex(VId),

    /// The query graph is disconnected; no match will be attempted.
    #[display(fmt = "the query graph is disconnected")]
    DisconnectedQuery,

    /// The cache was configured with a zero capacity.
    #[display(fmt = "cache capacity must be a positive integer")]
    ZeroCapacity,
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
