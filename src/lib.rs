//! Simulation-based graph pattern matching with a semantic query result
//! cache.
//!
//! The crate answers pattern queries over labeled directed graphs with
//! *tight simulation*: a dual-simulation fixpoint computes the set of data
//! vertices that can play each query vertex, and bounded-radius balls around
//! matched center vertices localize the answers.  The [`cache`] module reuses
//! earlier answers: it stores the polytree of each inserted query with the
//! data subgraph matching it, and serves any later query that polytree
//! dual-covers from the stored subgraph instead of the full graph.

pub mod cache;
pub mod error;
pub mod graph;
pub mod simulation;
pub mod types;
