use crate::{
    graph::{util::induced_subgraph, PatternGraph},
    types::VId,
};
use std::collections::{HashMap, HashSet, VecDeque};

/// A bounded-radius neighborhood around a center vertex.
///
/// A ball is a [`PatternGraph`] plus its center, radius, member set and
/// border (the members at distance exactly `radius`).  It is a value of its
/// own rather than a kind of pattern graph: it carries invariants a plain
/// pattern does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ball {
    graph: PatternGraph,
    center: VId,
    radius: usize,
    members: HashSet<VId>,
    border: HashSet<VId>,
}

impl Ball {
    /// Grow a ball of `radius` around `center` in `source`.
    ///
    /// The traversal is a bidirectional BFS (balls are defined over the
    /// undirected closure); the ball's graph is the subgraph of `source`
    /// induced by the reached members.
    pub fn new(source: &PatternGraph, center: VId, radius: usize) -> Self {
        let mut members = HashSet::new();
        let mut border = HashSet::new();
        let mut depth: HashMap<VId, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        members.insert(center);
        depth.insert(center, 0);
        queue.push_back(center);
        while let Some(node) = queue.pop_front() {
            let distance = depth[&node];
            if distance == radius {
                border.insert(node);
                continue;
            }
            for &n in source
                .successors(node)
                .iter()
                .chain(source.predecessors(node))
            {
                if members.insert(n) {
                    depth.insert(n, distance + 1);
                    queue.push_back(n);
                }
            }
        }
        let graph = induced_subgraph(source, &members);
        Self {
            graph,
            center,
            radius,
            members,
            border,
        }
    }

    pub fn graph(&self) -> &PatternGraph {
        &self.graph
    }

    pub fn center(&self) -> VId {
        self.center
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn members(&self) -> &HashSet<VId> {
        &self.members
    }

    pub fn border(&self) -> &HashSet<VId> {
        &self.border
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether this ball contains all vertices and edges of `other`.
    pub fn contains(&self, other: &Ball) -> bool {
        other.members.is_subset(&self.members)
            && other
                .members
                .iter()
                .all(|&v| other.graph.successors(v).is_subset(self.graph.successors(v)))
    }

    /// Replace the ball's content with a refined subgraph and member set.
    /// The border is dropped: it is meaningless after refinement.
    pub(crate) fn replace_content(&mut self, graph: PatternGraph, members: HashSet<VId>) {
        self.graph = graph;
        self.members = members;
        self.border.clear();
    }

    /// Empty the ball; used when a dual filter rejects it.
    pub(crate) fn clear(&mut self) {
        self.graph = PatternGraph::new();
        self.members.clear();
        self.border.clear();
    }
}
