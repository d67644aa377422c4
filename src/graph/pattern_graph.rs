use crate::{
    error::{Error, Result},
    graph::GraphAccess,
    types::{Signature, VId, VLabel},
};
use once_cell::sync::{Lazy, OnceCell};
use std::collections::{HashMap, HashSet, VecDeque};

static EMPTY_SET: Lazy<HashSet<VId>> = Lazy::new(HashSet::new);

/// Connectivity classification of a pattern graph over its undirected closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Disconnected,
    /// Connected but with a cycle in the undirected closure.
    Cyclic,
    /// Connected and acyclic in the undirected closure.
    Polytree,
}

/// Direction of a new edge in [`PatternGraph::connect_new_vertex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// From the new vertex to the old one.
    Outgoing,
    /// From the old vertex to the new one.
    Incoming,
}

/// A sparse graph whose vertex ids need not be contiguous.
///
/// Used for query graphs, polytrees, balls and cached induced subgraphs.
/// The parent index, label index and eccentricities are computed-once caches;
/// every structural mutation invalidates all of them.
///
/// Equality is structural: two graphs are equal when their label maps and
/// edge sets coincide.
#[derive(Debug, Clone, Default)]
pub struct PatternGraph {
    labels: HashMap<VId, VLabel>,
    out: HashMap<VId, HashSet<VId>>,
    parent_index: OnceCell<HashMap<VId, HashSet<VId>>>,
    label_index: OnceCell<HashMap<VLabel, HashSet<VId>>>,
    eccentricity: OnceCell<HashMap<VId, usize>>,
}

impl PatternGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(num_vertices: usize) -> Self {
        Self {
            labels: HashMap::with_capacity(num_vertices),
            out: HashMap::with_capacity(num_vertices),
            ..Self::default()
        }
    }

    /// Add (or relabel) a vertex.
    pub fn add_vertex(&mut self, vid: VId, label: VLabel) {
        self.labels.insert(vid, label);
        self.out.entry(vid).or_default();
        self.invalidate();
    }

    /// Add the edge `u -> v`.  Both endpoints must already be vertices.
    pub fn add_edge(&mut self, u: VId, v: VId) -> Result<()> {
        for vid in [u, v].iter().copied() {
            if !self.labels.contains_key(&vid) {
                return Err(Error::VertexOutOfRange {
                    vid,
                    num_vertices: self.vertex_count(),
                });
            }
        }
        self.insert_edge(u, v);
        Ok(())
    }

    /// Insert an edge between vertices known to exist.
    pub(crate) fn insert_edge(&mut self, u: VId, v: VId) {
        debug_assert!(self.labels.contains_key(&u) && self.labels.contains_key(&v));
        self.out.entry(u).or_default().insert(v);
        self.invalidate();
    }

    pub fn vertex_count(&self) -> usize {
        self.labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.out.values().map(HashSet::len).sum()
    }

    pub fn contains_vertex(&self, vid: VId) -> bool {
        self.labels.contains_key(&vid)
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VId> + '_ {
        self.labels.keys().copied()
    }

    /// The label of `vid`.  Panics on an unknown id.
    pub fn label(&self, vid: VId) -> VLabel {
        self.labels[&vid]
    }

    /// The children of `vid`; empty for a leaf or an unknown id.
    pub fn successors(&self, vid: VId) -> &HashSet<VId> {
        self.out.get(&vid).unwrap_or(&EMPTY_SET)
    }

    /// The parents of `vid`; empty for a root or an unknown id.
    pub fn predecessors(&self, vid: VId) -> &HashSet<VId> {
        self.parent_index().get(&vid).unwrap_or(&EMPTY_SET)
    }

    /// The vertices carrying `label`; empty for a label not in the graph.
    pub fn vertices_labeled(&self, label: VLabel) -> &HashSet<VId> {
        self.label_index().get(&label).unwrap_or(&EMPTY_SET)
    }

    /// The set of (parent-label, child-label) pairs over all edges.
    pub fn signature(&self) -> Signature {
        let mut sig = Signature::new();
        for (&u, children) in &self.out {
            for &v in children {
                sig.insert((self.labels[&u], self.labels[&v]));
            }
        }
        sig
    }

    /// The eccentricity of `vid`, assuming the undirected closure is
    /// connected.  `None` for an unknown id.
    pub fn eccentricity(&self, vid: VId) -> Option<usize> {
        self.eccentricities().get(&vid).copied()
    }

    /// Minimum eccentricity.
    pub fn radius(&self) -> usize {
        self.eccentricities().values().copied().min().unwrap_or(0)
    }

    /// Maximum eccentricity (longest shortest path).
    pub fn diameter(&self) -> usize {
        self.eccentricities().values().copied().max().unwrap_or(0)
    }

    /// The vertices attaining the radius, in ascending id order.
    pub fn centers(&self) -> Vec<VId> {
        let radius = self.radius();
        let mut centers: Vec<VId> = self
            .eccentricities()
            .iter()
            .filter(|&(_, &ecc)| ecc == radius)
            .map(|(&vid, _)| vid)
            .collect();
        centers.sort_unstable();
        centers
    }

    /// The center with the highest (degree / label-frequency) ratio.
    ///
    /// Degree counts both directions; the frequency is that of the vertex's
    /// label within this graph.  Ties keep the first candidate in ascending
    /// id order.  `None` for an empty graph.
    pub fn selected_center(&self) -> Option<VId> {
        let mut best: Option<(VId, f64)> = None;
        for vid in self.centers() {
            let neighbors = self.successors(vid).len() + self.predecessors(vid).len();
            let frequency = self.vertices_labeled(self.labels[&vid]).len();
            let ratio = neighbors as f64 / frequency as f64;
            match best {
                Some((_, max)) if ratio <= max => {}
                _ => best = Some((vid, ratio)),
            }
        }
        best.map(|(vid, _)| vid)
    }

    /// Classify connectivity via a three-color BFS over the symmetric
    /// closure of the edges.  The empty graph counts as disconnected.
    pub fn classify(&self) -> Classification {
        let start = match self.vertex_ids().min() {
            Some(vid) => vid,
            None => return Classification::Disconnected,
        };
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }
        let mut color: HashMap<VId, Color> =
            self.vertex_ids().map(|vid| (vid, Color::White)).collect();
        let mut cyclic = false;
        let mut traversed = 0;
        let mut queue = VecDeque::new();
        queue.push_back(start);
        color.insert(start, Color::Gray);
        while let Some(node) = queue.pop_front() {
            for &n in self.successors(node).iter().chain(self.predecessors(node)) {
                match color[&n] {
                    Color::White => {
                        color.insert(n, Color::Gray);
                        queue.push_back(n);
                    }
                    Color::Gray => cyclic = true,
                    Color::Black => {}
                }
            }
            color.insert(node, Color::Black);
            traversed += 1;
        }
        if traversed < self.vertex_count() {
            Classification::Disconnected
        } else if cyclic {
            Classification::Cyclic
        } else {
            Classification::Polytree
        }
    }

    /// Connect a fresh vertex to existing ones.
    ///
    /// The only mutation a query graph undergoes after construction; used by
    /// query-mutation tooling.  Every old vertex must exist and `new_vid`
    /// must not.
    pub fn connect_new_vertex(
        &mut self,
        new_vid: VId,
        label: VLabel,
        connections: &[(VId, EdgeDirection)],
    ) -> Result<()> {
        if self.contains_vertex(new_vid) {
            return Err(Error::DuplicateVertex(new_vid));
        }
        for &(old, _) in connections {
            if !self.contains_vertex(old) {
                return Err(Error::VertexOutOfRange {
                    vid: old,
                    num_vertices: self.vertex_count(),
                });
            }
        }
        self.add_vertex(new_vid, label);
        for &(old, direction) in connections {
            match direction {
                EdgeDirection::Outgoing => self.insert_edge(new_vid, old),
                EdgeDirection::Incoming => self.insert_edge(old, new_vid),
            }
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.parent_index.take();
        self.label_index.take();
        self.eccentricity.take();
    }

    fn parent_index(&self) -> &HashMap<VId, HashSet<VId>> {
        self.parent_index.get_or_init(|| {
            let mut parents: HashMap<VId, HashSet<VId>> = HashMap::with_capacity(self.labels.len());
            for (&u, children) in &self.out {
                for &v in children {
                    parents.entry(v).or_default().insert(u);
                }
            }
            parents
        })
    }

    fn label_index(&self) -> &HashMap<VLabel, HashSet<VId>> {
        self.label_index.get_or_init(|| {
            let mut index: HashMap<VLabel, HashSet<VId>> = HashMap::new();
            for (&vid, &label) in &self.labels {
                index.entry(label).or_default().insert(vid);
            }
            index
        })
    }

    fn eccentricities(&self) -> &HashMap<VId, usize> {
        self.eccentricity.get_or_init(|| {
            self.vertex_ids()
                .map(|vid| (vid, self.undirected_depths(vid).values().copied().max().unwrap_or(0)))
                .collect()
        })
    }

    /// BFS depths from `start` over the undirected closure.
    fn undirected_depths(&self, start: VId) -> HashMap<VId, usize> {
        let mut depth = HashMap::new();
        let mut queue = VecDeque::new();
        depth.insert(start, 0);
        queue.push_back(start);
        while let Some(node) = queue.pop_front() {
            let next = depth[&node] + 1;
            for &n in self.successors(node).iter().chain(self.predecessors(node)) {
                if !depth.contains_key(&n) {
                    depth.insert(n, next);
                    queue.push_back(n);
                }
            }
        }
        depth
    }
}

impl PartialEq for PatternGraph {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels && self.out == other.out
    }
}

impl Eq for PatternGraph {}

impl GraphAccess for PatternGraph {
    fn has_vertex(&self, vid: VId) -> bool {
        self.contains_vertex(vid)
    }

    fn vertex_label(&self, vid: VId) -> VLabel {
        self.label(vid)
    }

    fn out_neighbors(&self, vid: VId) -> Vec<VId> {
        self.successors(vid).iter().copied().collect()
    }

    fn in_neighbors(&self, vid: VId) -> Vec<VId> {
        self.predecessors(vid).iter().copied().collect()
    }

    fn with_label(&self, label: VLabel) -> Vec<VId> {
        self.vertices_labeled(label).iter().copied().collect()
    }
}
