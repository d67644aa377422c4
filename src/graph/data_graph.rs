use crate::{
    error::{Error, Result},
    graph::GraphAccess,
    types::{VId, VLabel},
};
use itertools::Itertools;
use log::{debug, info};
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// A dense graph over the contiguous vertex range `[0, n)`.
///
/// Each vertex carries one label and a successor list.  The reverse index
/// (predecessors per vertex) and the label index (vertices per label) are
/// derived, computed-once caches: they are built on first use and invalidated
/// only by full rebuild through the mutating operations, never incrementally
/// patched.
pub struct DataGraph {
    labels: Vec<VLabel>,
    adj: Vec<Vec<VId>>,
    parent_index: OnceCell<Vec<Vec<VId>>>,
    label_index: OnceCell<HashMap<VLabel, Vec<VId>>>,
}

impl DataGraph {
    /// Create a data graph from `(label, successors)` per vertex.
    ///
    /// Vertex `i` is the `i`-th element.  Every successor id must be inside
    /// `[0, n)`; an out-of-range id is rejected loudly.
    pub fn new(vertices: Vec<(VLabel, Vec<VId>)>) -> Result<Self> {
        let num_vertices = vertices.len();
        let mut labels = Vec::with_capacity(num_vertices);
        let mut adj = Vec::with_capacity(num_vertices);
        for (label, successors) in vertices {
            if let Some(&bad) = successors.iter().find(|&&v| v >= num_vertices) {
                return Err(Error::VertexOutOfRange {
                    vid: bad,
                    num_vertices,
                });
            }
            labels.push(label);
            adj.push(successors);
        }
        Ok(Self {
            labels,
            adj,
            parent_index: OnceCell::new(),
            label_index: OnceCell::new(),
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.labels.len()
    }

    pub fn label(&self, vid: VId) -> VLabel {
        self.labels[vid]
    }

    /// Set the label of `vid`, invalidating the label index.
    pub fn set_label(&mut self, vid: VId, label: VLabel) -> Result<()> {
        self.check_vid(vid)?;
        self.labels[vid] = label;
        self.label_index.take();
        Ok(())
    }

    /// Replace the successor list of `vid`, invalidating the reverse index.
    pub fn set_successors(&mut self, vid: VId, successors: Vec<VId>) -> Result<()> {
        self.check_vid(vid)?;
        if let Some(&bad) = successors.iter().find(|&&v| v >= self.vertex_count()) {
            return Err(Error::VertexOutOfRange {
                vid: bad,
                num_vertices: self.vertex_count(),
            });
        }
        self.adj[vid] = successors;
        self.parent_index.take();
        Ok(())
    }

    pub fn successors(&self, vid: VId) -> &[VId] {
        &self.adj[vid]
    }

    pub fn predecessors(&self, vid: VId) -> &[VId] {
        &self.parent_index()[vid]
    }

    /// The vertices carrying `label`; empty for a label not in the graph.
    pub fn vertices_labeled(&self, label: VLabel) -> &[VId] {
        self.label_index()
            .get(&label)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Log vertex count and label frequencies.
    pub fn stats(&self) {
        info!(
            "{} vertices, {} distinct labels",
            self.vertex_count(),
            self.label_index().len()
        );
        for (label, vertices) in self.label_index().iter().sorted_by_key(|&(&l, _)| l) {
            debug!("label {}: {} vertices", label, vertices.len());
        }
    }

    fn check_vid(&self, vid: VId) -> Result<()> {
        if vid < self.vertex_count() {
            Ok(())
        } else {
            Err(Error::VertexOutOfRange {
                vid,
                num_vertices: self.vertex_count(),
            })
        }
    }

    fn parent_index(&self) -> &Vec<Vec<VId>> {
        self.parent_index.get_or_init(|| {
            let mut parents = vec![Vec::new(); self.vertex_count()];
            for (vid, successors) in self.adj.iter().enumerate() {
                for &child in successors {
                    parents[child].push(vid);
                }
            }
            parents
        })
    }

    fn label_index(&self) -> &HashMap<VLabel, Vec<VId>> {
        self.label_index.get_or_init(|| {
            let mut index: HashMap<VLabel, Vec<VId>> = HashMap::new();
            for (vid, &label) in self.labels.iter().enumerate() {
                index.entry(label).or_default().push(vid);
            }
            index
        })
    }
}

impl GraphAccess for DataGraph {
    fn has_vertex(&self, vid: VId) -> bool {
        vid < self.vertex_count()
    }

    fn vertex_label(&self, vid: VId) -> VLabel {
        self.label(vid)
    }

    fn out_neighbors(&self, vid: VId) -> Vec<VId> {
        self.successors(vid).to_vec()
    }

    fn in_neighbors(&self, vid: VId) -> Vec<VId> {
        self.predecessors(vid).to_vec()
    }

    fn with_label(&self, label: VLabel) -> Vec<VId> {
        self.vertices_labeled(label).to_vec()
    }
}
