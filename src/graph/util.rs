use crate::{
    error::{Error, Result},
    graph::{DataGraph, GraphAccess, PatternGraph},
    types::VId,
};
use rand::{seq::SliceRandom, Rng};
use std::collections::{HashSet, VecDeque};

/// The subgraph of `source` induced by `subset`: all subset vertices with
/// their labels, and every edge whose endpoints both lie inside the subset.
///
/// The result is a private copy, never aliased into `source`.
pub fn induced_subgraph<G: GraphAccess>(source: &G, subset: &HashSet<VId>) -> PatternGraph {
    let mut subgraph = PatternGraph::with_capacity(subset.len());
    for &vid in subset {
        subgraph.add_vertex(vid, source.vertex_label(vid));
    }
    for &vid in subset {
        for child in source.out_neighbors(vid) {
            if subset.contains(&child) {
                subgraph.insert_edge(vid, child);
            }
        }
    }
    subgraph
}

/// Extract the polytree of `graph` rooted at `center`.
///
/// A BFS spanning structure over the undirected closure: every vertex and
/// label is retained, non-tree edges are dropped, and each tree edge keeps
/// its original orientation.  Keeping the orientation makes the polytree's
/// edge set a subset of the original's, which is what lets its simulation
/// result over-approximate that of any query containing it.
pub fn polytree(graph: &PatternGraph, center: VId) -> PatternGraph {
    let mut tree = PatternGraph::with_capacity(graph.vertex_count());
    for vid in graph.vertex_ids() {
        tree.add_vertex(vid, graph.label(vid));
    }
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(center);
    queue.push_back(center);
    while let Some(node) = queue.pop_front() {
        for &child in graph.successors(node) {
            if visited.insert(child) {
                queue.push_back(child);
                tree.insert_edge(node, child);
            }
        }
        for &parent in graph.predecessors(node) {
            if visited.insert(parent) {
                queue.push_back(parent);
                tree.insert_edge(parent, node);
            }
        }
    }
    tree
}

/// Extract a pattern graph of up to `n` vertices around `center` by an
/// undirected BFS whose per-vertex fanout is capped by a random number up to
/// `degree` (`degree == 0` leaves the fanout unbounded).
///
/// A collaborator interface for query generators, not used by the matching
/// core itself.
pub fn subgraph_bfs<R: Rng>(
    graph: &DataGraph,
    center: VId,
    degree: usize,
    n: usize,
    rng: &mut R,
) -> Result<PatternGraph> {
    if center >= graph.vertex_count() {
        return Err(Error::VertexOutOfRange {
            vid: center,
            num_vertices: graph.vertex_count(),
        });
    }
    let mut subgraph = PatternGraph::with_capacity(n);
    let mut queue = VecDeque::new();
    subgraph.add_vertex(center, graph.label(center));
    queue.push_back(center);
    'bfs: while let Some(node) = queue.pop_front() {
        let fanout = |rng: &mut R| {
            if degree == 0 {
                usize::MAX
            } else {
                rng.gen_range(0..=degree)
            }
        };
        let cap = fanout(rng);
        for (i, &child) in graph.successors(node).iter().enumerate() {
            if i >= cap {
                break;
            }
            if !subgraph.contains_vertex(child) {
                if subgraph.vertex_count() >= n {
                    break 'bfs;
                }
                subgraph.add_vertex(child, graph.label(child));
                queue.push_back(child);
            }
            subgraph.insert_edge(node, child);
        }
        let cap = fanout(rng);
        for (i, &parent) in graph.predecessors(node).iter().enumerate() {
            if i >= cap {
                break;
            }
            if !subgraph.contains_vertex(parent) {
                if subgraph.vertex_count() >= n {
                    break 'bfs;
                }
                subgraph.add_vertex(parent, graph.label(parent));
                queue.push_back(parent);
            }
            subgraph.insert_edge(parent, node);
        }
    }
    Ok(subgraph)
}

/// Shuffle a slice with a caller-supplied randomness source.
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Classification;
    use rand::{rngs::StdRng, SeedableRng};

    fn data_graph() -> DataGraph {
        // 0 -> 1 -> 2, 2 -> 0 (a triangle) and 2 -> 3.
        DataGraph::new(vec![
            (1, vec![1]),
            (2, vec![2]),
            (3, vec![0, 3]),
            (4, vec![]),
        ])
        .unwrap()
    }

    #[test]
    fn test_induced_subgraph_restricts_edges() {
        let g = data_graph();
        let subset: HashSet<VId> = [0, 1, 3].iter().copied().collect();
        let sub = induced_subgraph(&g, &subset);
        assert_eq!(sub.vertex_count(), 3);
        assert!(sub.successors(0).contains(&1));
        assert!(sub.successors(1).is_empty());
        assert!(sub.successors(3).is_empty());
        assert_eq!(sub.label(3), 4);
    }

    #[test]
    fn test_polytree_drops_cycle_edge_keeps_orientation() {
        let mut g = PatternGraph::new();
        for (vid, label) in [(1, 0), (2, 1), (3, 2)].iter() {
            g.add_vertex(*vid, *label);
        }
        // triangle 1 -> 2 -> 3 -> 1
        g.add_edge(1, 2).unwrap();
        g.add_edge(2, 3).unwrap();
        g.add_edge(3, 1).unwrap();
        let tree = polytree(&g, 1);
        assert_eq!(tree.vertex_count(), 3);
        assert_eq!(tree.edge_count(), 2);
        assert_eq!(tree.classify(), Classification::Polytree);
        // every kept edge exists in the original with the same orientation
        for u in tree.vertex_ids() {
            for &v in tree.successors(u) {
                assert!(g.successors(u).contains(&v));
            }
        }
    }

    #[test]
    fn test_subgraph_bfs_bounded() {
        let g = data_graph();
        let mut rng = StdRng::seed_from_u64(7);
        let sub = subgraph_bfs(&g, 0, 0, 3, &mut rng).unwrap();
        assert!(sub.vertex_count() <= 3);
        assert!(sub.contains_vertex(0));
        // every extracted edge exists in the data graph
        for u in sub.vertex_ids() {
            for &v in sub.successors(u) {
                assert!(g.successors(u).contains(&v));
            }
        }
    }

    #[test]
    fn test_subgraph_bfs_rejects_bad_center() {
        let g = data_graph();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(subgraph_bfs(&g, 9, 0, 3, &mut rng).is_err());
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let mut a = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let mut b = a.clone();
        shuffle(&mut a, &mut StdRng::seed_from_u64(11));
        shuffle(&mut b, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }
}
