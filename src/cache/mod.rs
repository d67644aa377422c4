//! Semantic query result cache.
//!
//! Instead of keying on whole queries, the cache stores the *polytree* of
//! each inserted query together with the induced data subgraph matching that
//! polytree.  A later query can be answered from a cached subgraph whenever a
//! stored polytree dual-covers it, i.e. the cached subgraph provably contains
//! every vertex any simulation-based answer to the query can touch.
//!
//! Candidate entries are pre-filtered by edge-label signature (cheap,
//! necessary, not sufficient) before the dual-cover check runs.  Eviction is
//! least-frequently-used with insertion-order tie-breaks.

mod usage;

use crate::{
    error::{Error, Result},
    graph::{induced_subgraph, polytree, Ball, Classification, GraphAccess, PatternGraph},
    simulation::{dual_filter, dual_sim, DualRelation, SimVariant},
    types::{Signature, VId, VLabel},
};
use log::{debug, info};
use std::collections::{BTreeSet, HashMap, HashSet};
use usage::UsageTracker;

pub type EntryId = u64;

struct CacheEntry {
    polytree: PatternGraph,
    subgraph: PatternGraph,
}

pub struct QueryCache {
    capacity: usize,
    next_id: EntryId,
    entries: HashMap<EntryId, CacheEntry>,
    index: HashMap<Signature, HashSet<EntryId>>,
    usage: UsageTracker,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            next_id: 0,
            entries: HashMap::new(),
            index: HashMap::new(),
            usage: UsageTracker::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries whose signature could make them answer `query`: same label
    /// set and a signature that is a subset of the query's.
    pub fn candidates(&self, query: &PatternGraph) -> Vec<EntryId> {
        let query_sig = query.signature();
        let query_labels = label_set(&query_sig);
        let mut ids: Vec<EntryId> = self
            .index
            .iter()
            .filter(|(sig, _)| label_set(sig) == query_labels && sig.is_subset(&query_sig))
            .flat_map(|(_, bucket)| bucket.iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Return the cached subgraph of the first candidate whose polytree
    /// dual-covers `query`, bumping its use count.
    pub fn lookup(&mut self, query: &PatternGraph) -> Option<&PatternGraph> {
        let candidates = self.candidates(query);
        let hit = candidates.iter().copied().find(|id| {
            self.entries
                .get(id)
                .map_or(false, |entry| dual_cover(&entry.polytree, query))
        });
        match hit {
            Some(id) => {
                info!("cache hit on entry {} ({} candidates)", id, candidates.len());
                self.usage.record(id);
                self.entries.get(&id).map(|entry| &entry.subgraph)
            }
            None => {
                info!("cache miss ({} candidates)", candidates.len());
                None
            }
        }
    }

    /// Cache `query`'s polytree together with the subgraph of `data` it
    /// matches.  An empty match subgraph is still stored: it records that
    /// this shape has no answer.  A polytree structurally equal to a stored
    /// one bumps the existing entry instead.
    pub fn insert<G: GraphAccess>(&mut self, query: &PatternGraph, data: &G) -> Result<()> {
        if query.classify() == Classification::Disconnected {
            return Err(Error::DisconnectedQuery);
        }
        let center = query.selected_center().ok_or(Error::DisconnectedQuery)?;
        let tree = polytree(query, center);
        let signature = tree.signature();
        if let Some(bucket) = self.index.get(&signature) {
            let mut ids: Vec<EntryId> = bucket.iter().copied().collect();
            ids.sort_unstable();
            for id in ids {
                let stored = self.entries.get(&id).map(|entry| &entry.polytree);
                if stored == Some(&tree) {
                    debug!("polytree already cached as entry {}", id);
                    self.usage.record(id);
                    return Ok(());
                }
            }
        }
        let relation = dual_sim(data, &tree, SimVariant::Cardinality);
        let subgraph = induced_subgraph(data, &relation.image());
        if self.entries.len() >= self.capacity {
            self.evict_one();
        }
        let id = self.next_id;
        self.next_id += 1;
        info!(
            "caching entry {}: polytree with {} vertices, subgraph with {}",
            id,
            tree.vertex_count(),
            subgraph.vertex_count()
        );
        self.entries.insert(
            id,
            CacheEntry {
                polytree: tree,
                subgraph,
            },
        );
        self.index.entry(signature).or_default().insert(id);
        self.usage.record(id);
        Ok(())
    }

    /// Evict the least-frequently-used entry, returning its polytree.
    pub fn evict_one(&mut self) -> Option<PatternGraph> {
        let id = self.usage.poll_least()?;
        let entry = self.entries.remove(&id)?;
        let signature = entry.polytree.signature();
        if let Some(bucket) = self.index.get_mut(&signature) {
            bucket.remove(&id);
            if bucket.is_empty() {
                self.index.remove(&signature);
            }
        }
        debug!("evicted entry {}", id);
        Some(entry.polytree)
    }
}

fn label_set(signature: &Signature) -> BTreeSet<VLabel> {
    signature
        .iter()
        .flat_map(|&(from, to)| [from, to])
        .collect()
}

/// Does `polytree` dual-cover `query`?  Covered means the cardinality
/// dual simulation of the polytree *against the query as data* matches every
/// query vertex, so any data vertex simulating the query also simulates the
/// polytree and lives in the cached subgraph.
pub fn dual_cover(polytree: &PatternGraph, query: &PatternGraph) -> bool {
    let relation = dual_sim(query, polytree, SimVariant::Cardinality);
    relation.image().len() == query.vertex_count()
}

/// Cut unfiltered balls out of a cached subgraph, one per matched polytree
/// center.  The radius is the polytree *diameter* so that a ball holds any
/// embedding its center participates in, wherever the center falls in it.
pub fn extract_balls(
    subgraph: &PatternGraph,
    polytree: &PatternGraph,
    relation: &DualRelation,
    limit: usize,
) -> Vec<Ball> {
    let center = match polytree.selected_center() {
        Some(center) => center,
        None => return Vec::new(),
    };
    let radius = polytree.diameter();
    let mut match_centers: Vec<VId> = relation.matches(center).iter().copied().collect();
    match_centers.sort_unstable();
    let mut balls = Vec::new();
    for c in match_centers {
        balls.push(Ball::new(subgraph, c, radius));
        if limit != 0 && balls.len() == limit {
            break;
        }
    }
    balls
}

/// Answer `query` inside each ball: cardinality dual simulation restricted
/// to the ball, then the dual filter.  Surviving refined balls are the same
/// tight-simulation answers the full graph would give, up to `limit`.
pub fn tight_sim_balls(balls: &[Ball], query: &PatternGraph, limit: usize) -> Vec<Ball> {
    let mut results = Vec::new();
    for ball in balls {
        let relation = dual_sim(ball.graph(), query, SimVariant::Cardinality);
        if relation.is_empty() {
            continue;
        }
        let mut refined = ball.clone();
        if dual_filter(&mut refined, query, &relation, SimVariant::Plain) {
            results.push(refined);
            if limit != 0 && results.len() == limit {
                break;
            }
        }
    }
    results
}
