use crate::{
    graph::{Ball, GraphAccess, PatternGraph},
    simulation::{dual_sim, refine, result_graph, DualRelation, SimVariant},
    types::VId,
};
use log::{debug, info};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Compute the tight simulation of `query` against `data`.
///
/// Dual simulation, materialization of the match graph, then one ball per
/// matched center vertex of the query's selected center, each grown with the
/// query's radius and dual-filtered.  Ball work is independent per center and
/// runs on the rayon pool; the merged result is truncated to `limit`
/// (`0` = unbounded).
///
/// The returned balls are *not* subsumption-filtered; apply
/// [`filter_subsumed`] to the complete set.
pub fn tight_sim<G: GraphAccess>(
    data: &G,
    query: &PatternGraph,
    variant: SimVariant,
    limit: usize,
) -> Vec<Ball> {
    let relation = dual_sim(data, query, variant);
    if relation.is_empty() {
        info!("no dual match");
        return Vec::new();
    }
    let match_graph = result_graph(data, query, &relation);
    let radius = query.radius();
    let center = match query.selected_center() {
        Some(center) => center,
        None => return Vec::new(),
    };
    let mut match_centers: Vec<VId> = relation.matches(center).iter().copied().collect();
    match_centers.sort_unstable();
    info!(
        "{} match centers, ball radius {}",
        match_centers.len(),
        radius
    );
    let mut balls: Vec<Ball> = match_centers
        .par_iter()
        .filter_map(|&c| {
            let mut ball = Ball::new(&match_graph, c, radius);
            if dual_filter(&mut ball, query, &relation, variant) {
                Some(ball)
            } else {
                None
            }
        })
        .collect();
    debug!("{} balls survived the dual filter", balls.len());
    if limit != 0 && balls.len() > limit {
        balls.truncate(limit);
    }
    balls
}

/// Dual-filter a ball against the query.
///
/// The global relation is projected onto the ball's members and re-refined
/// restricted to the ball.  The ball is rejected (cleared) when the local
/// relation empties or no longer contains the center; otherwise its content
/// is replaced by the maximal match subgraph of the local relation.
pub fn dual_filter(
    ball: &mut Ball,
    query: &PatternGraph,
    global: &DualRelation,
    variant: SimVariant,
) -> bool {
    let mut local: HashMap<VId, HashSet<VId>> = HashMap::new();
    for (u, matched) in global.iter() {
        local.insert(u, matched.intersection(ball.members()).copied().collect());
    }
    let local = refine(ball.graph(), query, DualRelation::from_map(local), variant);
    if local.is_empty() {
        ball.clear();
        return false;
    }
    let members = local.image();
    if !members.contains(&ball.center()) {
        ball.clear();
        return false;
    }
    let refined = result_graph(ball.graph(), query, &local);
    ball.replace_content(refined, members);
    true
}

/// Drop every ball whose vertices and edges contain another surviving
/// ball's: supersets add no new minimal match.  Identical balls keep
/// exactly one representative.
pub fn filter_subsumed(balls: Vec<Ball>) -> Vec<Ball> {
    let mut removed = vec![false; balls.len()];
    for i in 0..balls.len() {
        for j in 0..balls.len() {
            if i != j && !removed[j] && balls[i].contains(&balls[j]) {
                removed[i] = true;
                break;
            }
        }
    }
    balls
        .into_iter()
        .zip(removed)
        .filter(|(_, is_removed)| !is_removed)
        .map(|(ball, _)| ball)
        .collect()
}
