use tightsim::{
    cache::{extract_balls, tight_sim_balls, QueryCache},
    graph::{polytree, DataGraph, PatternGraph},
    simulation::{dual_sim, filter_subsumed, tight_sim, SimVariant},
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn create_data_graph() -> DataGraph {
    DataGraph::new(vec![
        (0, vec![1]),
        (1, vec![2]),
        (0, vec![3, 5]),
        (1, vec![]),
        (0, vec![1]),
        (1, vec![]),
    ])
    .unwrap()
}

fn create_query() -> PatternGraph {
    let mut q = PatternGraph::new();
    q.add_vertex(0, 0);
    q.add_vertex(1, 1);
    q.add_vertex(2, 0);
    q.add_vertex(3, 1);
    q.add_edge(0, 1).unwrap();
    q.add_edge(1, 2).unwrap();
    q.add_edge(2, 3).unwrap();
    q
}

// The answer computed from the cached subgraph must agree with the answer
// computed from the full data graph.
#[test]
fn test_cached_answer_matches_full_graph_answer() {
    init_logging();
    let data = create_data_graph();
    let query = create_query();

    let full = filter_subsumed(tight_sim(&data, &query, SimVariant::Plain, 0));

    let mut cache = QueryCache::new(4).unwrap();
    assert!(cache.lookup(&query).is_none());
    cache.insert(&query, &data).unwrap();

    let subgraph = cache.lookup(&query).expect("inserted query must hit");
    let tree = polytree(&query, query.selected_center().unwrap());
    let relation = dual_sim(subgraph, &tree, SimVariant::Cardinality);
    let balls = extract_balls(subgraph, &tree, &relation, 0);
    let cached = filter_subsumed(tight_sim_balls(&balls, &query, 0));

    assert_eq!(cached.len(), full.len());
    for (a, b) in cached.iter().zip(full.iter()) {
        assert_eq!(a.center(), b.center());
        assert_eq!(a.members(), b.members());
        assert_eq!(a.graph(), b.graph());
    }
}

// A stored shape whose signature is not a subset of the query's never gets
// as far as the dual-cover check.
#[test]
fn test_signature_prefilter_rejects_unrelated_shape() {
    init_logging();
    let data = create_data_graph();
    let mut cache = QueryCache::new(4).unwrap();

    // A -> B -> A, signature {(A,B), (B,A)}
    let mut stored = PatternGraph::new();
    stored.add_vertex(0, 0);
    stored.add_vertex(1, 1);
    stored.add_vertex(2, 0);
    stored.add_edge(0, 1).unwrap();
    stored.add_edge(1, 2).unwrap();
    cache.insert(&stored, &data).unwrap();

    // A -> B, signature {(A,B)}
    let mut edge = PatternGraph::new();
    edge.add_vertex(0, 0);
    edge.add_vertex(1, 1);
    edge.add_edge(0, 1).unwrap();
    assert!(cache.candidates(&edge).is_empty());
    assert!(cache.lookup(&edge).is_none());

    // the other way around the stored signature is a subset and covers
    cache.insert(&edge, &data).unwrap();
    assert!(cache.lookup(&edge).is_some());
}

#[test]
fn test_eviction_keeps_frequently_used_entries() {
    init_logging();
    let data = create_data_graph();
    let mut cache = QueryCache::new(2).unwrap();

    let mut hot = PatternGraph::new();
    hot.add_vertex(0, 0);
    hot.add_vertex(1, 1);
    hot.add_edge(0, 1).unwrap();

    let mut cold = PatternGraph::new();
    cold.add_vertex(0, 1);
    cold.add_vertex(1, 0);
    cold.add_edge(0, 1).unwrap();

    let mut third = PatternGraph::new();
    third.add_vertex(0, 0);
    third.add_vertex(1, 1);
    third.add_vertex(2, 0);
    third.add_edge(0, 1).unwrap();
    third.add_edge(1, 2).unwrap();

    cache.insert(&hot, &data).unwrap();
    cache.insert(&cold, &data).unwrap();
    cache.lookup(&hot);
    cache.lookup(&hot);

    // at capacity: inserting a third shape evicts the least-used entry
    cache.insert(&third, &data).unwrap();
    assert_eq!(cache.len(), 2);
    assert!(cache.lookup(&hot).is_some());
    assert!(cache.lookup(&cold).is_none());
}
