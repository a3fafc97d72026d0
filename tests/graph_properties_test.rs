//! Path and reachability properties over small hand-built graphs

use threatcanvas::graph::{
    has_cycle, reachable_set, shortest_path, trust_boundary_crossings, AnalysisContext, Edge,
    Node, NodeMap, NodeType,
};

fn services(ids: &[&str]) -> NodeMap {
    ids.iter()
        .map(|id| (id.to_string(), Node::new(id, NodeType::Microservice)))
        .collect()
}

fn chain_edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
    pairs
        .iter()
        .map(|(a, b)| Edge::new(&format!("{a}-{b}"), a, b))
        .collect()
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_chain_paths_and_reachability() {
    let nodes = services(&["A", "B", "C"]);
    let edges = chain_edges(&[("A", "B"), ("B", "C")]);
    let ctx = AnalysisContext::build(&nodes, &edges);

    assert_eq!(shortest_path(&ctx, "A", "C"), Some(ids(&["A", "B", "C"])));
    assert_eq!(shortest_path(&ctx, "C", "A"), None);

    let from_a: Vec<String> = reachable_set(&ctx, "A").into_iter().collect();
    assert_eq!(from_a, ids(&["B", "C"]));
    assert!(reachable_set(&ctx, "C").is_empty());
    assert!(!has_cycle(&ctx));
}

#[test]
fn test_closing_the_chain_makes_a_cycle() {
    let nodes = services(&["A", "B", "C"]);
    let edges = chain_edges(&[("A", "B"), ("B", "C"), ("C", "A")]);
    let ctx = AnalysisContext::build(&nodes, &edges);
    assert!(has_cycle(&ctx));
}

#[test]
fn test_trust_boundary_crossings_on_a_path() {
    let nodes = services(&["A", "B", "C", "D"]);
    let edges = vec![
        Edge::new("e1", "A", "B").with_trust_boundary("Yes"),
        Edge::new("e2", "B", "C").with_trust_boundary("No"),
        Edge::new("e3", "C", "D").with_trust_boundary("Yes"),
    ];
    let ctx = AnalysisContext::build(&nodes, &edges);

    let path = shortest_path(&ctx, "A", "D").unwrap();
    assert_eq!(trust_boundary_crossings(&ctx, &path), 2);
    assert_eq!(trust_boundary_crossings(&ctx, &ids(&["B", "C"])), 0);
}

#[test]
fn test_edges_to_missing_nodes_are_ignored() {
    let nodes = services(&["A", "B"]);
    let edges = chain_edges(&[("A", "B"), ("B", "ghost")]);
    let ctx = AnalysisContext::build(&nodes, &edges);

    assert_eq!(shortest_path(&ctx, "A", "ghost"), None);
    let from_a: Vec<String> = reachable_set(&ctx, "A").into_iter().collect();
    assert_eq!(from_a, ids(&["B"]));
}
