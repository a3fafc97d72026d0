//! Blast radius behavior through the public API

use threatcanvas::blast::{run_blast, BlockReason, SimulationConfig};
use threatcanvas::graph::{
    AnalysisContext, AuthMethod, CredScope, Encryption, NetworkRoute, NodeMap,
};
use threatcanvas::{Analyzer, DiagramModel, Edge, Node, NodeType};

fn map(list: Vec<Node>) -> NodeMap {
    list.into_iter().map(|n| (n.id.clone(), n)).collect()
}

#[test]
fn test_no_network_route_is_never_crossed() {
    let nodes = map(vec![
        Node::new("a1", NodeType::Api),
        Node::new("d1", NodeType::Database),
    ]);
    for (auth, enc) in [
        (AuthMethod::None, Encryption::None),
        (AuthMethod::Mtls, Encryption::Tls13),
        (AuthMethod::Jwt, Encryption::Tls10),
    ] {
        let edges = vec![Edge::new("e1", "a1", "d1")
            .with_auth(auth)
            .with_encryption(enc)
            .with_network_route(NetworkRoute::None)];
        let ctx = AnalysisContext::build(&nodes, &edges);
        let blast = run_blast(&ctx, "a1", &SimulationConfig::default()).unwrap();

        assert!(!blast.is_reached("d1"));
        assert_eq!(blast.blocked_by(BlockReason::NoNetworkRoute), vec!["e1"]);
    }
}

#[test]
fn test_service_bound_credential_needs_the_declared_holder() {
    let nodes = map(vec![
        Node::new("a1", NodeType::Api),
        Node::new("m1", NodeType::Microservice),
        Node::new("d1", NodeType::Database),
    ]);
    let edges = vec![
        Edge::new("e1", "a1", "m1"),
        Edge::new("e2", "m1", "d1").with_cred_scope(CredScope::ServiceBound),
    ];
    let ctx = AnalysisContext::build(&nodes, &edges);
    let config = SimulationConfig::default();

    let from_api = run_blast(&ctx, "a1", &config).unwrap();
    assert!(from_api.is_reached("m1"));
    assert!(!from_api.is_reached("d1"));
    assert_eq!(
        from_api.blocked_by(BlockReason::CredentialNotScoped),
        vec!["e2"]
    );

    let from_holder = run_blast(&ctx, "m1", &config).unwrap();
    assert_eq!(from_holder.hop("d1"), Some(1));
}

#[test]
fn test_detection_compounds_monotonically_under_the_cap() {
    let ids = ["s0", "s1", "s2", "s3", "s4", "s5"];
    let nodes = map(
        ids.iter()
            .map(|id| Node::new(id, NodeType::Microservice))
            .collect(),
    );
    let edges: Vec<Edge> = ids
        .windows(2)
        .map(|w| Edge::new(&format!("{}-{}", w[0], w[1]), w[0], w[1]))
        .collect();
    let ctx = AnalysisContext::build(&nodes, &edges);

    for increment in [0.05, 0.3, 0.9] {
        let config = SimulationConfig {
            default_edge_detection: increment,
            ..SimulationConfig::default()
        };
        let blast = run_blast(&ctx, "s0", &config).unwrap();

        let mut previous = 0.0;
        for id in ids {
            let p = blast.detection_of(id).unwrap();
            assert!(p >= previous, "{id}: {p} < {previous}");
            assert!(p <= 0.99, "{id}: {p} above cap");
            previous = p;
        }
    }
}

#[test]
fn test_analyzer_blast_uses_configured_model() {
    let mut model = DiagramModel::new();
    model
        .add_node(Node::bare("u1", NodeType::User))
        .add_node(Node::bare("a1", NodeType::Api))
        .add_node(Node::bare("d1", NodeType::Database))
        .add_edge(Edge::new("e1", "u1", "a1"))
        .add_edge(Edge::new("e2", "a1", "d1"));

    let analyzer = Analyzer::new();
    let blast = analyzer.blast(&mut model, "u1").unwrap();
    assert_eq!(blast.hop("a1"), Some(1));
    assert_eq!(blast.hop("d1"), Some(2));

    let summary = blast.summary();
    assert_eq!(summary.reached, 2);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.reach_pct, 100);
}
