//! Default-filling normalization
//!
//! Runs before every analysis pass. Only absent values are filled, so
//! running it twice is the same as running it once, and anything the editor
//! set explicitly is left alone.

use tracing::debug;

use super::components::{default_data_classification, defaults, resolve_trust_zone};
use super::model::{
    CompromiseImpact, DataClass, DiagramModel, Edge, IamPrivilege, Node, NodeMap, NodeType, Role,
    Zone,
};

pub fn normalize(model: &mut DiagramModel) {
    let filled_nodes = normalize_nodes(&mut model.nodes);
    let filled_edges = normalize_edges(&mut model.edges);
    debug!(
        "Normalized {} nodes ({} fields filled), {} edges ({} fields filled)",
        model.nodes.len(),
        filled_nodes,
        model.edges.len(),
        filled_edges
    );
}

/// Fill missing node attributes and props. Returns the number of fields set.
pub fn normalize_nodes(nodes: &mut NodeMap) -> usize {
    nodes.values_mut().map(normalize_node).sum()
}

fn fill<T>(slot: &mut Option<T>, value: impl FnOnce() -> T) -> usize {
    if slot.is_some() {
        return 0;
    }
    *slot = Some(value());
    1
}

fn normalize_node(node: &mut Node) -> usize {
    let def = defaults(node.node_type);
    let node_type = node.node_type;
    let zone = node.zone;
    let mut filled = 0;

    filled += fill(&mut node.trust_zone, || resolve_trust_zone(node_type, zone));
    filled += fill(&mut node.trust, || def.trust);
    filled += fill(&mut node.iam_priv, || def.iam_priv);
    filled += fill(&mut node.compromise_impact, CompromiseImpact::default);
    filled += fill(&mut node.is_detector, || def.is_detector);

    let trust_zone = node.trust_zone();
    let privilege = node.privilege();
    let props = &mut node.props;

    filled += fill(&mut props.data_classification, || {
        default_data_classification(node_type, trust_zone)
    });
    filled += fill(&mut props.auth, || {
        !matches!(node_type, NodeType::Api | NodeType::WebServer)
    });
    filled += fill(&mut props.encryption, || true);
    filled += fill(&mut props.role, || match privilege {
        IamPrivilege::Admin => Role::Admin,
        IamPrivilege::AssumeRole => Role::Service,
        _ => Role::User,
    });
    filled += fill(&mut props.exposed, || {
        zone == Some(Zone::Public) || node_type.is_external()
    });

    filled
}

/// Fill missing edge attributes. Auth and encryption are left absent; every
/// consumer already treats an absent control as "None".
pub fn normalize_edges(edges: &mut [Edge]) -> usize {
    let mut filled = 0;
    for edge in edges.iter_mut() {
        filled += fill(&mut edge.data_class, || DataClass::Public);
        filled += fill(&mut edge.cred_scope, Default::default);
        filled += fill(&mut edge.network_route, Default::default);
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{CredScope, NetworkRoute, TrustLevel, TrustZone};

    fn nodes(list: Vec<Node>) -> NodeMap {
        list.into_iter().map(|n| (n.id.clone(), n)).collect()
    }

    #[test]
    fn test_bare_node_is_fully_populated() {
        let mut map = nodes(vec![Node::bare("a1", NodeType::Api)]);
        normalize_nodes(&mut map);
        let api = &map["a1"];

        assert_eq!(api.trust_zone, Some(TrustZone::Internal));
        assert_eq!(api.trust, Some(TrustLevel::Internal));
        assert_eq!(api.iam_priv, Some(IamPrivilege::Standard));
        assert_eq!(api.props.auth, Some(false));
        assert_eq!(api.props.encryption, Some(true));
        assert_eq!(api.props.data_classification, Some(DataClass::Internal));
        assert_eq!(api.props.role, Some(Role::User));
        assert_eq!(api.props.exposed, Some(false));
    }

    #[test]
    fn test_trust_zone_follows_canvas_zone() {
        let mut map = nodes(vec![Node::bare("a", NodeType::Api).with_zone(Zone::Public)]);
        normalize_nodes(&mut map);
        assert_eq!(map["a"].trust_zone, Some(TrustZone::Internet));
        assert_eq!(map["a"].props.exposed, Some(true));
        assert_eq!(map["a"].props.data_classification, Some(DataClass::Public));
    }

    #[test]
    fn test_explicit_values_survive() {
        let mut node = Node::bare("d", NodeType::Database)
            .with_trust_zone(TrustZone::Dmz)
            .with_privilege(IamPrivilege::Admin);
        node.props.encryption = Some(false);
        let mut map = nodes(vec![node]);
        normalize_nodes(&mut map);

        let db = &map["d"];
        assert_eq!(db.trust_zone, Some(TrustZone::Dmz));
        assert_eq!(db.props.encryption, Some(false));
        assert_eq!(db.props.data_classification, Some(DataClass::Secret));
        assert_eq!(db.props.role, Some(Role::Admin));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut map = nodes(vec![
            Node::bare("u", NodeType::User),
            Node::bare("s", NodeType::Storage),
        ]);
        assert!(normalize_nodes(&mut map) > 0);
        let once = map.clone();
        assert_eq!(normalize_nodes(&mut map), 0);
        assert_eq!(map, once);
    }

    #[test]
    fn test_edge_defaults() {
        let mut edges = vec![Edge::new("e1", "a", "b").with_protocol("https")];
        normalize_edges(&mut edges);
        assert_eq!(edges[0].data_class, Some(DataClass::Public));
        assert_eq!(edges[0].cred_scope, Some(CredScope::Shared));
        assert_eq!(edges[0].network_route, Some(NetworkRoute::Direct));
        assert_eq!(edges[0].protocol.as_deref(), Some("https"));
        assert!(edges[0].auth.is_none());
        assert_eq!(normalize_edges(&mut edges), 0);
    }
}
