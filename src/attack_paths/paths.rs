//! Entry-to-crown-jewel attack path enumeration

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{
    all_paths_bounded, AnalysisContext, Node, NodeType, TrustZone, Zone, MAX_PATHS,
    MAX_PATH_DEPTH,
};
use crate::models::Severity;

pub(crate) const BROKEN_ACCESS_CONTROL: &str = "A01:2021 Broken Access Control";

const FALLBACK_REASON: &str = "Path from internet to sensitive data";

/// A multi-hop route from an entry point to a high-value component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackPath {
    pub id: String,
    pub path: Vec<String>,
    pub path_labels: Vec<String>,
    pub risk: Severity,
    pub entry: String,
    pub target: String,
    pub reasons: Vec<String>,
    pub reason: String,
    pub owasp: String,
    pub has_unencrypted: bool,
    pub has_no_auth: bool,
    pub crosses_boundary: bool,
}

impl AttackPath {
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Where an outside actor gets in: the internet trust zone, the public
/// canvas zone, or an external component type.
pub fn is_entry(node: &Node) -> bool {
    node.trust_zone() == TrustZone::Internet
        || node.zone == Some(Zone::Public)
        || node.node_type.is_external()
}

pub fn entry_nodes<'a>(ctx: &AnalysisContext<'a>) -> Vec<&'a Node> {
    ctx.select(is_entry)
}

/// Databases, object storage, anything in the restricted zone, and anything
/// holding secret or regulated data.
pub fn is_high_value(node: &Node) -> bool {
    matches!(node.node_type, NodeType::Database | NodeType::Storage)
        || node.trust_zone() == TrustZone::Restricted
        || node.data_classification().is_crown_jewel()
}

/// Enumerate bounded paths from every entry node, keep the ones that end at
/// a high-value target, and collapse them to one finding per
/// (entry, target) pair.
///
/// The result is ordered most severe first; ids are `AP-1`, `AP-2`, ... in
/// that order.
pub fn detect_attack_paths(ctx: &AnalysisContext<'_>) -> Vec<AttackPath> {
    let mut best: IndexMap<(String, String), AttackPath> = IndexMap::new();
    let mut considered = 0usize;

    for entry in entry_nodes(ctx) {
        for path in all_paths_bounded(ctx, &entry.id, MAX_PATH_DEPTH, MAX_PATHS) {
            let Some(target) = path.last().and_then(|id| ctx.node(id)) else {
                continue;
            };
            if path.len() < 2 || !is_high_value(target) {
                continue;
            }
            considered += 1;

            let found = classify(ctx, entry, target, path);
            let key = (found.entry.clone(), found.target.clone());
            let more_severe = best
                .get(&key)
                .map_or(true, |existing| found.risk > existing.risk);
            if more_severe {
                best.insert(key, found);
            }
        }
    }

    let mut paths: Vec<AttackPath> = best.into_values().collect();
    // stable: equal risks keep discovery order
    paths.sort_by(|a, b| b.risk.cmp(&a.risk));
    for (i, p) in paths.iter_mut().enumerate() {
        p.id = format!("AP-{}", i + 1);
    }

    debug!(
        "Attack paths: {} candidate paths, {} distinct entry/target pairs",
        considered,
        paths.len()
    );
    paths
}

fn classify(ctx: &AnalysisContext<'_>, entry: &Node, target: &Node, path: Vec<String>) -> AttackPath {
    let edges = ctx.path_edges(&path);
    let has_unencrypted = edges.iter().any(|e| e.is_unencrypted());
    let has_no_auth = edges.iter().any(|e| e.is_unauthenticated());
    let crosses_boundary = path.windows(2).any(|pair| {
        match (ctx.node(&pair[0]), ctx.node(&pair[1])) {
            (Some(a), Some(b)) => a.trust_zone() != b.trust_zone(),
            _ => false,
        }
    });

    let deep_target =
        target.trust_zone() == TrustZone::Restricted || target.node_type == NodeType::Database;
    let risk = if entry.node_type == NodeType::Attacker
        || (deep_target && has_unencrypted && has_no_auth)
    {
        Severity::Critical
    } else {
        Severity::High
    };

    let mut reasons = Vec::new();
    if has_unencrypted {
        reasons.push("plaintext channel".to_string());
    }
    if has_no_auth {
        reasons.push("unauthenticated edge".to_string());
    }
    if crosses_boundary {
        reasons.push("trust boundary crossed".to_string());
    }
    let reason = if reasons.is_empty() {
        FALLBACK_REASON.to_string()
    } else {
        reasons.join(", ")
    };

    let path_labels = path
        .iter()
        .map(|id| {
            ctx.node(id)
                .map(|n| n.display_name().to_string())
                .unwrap_or_else(|| id.clone())
        })
        .collect();

    AttackPath {
        id: String::new(),
        path_labels,
        risk,
        entry: entry.id.clone(),
        target: target.id.clone(),
        reasons,
        reason,
        owasp: BROKEN_ACCESS_CONTROL.to_string(),
        has_unencrypted,
        has_no_auth,
        crosses_boundary,
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AuthMethod, Edge, Encryption, NodeMap};

    fn model(list: &[(&str, NodeType)]) -> NodeMap {
        list.iter()
            .map(|(id, t)| (id.to_string(), Node::new(id, *t)))
            .collect()
    }

    #[test]
    fn test_entry_and_high_value_classification() {
        assert!(is_entry(&Node::new("u", NodeType::User)));
        assert!(is_entry(&Node::new("c", NodeType::Cdn)));
        assert!(!is_entry(&Node::new("a", NodeType::Api)));
        assert!(is_entry(
            &Node::new("a", NodeType::Api).with_zone(Zone::Public)
        ));

        assert!(is_high_value(&Node::new("d", NodeType::Database)));
        assert!(is_high_value(&Node::new("c", NodeType::Cache)));
        assert!(!is_high_value(&Node::new("a", NodeType::Api)));
        let phi_api = Node::new("a", NodeType::Api).with_props(crate::graph::NodeProps {
            data_classification: Some(crate::graph::DataClass::Phi),
            ..Default::default()
        });
        assert!(is_high_value(&phi_api));
    }

    #[test]
    fn test_plaintext_unauthenticated_path_to_database_is_critical() {
        let nodes = model(&[
            ("u1", NodeType::User),
            ("a1", NodeType::Api),
            ("d1", NodeType::Database),
        ]);
        let edges = vec![Edge::new("e1", "u1", "a1"), Edge::new("e2", "a1", "d1")];
        let ctx = AnalysisContext::build(&nodes, &edges);

        let paths = detect_attack_paths(&ctx);
        assert_eq!(paths.len(), 1);
        let ap = &paths[0];
        assert_eq!(ap.id, "AP-1");
        assert_eq!(ap.path, vec!["u1", "a1", "d1"]);
        assert_eq!(ap.risk, Severity::Critical);
        assert_eq!(
            ap.reason,
            "plaintext channel, unauthenticated edge, trust boundary crossed"
        );
        assert_eq!(ap.hops(), 2);
    }

    #[test]
    fn test_secured_path_is_high_with_fallback_reason() {
        let mut nodes = model(&[("u1", NodeType::User), ("s1", NodeType::Storage)]);
        // same trust zone on both ends so no boundary reason
        if let Some(s) = nodes.get_mut("s1") {
            s.trust_zone = Some(TrustZone::Internet);
        }
        let edges = vec![Edge::new("e1", "u1", "s1")
            .with_auth(AuthMethod::Jwt)
            .with_encryption(Encryption::Tls13)];
        let ctx = AnalysisContext::build(&nodes, &edges);

        let paths = detect_attack_paths(&ctx);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].risk, Severity::High);
        assert!(paths[0].reasons.is_empty());
        assert_eq!(paths[0].reason, "Path from internet to sensitive data");
    }

    #[test]
    fn test_attacker_entry_is_always_critical() {
        let nodes = model(&[("x", NodeType::Attacker), ("s", NodeType::Storage)]);
        let edges = vec![Edge::new("e1", "x", "s")
            .with_auth(AuthMethod::Mtls)
            .with_encryption(Encryption::Tls13)];
        let ctx = AnalysisContext::build(&nodes, &edges);
        assert_eq!(detect_attack_paths(&ctx)[0].risk, Severity::Critical);
    }

    #[test]
    fn test_dedupe_keeps_most_severe_per_pair_and_sorts() {
        // u -> d directly (secured) and u -> a -> d (plaintext, no auth)
        let nodes = model(&[
            ("u", NodeType::User),
            ("a", NodeType::Api),
            ("d", NodeType::Database),
            ("s", NodeType::Storage),
        ]);
        let edges = vec![
            Edge::new("e1", "u", "d")
                .with_auth(AuthMethod::Jwt)
                .with_encryption(Encryption::Tls13),
            Edge::new("e2", "u", "a"),
            Edge::new("e3", "a", "d"),
            Edge::new("e4", "u", "s")
                .with_auth(AuthMethod::Jwt)
                .with_encryption(Encryption::Tls13),
        ];
        let ctx = AnalysisContext::build(&nodes, &edges);

        let paths = detect_attack_paths(&ctx);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].target, "d");
        assert_eq!(paths[0].risk, Severity::Critical);
        assert_eq!(paths[0].path, vec!["u", "a", "d"]);
        assert_eq!(paths[1].target, "s");
        assert_eq!(paths[1].id, "AP-2");
    }

    #[test]
    fn test_no_entry_nodes_means_no_paths() {
        let nodes = model(&[("a", NodeType::Api), ("d", NodeType::Database)]);
        let edges = vec![Edge::new("e1", "a", "d")];
        let ctx = AnalysisContext::build(&nodes, &edges);
        assert!(detect_attack_paths(&ctx).is_empty());
    }
}
