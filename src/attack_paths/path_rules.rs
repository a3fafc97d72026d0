//! Graph-wide path rules
//!
//! Unlike the built-in rules these look at whole enumerated paths rather
//! than single edges. Each rule reports at most once, on the first path that
//! matches.

use indexmap::IndexSet;

use super::paths::{entry_nodes, BROKEN_ACCESS_CONTROL};
use crate::graph::{all_paths_bounded, AnalysisContext, TrustZone, MAX_PATHS, MAX_PATH_DEPTH};
use crate::models::{Rating, RuleMeta, Severity, Stride, Threat, ThreatSource};

const ESCALATION_DEPTH: usize = 5;

const PATH_ARROW: &str = " → ";

fn escalation_meta() -> RuleMeta {
    RuleMeta::new(
        "PR-001",
        "Privilege Escalation Path (Graph)",
        Stride::ElevationOfPrivilege,
        Severity::Critical,
    )
    .with_rating(Rating::Medium, Rating::High)
    .with_control("Authorization")
    .with_owasp(BROKEN_ACCESS_CONTROL)
    .with_remediation(&[
        "Enforce authentication on every edge involving admin-role nodes",
        "Implement least-privilege: no admin credentials for application paths",
        "Add network-layer ACLs to block unauthenticated admin access",
    ])
}

fn penetration_meta() -> RuleMeta {
    RuleMeta::new(
        "PR-002",
        "Deep Penetration Path (Internet → Restricted Zone)",
        Stride::ElevationOfPrivilege,
        Severity::Critical,
    )
    .with_rating(Rating::High, Rating::High)
    .with_control("Network Segmentation")
    .with_owasp(BROKEN_ACCESS_CONTROL)
    .with_remediation(&[
        "Add WAF and firewall between internet and internal zones",
        "Enforce zero-trust: every hop must authenticate",
        "Deploy intrusion detection on zone boundary traffic",
    ])
}

/// Run PR-001 and PR-002, in that order.
pub fn evaluate_path_rules(ctx: &AnalysisContext<'_>) -> Vec<Threat> {
    [privilege_escalation_path(ctx), deep_penetration_path(ctx)]
        .into_iter()
        .flatten()
        .collect()
}

fn labels(ctx: &AnalysisContext<'_>, path: &[String]) -> String {
    path.iter()
        .map(|id| ctx.node(id).map_or(id.as_str(), |n| n.display_name()))
        .collect::<Vec<_>>()
        .join(PATH_ARROW)
}

fn to_threat(ctx: &AnalysisContext<'_>, meta: &RuleMeta, path: &[String]) -> Threat {
    let affected: IndexSet<String> = path.iter().cloned().collect();
    Threat::from_rule(
        meta,
        affected.into_iter().collect(),
        ctx.nodes(),
        ThreatSource::PathRule,
    )
}

/// An admin-privileged node reached through at least one unauthenticated hop.
fn reaches_admin_unauthenticated(ctx: &AnalysisContext<'_>, path: &[String]) -> bool {
    let edges = ctx.path_edges(path);
    path.iter().enumerate().skip(1).any(|(i, id)| {
        ctx.node(id).is_some_and(|n| n.is_admin())
            && edges.iter().take(i).any(|e| e.is_unauthenticated())
    })
}

/// PR-001
pub fn privilege_escalation_path(ctx: &AnalysisContext<'_>) -> Option<Threat> {
    for entry in entry_nodes(ctx) {
        for path in all_paths_bounded(ctx, &entry.id, ESCALATION_DEPTH, MAX_PATHS) {
            if !reaches_admin_unauthenticated(ctx, &path) {
                continue;
            }
            let mut meta = escalation_meta();
            meta.description = format!(
                "A traversal path exists containing an admin-privileged node reachable via an \
                 unauthenticated edge. An attacker can exploit the missing auth to inherit \
                 elevated privileges. Path: {}",
                labels(ctx, &path)
            );
            return Some(to_threat(ctx, &meta, &path));
        }
    }
    None
}

/// PR-002
pub fn deep_penetration_path(ctx: &AnalysisContext<'_>) -> Option<Threat> {
    let internet_entries = entry_nodes(ctx)
        .into_iter()
        .filter(|n| n.trust_zone() == TrustZone::Internet);

    for entry in internet_entries {
        for path in all_paths_bounded(ctx, &entry.id, MAX_PATH_DEPTH, MAX_PATHS) {
            if path.len() < 3 {
                continue;
            }
            let ends_restricted = path
                .last()
                .and_then(|id| ctx.node(id))
                .is_some_and(|n| n.trust_zone() == TrustZone::Restricted);
            if !ends_restricted {
                continue;
            }
            let edges = ctx.path_edges(&path);
            let wide_open = edges.len() == path.len() - 1
                && edges
                    .iter()
                    .all(|e| e.is_unauthenticated() && e.is_unencrypted());
            if !wide_open {
                continue;
            }

            let mut meta = penetration_meta();
            meta.description = format!(
                "Multi-zone penetration path detected: {}. An internet-origin actor can traverse \
                 through intermediate zones to reach the restricted zone via unauthenticated, \
                 unencrypted connections.",
                labels(ctx, &path)
            );
            return Some(to_threat(ctx, &meta, &path));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AuthMethod, Edge, Encryption, IamPrivilege, Node, NodeMap, NodeType};

    fn chain() -> NodeMap {
        let mut map = NodeMap::new();
        map.insert("u".into(), Node::new("u", NodeType::User).with_label("Client"));
        map.insert("a".into(), Node::new("a", NodeType::Api).with_label("API"));
        map.insert("d".into(), Node::new("d", NodeType::Database).with_label("DB"));
        map
    }

    #[test]
    fn test_escalation_path_needs_admin_and_open_hop() {
        let mut map = chain();
        let edges = vec![Edge::new("e1", "u", "a"), Edge::new("e2", "a", "d")];
        {
            let ctx = AnalysisContext::build(&map, &edges);
            assert!(privilege_escalation_path(&ctx).is_none());
        }

        if let Some(a) = map.get_mut("a") {
            a.iam_priv = Some(IamPrivilege::Admin);
        }
        let ctx = AnalysisContext::build(&map, &edges);
        let threat = privilege_escalation_path(&ctx).unwrap();
        assert_eq!(threat.id, "PR-001");
        assert_eq!(threat.source, ThreatSource::PathRule);
        assert_eq!(threat.affected, vec!["u", "a"]);
        assert!(threat.description.ends_with("Path: Client → API"));
    }

    #[test]
    fn test_escalation_path_ignores_authenticated_admin() {
        let mut map = chain();
        if let Some(a) = map.get_mut("a") {
            a.iam_priv = Some(IamPrivilege::Admin);
        }
        let edges = vec![
            Edge::new("e1", "u", "a").with_auth(AuthMethod::OAuth2),
            Edge::new("e2", "a", "d").with_auth(AuthMethod::Mtls),
        ];
        let ctx = AnalysisContext::build(&map, &edges);
        assert!(privilege_escalation_path(&ctx).is_none());
    }

    #[test]
    fn test_deep_penetration_requires_every_hop_open() {
        let map = chain();
        let open = vec![Edge::new("e1", "u", "a"), Edge::new("e2", "a", "d")];
        let ctx = AnalysisContext::build(&map, &open);
        let threat = deep_penetration_path(&ctx).unwrap();
        assert_eq!(threat.affected, vec!["u", "a", "d"]);
        assert!(threat.description.contains("Client → API → DB"));

        let one_hop_secured = vec![
            Edge::new("e1", "u", "a"),
            Edge::new("e2", "a", "d").with_encryption(Encryption::Tls13),
        ];
        let ctx = AnalysisContext::build(&map, &one_hop_secured);
        assert!(deep_penetration_path(&ctx).is_none());
    }

    #[test]
    fn test_deep_penetration_needs_an_intermediate_hop() {
        let map = chain();
        let direct = vec![Edge::new("e1", "u", "d")];
        let ctx = AnalysisContext::build(&map, &direct);
        assert!(deep_penetration_path(&ctx).is_none());
    }

    #[test]
    fn test_each_rule_reports_once() {
        let mut map = chain();
        map.insert("u2".into(), Node::new("u2", NodeType::Internet));
        let edges = vec![
            Edge::new("e1", "u", "a"),
            Edge::new("e2", "a", "d"),
            Edge::new("e3", "u2", "a"),
        ];
        let ctx = AnalysisContext::build(&map, &edges);
        let threats = evaluate_path_rules(&ctx);
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].id, "PR-002");
    }
}
