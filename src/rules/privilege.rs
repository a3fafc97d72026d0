//! Authorization rules: lateral movement and privilege escalation

use anyhow::Result;

use super::base::{BuiltinRule, RuleHit, RuleSettings};
use super::untrusted_nodes;
use crate::graph::{
    shortest_path, trust_boundary_crossings, AnalysisContext, DataClass, Node, NodeType, Role,
    TrustLevel,
};
use crate::models::{Rating, RuleMeta, Severity, Stride};

fn escalation(id: &str, name: &str, severity: Severity) -> RuleMeta {
    RuleMeta::new(id, name, Stride::ElevationOfPrivilege, severity).with_control("Authorization")
}

fn restricted_nodes<'a>(ctx: &AnalysisContext<'a>) -> Vec<&'a Node> {
    ctx.select(|n| n.trust() == TrustLevel::Restricted)
}

pub(super) fn lateral_movement() -> BuiltinRule {
    let meta = escalation("T-010", "Lateral Movement to Data Store", Severity::High)
        .with_rating(Rating::Medium, Rating::High)
        .with_description(
            "Direct or multi-hop path exists from internal/untrusted node to restricted data \
             store without authentication. Enables lateral movement post-compromise.",
        )
        .with_remediation(&[
            "Require mTLS between services and data stores",
            "Use service mesh with AuthZ policies",
            "Least-privilege DB credentials per service",
        ]);
    BuiltinRule::new(meta, check_lateral_movement)
}

/// Internal to restricted over an unauthenticated hop, or untrusted to
/// restricted through at least one intermediate node.
fn check_lateral_movement(ctx: &AnalysisContext<'_>, _: &RuleSettings) -> Result<Option<RuleHit>> {
    let mut affected: Vec<&str> = ctx
        .edges()
        .filter_map(|e| {
            let from = ctx.node(&e.from)?;
            let to = ctx.node(&e.to)?;
            (from.trust() == TrustLevel::Internal
                && to.trust() == TrustLevel::Restricted
                && e.is_unauthenticated())
            .then_some(to.id.as_str())
        })
        .collect();

    let restricted = restricted_nodes(ctx);
    for src in untrusted_nodes(ctx) {
        for dst in &restricted {
            if shortest_path(ctx, &src.id, &dst.id).is_some_and(|p| p.len() > 2) {
                affected.push(dst.id.as_str());
            }
        }
    }
    Ok(RuleHit::nodes(affected))
}

pub(super) fn boundary_traversal() -> BuiltinRule {
    let meta = escalation("T-013", "Excessive Trust Boundary Traversal", Severity::High)
        .with_rating(Rating::Medium, Rating::High)
        .with_description(
            "A path crosses two or more trust boundaries to reach a restricted node. Each \
             boundary crossing is a privilege escalation opportunity if controls are \
             inconsistent.",
        )
        .with_remediation(&[
            "Enforce re-authentication at each trust boundary",
            "Implement consistent AuthZ policy across zones",
            "Use network micro-segmentation between trust levels",
        ]);
    BuiltinRule::new(meta, check_boundary_traversal)
}

fn check_boundary_traversal(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let restricted = restricted_nodes(ctx);
    let mut affected = Vec::new();
    for src in untrusted_nodes(ctx) {
        for dst in &restricted {
            let Some(path) = shortest_path(ctx, &src.id, &dst.id) else {
                continue;
            };
            if trust_boundary_crossings(ctx, &path) >= 2 {
                affected.push(dst.id.as_str());
            }
        }
    }
    Ok(RuleHit::nodes(affected))
}

pub(super) fn unauthorized_data_access() -> BuiltinRule {
    let meta = escalation("R-005", "Unauthorized Data Access", Severity::High)
        .with_rating(Rating::High, Rating::High)
        .with_owasp("A01:2021 Broken Access Control")
        .with_description(
            "Non-public data flows across a connection with no authentication. Any actor with \
             network access can read or exfiltrate internal, confidential, or regulated data \
             without presenting credentials. Maps to OWASP A01:2021.",
        )
        .with_remediation(&[
            "Require authentication on every connection carrying non-public data",
            "Implement zero-trust: authenticate every request regardless of network zone",
            "Use API keys or JWT for service-to-service calls",
            "Log and alert on unauthenticated access to sensitive endpoints",
        ]);
    BuiltinRule::new(meta, check_unauthorized_data_access)
}

fn check_unauthorized_data_access(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let affected = ctx
        .edges()
        .filter(|e| e.is_unauthenticated() && e.data_class() != DataClass::Public)
        .flat_map(|e| [e.to.as_str(), e.from.as_str()]);
    Ok(RuleHit::nodes(affected))
}

pub(super) fn escalation_chain() -> BuiltinRule {
    let meta = escalation("R-006", "Privilege Escalation Path", Severity::Critical)
        .with_rating(Rating::Medium, Rating::High)
        .with_owasp("A01:2021 Broken Access Control")
        .with_description(
            "A privilege escalation path exists: a client can reach an admin-role API, and that \
             API connects to a database without authentication. An attacker exploiting the \
             unauthenticated API gains full database access via admin privileges. Maps to \
             OWASP A01:2021.",
        )
        .with_remediation(&[
            "Enforce strict role-based access control (RBAC) on all API->DB connections",
            "Require mTLS for service-to-database authentication",
            "Apply least privilege: never use admin credentials for application DB connections",
            "Implement database proxies (e.g. AWS RDS Proxy) to enforce connection-level AuthZ",
        ]);
    BuiltinRule::new(meta, check_escalation_chain)
}

/// APIs that act with elevated rights: admin or service role, admin IAM, or
/// restricted trust.
fn is_privileged_api(node: &Node) -> bool {
    node.node_type == NodeType::Api
        && (matches!(node.props.role, Some(Role::Admin | Role::Service))
            || node.is_admin()
            || node.trust() == TrustLevel::Restricted)
}

/// client -> privileged API -> database, both hops unauthenticated; plus any
/// admin node talking to a database without auth.
fn check_escalation_chain(ctx: &AnalysisContext<'_>, _: &RuleSettings) -> Result<Option<RuleHit>> {
    let clients = ctx.select(|n| n.node_type.is_external());
    let apis = ctx.select(is_privileged_api);
    let databases: Vec<&Node> = ctx.nodes_of_type(NodeType::Database).collect();

    let mut affected = Vec::new();
    for client in &clients {
        for api in &apis {
            let Some(to_api) = shortest_path(ctx, &client.id, &api.id) else {
                continue;
            };
            let entry_open = ctx
                .incoming(&api.id)
                .find(|e| to_api.contains(&e.from))
                .map_or(true, |e| e.is_unauthenticated());
            if !entry_open {
                continue;
            }
            for db in &databases {
                if shortest_path(ctx, &api.id, &db.id).is_none() {
                    continue;
                }
                let db_open = ctx
                    .edge_between(&api.id, &db.id)
                    .map_or(true, |e| e.is_unauthenticated());
                if db_open {
                    affected.extend([client.id.as_str(), api.id.as_str(), db.id.as_str()]);
                }
            }
        }
    }

    for e in ctx.edges() {
        let (Some(from), Some(to)) = (ctx.node(&e.from), ctx.node(&e.to)) else {
            continue;
        };
        if from.is_admin() && e.is_unauthenticated() && to.node_type == NodeType::Database {
            affected.extend([from.id.as_str(), to.id.as_str()]);
        }
    }
    Ok(RuleHit::nodes(affected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AuthMethod, Edge, IamPrivilege, NodeMap};
    use crate::rules::base::Rule;

    fn nodes(list: &[(&str, NodeType)]) -> NodeMap {
        list.iter()
            .map(|(id, t)| (id.to_string(), Node::new(id, *t)))
            .collect()
    }

    fn fire(rule: &BuiltinRule, nodes: &NodeMap, edges: &[Edge]) -> Option<Vec<String>> {
        let ctx = AnalysisContext::build(nodes, edges);
        rule.check(&ctx).unwrap().map(|h| h.affected)
    }

    #[test]
    fn test_lateral_movement_direct_and_multi_hop() {
        let map = nodes(&[
            ("u1", NodeType::User),
            ("a1", NodeType::Api),
            ("d1", NodeType::Database),
        ]);
        let edges = vec![
            Edge::new("e1", "u1", "a1").with_auth(AuthMethod::Jwt),
            Edge::new("e2", "a1", "d1").with_auth(AuthMethod::Mtls),
        ];
        // authenticated hop, but still untrusted -> restricted over two hops
        assert_eq!(fire(&lateral_movement(), &map, &edges), Some(vec!["d1".into()]));

        let direct = vec![Edge::new("e2", "a1", "d1").with_auth(AuthMethod::None)];
        assert_eq!(fire(&lateral_movement(), &map, &direct), Some(vec!["d1".into()]));

        let authed = vec![Edge::new("e2", "a1", "d1").with_auth(AuthMethod::Mtls)];
        assert_eq!(fire(&lateral_movement(), &map, &authed), None);
    }

    #[test]
    fn test_boundary_traversal_needs_two_crossings() {
        let map = nodes(&[
            ("u", NodeType::User),
            ("web", NodeType::WebServer),
            ("db", NodeType::Database),
        ]);
        let one = vec![
            Edge::new("e1", "u", "web").with_trust_boundary("Yes"),
            Edge::new("e2", "web", "db").with_trust_boundary("No"),
        ];
        assert_eq!(fire(&boundary_traversal(), &map, &one), None);

        let two = vec![
            Edge::new("e1", "u", "web").with_trust_boundary("Yes"),
            Edge::new("e2", "web", "db").with_trust_boundary("Yes - internal/restricted"),
        ];
        assert_eq!(fire(&boundary_traversal(), &map, &two), Some(vec!["db".into()]));
    }

    #[test]
    fn test_unauthorized_data_access() {
        let map = nodes(&[("svc", NodeType::Microservice), ("q", NodeType::MessageQueue)]);
        let public = vec![Edge::new("e1", "svc", "q")];
        assert_eq!(fire(&unauthorized_data_access(), &map, &public), None);

        let internal = vec![Edge::new("e1", "svc", "q").with_data_class(DataClass::Internal)];
        assert_eq!(
            fire(&unauthorized_data_access(), &map, &internal),
            Some(vec!["q".into(), "svc".into()])
        );
    }

    #[test]
    fn test_escalation_chain_through_admin_api() {
        let mut map = nodes(&[("u", NodeType::User), ("db", NodeType::Database)]);
        map.insert(
            "admin".into(),
            Node::new("admin", NodeType::Api).with_privilege(IamPrivilege::Admin),
        );
        let edges = vec![
            Edge::new("e1", "u", "admin").with_auth(AuthMethod::None),
            Edge::new("e2", "admin", "db").with_auth(AuthMethod::None),
        ];
        assert_eq!(
            fire(&escalation_chain(), &map, &edges),
            Some(vec!["u".into(), "admin".into(), "db".into()])
        );

        let guarded = vec![
            Edge::new("e1", "u", "admin").with_auth(AuthMethod::OAuth2),
            Edge::new("e2", "admin", "db").with_auth(AuthMethod::Mtls),
        ];
        assert_eq!(fire(&escalation_chain(), &map, &guarded), None);
    }

    #[test]
    fn test_escalation_chain_ignores_standard_api() {
        let map = nodes(&[("u", NodeType::User), ("a", NodeType::Api), ("db", NodeType::Database)]);
        let edges = vec![
            Edge::new("e1", "u", "a").with_auth(AuthMethod::None),
            Edge::new("e2", "a", "db").with_auth(AuthMethod::None),
        ];
        assert_eq!(fire(&escalation_chain(), &map, &edges), None);
    }
}
