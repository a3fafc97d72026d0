//! Identity and authentication rules

use anyhow::Result;

use super::base::{BuiltinRule, RuleHit, RuleSettings};
use super::untrusted_nodes;
use crate::graph::{reachable_set, shortest_path, AnalysisContext, NodeType};
use crate::models::{Rating, RuleMeta, Severity, Stride};

pub(super) fn unauthenticated_api() -> BuiltinRule {
    let meta = RuleMeta::new(
        "T-002",
        "Unauthenticated API Reachable from Untrusted Node",
        Stride::Spoofing,
        Severity::Critical,
    )
    .with_rating(Rating::High, Rating::High)
    .with_control("Authentication")
    .with_description(
        "An untrusted node can reach an API endpoint with no authentication through one or \
         more hops. Any actor can spoof identity and make unauthorized calls.",
    )
    .with_remediation(&[
        "Require JWT or OAuth2 on all API endpoints",
        "Implement API gateway with mandatory auth",
        "Add rate limiting and IP allowlisting",
    ]);
    BuiltinRule::new(meta, check_unauthenticated_api)
}

fn check_unauthenticated_api(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let untrusted = untrusted_nodes(ctx);
    let mut affected = Vec::new();
    for api in ctx.nodes_of_type(NodeType::Api) {
        if !ctx.incoming(&api.id).any(|e| e.is_unauthenticated()) {
            continue;
        }
        if untrusted
            .iter()
            .any(|src| shortest_path(ctx, &src.id, &api.id).is_some())
        {
            affected.push(api.id.as_str());
        }
    }
    Ok(RuleHit::nodes(affected))
}

pub(super) fn attacker_path() -> BuiltinRule {
    let meta = RuleMeta::new(
        "T-005",
        "Attacker Has Active Data Flow Path",
        Stride::Spoofing,
        Severity::Critical,
    )
    .with_rating(Rating::High, Rating::High)
    .with_control("Authentication")
    .with_description(
        "Adversary node has a directed path to internal or restricted nodes. Models a live \
         attack path into the protected architecture.",
    )
    .with_remediation(&[
        "Explicitly model attacker capabilities",
        "Add detection (SIEM, IDS/IPS)",
        "Implement zero-trust network segmentation",
    ]);
    BuiltinRule::new(meta, check_attacker_path)
}

/// Only the first attacker in the model is considered.
fn check_attacker_path(ctx: &AnalysisContext<'_>, _: &RuleSettings) -> Result<Option<RuleHit>> {
    let Some(attacker) = ctx.nodes_of_type(NodeType::Attacker).next() else {
        return Ok(None);
    };
    let reachable = reachable_set(ctx, &attacker.id);
    let targets: Vec<&str> = ctx
        .nodes()
        .values()
        .filter(|n| n.trust().is_protected() && reachable.contains(n.id.as_str()))
        .map(|n| n.id.as_str())
        .collect();
    if targets.is_empty() {
        return Ok(None);
    }
    Ok(RuleHit::nodes(
        std::iter::once(attacker.id.as_str()).chain(targets),
    ))
}

pub(super) fn missing_identity_provider() -> BuiltinRule {
    let meta = RuleMeta::new(
        "T-012",
        "No Centralized Identity Provider",
        Stride::Spoofing,
        Severity::Medium,
    )
    .with_rating(Rating::Medium, Rating::Medium)
    .with_control("Authentication")
    .with_description(
        "No centralized identity provider. Fragmented authentication increases credential \
         exposure and inconsistent session handling.",
    )
    .with_remediation(&[
        "Implement SSO with SAML 2.0 or OIDC",
        "Centralize AuthN in Identity Provider",
        "Enable MFA for all user accounts",
    ]);
    BuiltinRule::new(meta, check_missing_identity_provider)
}

fn check_missing_identity_provider(
    ctx: &AnalysisContext<'_>,
    settings: &RuleSettings,
) -> Result<Option<RuleHit>> {
    if ctx.node_count() <= settings.small_model_node_limit {
        return Ok(None);
    }
    let fires = ctx.has_type(NodeType::User) && !ctx.has_type(NodeType::Idp);
    Ok(fires.then(RuleHit::global))
}

pub(super) fn broken_authentication() -> BuiltinRule {
    let meta = RuleMeta::new("R-001", "Broken Authentication", Stride::Spoofing, Severity::High)
        .with_rating(Rating::High, Rating::High)
        .with_control("Authentication")
        .with_owasp("A07:2021 Identification and Authentication Failures")
        .with_description(
            "API endpoint has authentication disabled. Any actor can make unauthorized calls, \
             spoof identities, and access protected resources without credentials. Maps to \
             OWASP A07:2021.",
        )
        .with_remediation(&[
            "Enable JWT or OAuth2 on all API endpoints",
            "Implement API Gateway with mandatory authentication policy",
            "Add MFA for privileged API operations",
            "Audit all API routes for missing auth middleware",
        ]);
    BuiltinRule::new(meta, check_broken_authentication)
}

/// An API whose props disable auth, or whose every inbound flow is
/// unauthenticated.
fn check_broken_authentication(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let affected = ctx.nodes_of_type(NodeType::Api).filter_map(|api| {
        let disabled = api.props.auth == Some(false);
        let mut inbound = ctx.incoming(&api.id).peekable();
        let all_open = inbound.peek().is_some() && inbound.all(|e| e.is_unauthenticated());
        (disabled || all_open).then_some(api.id.as_str())
    });
    Ok(RuleHit::nodes(affected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AuthMethod, Edge, Node, NodeMap, NodeProps};
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
    fn test_unauthenticated_api_from_untrusted() {
        let map = nodes(&[("u1", NodeType::User), ("a1", NodeType::Api)]);
        let open = vec![Edge::new("e1", "u1", "a1").with_auth(AuthMethod::None)];
        assert_eq!(fire(&unauthenticated_api(), &map, &open), Some(vec!["a1".into()]));

        let jwt = vec![Edge::new("e1", "u1", "a1").with_auth(AuthMethod::Jwt)];
        assert_eq!(fire(&unauthenticated_api(), &map, &jwt), None);
    }

    #[test]
    fn test_attacker_path_lists_attacker_first() {
        let map = nodes(&[
            ("atk", NodeType::Attacker),
            ("web", NodeType::WebServer),
            ("db", NodeType::Database),
        ]);
        let edges = vec![Edge::new("e1", "atk", "web"), Edge::new("e2", "web", "db")];
        assert_eq!(
            fire(&attacker_path(), &map, &edges),
            Some(vec!["atk".into(), "web".into(), "db".into()])
        );
        assert_eq!(fire(&attacker_path(), &map, &[]), None);
    }

    #[test]
    fn test_identity_provider_suppressed_on_small_models() {
        let mut map = nodes(&[
            ("u", NodeType::User),
            ("a", NodeType::Api),
            ("b", NodeType::Api),
            ("c", NodeType::Api),
            ("d", NodeType::Database),
        ]);
        assert_eq!(fire(&missing_identity_provider(), &map, &[]), None);

        map.insert("e".into(), Node::new("e", NodeType::Cache));
        assert_eq!(fire(&missing_identity_provider(), &map, &[]), Some(vec![]));

        map.insert("idp".into(), Node::new("idp", NodeType::Idp));
        assert_eq!(fire(&missing_identity_provider(), &map, &[]), None);
    }

    #[test]
    fn test_identity_provider_respects_settings() {
        let map = nodes(&[("u", NodeType::User), ("a", NodeType::Api)]);
        let rule = missing_identity_provider().with_settings(RuleSettings {
            small_model_node_limit: 0,
        });
        assert_eq!(fire(&rule, &map, &[]), Some(vec![]));
    }

    #[test]
    fn test_broken_authentication() {
        let mut map = nodes(&[
            ("u", NodeType::User),
            ("open", NodeType::Api),
            ("mixed", NodeType::Api),
            ("isolated", NodeType::Api),
        ]);
        let edges = vec![
            Edge::new("e1", "u", "open").with_auth(AuthMethod::None),
            Edge::new("e2", "u", "mixed").with_auth(AuthMethod::None),
            Edge::new("e3", "open", "mixed").with_auth(AuthMethod::Mtls),
        ];
        assert_eq!(
            fire(&broken_authentication(), &map, &edges),
            Some(vec!["open".into()])
        );

        let disabled = NodeProps {
            auth: Some(false),
            ..Default::default()
        };
        let isolated = Node::new("isolated", NodeType::Api).with_props(disabled);
        map.insert("isolated".into(), isolated);
        assert_eq!(
            fire(&broken_authentication(), &map, &edges),
            Some(vec!["open".into(), "isolated".into()])
        );
    }
}
