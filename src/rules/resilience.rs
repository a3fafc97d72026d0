//! Availability and accountability rules
//!
//! Mostly graph-level: they fire on what the architecture lacks rather than
//! on a specific component.

use anyhow::Result;
use rustc_hash::FxHashSet;

use super::base::{BuiltinRule, RuleHit, RuleSettings};
use crate::graph::{cycle_groups, has_cycle_within, AnalysisContext, NodeType};
use crate::models::{Rating, RuleMeta, Severity, Stride};

pub(super) fn missing_audit_trail() -> BuiltinRule {
    let meta = RuleMeta::new("T-006", "No Audit Trail / SIEM", Stride::Repudiation, Severity::Medium)
        .with_rating(Rating::Medium, Rating::Medium)
        .with_control("Non-Repudiation")
        .with_description(
            "No SIEM or audit component. Operations are unlogged; attacks go undetected; \
             repudiation is enabled.",
        )
        .with_remediation(&[
            "Deploy SIEM (Splunk, Elastic, Wazuh)",
            "Enable centralized audit logging",
            "Implement digital signatures on critical ops",
            "Set up anomaly detection alerts",
        ]);
    BuiltinRule::new(meta, check_missing_audit_trail)
}

fn check_missing_audit_trail(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let fires = ctx.node_count() > 2 && !ctx.has_type(NodeType::Siem);
    Ok(fires.then(RuleHit::global))
}

pub(super) fn single_point_of_failure() -> BuiltinRule {
    let meta = RuleMeta::new(
        "T-009",
        "Single Point of Failure - No LB",
        Stride::DenialOfService,
        Severity::Medium,
    )
    .with_rating(Rating::Medium, Rating::Medium)
    .with_control("Availability")
    .with_description(
        "No load balancer detected. A single server crash causes complete service outage.",
    )
    .with_remediation(&[
        "Add load balancer with health checks",
        "Deploy across multiple availability zones",
        "Implement circuit breaker patterns",
    ]);
    BuiltinRule::new(meta, check_single_point_of_failure)
}

fn check_single_point_of_failure(
    ctx: &AnalysisContext<'_>,
    settings: &RuleSettings,
) -> Result<Option<RuleHit>> {
    if ctx.node_count() <= settings.small_model_node_limit {
        return Ok(None);
    }
    let serving = ctx.has_type(NodeType::WebServer) || ctx.has_type(NodeType::Api);
    Ok((serving && !ctx.has_type(NodeType::LoadBalancer)).then(RuleHit::global))
}

pub(super) fn cyclic_dependency() -> BuiltinRule {
    let meta = RuleMeta::new(
        "T-015",
        "Cyclic Service Dependency",
        Stride::DenialOfService,
        Severity::Medium,
    )
    .with_rating(Rating::Low, Rating::High)
    .with_control("Availability")
    .with_description(
        "Internal service graph contains a cycle. Circular dependencies create deadlock risk, \
         cascading failures, and amplified DoS surface under load.",
    )
    .with_remediation(&[
        "Break cycles with async messaging (queues/events)",
        "Introduce timeout and circuit-breaker patterns",
        "Audit service call graph for unintentional loops",
    ]);
    BuiltinRule::new(meta, check_cyclic_dependency)
}

/// Cycle among internal/restricted nodes. The affected set names the nodes
/// on the cycle.
fn check_cyclic_dependency(ctx: &AnalysisContext<'_>, _: &RuleSettings) -> Result<Option<RuleHit>> {
    let internal: FxHashSet<&str> = ctx
        .nodes()
        .values()
        .filter(|n| n.trust().is_protected())
        .map(|n| n.id.as_str())
        .collect();
    if !has_cycle_within(ctx, &internal) {
        return Ok(None);
    }
    let members = cycle_groups(ctx, &internal).into_iter().flatten();
    Ok(Some(RuleHit::nodes(members).unwrap_or_else(RuleHit::global)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node, NodeMap};
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
    fn test_audit_trail_needs_three_nodes() {
        let mut map = nodes(&[("u", NodeType::User), ("a", NodeType::Api)]);
        assert_eq!(fire(&missing_audit_trail(), &map, &[]), None);

        map.insert("d".into(), Node::new("d", NodeType::Database));
        assert_eq!(fire(&missing_audit_trail(), &map, &[]), Some(vec![]));

        map.insert("s".into(), Node::new("s", NodeType::Siem));
        assert_eq!(fire(&missing_audit_trail(), &map, &[]), None);
    }

    #[test]
    fn test_single_point_of_failure() {
        let mut map = nodes(&[
            ("u", NodeType::User),
            ("web", NodeType::WebServer),
            ("a", NodeType::Microservice),
            ("b", NodeType::Microservice),
            ("c", NodeType::Cache),
            ("d", NodeType::Database),
        ]);
        assert_eq!(fire(&single_point_of_failure(), &map, &[]), Some(vec![]));

        map.insert("lb".into(), Node::new("lb", NodeType::LoadBalancer));
        assert_eq!(fire(&single_point_of_failure(), &map, &[]), None);
    }

    #[test]
    fn test_cyclic_dependency_names_members() {
        let map = nodes(&[
            ("u", NodeType::User),
            ("a", NodeType::Microservice),
            ("b", NodeType::Microservice),
            ("q", NodeType::MessageQueue),
        ]);
        let edges = vec![
            Edge::new("e1", "u", "a"),
            Edge::new("e2", "a", "b"),
            Edge::new("e3", "b", "a"),
            Edge::new("e4", "b", "q"),
        ];
        assert_eq!(
            fire(&cyclic_dependency(), &map, &edges),
            Some(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_cycle_through_untrusted_node_is_ignored() {
        let map = nodes(&[("u", NodeType::User), ("a", NodeType::Api)]);
        let edges = vec![Edge::new("e1", "u", "a"), Edge::new("e2", "a", "u")];
        assert_eq!(fire(&cyclic_dependency(), &map, &edges), None);
    }
}
