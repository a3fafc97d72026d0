//! Perimeter and exposure rules
//!
//! What an outside actor can reach, and through what.

use anyhow::Result;

use super::base::{BuiltinRule, RuleHit, RuleSettings};
use super::external_nodes;
use crate::graph::{reachable_set, shortest_path, AnalysisContext, NodeType};
use crate::models::{Rating, RuleMeta, Severity, Stride};

pub(super) fn missing_perimeter() -> BuiltinRule {
    let meta = RuleMeta::new("T-001", "Missing WAF / Firewall", Stride::Tampering, Severity::Critical)
        .with_rating(Rating::High, Rating::High)
        .with_control("Integrity")
        .with_description(
            "External traffic can reach internal services without passing through any WAF or \
             Firewall. Enables direct exploitation of web vulnerabilities.",
        )
        .with_remediation(&[
            "Deploy WAF (AWS WAF, Cloudflare, ModSecurity)",
            "Add firewall with deny-by-default rules",
            "Implement DMZ and network segmentation",
        ]);
    BuiltinRule::new(meta, check_missing_perimeter)
}

fn check_missing_perimeter(ctx: &AnalysisContext<'_>, _: &RuleSettings) -> Result<Option<RuleHit>> {
    if ctx.nodes().values().any(|n| n.node_type.is_perimeter_guard()) {
        return Ok(None);
    }
    let external = external_nodes(ctx);
    let services = ctx.select(|n| matches!(n.node_type, NodeType::WebServer | NodeType::Api));

    let affected = services.iter().filter(|svc| {
        external
            .iter()
            .any(|ext| shortest_path(ctx, &ext.id, &svc.id).is_some())
    });
    Ok(RuleHit::nodes(affected.map(|svc| svc.id.as_str())))
}

pub(super) fn public_storage() -> BuiltinRule {
    let meta = RuleMeta::new(
        "T-008",
        "Public Object Storage Exposure",
        Stride::InformationDisclosure,
        Severity::High,
    )
    .with_rating(Rating::High, Rating::High)
    .with_control("Confidentiality")
    .with_description(
        "Object storage is reachable from an untrusted node through one or more hops. Risk of \
         public bucket misconfiguration or indirect access.",
    )
    .with_remediation(&[
        "Block all public access by default",
        "Use pre-signed URLs with short TTL",
        "Enable S3 Block Public Access policy",
    ]);
    BuiltinRule::new(meta, check_public_storage)
}

fn check_public_storage(ctx: &AnalysisContext<'_>, _: &RuleSettings) -> Result<Option<RuleHit>> {
    let external = external_nodes(ctx);
    let mut affected = Vec::new();
    for src in &external {
        for store in ctx.nodes_of_type(NodeType::Storage) {
            if shortest_path(ctx, &src.id, &store.id).is_some() {
                affected.push(store.id.as_str());
            }
        }
    }
    Ok(RuleHit::nodes(affected))
}

pub(super) fn plaintext_external_channel() -> BuiltinRule {
    let meta = RuleMeta::new(
        "T-011",
        "HTTP on External Channel",
        Stride::InformationDisclosure,
        Severity::High,
    )
    .with_rating(Rating::High, Rating::Medium)
    .with_control("Confidentiality")
    .with_description(
        "Unencrypted HTTP on external-facing connections. Susceptible to MITM, credential \
         theft, session hijacking.",
    )
    .with_remediation(&[
        "Enforce HTTPS via HSTS",
        "Redirect all HTTP to HTTPS",
        "Configure TLS 1.2+ with strong cipher suites",
    ]);
    BuiltinRule::new(meta, check_plaintext_external_channel)
}

fn check_plaintext_external_channel(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let affected = ctx.edges().filter_map(|e| {
        let from = ctx.node(&e.from)?;
        let outside = matches!(from.node_type, NodeType::Internet | NodeType::User);
        (outside && e.protocol_is("HTTP")).then_some(e.to.as_str())
    });
    Ok(RuleHit::nodes(affected))
}

pub(super) fn missing_rate_limiting() -> BuiltinRule {
    let meta = RuleMeta::new(
        "T-016",
        "Missing Rate Limiting on Auth Endpoint",
        Stride::DenialOfService,
        Severity::High,
    )
    .with_rating(Rating::High, Rating::Medium)
    .with_control("Availability")
    .with_description(
        "An external actor can reach an authentication-handling service with no rate limiting \
         or throttling controls on the path. Enables brute force and credential stuffing.",
    )
    .with_remediation(&[
        "Implement rate limiting at WAF or API gateway",
        "Add CAPTCHA on login endpoints",
        "Deploy account lockout and progressive delay policies",
    ]);
    BuiltinRule::new(meta, check_missing_rate_limiting)
}

fn check_missing_rate_limiting(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let external = external_nodes(ctx);
    let endpoints = ctx.select(|n| {
        matches!(n.node_type, NodeType::Api | NodeType::WebServer | NodeType::Idp)
    });

    let mut affected = Vec::new();
    for src in &external {
        for svc in &endpoints {
            let Some(path) = shortest_path(ctx, &src.id, &svc.id) else {
                continue;
            };
            let unprotected = ctx.path_edges(&path).iter().all(|e| e.is_unauthenticated());
            let unguarded = !path[1..path.len().saturating_sub(1).max(1)].iter().any(|id| {
                ctx.node(id).is_some_and(|n| {
                    matches!(
                        n.node_type,
                        NodeType::Waf | NodeType::Firewall | NodeType::LoadBalancer
                    )
                })
            });
            if unprotected && unguarded {
                affected.push(svc.id.as_str());
            }
        }
    }
    Ok(RuleHit::nodes(affected))
}

pub(super) fn uncontrolled_ingress() -> BuiltinRule {
    let meta = RuleMeta::new(
        "T-017",
        "Uncontrolled External Dependency Ingress",
        Stride::Tampering,
        Severity::High,
    )
    .with_rating(Rating::Medium, Rating::High)
    .with_control("Integrity")
    .with_description(
        "Internet-facing nodes have a directed path to internal services with no explicit \
         trust validation. Supply chain or dependency tampering can propagate inward.",
    )
    .with_remediation(&[
        "Pin and verify all external dependencies (SBOMs)",
        "Enforce input validation at every trust boundary",
        "Use network egress filtering to limit outbound connections",
    ]);
    BuiltinRule::new(meta, check_uncontrolled_ingress)
}

fn check_uncontrolled_ingress(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let protected = ctx.select(|n| n.trust().is_protected());
    let mut affected = Vec::new();
    for src in ctx.nodes_of_type(NodeType::Internet) {
        let reachable = reachable_set(ctx, &src.id);
        affected.extend(
            protected
                .iter()
                .filter(|n| reachable.contains(n.id.as_str()))
                .map(|n| n.id.as_str()),
        );
    }
    Ok(RuleHit::nodes(affected))
}
