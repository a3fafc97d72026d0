//! Confidentiality rules: encryption and classification of data in flight

use anyhow::Result;

use super::base::{BuiltinRule, RuleHit, RuleSettings};
use crate::graph::{AnalysisContext, DataClass, Edge, NodeType};
use crate::models::{Rating, RuleMeta, Severity, Stride};

fn disclosure(id: &str, name: &str, severity: Severity) -> RuleMeta {
    RuleMeta::new(id, name, Stride::InformationDisclosure, severity).with_control("Confidentiality")
}

/// Both endpoints of every matching edge, target first.
fn edge_endpoints<'a, F>(ctx: &AnalysisContext<'a>, matches: F) -> Vec<&'a str>
where
    F: Fn(&Edge) -> bool,
{
    ctx.edges()
        .filter(|e| matches(e))
        .flat_map(|e| [e.to.as_str(), e.from.as_str()])
        .collect()
}

pub(super) fn unencrypted_database() -> BuiltinRule {
    let meta = disclosure("T-003", "Unencrypted Database Connection", Severity::High)
        .with_rating(Rating::Medium, Rating::High)
        .with_description(
            "Database connections transmit plaintext, exposing credentials and sensitive \
             records to eavesdropping.",
        )
        .with_remediation(&[
            "Enable TLS/SSL for all DB connections",
            "Use mTLS for service-to-DB authentication",
            "Encrypt data at rest and in transit",
        ]);
    BuiltinRule::new(meta, check_unencrypted_database)
}

fn check_unencrypted_database(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let affected = ctx
        .nodes_of_type(NodeType::Database)
        .filter(|db| ctx.incoming(&db.id).any(|e| e.is_unencrypted()))
        .map(|db| db.id.as_str());
    Ok(RuleHit::nodes(affected))
}

pub(super) fn regulated_plaintext() -> BuiltinRule {
    let meta = disclosure("T-004", "PII / Sensitive Data over Plaintext", Severity::Critical)
        .with_rating(Rating::High, Rating::High)
        .with_description(
            "PII, PHI, or PCI data transmitted without encryption. Violates GDPR, HIPAA, \
             PCI-DSS requirements.",
        )
        .with_remediation(&[
            "Enforce TLS 1.2+ on all sensitive flows",
            "Implement data masking at API layer",
            "Classify and audit all data flows",
        ]);
    BuiltinRule::new(meta, check_regulated_plaintext)
}

fn check_regulated_plaintext(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let affected = ctx
        .edges()
        .filter(|e| e.data_class().is_regulated() && e.is_unencrypted())
        .map(|e| e.to.as_str());
    Ok(RuleHit::nodes(affected))
}

pub(super) fn unauthenticated_cache() -> BuiltinRule {
    let meta = disclosure("T-007", "Unauthenticated Cache Access", Severity::High)
        .with_rating(Rating::Medium, Rating::High)
        .with_description(
            "Cache accessible without authentication leaks session data, tokens, or sensitive \
             cached responses.",
        )
        .with_remediation(&[
            "Enable Redis AUTH / Memcached SASL",
            "Restrict to localhost/private network only",
            "Encrypt sensitive values before caching",
        ]);
    BuiltinRule::new(meta, check_unauthenticated_cache)
}

fn check_unauthenticated_cache(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let affected = ctx.edges().filter_map(|e| {
        let target = ctx.node(&e.to)?;
        (target.node_type == NodeType::Cache && e.is_unauthenticated())
            .then_some(target.id.as_str())
    });
    Ok(RuleHit::nodes(affected))
}

pub(super) fn sensitive_to_low_trust() -> BuiltinRule {
    let meta = disclosure("T-014", "Sensitive Data Flows to Low-Trust Node", Severity::Critical)
        .with_rating(Rating::High, Rating::High)
        .with_description(
            "Sensitive or regulated data (PII/PHI/PCI/Confidential) is being sent directly to \
             an untrusted or hostile node. This is an unconditional data exposure.",
        )
        .with_remediation(&[
            "Never transmit classified data to untrusted endpoints",
            "Enforce data classification policies at API layer",
            "Add DLP controls and egress filtering",
        ]);
    BuiltinRule::new(meta, check_sensitive_to_low_trust)
}

fn check_sensitive_to_low_trust(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let affected = ctx.edges().filter_map(|e| {
        let target = ctx.node(&e.to)?;
        let class = e.data_class();
        let classified = class.is_regulated()
            || matches!(class, DataClass::Confidential | DataClass::Restricted);
        (classified && target.trust().is_untrusted()).then_some(target.id.as_str())
    });
    Ok(RuleHit::nodes(affected))
}

pub(super) fn unclassified_datastore_flow() -> BuiltinRule {
    let meta = disclosure("T-018", "Missing Data Classification on Data Store", Severity::Medium)
        .with_rating(Rating::Medium, Rating::High)
        .with_description(
            "A compute node connects to a data store, but the data flow has no sensitivity \
             classification. If this data store holds PII, financial data, or health records, \
             this connection needs encryption and access controls. Set the data \
             classification on this edge to get more targeted threat analysis.",
        )
        .with_remediation(&[
            "Classify the data flowing on this edge (PII, Internal, Confidential)",
            "Enable TLS/encryption on all data store connections",
            "Implement least-privilege database access controls",
            "In threat modeling, data classification drives your security decisions; start here",
        ]);
    BuiltinRule::new(meta, check_unclassified_datastore_flow)
}

/// Unset and "Public" both count as unclassified.
fn check_unclassified_datastore_flow(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let affected = ctx.edges().filter_map(|e| {
        let src = ctx.node(&e.from)?;
        let dst = ctx.node(&e.to)?;
        let store_link = src.node_type.is_compute() && dst.node_type.is_datastore();
        (store_link && e.data_class() == DataClass::Public).then_some(dst.id.as_str())
    });
    Ok(RuleHit::nodes(affected))
}

pub(super) fn database_exposure() -> BuiltinRule {
    let meta = disclosure(
        "R-002",
        "Sensitive Data Exposure - Unencrypted Database",
        Severity::Critical,
    )
    .with_rating(Rating::High, Rating::High)
    .with_owasp("A02:2021 Cryptographic Failures")
    .with_description(
        "Database lacks encryption at rest or receives unencrypted connections. Sensitive \
         records, credentials, and PII are exposed to anyone with physical or logical access \
         to storage. Maps to OWASP A02:2021.",
    )
    .with_remediation(&[
        "Enable transparent data encryption (TDE) at the database engine level",
        "Encrypt all DB connection strings with TLS 1.2+",
        "Use column-level encryption for PII/PCI/PHI fields",
        "Rotate encryption keys on a regular schedule",
    ]);
    BuiltinRule::new(meta, check_database_exposure)
}

fn check_database_exposure(ctx: &AnalysisContext<'_>, _: &RuleSettings) -> Result<Option<RuleHit>> {
    let affected = ctx
        .nodes_of_type(NodeType::Database)
        .filter(|db| {
            db.props.encryption == Some(false) || ctx.incoming(&db.id).any(|e| e.is_unencrypted())
        })
        .map(|db| db.id.as_str());
    Ok(RuleHit::nodes(affected))
}

pub(super) fn man_in_the_middle() -> BuiltinRule {
    let meta = disclosure("R-003", "Man-in-the-Middle Attack", Severity::High)
        .with_rating(Rating::High, Rating::High)
        .with_owasp("A02:2021 Cryptographic Failures")
        .with_description(
            "Data flow uses unencrypted HTTP with no transport security. An attacker \
             positioned on the network can intercept, read, and modify all traffic between \
             these components. Maps to OWASP A02:2021.",
        )
        .with_remediation(&[
            "Upgrade all connections to HTTPS/TLS 1.2+",
            "Enforce HTTP Strict Transport Security (HSTS)",
            "Redirect all HTTP requests to HTTPS at the load balancer",
            "Use TLS 1.3 for maximum forward secrecy",
        ]);
    BuiltinRule::new(meta, check_man_in_the_middle)
}

fn check_man_in_the_middle(ctx: &AnalysisContext<'_>, _: &RuleSettings) -> Result<Option<RuleHit>> {
    let affected = edge_endpoints(ctx, |e| e.protocol_is("HTTP") && e.is_unencrypted());
    Ok(RuleHit::nodes(affected))
}

pub(super) fn plaintext_sensitive_data() -> BuiltinRule {
    let meta = disclosure("R-004", "Plaintext Sensitive Data Exposure", Severity::Critical)
        .with_rating(Rating::High, Rating::High)
        .with_owasp("A02:2021 Cryptographic Failures")
        .with_description(
            "Personally Identifiable Information (PII), secrets, or regulated data is \
             transmitted without encryption. This violates GDPR, HIPAA, and PCI-DSS \
             requirements and exposes individuals to identity theft. Maps to OWASP A02:2021.",
        )
        .with_remediation(&[
            "Enforce TLS 1.2+ on all channels carrying PII/secret data",
            "Implement end-to-end encryption for sensitive payloads",
            "Apply data minimization: transmit only essential fields",
            "Audit all data flows against a data classification register",
        ]);
    BuiltinRule::new(meta, check_plaintext_sensitive_data)
}

fn check_plaintext_sensitive_data(
    ctx: &AnalysisContext<'_>,
    _: &RuleSettings,
) -> Result<Option<RuleHit>> {
    let affected = edge_endpoints(ctx, |e| e.data_class().is_sensitive() && e.is_unencrypted());
    Ok(RuleHit::nodes(affected))
}
