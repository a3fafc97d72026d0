//! Trust-zone boundary scan
//!
//! Every edge whose endpoints sit in different trust zones must carry both
//! authentication and encryption. A crossing missing both controls while
//! moving up the zone order is critical; any other gap is high.

use serde::{Deserialize, Serialize};

use super::paths::BROKEN_ACCESS_CONTROL;
use crate::graph::{AnalysisContext, Edge, TrustZone};
use crate::models::{Rating, RuleMeta, Severity, Stride, Threat, ThreatSource};

const FINDING_NAME: &str = "Insecure Trust Boundary Crossing";

const REMEDIATION: &[&str] = &[
    "Enforce mTLS at every trust boundary crossing",
    "Require strong authentication (JWT/OAuth2) for cross-zone calls",
    "Deploy an API gateway or service mesh at zone boundaries",
    "Use network micro-segmentation to enforce zone isolation",
];

/// An edge that insecurely crosses trust zones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryFinding {
    pub id: String,
    pub edge_id: String,
    pub source_id: String,
    pub target_id: String,
    pub source_name: String,
    pub target_name: String,
    pub src_zone: TrustZone,
    pub tgt_zone: TrustZone,
    pub severity: Severity,
    pub escalating: bool,
    pub no_auth: bool,
    pub no_enc: bool,
}

impl BoundaryFinding {
    fn missing_controls(&self) -> &'static str {
        match (self.no_auth, self.no_enc) {
            (true, true) => "authentication or encryption",
            (true, false) => "authentication",
            _ => "encryption",
        }
    }

    pub fn description(&self) -> String {
        format!(
            "{} ({}) → {} ({}) crosses a trust boundary without {}. This allows unauthorized \
             access across security zones.",
            self.source_name,
            self.src_zone,
            self.target_name,
            self.tgt_zone,
            self.missing_controls()
        )
    }

    /// Render as an elevation-of-privilege threat touching both endpoints.
    pub fn to_threat(&self, ctx: &AnalysisContext<'_>) -> Threat {
        let meta = RuleMeta::new(
            &self.id,
            FINDING_NAME,
            Stride::ElevationOfPrivilege,
            self.severity,
        )
        .with_rating(Rating::High, Rating::High)
        .with_control("Network Segmentation")
        .with_owasp(BROKEN_ACCESS_CONTROL)
        .with_description(&self.description())
        .with_remediation(REMEDIATION);

        Threat::from_rule(
            &meta,
            vec![self.source_id.clone(), self.target_id.clone()],
            ctx.nodes(),
            ThreatSource::Boundary,
        )
    }
}

/// Scan every admitted edge for insecure zone crossings, in edge order.
pub fn scan_boundaries(ctx: &AnalysisContext<'_>) -> Vec<BoundaryFinding> {
    ctx.edges().filter_map(|edge| inspect(ctx, edge)).collect()
}

fn inspect(ctx: &AnalysisContext<'_>, edge: &Edge) -> Option<BoundaryFinding> {
    let source = ctx.node(&edge.from)?;
    let target = ctx.node(&edge.to)?;
    let src_zone = source.trust_zone();
    let tgt_zone = target.trust_zone();
    if src_zone == tgt_zone {
        return None;
    }

    let no_auth = edge.is_unauthenticated();
    let no_enc = edge.is_unencrypted();
    if !no_auth && !no_enc {
        return None;
    }

    let escalating = src_zone.ordinal() < tgt_zone.ordinal();
    let severity = if no_auth && no_enc && escalating {
        Severity::Critical
    } else {
        Severity::High
    };

    Some(BoundaryFinding {
        id: format!("BV-{}", edge.id),
        edge_id: edge.id.clone(),
        source_id: source.id.clone(),
        target_id: target.id.clone(),
        source_name: source.display_name().to_string(),
        target_name: target.display_name().to_string(),
        src_zone,
        tgt_zone,
        severity,
        escalating,
        no_auth,
        no_enc,
    })
}
