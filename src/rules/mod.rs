//! Built-in threat rules
//!
//! Every rule is a pure predicate over an [`AnalysisContext`]. The library is
//! grouped by concern:
//!
//! - `exposure`: what external actors can reach (T-001, T-008, T-011, T-016, T-017)
//! - `identity`: authentication gaps (T-002, T-005, T-012, R-001)
//! - `data_protection`: encryption and classification (T-003, T-004, T-007, T-014, T-018, R-002..R-004)
//! - `privilege`: lateral movement and escalation (T-010, T-013, R-005, R-006)
//! - `resilience`: availability and audit (T-006, T-009, T-015)

pub mod base;
mod data_protection;
pub mod engine;
mod exposure;
mod identity;
mod privilege;
mod resilience;

use std::sync::Arc;

pub use base::{BuiltinRule, Rule, RuleHit, RuleResult, RuleRunSummary, RuleSettings};
pub use engine::{run_single_rule, RuleEngine};

use crate::graph::{AnalysisContext, Node};

/// The built-in library in id order: T-001..T-018, then R-001..R-006.
pub fn builtin_rules(settings: RuleSettings) -> Vec<Arc<dyn Rule>> {
    let library = [
        exposure::missing_perimeter(),
        identity::unauthenticated_api(),
        data_protection::unencrypted_database(),
        data_protection::regulated_plaintext(),
        identity::attacker_path(),
        resilience::missing_audit_trail(),
        data_protection::unauthenticated_cache(),
        exposure::public_storage(),
        resilience::single_point_of_failure(),
        privilege::lateral_movement(),
        exposure::plaintext_external_channel(),
        identity::missing_identity_provider(),
        privilege::boundary_traversal(),
        data_protection::sensitive_to_low_trust(),
        resilience::cyclic_dependency(),
        exposure::missing_rate_limiting(),
        exposure::uncontrolled_ingress(),
        data_protection::unclassified_datastore_flow(),
        identity::broken_authentication(),
        data_protection::database_exposure(),
        data_protection::man_in_the_middle(),
        data_protection::plaintext_sensitive_data(),
        privilege::unauthorized_data_access(),
        privilege::escalation_chain(),
    ];
    library
        .into_iter()
        .map(|rule| Arc::new(rule.with_settings(settings)) as Arc<dyn Rule>)
        .collect()
}

/// internet, user and attacker nodes.
fn external_nodes<'a>(ctx: &AnalysisContext<'a>) -> Vec<&'a Node> {
    ctx.select(|n| n.node_type.is_external())
}

/// Nodes whose declared trust is untrusted or hostile.
fn untrusted_nodes<'a>(ctx: &AnalysisContext<'a>) -> Vec<&'a Node> {
    ctx.select(|n| n.trust().is_untrusted())
}
