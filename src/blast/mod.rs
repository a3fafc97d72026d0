//! Blast Radius Simulator
//!
//! From one compromised component, how far can an attacker spread and how
//! likely are they to be seen on the way? Spread follows edges that pass the
//! [`evaluate_edge`] checks, plus whatever the source's IAM privilege lets it
//! take over directly.

pub mod edge_model;
pub mod privilege;
pub mod simulate;

pub use edge_model::{
    can_possess_credential, evaluate_edge, BlockReason, EdgeVerdict, SimulationConfig,
};
pub use privilege::{can_escalate, can_take_over, escalation_targets, is_high_impact};
pub use simulate::{run_blast, BlastResult, BlastSummary};
