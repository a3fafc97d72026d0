//! Attack Path & Boundary-Violation Detector
//!
//! Three passes over the same [`AnalysisContext`](crate::graph::AnalysisContext):
//! entry-to-target path enumeration, a per-edge trust-zone scan, and the
//! graph-wide path rules PR-001/PR-002.

pub mod boundary;
pub mod path_rules;
pub mod paths;

pub use boundary::{scan_boundaries, BoundaryFinding};
pub use path_rules::evaluate_path_rules;
pub use paths::{detect_attack_paths, entry_nodes, is_entry, is_high_value, AttackPath};
