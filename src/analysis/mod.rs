//! Analysis orchestration
//!
//! [`Analyzer`] runs one full pass (built-in rules, custom rules, attack
//! paths, boundary scan, path rules) and keeps the countermeasure register
//! across passes. [`Assessment`] turns a result into a maturity report.

pub mod assessment;
pub mod countermeasures;
pub mod orchestrator;

pub use assessment::{
    stride_narrative, ActionTag, Assessment, MaturityLevel, RecommendedAction, StrideNarrative,
};
pub use countermeasures::{Countermeasure, CountermeasureRegister, MitigationStatus, Response};
pub use orchestrator::{AnalysisResult, AnalysisSummary, Analyzer};
