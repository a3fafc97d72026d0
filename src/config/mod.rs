//! Configuration module
//!
//! This module handles:
//! - Project-level configuration (threatcanvas.toml)
//! - Rule enable/severity overrides
//! - Blast simulator tunables
//! - Rule pack installation

mod project_config;

pub use project_config::{
    load_project_config, normalize_rule_id, AnalysisConfig, ProjectConfig, RuleOverride,
    CONFIG_FILE_NAMES,
};
