//! Project-level configuration support
//!
//! Loads per-project configuration from `threatcanvas.toml`,
//! `.threatcanvas.toml` or `threatcanvas.json` next to the model.
//!
//! # Configuration Format
//!
//! ```toml
//! # threatcanvas.toml
//!
//! [rules.T-009]
//! enabled = false
//!
//! [rules.R-003]
//! severity = "critical"  # Override default severity
//!
//! [simulation]
//! default_edge_detection = 0.1
//! detector_probabilities = { siem = 0.9, waf = 0.6 }
//!
//! [analysis]
//! small_model_node_limit = 3
//! install_packs = ["healthcare"]
//! rule_pack_files = ["packs/team-rules.json"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::blast::SimulationConfig;
use crate::error::{AnalysisError, Result};
use crate::models::Severity;
use crate::rules::RuleSettings;

/// Config file names, in lookup order
pub const CONFIG_FILE_NAMES: &[&str] =
    &["threatcanvas.toml", ".threatcanvas.toml", "threatcanvas.json"];

/// Project-level configuration loaded from threatcanvas.toml or similar
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProjectConfig {
    /// Per-rule overrides, keyed by rule id
    #[serde(default)]
    pub rules: HashMap<String, RuleOverride>,

    /// Blast simulator tunables. A `detector_probabilities` table replaces
    /// the default one wholesale.
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Directory the config was loaded from (not serialized)
    #[serde(skip)]
    root: Option<PathBuf>,
}

/// Configuration override for a specific rule
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RuleOverride {
    /// Whether the rule is enabled (default: true)
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Override the default severity (critical, high, medium, low)
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Models with this many nodes or fewer skip T-009 and T-012 (default: 5)
    #[serde(default = "default_small_model_node_limit")]
    pub small_model_node_limit: usize,

    /// Prebuilt rule packs to install into every analyzer
    #[serde(default)]
    pub install_packs: Vec<String>,

    /// JSON rule packs to import, relative to the config directory
    #[serde(default)]
    pub rule_pack_files: Vec<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            small_model_node_limit: default_small_model_node_limit(),
            install_packs: Vec::new(),
            rule_pack_files: Vec::new(),
        }
    }
}

fn default_small_model_node_limit() -> usize {
    5
}

/// Canonical form of a rule id for override lookup: `t_001` and ` T-001 `
/// both become `T-001`.
pub fn normalize_rule_id(id: &str) -> String {
    id.trim().replace('_', "-").to_ascii_uppercase()
}

/// Load project configuration from `dir`.
///
/// Searches [`CONFIG_FILE_NAMES`] in order. A file that fails to parse is
/// skipped with a warning. Returns defaults if nothing usable is found.
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match ProjectConfig::load_strict(&path) {
            Ok(config) => {
                debug!("Loaded project config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("{}; falling back to defaults", e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default().with_root(dir)
}

fn parse_config(path: &Path, content: &str) -> std::result::Result<ProjectConfig, String> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(content).map_err(|e| e.to_string())
    } else {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

impl ProjectConfig {
    /// Lenient load from a directory; see [`load_project_config`].
    pub fn load(dir: &Path) -> Self {
        load_project_config(dir)
    }

    /// Load one specific file, TOML unless it ends in `.json`.
    pub fn load_strict(path: &Path) -> Result<Self> {
        let config_error = |message: String| AnalysisError::Config {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config = parse_config(path, &content).map_err(config_error)?;

        let root = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.with_root(root))
    }

    fn with_root(mut self, root: &Path) -> Self {
        self.root = Some(root.to_path_buf());
        self
    }

    fn rule_override(&self, id: &str) -> Option<&RuleOverride> {
        self.rules
            .get(id)
            .or_else(|| self.rules.get(&normalize_rule_id(id)))
            .or_else(|| {
                let wanted = normalize_rule_id(id);
                self.rules
                    .iter()
                    .find(|(key, _)| normalize_rule_id(key) == wanted)
                    .map(|(_, o)| o)
            })
    }

    /// Check if a rule is enabled (defaults to true if not specified)
    pub fn is_rule_enabled(&self, id: &str) -> bool {
        self.rule_override(id)
            .and_then(|o| o.enabled)
            .unwrap_or(true)
    }

    /// Severity override for a rule, if one is set and parses.
    pub fn severity_override(&self, id: &str) -> Option<Severity> {
        let raw = self.rule_override(id)?.severity.as_deref()?;
        match raw.parse::<Severity>() {
            Ok(severity) => Some(severity),
            Err(e) => {
                warn!("Ignoring severity override for {}: {}", id, e);
                None
            }
        }
    }

    /// All rule ids explicitly switched off
    pub fn disabled_rules(&self) -> Vec<String> {
        let mut disabled: Vec<String> = self
            .rules
            .iter()
            .filter(|(_, o)| o.enabled == Some(false))
            .map(|(id, _)| normalize_rule_id(id))
            .collect();
        disabled.sort();
        disabled
    }

    pub fn rule_settings(&self) -> RuleSettings {
        RuleSettings {
            small_model_node_limit: self.analysis.small_model_node_limit,
        }
    }

    /// Rule pack files resolved against the config directory.
    pub fn rule_pack_paths(&self) -> Vec<PathBuf> {
        self.analysis
            .rule_pack_files
            .iter()
            .map(|p| match &self.root {
                Some(root) if p.is_relative() => root.join(p),
                _ => p.clone(),
            })
            .collect()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }
}

#[cfg(test)]
mod tests;
