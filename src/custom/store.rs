//! Custom rule store and rule-pack interchange
//!
//! Rules are kept in insertion order. A pack document looks like
//!
//! ```json
//! {"formatVersion": "1.0", "packName": "team-rules", "exportedAt": "...", "rules": [...]}
//! ```
//!
//! and each rule carries the same metadata keys as a built-in rule plus
//! `enabled`, `pack` and a declarative `condition`.

use anyhow::Result as AnyResult;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::condition::RuleCondition;
use super::packs;
use crate::error::{AnalysisError, Result};
use crate::graph::AnalysisContext;
use crate::models::{RuleMeta, ThreatSource};
use crate::rules::{Rule, RuleHit};

pub const FORMAT_VERSION: &str = "1.0";

fn default_enabled() -> bool {
    true
}

/// A user-defined rule: metadata plus a declarative condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRule {
    #[serde(flatten)]
    pub meta: RuleMeta,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub pack: String,
    pub condition: RuleCondition,
}

impl CustomRule {
    pub fn new(meta: RuleMeta, condition: impl Into<RuleCondition>) -> Self {
        Self {
            meta,
            enabled: true,
            pack: String::new(),
            condition: condition.into(),
        }
    }

    pub fn with_pack(mut self, pack: &str) -> Self {
        self.pack = pack.to_string();
        self
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }
}

impl Rule for CustomRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn check(&self, ctx: &AnalysisContext<'_>) -> AnyResult<Option<RuleHit>> {
        Ok(self.condition.evaluate(ctx))
    }

    fn source(&self) -> ThreatSource {
        ThreatSource::Custom
    }
}

/// Exported rule pack document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePack {
    pub format_version: String,
    pub pack_name: String,
    pub exported_at: String,
    pub rules: Vec<CustomRule>,
}

impl RulePack {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// How imported rules combine with the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Replace a rule with the same id, otherwise append.
    #[default]
    Merge,
    /// Always append.
    Append,
}

/// Outcome of [`CustomRuleStore::import_pack`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub pack_name: Option<String>,
    pub imported: Vec<String>,
    pub skipped: usize,
}

impl ImportReport {
    pub fn count(&self) -> usize {
        self.imported.len()
    }
}

fn generate_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("C-{}", &hex[..8])
}

/// Ordered collection of custom rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomRuleStore {
    rules: Vec<CustomRule>,
}

impl CustomRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, assigning an id if it has none and the `custom` pack if
    /// it names none. Returns the stored rule's id.
    pub fn add(&mut self, mut rule: CustomRule) -> String {
        if rule.meta.id.is_empty() {
            rule.meta.id = generate_id();
        }
        if rule.pack.is_empty() {
            rule.pack = "custom".to_string();
        }
        let id = rule.meta.id.clone();
        debug!("Added custom rule {}", id);
        self.rules.push(rule);
        id
    }

    /// Patch a rule in place. The id cannot be changed through a patch.
    pub fn update<F>(&mut self, id: &str, patch: F) -> Option<&CustomRule>
    where
        F: FnOnce(&mut CustomRule),
    {
        let rule = self.rules.iter_mut().find(|r| r.meta.id == id)?;
        patch(&mut *rule);
        rule.meta.id = id.to_string();
        Some(rule)
    }

    /// Remove every rule with this id. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.meta.id != id);
        self.rules.len() != before
    }

    /// Flip `enabled`. Returns the new state.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let rule = self.rules.iter_mut().find(|r| r.meta.id == id)?;
        rule.enabled = !rule.enabled;
        Some(rule.enabled)
    }

    pub fn get(&self, id: &str) -> Option<&CustomRule> {
        self.rules.iter().find(|r| r.meta.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomRule> {
        self.rules.iter()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &CustomRule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Snapshot of the store as a pack, optionally limited to one pack name.
    pub fn export_pack(&self, pack: Option<&str>) -> RulePack {
        let rules = self
            .rules
            .iter()
            .filter(|r| pack.map_or(true, |name| r.pack == name))
            .cloned()
            .collect();
        RulePack {
            format_version: FORMAT_VERSION.to_string(),
            pack_name: pack.unwrap_or("all-rules").to_string(),
            exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            rules,
        }
    }

    /// Import a pack document.
    ///
    /// The document must carry a `rules` array. Entries missing a name, a
    /// stride letter or a condition, or that fail to deserialize, are
    /// skipped with a warning.
    pub fn import_pack(&mut self, json: &str, mode: ImportMode) -> Result<ImportReport> {
        let doc: Value = serde_json::from_str(json)?;
        let entries = doc
            .get("rules")
            .and_then(Value::as_array)
            .ok_or_else(|| AnalysisError::InvalidRulePack("missing `rules` array".into()))?;
        let pack_name = doc
            .get("packName")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let mut report = ImportReport {
            pack_name: pack_name.clone(),
            ..Default::default()
        };

        for entry in entries {
            let label = entry.get("name").and_then(Value::as_str).unwrap_or("unnamed");
            if !has_required_fields(entry) {
                warn!("Skipping invalid rule: {}", label);
                report.skipped += 1;
                continue;
            }
            let mut rule: CustomRule = match serde_json::from_value(entry.clone()) {
                Ok(rule) => rule,
                Err(e) => {
                    warn!("Skipping invalid rule {}: {}", label, e);
                    report.skipped += 1;
                    continue;
                }
            };
            if rule.meta.id.is_empty() {
                rule.meta.id = generate_id();
            }
            if rule.pack.is_empty() {
                rule.pack = pack_name.clone().unwrap_or_else(|| "imported".to_string());
            }

            let id = rule.meta.id.clone();
            match mode {
                ImportMode::Merge => match self.rules.iter_mut().find(|r| r.meta.id == id) {
                    Some(existing) => *existing = rule,
                    None => self.rules.push(rule),
                },
                ImportMode::Append => self.rules.push(rule),
            }
            report.imported.push(id);
        }

        info!(
            "Imported {} custom rules ({} skipped) from pack {}",
            report.count(),
            report.skipped,
            pack_name.as_deref().unwrap_or("<unnamed>")
        );
        Ok(report)
    }

    /// Install a prebuilt pack. Rules whose id is already present are left
    /// alone. Returns the number added.
    pub fn install_pack(&mut self, name: &str) -> Result<usize> {
        let pack =
            packs::prebuilt(name).ok_or_else(|| AnalysisError::UnknownRulePack(name.into()))?;
        let mut added = 0;
        for mut rule in pack.rules {
            if self.get(rule.id()).is_some() {
                continue;
            }
            rule.enabled = true;
            self.rules.push(rule);
            added += 1;
        }
        info!("Installed rule pack {} ({} new rules)", pack.name, added);
        Ok(added)
    }

    /// Remove every rule a prebuilt pack defines. Returns the number removed.
    pub fn uninstall_pack(&mut self, name: &str) -> Result<usize> {
        let pack =
            packs::prebuilt(name).ok_or_else(|| AnalysisError::UnknownRulePack(name.into()))?;
        let before = self.rules.len();
        self.rules
            .retain(|r| !pack.rules.iter().any(|p| p.meta.id == r.meta.id));
        Ok(before - self.rules.len())
    }
}

fn has_required_fields(entry: &Value) -> bool {
    let non_empty = |key: &str| match entry.get(key) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };
    non_empty("name") && non_empty("stride") && non_empty("condition")
}
