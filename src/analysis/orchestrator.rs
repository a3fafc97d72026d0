//! Analysis orchestrator
//!
//! One pass:
//! 1. Refuse an empty model
//! 2. Normalize defaults
//! 3. Build the analysis context
//! 4. Built-in rules, then enabled custom rules
//! 5. Attack paths, boundary scan, path rules
//! 6. Merge into one threat list and upsert countermeasure records

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use super::assessment::Assessment;
use super::countermeasures::{Countermeasure, CountermeasureRegister};
use crate::attack_paths::{
    detect_attack_paths, evaluate_path_rules, scan_boundaries, AttackPath, BoundaryFinding,
};
use crate::blast::{run_blast, BlastResult};
use crate::config::ProjectConfig;
use crate::custom::{CustomRuleStore, ImportMode};
use crate::error::{AnalysisError, Result};
use crate::graph::{normalize, AnalysisContext, DiagramModel};
use crate::models::{StrideCounts, Threat, ThreatSource, ThreatsSummary};
use crate::rules::{run_single_rule, Rule, RuleEngine, RuleResult, RuleRunSummary};

/// Display counters for one pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub stride: StrideCounts,
    pub severity: ThreatsSummary,
    pub total_threats: usize,
    pub attack_paths: usize,
    pub boundary_violations: usize,
    pub path_rule_findings: usize,
    pub rules: RuleRunSummary,
    /// Ids of rules that errored or panicked this pass
    pub failed_rules: Vec<String>,
}

/// Everything one analysis pass produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub threats: Vec<Threat>,
    pub attack_paths: Vec<AttackPath>,
    pub boundary_findings: Vec<BoundaryFinding>,
    pub summary: AnalysisSummary,
}

impl AnalysisResult {
    pub fn threat(&self, id: &str) -> Option<&Threat> {
        self.threats.iter().find(|t| t.id == id)
    }

    pub fn threat_ids(&self) -> Vec<&str> {
        self.threats.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs analysis passes and keeps the state that survives between them:
/// custom rules and the countermeasure register.
pub struct Analyzer {
    engine: RuleEngine,
    custom: CustomRuleStore,
    register: CountermeasureRegister,
    config: ProjectConfig,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::with_config(ProjectConfig::default())
    }

    /// Analyzer for the project rooted at `dir`, configured from its
    /// `threatcanvas.toml` if there is one.
    pub fn for_project(dir: &Path) -> Self {
        Self::with_config(ProjectConfig::load(dir))
    }

    /// Built-in rules minus the ones the config disables, plus every
    /// configured pack. A pack that fails to install or import is skipped
    /// with a warning.
    pub fn with_config(config: ProjectConfig) -> Self {
        let mut engine = RuleEngine::builtin(config.rule_settings());
        engine.retain(|rule| config.is_rule_enabled(rule.id()));

        let mut custom = CustomRuleStore::new();
        for pack in &config.analysis.install_packs {
            match custom.install_pack(pack) {
                Ok(added) => debug!("Installed pack {} ({} rules)", pack, added),
                Err(e) => warn!("Skipping pack {}: {}", pack, e),
            }
        }
        for path in config.rule_pack_paths() {
            let imported = std::fs::read_to_string(&path)
                .map_err(AnalysisError::from)
                .and_then(|json| custom.import_pack(&json, ImportMode::Merge));
            match imported {
                Ok(report) => debug!(
                    "Imported {} rules from {}",
                    report.count(),
                    path.display()
                ),
                Err(e) => warn!("Skipping rule pack {}: {}", path.display(), e),
            }
        }

        Self {
            engine,
            custom,
            register: CountermeasureRegister::new(),
            config,
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn custom_rules(&self) -> &CustomRuleStore {
        &self.custom
    }

    pub fn custom_rules_mut(&mut self) -> &mut CustomRuleStore {
        &mut self.custom
    }

    pub fn countermeasures(&self) -> &CountermeasureRegister {
        &self.register
    }

    pub fn countermeasures_mut(&mut self) -> &mut CountermeasureRegister {
        &mut self.register
    }

    /// The persisted countermeasure record for a threat id.
    pub fn countermeasure(&self, id: &str) -> Option<&Countermeasure> {
        self.register.get(id)
    }

    /// Run one full analysis pass over `model`.
    ///
    /// The model is normalized in place; nothing else about it changes.
    /// Fails only when the model has no nodes.
    pub fn run(&mut self, model: &mut DiagramModel) -> Result<AnalysisResult> {
        if model.is_empty() {
            return Err(AnalysisError::EmptyModel);
        }
        normalize(model);
        let ctx = AnalysisContext::build(&model.nodes, &model.edges);

        let (builtin_results, mut rule_summary) = self.engine.run(&ctx);
        let mut threats: Vec<Threat> = Vec::new();
        let mut seen: IndexSet<String> = IndexSet::new();
        let mut failed_rules: Vec<String> = Vec::new();

        for result in &builtin_results {
            if let Some(rule) = self.engine.get(&result.rule_id) {
                self.collect(rule.as_ref(), result, &ctx, &mut threats, &mut seen);
            }
            if !result.success {
                failed_rules.push(result.rule_id.clone());
            }
        }

        let mut custom_summary = RuleRunSummary::default();
        for rule in self.custom.enabled() {
            if !self.config.is_rule_enabled(rule.id()) {
                continue;
            }
            let result = run_single_rule(rule, &ctx);
            custom_summary.add_result(&result);
            if !result.success {
                failed_rules.push(result.rule_id.clone());
            }
            self.collect(rule, &result, &ctx, &mut threats, &mut seen);
        }
        rule_summary.merge(&custom_summary);

        let attack_paths = detect_attack_paths(&ctx);
        let boundary_findings = scan_boundaries(&ctx);
        let path_rule_threats = evaluate_path_rules(&ctx);
        let path_rule_count = path_rule_threats.len();

        let derived = boundary_findings
            .iter()
            .map(|f| f.to_threat(&ctx))
            .chain(path_rule_threats);
        for threat in derived {
            if seen.insert(threat.id.clone()) {
                threats.push(threat);
            }
        }

        let mut created = 0usize;
        for threat in &threats {
            if self.register.upsert_default(&threat.id) {
                created += 1;
            }
        }

        let summary = AnalysisSummary {
            stride: StrideCounts::from_threats(&threats),
            severity: ThreatsSummary::from_threats(&threats),
            total_threats: threats.len(),
            attack_paths: attack_paths.len(),
            boundary_violations: boundary_findings.len(),
            path_rule_findings: path_rule_count,
            rules: rule_summary,
            failed_rules,
        };

        info!(
            "Analysis complete: {} threats ({} critical, {} high), {} attack paths, {} boundary violations, {} new countermeasure records",
            summary.total_threats,
            summary.severity.critical,
            summary.severity.high,
            summary.attack_paths,
            summary.boundary_violations,
            created
        );

        Ok(AnalysisResult {
            threats,
            attack_paths,
            boundary_findings,
            summary,
        })
    }

    /// Turn a fired rule into a threat, honoring severity overrides. The
    /// first threat for an id wins.
    fn collect(
        &self,
        rule: &dyn Rule,
        result: &RuleResult,
        ctx: &AnalysisContext<'_>,
        threats: &mut Vec<Threat>,
        seen: &mut IndexSet<String>,
    ) {
        let Some(hit) = &result.hit else {
            return;
        };
        if !seen.insert(result.rule_id.clone()) {
            debug!("Rule {} already reported this pass", result.rule_id);
            return;
        }
        let mut threat =
            Threat::from_rule(rule.meta(), hit.affected.clone(), ctx.nodes(), result.source);
        if let Some(severity) = self.config.severity_override(&threat.id) {
            threat.severity = severity;
        }
        threats.push(threat);
    }

    /// Simulate compromise of `source_id` with the configured detection
    /// model. Normalizes the model first, like [`Analyzer::run`].
    pub fn blast(&self, model: &mut DiagramModel, source_id: &str) -> Result<BlastResult> {
        normalize(model);
        let ctx = AnalysisContext::build(&model.nodes, &model.edges);
        run_blast(&ctx, source_id, &self.config.simulation)
    }

    /// Maturity assessment of `result` against the current register.
    pub fn assess(&self, result: &AnalysisResult, model: &DiagramModel) -> Assessment {
        Assessment::from_result(result, &model.nodes, &self.register, &self.config.simulation)
    }

    /// Threat ids in `result` that came from custom rules.
    pub fn custom_threat_ids<'r>(&self, result: &'r AnalysisResult) -> Vec<&'r str> {
        result
            .threats
            .iter()
            .filter(|t| t.source == ThreatSource::Custom)
            .map(|t| t.id.as_str())
            .collect()
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("builtin_rules", &self.engine.len())
            .field("custom_rules", &self.custom.len())
            .field("countermeasures", &self.register.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::countermeasures::{MitigationStatus, Response};
    use crate::custom::{Condition, CustomRule};
    use crate::graph::{AuthMethod, Edge, Node, NodeType};
    use crate::models::{RuleMeta, Severity, Stride};

    fn scenario() -> DiagramModel {
        let mut model = DiagramModel::new();
        model
            .add_node(Node::bare("u1", NodeType::User))
            .add_node(Node::bare("a1", NodeType::Api))
            .add_node(Node::bare("d1", NodeType::Database))
            .add_edge(Edge::new("e1", "u1", "a1").with_auth(AuthMethod::None))
            .add_edge(Edge::new("e2", "a1", "d1").with_auth(AuthMethod::None));
        model
    }

    #[test]
    fn test_empty_model_is_refused() {
        let mut analyzer = Analyzer::new();
        let err = analyzer.run(&mut DiagramModel::new()).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyModel));
    }

    #[test]
    fn test_threat_ids_are_unique() {
        let mut analyzer = Analyzer::new();
        let result = analyzer.run(&mut scenario()).unwrap();
        let ids: IndexSet<&str> = result.threats.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), result.threats.len());
        assert_eq!(result.summary.total_threats, result.threats.len());
        assert!(result.threat("T-002").is_some());
        assert!(result.threat("BV-e1").is_some());
    }

    #[test]
    fn test_countermeasures_survive_reanalysis() {
        let mut analyzer = Analyzer::new();
        let mut model = scenario();
        analyzer.run(&mut model).unwrap();
        assert_eq!(
            analyzer.countermeasure("T-002"),
            Some(&Countermeasure::default())
        );

        analyzer.countermeasures_mut().set(
            "T-002",
            Countermeasure::new(Response::Accept, MitigationStatus::Mitigated),
        );
        analyzer.run(&mut model).unwrap();
        assert_eq!(
            analyzer.countermeasure("T-002").map(|c| c.status),
            Some(MitigationStatus::Mitigated)
        );
    }

    #[test]
    fn test_config_disables_and_overrides() {
        let config: ProjectConfig = toml::from_str(
            "[rules.T-002]\nenabled = false\n\n[rules.T-003]\nseverity = \"low\"\n",
        )
        .unwrap();
        let mut analyzer = Analyzer::with_config(config);
        assert!(analyzer.engine().get("T-002").is_none());

        let result = analyzer.run(&mut scenario()).unwrap();
        assert!(result.threat("T-002").is_none());
        assert_eq!(result.threat("T-003").map(|t| t.severity), Some(Severity::Low));
    }

    #[test]
    fn test_custom_rules_run_after_builtins() {
        let mut analyzer = Analyzer::new();
        let rule = CustomRule::new(
            RuleMeta::new("", "No SIEM", Stride::Repudiation, Severity::Medium),
            Condition::MissingComponent {
                node_type: NodeType::Siem,
            },
        );
        let id = analyzer.custom_rules_mut().add(rule);

        let result = analyzer.run(&mut scenario()).unwrap();
        let custom = analyzer.custom_threat_ids(&result);
        assert_eq!(custom, vec![id.as_str()]);

        let first_custom = result.threats.iter().position(|t| t.id == id).unwrap();
        assert!(result.threats[..first_custom]
            .iter()
            .all(|t| t.source == ThreatSource::Builtin));
    }

    #[test]
    fn test_installed_pack_from_config() {
        let config: ProjectConfig =
            toml::from_str("[analysis]\ninstall_packs = [\"zero-trust\", \"bogus\"]\n").unwrap();
        let analyzer = Analyzer::with_config(config);
        assert_eq!(analyzer.custom_rules().len(), 3);
    }

    #[test]
    fn test_blast_uses_normalized_model() {
        let analyzer = Analyzer::new();
        let mut model = scenario();
        let blast = analyzer.blast(&mut model, "u1").unwrap();
        assert_eq!(blast.hop("d1"), Some(2));
        assert!(analyzer.blast(&mut model, "zz").is_err());
    }
}
