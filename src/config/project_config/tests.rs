use super::*;
use crate::graph::NodeType;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_normalize_rule_id() {
    assert_eq!(normalize_rule_id("T-001"), "T-001");
    assert_eq!(normalize_rule_id(" t_001 "), "T-001");
    assert_eq!(normalize_rule_id("hc-002"), "HC-002");
}

#[test]
fn test_default_config() {
    let config = ProjectConfig::default();

    // All rules enabled by default
    assert!(config.is_rule_enabled("T-001"));
    assert!(config.is_rule_enabled("unknown-rule"));
    assert_eq!(config.severity_override("T-001"), None);
    assert_eq!(config.analysis.small_model_node_limit, 5);
    assert_eq!(config.rule_settings(), RuleSettings::default());
    assert_eq!(config.simulation, SimulationConfig::default());
    assert!(config.disabled_rules().is_empty());
}

#[test]
fn test_parse_toml_overrides() {
    let content = r#"
[rules.T-009]
enabled = false

[rules.r_003]
severity = "Critical"

[rules.T-004]
severity = "catastrophic"

[simulation]
default_edge_detection = 0.1
detector_probabilities = { siem = 0.9 }

[analysis]
small_model_node_limit = 3
install_packs = ["healthcare"]
"#;
    let config: ProjectConfig = toml::from_str(content).unwrap();

    assert!(!config.is_rule_enabled("T-009"));
    assert!(!config.is_rule_enabled("t-009"));
    assert!(config.is_rule_enabled("T-010"));
    assert_eq!(config.severity_override("R-003"), Some(Severity::Critical));
    // unparseable severity is ignored
    assert_eq!(config.severity_override("T-004"), None);
    assert_eq!(config.disabled_rules(), vec!["T-009".to_string()]);

    assert_eq!(config.simulation.default_edge_detection, 0.1);
    assert_eq!(config.simulation.detector_probability(NodeType::Siem), 0.9);
    // the table replaces the defaults
    assert_eq!(config.simulation.detector_probability(NodeType::Waf), 0.0);
    assert_eq!(config.simulation.max_detection, 0.99);

    assert_eq!(config.rule_settings().small_model_node_limit, 3);
    assert_eq!(config.analysis.install_packs, vec!["healthcare".to_string()]);
}

#[test]
fn test_load_prefers_toml_and_resolves_pack_paths() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("threatcanvas.toml"),
        "[analysis]\nrule_pack_files = [\"packs/team.json\"]\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("threatcanvas.json"),
        r#"{"analysis": {"small_model_node_limit": 9}}"#,
    )
    .unwrap();

    let config = ProjectConfig::load(dir.path());
    assert_eq!(config.analysis.small_model_node_limit, 5);
    assert_eq!(
        config.rule_pack_paths(),
        vec![dir.path().join("packs/team.json")]
    );
    assert_eq!(config.root(), Some(dir.path()));
}

#[test]
fn test_load_json_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("threatcanvas.json"),
        r#"{"rules": {"T-006": {"enabled": false}}, "analysis": {"small_model_node_limit": 9}}"#,
    )
    .unwrap();

    let config = ProjectConfig::load(dir.path());
    assert!(!config.is_rule_enabled("T-006"));
    assert_eq!(config.analysis.small_model_node_limit, 9);
}

#[test]
fn test_broken_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("threatcanvas.toml"), "[rules\nnot toml").unwrap();

    let config = ProjectConfig::load(dir.path());
    assert!(config.rules.is_empty());

    let err = ProjectConfig::load_strict(&dir.path().join("threatcanvas.toml")).unwrap_err();
    assert!(matches!(err, AnalysisError::Config { .. }));
}

#[test]
fn test_missing_dir_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ProjectConfig::load(&dir.path().join("nope"));
    assert_eq!(config.analysis, AnalysisConfig::default());

    let err = ProjectConfig::load_strict(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, AnalysisError::Config { .. }));
}
