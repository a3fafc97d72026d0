//! Base rule trait and types
//!
//! This module defines the core abstractions for threat rules:
//! - `Rule` trait that built-in and custom rules implement
//! - `RuleHit` for the affected-node set of a rule that fired
//! - `RuleResult` / `RuleRunSummary` for capturing execution outcomes

use anyhow::Result;
use indexmap::IndexSet;

use crate::graph::AnalysisContext;
use crate::models::{RuleMeta, ThreatSource};

/// Affected nodes of a rule that fired.
///
/// Graph-level rules ("no SIEM anywhere") fire with an empty set; node-level
/// rules only fire when at least one node is affected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleHit {
    pub affected: Vec<String>,
}

impl RuleHit {
    /// A graph-level finding with no specific node.
    pub fn global() -> Self {
        Self::default()
    }

    /// Deduplicated affected set, first occurrence wins. `None` when empty.
    pub fn nodes<I, S>(ids: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let affected: IndexSet<String> = ids.into_iter().map(Into::into).collect();
        if affected.is_empty() {
            None
        } else {
            Some(Self {
                affected: affected.into_iter().collect(),
            })
        }
    }
}

/// Knobs shared by the built-in rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSettings {
    /// Models with this many nodes or fewer skip the "missing load balancer"
    /// and "missing identity provider" checks.
    pub small_model_node_limit: usize,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            small_model_node_limit: 5,
        }
    }
}

/// Trait for all threat rules
///
/// A rule is a pure predicate over the graph. It returns `Ok(None)` when it
/// does not apply, or the nodes it affects. It must not mutate anything and
/// must not render anything.
///
/// # Example Implementation
///
/// ```ignore
/// struct NoCdn { meta: RuleMeta }
///
/// impl Rule for NoCdn {
///     fn meta(&self) -> &RuleMeta {
///         &self.meta
///     }
///
///     fn check(&self, ctx: &AnalysisContext<'_>) -> Result<Option<RuleHit>> {
///         Ok((!ctx.has_type(NodeType::Cdn)).then(RuleHit::global))
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Metadata the resulting threat inherits
    fn meta(&self) -> &RuleMeta;

    /// Evaluate the rule
    fn check(&self, ctx: &AnalysisContext<'_>) -> Result<Option<RuleHit>>;

    fn id(&self) -> &str {
        &self.meta().id
    }

    /// Where threats from this rule are reported as coming from
    fn source(&self) -> ThreatSource {
        ThreatSource::Builtin
    }
}

type Predicate = fn(&AnalysisContext<'_>, &RuleSettings) -> Result<Option<RuleHit>>;

/// A built-in rule: static metadata plus a predicate function.
pub struct BuiltinRule {
    meta: RuleMeta,
    settings: RuleSettings,
    predicate: Predicate,
}

impl BuiltinRule {
    pub fn new(meta: RuleMeta, predicate: Predicate) -> Self {
        Self {
            meta,
            settings: RuleSettings::default(),
            predicate,
        }
    }

    pub fn with_settings(mut self, settings: RuleSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl Rule for BuiltinRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn check(&self, ctx: &AnalysisContext<'_>) -> Result<Option<RuleHit>> {
        (self.predicate)(ctx, &self.settings)
    }
}

impl std::fmt::Debug for BuiltinRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinRule")
            .field("id", &self.meta.id)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Result from evaluating a single rule
#[derive(Debug, Clone)]
pub struct RuleResult {
    pub rule_id: String,
    pub source: ThreatSource,
    /// `Some` when the rule fired
    pub hit: Option<RuleHit>,
    pub duration_us: u64,
    /// Whether the rule completed without error or panic
    pub success: bool,
    pub error: Option<String>,
}

impl RuleResult {
    pub fn success(
        rule_id: String,
        source: ThreatSource,
        hit: Option<RuleHit>,
        duration_us: u64,
    ) -> Self {
        Self {
            rule_id,
            source,
            hit,
            duration_us,
            success: true,
            error: None,
        }
    }

    pub fn failure(rule_id: String, source: ThreatSource, error: String, duration_us: u64) -> Self {
        Self {
            rule_id,
            source,
            hit: None,
            duration_us,
            success: false,
            error: Some(error),
        }
    }

    pub fn fired(&self) -> bool {
        self.hit.is_some()
    }
}

/// Summary statistics from one rule pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RuleRunSummary {
    pub rules_run: usize,
    pub rules_fired: usize,
    pub rules_failed: usize,
    pub total_duration_us: u64,
}

impl RuleRunSummary {
    pub fn add_result(&mut self, result: &RuleResult) {
        self.rules_run += 1;
        self.total_duration_us += result.duration_us;
        if !result.success {
            self.rules_failed += 1;
        } else if result.fired() {
            self.rules_fired += 1;
        }
    }

    pub fn merge(&mut self, other: &RuleRunSummary) {
        self.rules_run += other.rules_run;
        self.rules_fired += other.rules_fired;
        self.rules_failed += other.rules_failed;
        self.total_duration_us += other.total_duration_us;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_hit_dedupes_in_order() {
        let hit = RuleHit::nodes(["b", "a", "b", "c", "a"]).unwrap();
        assert_eq!(hit.affected, vec!["b", "a", "c"]);
        assert!(RuleHit::nodes(Vec::<String>::new()).is_none());
        assert!(RuleHit::global().affected.is_empty());
    }

    #[test]
    fn test_rule_result_success() {
        let result = RuleResult::success(
            "T-001".to_string(),
            ThreatSource::Builtin,
            RuleHit::nodes(["a"]),
            100,
        );
        assert!(result.success);
        assert!(result.fired());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_rule_result_failure() {
        let result = RuleResult::failure(
            "C-1".to_string(),
            ThreatSource::Custom,
            "oops".to_string(),
            50,
        );
        assert!(!result.success);
        assert!(!result.fired());
        assert_eq!(result.error, Some("oops".to_string()));
    }

    #[test]
    fn test_run_summary() {
        let mut summary = RuleRunSummary::default();
        summary.add_result(&RuleResult::success(
            "A".into(),
            ThreatSource::Builtin,
            Some(RuleHit::global()),
            10,
        ));
        summary.add_result(&RuleResult::success("B".into(), ThreatSource::Builtin, None, 5));
        summary.add_result(&RuleResult::failure(
            "C".into(),
            ThreatSource::Custom,
            "err".into(),
            1,
        ));

        assert_eq!(summary.rules_run, 3);
        assert_eq!(summary.rules_fired, 1);
        assert_eq!(summary.rules_failed, 1);
        assert_eq!(summary.total_duration_us, 16);
    }
}
