//! Rule engine: runs rules against one analysis context
//!
//! Each rule runs on the calling thread, in registration order. A rule that
//! returns an error or panics is logged and recorded as a failure; the pass
//! always continues with the next rule.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::base::{Rule, RuleResult, RuleRunSummary, RuleSettings};
use crate::graph::AnalysisContext;

/// Ordered collection of rules
#[derive(Default)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine pre-loaded with the built-in rule library: T-001..T-018, then
    /// the OWASP-mapped R-001..R-006.
    pub fn builtin(settings: RuleSettings) -> Self {
        let mut engine = Self::new();
        for rule in super::builtin_rules(settings) {
            engine.register(rule);
        }
        engine
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Keep only the rules for which `keep` returns true.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: Fn(&dyn Rule) -> bool,
    {
        self.rules.retain(|r| keep(r.as_ref()));
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule. Results come back in registration order.
    pub fn run(&self, ctx: &AnalysisContext<'_>) -> (Vec<RuleResult>, RuleRunSummary) {
        let mut summary = RuleRunSummary::default();
        let results: Vec<RuleResult> = self
            .rules
            .iter()
            .map(|rule| {
                let result = run_single_rule(rule.as_ref(), ctx);
                summary.add_result(&result);
                result
            })
            .collect();

        info!(
            "Evaluated {} rules: {} fired, {} failed",
            summary.rules_run, summary.rules_fired, summary.rules_failed
        );
        (results, summary)
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.rules.iter().map(|r| r.id()).collect();
        f.debug_struct("RuleEngine").field("rules", &ids).finish()
    }
}

/// Run one rule with error and panic isolation and timing.
pub fn run_single_rule(rule: &dyn Rule, ctx: &AnalysisContext<'_>) -> RuleResult {
    let id = rule.id().to_string();
    let source = rule.source();
    let start = Instant::now();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| rule.check(ctx)));
    let duration = start.elapsed().as_micros() as u64;

    match outcome {
        Ok(Ok(hit)) => {
            match &hit {
                Some(h) => debug!("Rule {} fired on {} nodes", id, h.affected.len()),
                None => debug!("Rule {} did not fire", id),
            }
            RuleResult::success(id, source, hit, duration)
        }
        Ok(Err(e)) => {
            debug!("Rule {} skipped (evaluation error): {}", id, e);
            RuleResult::failure(id, source, e.to_string(), duration)
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            error!("Rule {} panicked: {}", id, panic_msg);
            RuleResult::failure(id, source, format!("Panic: {}", panic_msg), duration)
        }
    }
}
