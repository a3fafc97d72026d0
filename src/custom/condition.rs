//! Declarative rule conditions
//!
//! A closed set of condition kinds, each interpreted by [`Condition::evaluate`].
//! Conditions are plain data: they deserialize from rule pack JSON
//! (`{"type": "missing-component", "nodeType": "siem"}`) and nothing in a
//! pack is ever executed.
//!
//! A condition whose kind (or parameters) this crate does not understand is
//! kept verbatim as [`RuleCondition::Unrecognized`] so it survives an
//! export, and evaluates to "did not fire".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::graph::{shortest_path, AnalysisContext, DataClass, Edge, Node, NodeType};
use crate::rules::RuleHit;

/// A single value or a list of values; packs use both spellings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: PartialEq> OneOrMany<T> {
    pub fn contains(&self, item: &T) -> bool {
        match self {
            OneOrMany::One(value) => value == item,
            OneOrMany::Many(values) => values.contains(item),
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        OneOrMany::Many(values)
    }
}

fn default_threshold() -> usize {
    1
}

fn default_bad_values() -> Vec<String> {
    vec!["None".to_string()]
}

/// Graph condition kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Condition {
    /// Fires (globally) when no node of `node_type` exists.
    MissingComponent { node_type: NodeType },

    /// Fires (globally) when fewer than `threshold` nodes of `node_type` exist.
    ComponentCountBelow {
        node_type: NodeType,
        #[serde(default = "default_threshold")]
        threshold: usize,
    },

    /// Fires on each node of `node_type` whose property differs from
    /// `prop_value`. An absent property takes `prop_default`.
    NodeMissingProperty {
        node_type: NodeType,
        prop_key: String,
        prop_value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prop_default: Option<Value>,
    },

    /// Fires on each node of the listed types whose property equals
    /// `prop_value`.
    NodeHasProperty {
        node_types: OneOrMany<NodeType>,
        prop_key: String,
        prop_value: Value,
    },

    /// Fires on the target of each edge whose property is absent or one of
    /// `bad_values`, optionally only for flows carrying the listed classes.
    EdgeMissingProperty {
        prop_key: String,
        #[serde(default = "default_bad_values")]
        bad_values: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        data_class_filter: Vec<DataClass>,
    },

    /// Like `EdgeMissingProperty`, restricted to edges into `target_node_type`.
    EdgeToNodeType {
        target_node_type: NodeType,
        prop_key: String,
        #[serde(default = "default_bad_values")]
        bad_values: Vec<String>,
    },

    /// Fires on both endpoints of each offending edge, optionally filtered
    /// by endpoint types.
    AllEdgesCheck {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_node_type: Option<NodeType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_node_type: Option<NodeType>,
        prop_key: String,
        #[serde(default = "default_bad_values")]
        bad_values: Vec<String>,
    },

    /// For every (source, destination) pair with a connecting path, fires on
    /// the destination unless a guard sits strictly between the endpoints of
    /// the shortest path.
    PathUnguarded {
        src_type: OneOrMany<NodeType>,
        dst_type: OneOrMany<NodeType>,
        guard_type: OneOrMany<NodeType>,
    },

    /// Fires on each node of `node_type` whose zone (canvas zone, else trust
    /// zone) is not listed. An empty list accepts any zone.
    NodeZoneMismatch {
        node_type: NodeType,
        #[serde(default)]
        expected_zones: Vec<String>,
    },
}

impl Condition {
    /// Wire names of every condition kind.
    pub const KINDS: [&'static str; 9] = [
        "missing-component",
        "component-count-below",
        "node-missing-property",
        "node-has-property",
        "edge-missing-property",
        "edge-to-node-type",
        "all-edges-check",
        "path-unguarded",
        "node-zone-mismatch",
    ];

    /// Wire name of the condition kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Condition::MissingComponent { .. } => "missing-component",
            Condition::ComponentCountBelow { .. } => "component-count-below",
            Condition::NodeMissingProperty { .. } => "node-missing-property",
            Condition::NodeHasProperty { .. } => "node-has-property",
            Condition::EdgeMissingProperty { .. } => "edge-missing-property",
            Condition::EdgeToNodeType { .. } => "edge-to-node-type",
            Condition::AllEdgesCheck { .. } => "all-edges-check",
            Condition::PathUnguarded { .. } => "path-unguarded",
            Condition::NodeZoneMismatch { .. } => "node-zone-mismatch",
        }
    }

    /// Evaluate against one analysis context. `None` means "did not fire".
    pub fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<RuleHit> {
        match self {
            Condition::MissingComponent { node_type } => {
                (!ctx.has_type(*node_type)).then(RuleHit::global)
            }

            Condition::ComponentCountBelow {
                node_type,
                threshold,
            } => (ctx.nodes_of_type(*node_type).count() < *threshold).then(RuleHit::global),

            Condition::NodeMissingProperty {
                node_type,
                prop_key,
                prop_value,
                prop_default,
            } => {
                let affected = ctx.nodes_of_type(*node_type).filter(|n| {
                    let value = n.property(prop_key).or_else(|| prop_default.clone());
                    value.as_ref() != Some(prop_value)
                });
                RuleHit::nodes(affected.map(|n| n.id.as_str()))
            }

            Condition::NodeHasProperty {
                node_types,
                prop_key,
                prop_value,
            } => {
                let affected = ctx.nodes().values().filter(|n| {
                    node_types.contains(&n.node_type)
                        && n.property(prop_key).as_ref() == Some(prop_value)
                });
                RuleHit::nodes(affected.map(|n| n.id.as_str()))
            }

            Condition::EdgeMissingProperty {
                prop_key,
                bad_values,
                data_class_filter,
            } => {
                let affected = ctx
                    .edges()
                    .filter(|e| {
                        data_class_filter.is_empty() || data_class_filter.contains(&e.data_class())
                    })
                    .filter(|e| is_bad(e, prop_key, bad_values))
                    .map(|e| e.to.as_str());
                RuleHit::nodes(affected)
            }

            Condition::EdgeToNodeType {
                target_node_type,
                prop_key,
                bad_values,
            } => {
                let affected = ctx
                    .edges()
                    .filter(|e| node_is(ctx, &e.to, Some(*target_node_type)))
                    .filter(|e| is_bad(e, prop_key, bad_values))
                    .map(|e| e.to.as_str());
                RuleHit::nodes(affected)
            }

            Condition::AllEdgesCheck {
                from_node_type,
                to_node_type,
                prop_key,
                bad_values,
            } => {
                let affected = ctx
                    .edges()
                    .filter(|e| {
                        node_is(ctx, &e.from, *from_node_type) && node_is(ctx, &e.to, *to_node_type)
                    })
                    .filter(|e| is_bad(e, prop_key, bad_values))
                    .flat_map(|e| [e.to.as_str(), e.from.as_str()]);
                RuleHit::nodes(affected)
            }

            Condition::PathUnguarded {
                src_type,
                dst_type,
                guard_type,
            } => {
                let sources = ctx.select(|n| src_type.contains(&n.node_type));
                let targets = ctx.select(|n| dst_type.contains(&n.node_type));
                let mut affected = Vec::new();
                for src in &sources {
                    for dst in &targets {
                        let Some(path) = shortest_path(ctx, &src.id, &dst.id) else {
                            continue;
                        };
                        let inner = &path[1..path.len().saturating_sub(1).max(1)];
                        let guarded = inner.iter().any(|id| {
                            ctx.node(id)
                                .is_some_and(|n| guard_type.contains(&n.node_type))
                        });
                        if !guarded {
                            affected.push(dst.id.as_str());
                        }
                    }
                }
                RuleHit::nodes(affected)
            }

            Condition::NodeZoneMismatch {
                node_type,
                expected_zones,
            } => {
                if expected_zones.is_empty() {
                    return None;
                }
                let affected = ctx.nodes_of_type(*node_type).filter(|n| {
                    zone_label(n).map_or(true, |zone| !expected_zones.iter().any(|z| z == zone))
                });
                RuleHit::nodes(affected.map(|n| n.id.as_str()))
            }
        }
    }
}

/// Absent, empty, or listed as bad.
fn is_bad(edge: &Edge, key: &str, bad_values: &[String]) -> bool {
    match edge.property(key) {
        None => true,
        Some(value) => value.is_empty() || bad_values.iter().any(|b| *b == value),
    }
}

/// Whether node `id` exists and has type `wanted`; `None` matches any node.
fn node_is(ctx: &AnalysisContext<'_>, id: &str, wanted: Option<NodeType>) -> bool {
    match wanted {
        None => true,
        Some(t) => ctx.node(id).is_some_and(|n| n.node_type == t),
    }
}

fn zone_label(node: &Node) -> Option<&'static str> {
    node.zone
        .map(|z| z.as_str())
        .or_else(|| node.trust_zone.map(|z| z.as_str()))
}

/// A condition as stored on a rule: understood, or carried through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleCondition {
    Known(Condition),
    Unrecognized(Value),
}

impl RuleCondition {
    pub fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<RuleHit> {
        match self {
            RuleCondition::Known(condition) => condition.evaluate(ctx),
            RuleCondition::Unrecognized(_) => {
                if let Some(problem) = self.problem() {
                    warn!("{}", problem);
                }
                None
            }
        }
    }

    /// Why an unrecognized condition cannot be evaluated: an unknown kind, or
    /// a known kind whose parameters do not deserialize.
    pub fn problem(&self) -> Option<String> {
        let RuleCondition::Unrecognized(raw) = self else {
            return None;
        };
        let kind = raw.get("type").and_then(Value::as_str);
        Some(match kind {
            Some(kind) if Condition::KINDS.contains(&kind) => {
                let reason = serde_json::from_value::<Condition>(raw.clone())
                    .err()
                    .map_or_else(String::new, |e| format!(": {e}"));
                format!("Invalid parameters for custom rule condition {kind}{reason}")
            }
            Some(kind) => format!("Unknown custom rule condition type: {kind}"),
            None => "Custom rule condition has no type".to_string(),
        })
    }

    pub fn is_known(&self) -> bool {
        matches!(self, RuleCondition::Known(_))
    }
}

impl From<Condition> for RuleCondition {
    fn from(condition: Condition) -> Self {
        RuleCondition::Known(condition)
    }
}
