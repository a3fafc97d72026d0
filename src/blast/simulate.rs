//! Blast radius BFS

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::edge_model::{evaluate_edge, BlockReason, EdgeVerdict, SimulationConfig};
use super::privilege::escalation_targets;
use crate::error::{AnalysisError, Result};
use crate::graph::AnalysisContext;

/// Everything one compromise simulation found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlastResult {
    pub source: String,
    /// Hop distance of every network-reached node, the source at 0.
    pub hops: IndexMap<String, usize>,
    /// Detection probability of every reached node, the source included.
    pub detection: IndexMap<String, f64>,
    /// Edge id -> why it could not be crossed.
    pub blocked: IndexMap<String, BlockReason>,
    /// Nodes reached only by privilege escalation; they have no hop distance.
    pub escalated: IndexSet<String>,
    pub node_count: usize,
}

/// Condensed view of a [`BlastResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlastSummary {
    /// Network-reached plus escalated nodes, source excluded
    pub reached: usize,
    pub via_escalation: usize,
    /// Every node except the source
    pub total: usize,
    pub reach_pct: u32,
    pub mean_detection: f64,
    pub blocked: IndexMap<BlockReason, usize>,
}

impl BlastResult {
    pub fn hop(&self, id: &str) -> Option<usize> {
        self.hops.get(id).copied()
    }

    pub fn detection_of(&self, id: &str) -> Option<f64> {
        self.detection.get(id).copied()
    }

    /// Reached over the network or by escalation. The source is not
    /// "reached".
    pub fn is_reached(&self, id: &str) -> bool {
        id != self.source && (self.hops.contains_key(id) || self.escalated.contains(id))
    }

    /// Ids of edges blocked for `reason`, in discovery order.
    pub fn blocked_by(&self, reason: BlockReason) -> Vec<&str> {
        self.blocked
            .iter()
            .filter(|(_, r)| **r == reason)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn summary(&self) -> BlastSummary {
        let network: Vec<&str> = self
            .hops
            .keys()
            .map(String::as_str)
            .filter(|id| *id != self.source)
            .collect();
        let reached = network.len() + self.escalated.len();
        let total = self.node_count.saturating_sub(1);
        let reach_pct = if total > 0 {
            (reached as f64 / total as f64 * 100.0).round() as u32
        } else {
            0
        };

        let scores: Vec<f64> = network
            .iter()
            .copied()
            .chain(self.escalated.iter().map(String::as_str))
            .filter_map(|id| self.detection_of(id))
            .collect();
        let mean_detection = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        let mut blocked: IndexMap<BlockReason, usize> = IndexMap::new();
        for reason in self.blocked.values() {
            *blocked.entry(*reason).or_insert(0) += 1;
        }

        BlastSummary {
            reached,
            via_escalation: self.escalated.len(),
            total,
            reach_pct,
            mean_detection,
            blocked,
        }
    }
}

/// Simulate compromise of `source_id` and spread it as far as the edge
/// model and the source's privileges allow.
///
/// Network spread is a BFS: each node is expanded once, at its shortest hop
/// distance, and carries the detection probability of the route that first
/// reached it. Privilege escalation is applied afterwards to whatever the
/// network could not reach.
pub fn run_blast(
    ctx: &AnalysisContext<'_>,
    source_id: &str,
    config: &SimulationConfig,
) -> Result<BlastResult> {
    let source = ctx
        .node(source_id)
        .ok_or_else(|| AnalysisError::UnknownNode(source_id.to_string()))?;

    let mut hops: IndexMap<String, usize> = IndexMap::new();
    let mut detection: IndexMap<String, f64> = IndexMap::new();
    let mut blocked: IndexMap<String, BlockReason> = IndexMap::new();

    // capped like every later hop
    let source_detect = config.compound(0.0, config.detector_probability(source.node_type), 0.0);
    let mut queue: VecDeque<(&str, usize, f64)> = VecDeque::new();
    queue.push_back((source.id.as_str(), 0, source_detect));

    while let Some((current, hop, detect)) = queue.pop_front() {
        if hops.contains_key(current) {
            continue;
        }
        hops.insert(current.to_string(), hop);
        detection.insert(current.to_string(), detect);

        let Some(from) = ctx.node(current) else {
            continue;
        };
        for edge in ctx.outgoing(current) {
            match evaluate_edge(edge, from, source, config) {
                EdgeVerdict::Traverse { detection: edge_prob } => {
                    if hops.contains_key(edge.to.as_str()) {
                        continue;
                    }
                    let node_prob = ctx
                        .node(&edge.to)
                        .map_or(0.0, |n| config.detector_probability(n.node_type));
                    let next = config.compound(detect, node_prob, edge_prob);
                    queue.push_back((edge.to.as_str(), hop + 1, next));
                }
                EdgeVerdict::Blocked(reason) => {
                    debug!("Blast: edge {} blocked ({})", edge.id, reason);
                    blocked.insert(edge.id.clone(), reason);
                }
            }
        }
    }

    let mut escalated: IndexSet<String> = IndexSet::new();
    for target in escalation_targets(ctx, source) {
        if hops.contains_key(target.id.as_str()) {
            continue;
        }
        let node_prob = config.detector_probability(target.node_type);
        let prob = config.compound(source_detect, node_prob, config.privilege_escalation_penalty);
        detection.insert(target.id.clone(), prob);
        escalated.insert(target.id.clone());
    }

    let result = BlastResult {
        source: source.id.clone(),
        hops,
        detection,
        blocked,
        escalated,
        node_count: ctx.node_count(),
    };

    let summary = result.summary();
    info!(
        "Blast from {}: {}/{} nodes reachable ({}%), {} via escalation, {} edges blocked",
        result.source,
        summary.reached,
        summary.total,
        summary.reach_pct,
        summary.via_escalation,
        result.blocked.len()
    );
    Ok(result)
}
