//! Per-edge admissibility for the blast simulator
//!
//! Factors are checked in a fixed order and the first that decides wins:
//!
//! 1. no network route: blocked
//! 2. leaving an untrusted node: auth + strong TLS blocks, auth + weak TLS
//!    lets the attacker through at a detection cost
//! 3. leaving an internal, ordinary node: the compromised identity must be
//!    able to use the edge's credential
//! 4. plaintext adds a small detection increment

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::privilege::{can_open_vault, is_high_impact};
use crate::graph::{CredScope, Edge, NetworkRoute, Node, NodeType, TlsStrength};

/// Tunables of the detection model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Baseline chance that a component of this type notices an intruder.
    pub detector_probabilities: IndexMap<NodeType, f64>,
    /// Added per plaintext hop.
    pub default_edge_detection: f64,
    /// Added per authenticated hop over weak TLS out of an untrusted node.
    pub weak_tls_detection: f64,
    /// Added per node reached by privilege escalation instead of the network.
    pub privilege_escalation_penalty: f64,
    pub max_detection: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let detector_probabilities = [
            (NodeType::Siem, 0.85),
            (NodeType::Idp, 0.70),
            (NodeType::Waf, 0.60),
            (NodeType::Firewall, 0.45),
        ]
        .into_iter()
        .collect();

        Self {
            detector_probabilities,
            default_edge_detection: 0.05,
            weak_tls_detection: 0.15,
            privilege_escalation_penalty: 0.4,
            max_detection: 0.99,
        }
    }
}

impl SimulationConfig {
    pub fn detector_probability(&self, node_type: NodeType) -> f64 {
        self.detector_probabilities
            .get(&node_type)
            .copied()
            .map_or(0.0, clamp_unit)
    }

    /// Fold one more independent chance of detection into `prev`.
    ///
    /// Never lower than `prev` (as long as `prev` is within the cap) and
    /// never above `max_detection`.
    pub fn compound(&self, prev: f64, node_prob: f64, edge_prob: f64) -> f64 {
        let undetected =
            (1.0 - clamp_unit(prev)) * (1.0 - clamp_unit(node_prob)) * (1.0 - clamp_unit(edge_prob));
        (1.0 - undetected).min(clamp_unit(self.max_detection))
    }
}

fn clamp_unit(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Why the simulator refused to cross an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockReason {
    NoNetworkRoute,
    AuthAndStrongTls,
    CredentialNotScoped,
}

impl BlockReason {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockReason::NoNetworkRoute => "no-network-route",
            BlockReason::AuthAndStrongTls => "auth-and-strong-tls",
            BlockReason::CredentialNotScoped => "credential-not-scoped",
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`evaluate_edge`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeVerdict {
    Traverse { detection: f64 },
    Blocked(BlockReason),
}

impl EdgeVerdict {
    pub fn is_traversable(&self) -> bool {
        matches!(self, EdgeVerdict::Traverse { .. })
    }
}

/// Can the identity of `compromised` use the credential `edge` requires?
pub fn can_possess_credential(edge: &Edge, compromised: &Node) -> bool {
    match edge.cred_scope() {
        CredScope::Shared => true,
        CredScope::ServiceBound => edge.from == compromised.id,
        CredScope::Vault => can_open_vault(compromised.privilege()),
    }
}

/// Decide whether an attacker holding `from` (the edge's source) can move
/// along `edge`, given that the simulation started at `compromised`.
pub fn evaluate_edge(
    edge: &Edge,
    from: &Node,
    compromised: &Node,
    config: &SimulationConfig,
) -> EdgeVerdict {
    if edge.network_route() == NetworkRoute::None {
        return EdgeVerdict::Blocked(BlockReason::NoNetworkRoute);
    }

    let external = from.trust().is_untrusted();
    let strength = edge.tls_strength();

    if external && !edge.is_unauthenticated() {
        match strength {
            TlsStrength::Strong => return EdgeVerdict::Blocked(BlockReason::AuthAndStrongTls),
            TlsStrength::Weak => {
                return EdgeVerdict::Traverse {
                    detection: config.weak_tls_detection,
                }
            }
            TlsStrength::Plaintext => {}
        }
    }

    if !external && !is_high_impact(from) && !can_possess_credential(edge, compromised) {
        return EdgeVerdict::Blocked(BlockReason::CredentialNotScoped);
    }

    let detection = if strength == TlsStrength::Plaintext {
        config.default_edge_detection
    } else {
        0.0
    };
    EdgeVerdict::Traverse { detection }
}
