//! Security maturity assessment
//!
//! Condenses one [`AnalysisResult`] and the countermeasure register into a
//! management-level view: a maturity level, headline numbers, STRIDE
//! narratives and a prioritized action list.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::countermeasures::{CountermeasureRegister, MitigationStatus};
use super::orchestrator::AnalysisResult;
use crate::blast::SimulationConfig;
use crate::graph::{NodeMap, NodeType};
use crate::models::{Severity, Stride, StrideCounts};

/// Detector types that count towards detection confidence
const CONFIDENCE_DETECTORS: [NodeType; 3] = [NodeType::Siem, NodeType::Waf, NodeType::Firewall];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaturityLevel {
    #[serde(rename = "Not Assessed")]
    NotAssessed,
    Initial,
    Defined,
    Managed,
    Proactive,
}

impl MaturityLevel {
    pub fn label(self) -> &'static str {
        match self {
            MaturityLevel::NotAssessed => "Not Assessed",
            MaturityLevel::Initial => "Initial",
            MaturityLevel::Defined => "Defined",
            MaturityLevel::Managed => "Managed",
            MaturityLevel::Proactive => "Proactive",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MaturityLevel::NotAssessed => {
                "No analysis has been run. Build a DFD and run analysis first."
            }
            MaturityLevel::Initial => {
                "Critical vulnerabilities require immediate remediation before deployment."
            }
            MaturityLevel::Defined => {
                "Threats are identified but mitigation coverage needs improvement."
            }
            MaturityLevel::Managed => {
                "Risk is well-understood and largely under control. Continue mitigation progress."
            }
            MaturityLevel::Proactive => {
                "Security posture exceeds baseline. Architecture demonstrates secure-by-design principles."
            }
        }
    }

    fn classify(total: usize, criticals: usize, mitigation_ratio: f64) -> Self {
        if total == 0 {
            MaturityLevel::NotAssessed
        } else if criticals > 0 {
            MaturityLevel::Initial
        } else if mitigation_ratio > 0.8 {
            MaturityLevel::Proactive
        } else if mitigation_ratio > 0.7 {
            MaturityLevel::Managed
        } else {
            MaturityLevel::Defined
        }
    }
}

impl std::fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Priority bucket of a recommended action, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum ActionTag {
    Immediate,
    HighPriority,
    ShortTerm,
    Ongoing,
    Maintain,
}

impl ActionTag {
    pub fn label(self) -> &'static str {
        match self {
            ActionTag::Immediate => "IMMEDIATE",
            ActionTag::HighPriority => "HIGH PRIORITY",
            ActionTag::ShortTerm => "SHORT-TERM",
            ActionTag::Ongoing => "ONGOING",
            ActionTag::Maintain => "MAINTAIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub tag: ActionTag,
    pub text: String,
}

impl RecommendedAction {
    fn new(tag: ActionTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }
}

/// Business-impact narrative for one STRIDE category present in the result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrideNarrative {
    pub stride: Stride,
    pub name: String,
    pub text: String,
}

pub fn stride_narrative(stride: Stride) -> &'static str {
    match stride {
        Stride::Spoofing => {
            "Potential for unauthorized identity assumption, credential theft, and fraudulent transactions."
        }
        Stride::Tampering => {
            "Risk of data integrity violations, undetected modification of records, and audit log tampering."
        }
        Stride::Repudiation => {
            "Inability to attribute actions to users, undermining audit trails and regulatory accountability."
        }
        Stride::InformationDisclosure => {
            "Risk of regulatory non-compliance (GDPR / PCI-DSS / HIPAA) and loss of customer trust through data exposure."
        }
        Stride::DenialOfService => {
            "Operational risk involving service downtime, SLA breaches, and direct revenue loss."
        }
        Stride::ElevationOfPrivilege => {
            "Attackers may gain administrative control, enabling lateral movement across the entire system."
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub total_threats: usize,
    pub criticals: usize,
    pub highs: usize,
    pub mitigated: usize,
    pub partial: usize,
    /// Share of current threats whose record is Mitigated (0.0 - 1.0)
    pub mitigation_ratio: f64,
    /// Mean DREAD weight of the current threats, `None` with no threats
    pub average_dread: Option<f64>,
    /// `1 - Π(1 - p)` over the detector types present (0.0 - 1.0)
    pub detection_confidence: f64,
    pub detectors: Vec<NodeType>,
    pub level: MaturityLevel,
    pub level_description: String,
    pub stride: StrideCounts,
    pub narratives: Vec<StrideNarrative>,
    pub actions: Vec<RecommendedAction>,
}

impl Assessment {
    pub fn from_result(
        result: &AnalysisResult,
        nodes: &NodeMap,
        register: &CountermeasureRegister,
        detection: &SimulationConfig,
    ) -> Self {
        let threats = &result.threats;
        let total = threats.len();
        let criticals = threats
            .iter()
            .filter(|t| t.severity == Severity::Critical)
            .count();
        let highs = threats
            .iter()
            .filter(|t| t.severity == Severity::High)
            .count();

        let statuses: Vec<MitigationStatus> =
            threats.iter().map(|t| register.status(&t.id)).collect();
        let mitigated = statuses
            .iter()
            .filter(|s| **s == MitigationStatus::Mitigated)
            .count();
        let partial = statuses
            .iter()
            .filter(|s| **s == MitigationStatus::Partial)
            .count();
        let mitigation_ratio = if total > 0 {
            mitigated as f64 / total as f64
        } else {
            0.0
        };

        let average_dread = (total > 0).then(|| {
            threats.iter().map(|t| t.severity.dread_weight()).sum::<f64>() / total as f64
        });

        let detectors: Vec<NodeType> = CONFIDENCE_DETECTORS
            .into_iter()
            .filter(|t| nodes.values().any(|n| n.node_type == *t))
            .collect();
        let detection_confidence = if detectors.is_empty() {
            0.0
        } else {
            1.0 - detectors
                .iter()
                .map(|t| 1.0 - detection.detector_probability(*t))
                .product::<f64>()
        };

        let level = MaturityLevel::classify(total, criticals, mitigation_ratio);

        let present: IndexSet<Stride> = threats.iter().map(|t| t.stride).collect();
        let narratives = present
            .into_iter()
            .map(|stride| StrideNarrative {
                stride,
                name: stride.to_string(),
                text: stride_narrative(stride).to_string(),
            })
            .collect();

        let actions = recommended_actions(total, criticals, mitigated, &detectors);

        Self {
            total_threats: total,
            criticals,
            highs,
            mitigated,
            partial,
            mitigation_ratio,
            average_dread,
            detection_confidence,
            detectors,
            level,
            level_description: level.description().to_string(),
            stride: result.summary.stride,
            narratives,
            actions,
        }
    }

    pub fn detection_confidence_pct(&self) -> u32 {
        (self.detection_confidence * 100.0).round() as u32
    }
}

fn recommended_actions(
    total: usize,
    criticals: usize,
    mitigated: usize,
    detectors: &[NodeType],
) -> Vec<RecommendedAction> {
    let mut actions = Vec::new();

    if criticals > 0 {
        let noun = if criticals == 1 {
            "vulnerability"
        } else {
            "vulnerabilities"
        };
        actions.push(RecommendedAction::new(
            ActionTag::Immediate,
            format!(
                "Remediate {criticals} critical {noun}. Secure unencrypted data paths and \
                 implement missing WAF/Firewall controls."
            ),
        ));
    }
    if !detectors.contains(&NodeType::Waf) && !detectors.contains(&NodeType::Firewall) {
        actions.push(RecommendedAction::new(
            ActionTag::HighPriority,
            "No WAF or Firewall detected in the architecture. Add perimeter controls to reduce \
             attack surface.",
        ));
    }
    if mitigated < total {
        let pending = total - mitigated;
        let noun = if pending == 1 { "threat" } else { "threats" };
        actions.push(RecommendedAction::new(
            ActionTag::ShortTerm,
            format!("Complete countermeasure register for {pending} pending {noun}."),
        ));
    }
    if !detectors.contains(&NodeType::Siem) {
        actions.push(RecommendedAction::new(
            ActionTag::Ongoing,
            "No SIEM detected. Implement centralized log aggregation and anomaly alerting for \
             operational visibility.",
        ));
    }
    if actions.is_empty() {
        actions.push(RecommendedAction::new(
            ActionTag::Maintain,
            "Security posture is strong. Schedule periodic threat model reviews as architecture \
             evolves.",
        ));
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::countermeasures::{Countermeasure, Response};
    use crate::graph::Node;
    use crate::models::{RuleMeta, Threat, ThreatSource};

    fn threat(id: &str, stride: Stride, severity: Severity) -> Threat {
        let meta = RuleMeta::new(id, id, stride, severity);
        Threat::from_rule(&meta, Vec::new(), &NodeMap::new(), ThreatSource::Builtin)
    }

    fn result(threats: Vec<Threat>) -> AnalysisResult {
        let mut r = AnalysisResult::default();
        r.summary.stride = StrideCounts::from_threats(&threats);
        r.threats = threats;
        r
    }

    fn nodes(types: &[NodeType]) -> NodeMap {
        types
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let id = format!("n{i}");
                let node = Node::new(&id, *t);
                (id, node)
            })
            .collect()
    }

    fn mitigate(register: &mut CountermeasureRegister, id: &str) {
        register.set(
            id,
            Countermeasure::new(Response::Mitigate, MitigationStatus::Mitigated),
        );
    }

    #[test]
    fn test_no_threats_is_not_assessed() {
        let a = Assessment::from_result(
            &result(Vec::new()),
            &nodes(&[NodeType::Waf, NodeType::Siem]),
            &CountermeasureRegister::new(),
            &SimulationConfig::default(),
        );
        assert_eq!(a.level, MaturityLevel::NotAssessed);
        assert_eq!(a.average_dread, None);
        assert_eq!(a.actions.len(), 1);
        assert_eq!(a.actions[0].tag, ActionTag::Maintain);
    }

    #[test]
    fn test_critical_means_initial_with_immediate_action() {
        let threats = vec![
            threat("T-004", Stride::InformationDisclosure, Severity::Critical),
            threat("T-006", Stride::Repudiation, Severity::Medium),
        ];
        let a = Assessment::from_result(
            &result(threats),
            &nodes(&[NodeType::Api]),
            &CountermeasureRegister::new(),
            &SimulationConfig::default(),
        );

        assert_eq!(a.level, MaturityLevel::Initial);
        assert_eq!(a.average_dread, Some(7.0));
        let tags: Vec<ActionTag> = a.actions.iter().map(|x| x.tag).collect();
        assert_eq!(
            tags,
            vec![
                ActionTag::Immediate,
                ActionTag::HighPriority,
                ActionTag::ShortTerm,
                ActionTag::Ongoing
            ]
        );
        assert!(a.actions[0].text.starts_with("Remediate 1 critical vulnerability."));
        assert_eq!(
            a.actions[2].text,
            "Complete countermeasure register for 2 pending threats."
        );
        assert_eq!(a.narratives.len(), 2);
        assert_eq!(a.narratives[0].stride, Stride::InformationDisclosure);
    }

    #[test]
    fn test_mitigation_ratio_drives_level() {
        let threats: Vec<Threat> = (0..10)
            .map(|i| threat(&format!("T-{i}"), Stride::Tampering, Severity::High))
            .collect();
        let mut register = CountermeasureRegister::new();
        for i in 0..8 {
            mitigate(&mut register, &format!("T-{i}"));
        }
        // stale entries for threats no longer present do not count
        mitigate(&mut register, "T-gone");

        let r = result(threats);
        let detectors = nodes(&[NodeType::Waf, NodeType::Siem]);
        let a = Assessment::from_result(&r, &detectors, &register, &SimulationConfig::default());
        assert_eq!(a.mitigated, 8);
        assert_eq!(a.level, MaturityLevel::Managed);

        mitigate(&mut register, "T-8");
        let a = Assessment::from_result(&r, &detectors, &register, &SimulationConfig::default());
        assert_eq!(a.level, MaturityLevel::Proactive);
        assert_eq!(a.actions.len(), 1);
        assert_eq!(a.actions[0].tag, ActionTag::ShortTerm);
        assert_eq!(
            a.actions[0].text,
            "Complete countermeasure register for 1 pending threat."
        );

        register.set(
            "T-9",
            Countermeasure::new(Response::Accept, MitigationStatus::Partial),
        );
        let a = Assessment::from_result(&r, &detectors, &register, &SimulationConfig::default());
        assert_eq!(a.partial, 1);
    }

    #[test]
    fn test_low_mitigation_is_defined() {
        let threats = vec![threat("T-1", Stride::Spoofing, Severity::Low)];
        let a = Assessment::from_result(
            &result(threats),
            &NodeMap::new(),
            &CountermeasureRegister::new(),
            &SimulationConfig::default(),
        );
        assert_eq!(a.level, MaturityLevel::Defined);
        assert_eq!(a.level_description, MaturityLevel::Defined.description());
    }

    #[test]
    fn test_detection_confidence_compounds() {
        let a = Assessment::from_result(
            &result(Vec::new()),
            &nodes(&[NodeType::Siem, NodeType::Firewall, NodeType::Idp]),
            &CountermeasureRegister::new(),
            &SimulationConfig::default(),
        );
        // 1 - 0.15 * 0.55
        assert!((a.detection_confidence - 0.9175).abs() < 1e-9);
        assert_eq!(a.detection_confidence_pct(), 92);
        assert_eq!(a.detectors, vec![NodeType::Siem, NodeType::Firewall]);
    }
}
