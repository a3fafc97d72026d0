//! Core data models shared by the rule engine, the path detector and the
//! orchestrator.
//!
//! Wire names follow the diagram editor's JSON (`sev`, `like`, `imp`, `cat`,
//! `ctrl`, `desc`, `mits`) so rule packs written by hand or exported from
//! the editor deserialize unchanged.

use crate::graph::NodeMap;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Severity levels for threats
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[default]
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
    #[serde(alias = "Critical", alias = "CRITICAL")]
    Critical,
}

impl Severity {
    /// DREAD-style weight used by the maturity assessment.
    pub fn dread_weight(self) -> f64 {
        match self {
            Severity::Critical => 9.0,
            Severity::High => 7.0,
            Severity::Medium => 5.0,
            Severity::Low => 3.0,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// STRIDE threat category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stride {
    #[serde(rename = "S")]
    Spoofing,
    #[serde(rename = "T")]
    Tampering,
    #[serde(rename = "R")]
    Repudiation,
    #[serde(rename = "I")]
    InformationDisclosure,
    #[serde(rename = "D")]
    DenialOfService,
    #[serde(rename = "E")]
    ElevationOfPrivilege,
}

impl Stride {
    pub const ALL: [Stride; 6] = [
        Stride::Spoofing,
        Stride::Tampering,
        Stride::Repudiation,
        Stride::InformationDisclosure,
        Stride::DenialOfService,
        Stride::ElevationOfPrivilege,
    ];

    pub fn letter(self) -> char {
        match self {
            Stride::Spoofing => 'S',
            Stride::Tampering => 'T',
            Stride::Repudiation => 'R',
            Stride::InformationDisclosure => 'I',
            Stride::DenialOfService => 'D',
            Stride::ElevationOfPrivilege => 'E',
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Stride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stride::Spoofing => "Spoofing",
            Stride::Tampering => "Tampering",
            Stride::Repudiation => "Repudiation",
            Stride::InformationDisclosure => "Information Disclosure",
            Stride::DenialOfService => "Denial of Service",
            Stride::ElevationOfPrivilege => "Elevation of Privilege",
        };
        write!(f, "{name}")
    }
}

/// Likelihood / impact rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Rating {
    #[serde(alias = "low")]
    Low,
    #[default]
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "high")]
    High,
}

/// Static description of a rule: everything a threat inherits when it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMeta {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub stride: Stride,
    #[serde(rename = "sev", default)]
    pub severity: Severity,
    #[serde(rename = "like", default)]
    pub likelihood: Rating,
    #[serde(rename = "imp", default)]
    pub impact: Rating,
    #[serde(rename = "cat", default)]
    pub category: String,
    #[serde(rename = "ctrl", default)]
    pub control: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owasp: Option<String>,
    #[serde(rename = "desc", default)]
    pub description: String,
    #[serde(rename = "mits", default)]
    pub remediation: Vec<String>,
}

impl RuleMeta {
    pub fn new(id: &str, name: &str, stride: Stride, severity: Severity) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            stride,
            severity,
            likelihood: Rating::Medium,
            impact: Rating::Medium,
            category: stride.to_string(),
            control: String::new(),
            owasp: None,
            description: String::new(),
            remediation: Vec::new(),
        }
    }

    pub fn with_rating(mut self, likelihood: Rating, impact: Rating) -> Self {
        self.likelihood = likelihood;
        self.impact = impact;
        self
    }

    pub fn with_control(mut self, control: &str) -> Self {
        self.control = control.to_string();
        self
    }

    pub fn with_owasp(mut self, owasp: &str) -> Self {
        self.owasp = Some(owasp.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_remediation(mut self, steps: &[&str]) -> Self {
        self.remediation = steps.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Where a threat came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreatSource {
    Builtin,
    Custom,
    Boundary,
    PathRule,
}

/// A fired rule, resolved against the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threat {
    pub id: String,
    pub name: String,
    pub stride: Stride,
    pub severity: Severity,
    pub likelihood: Rating,
    pub impact: Rating,
    pub category: String,
    pub control: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owasp: Option<String>,
    pub description: String,
    pub remediation: Vec<String>,
    pub affected: Vec<String>,
    pub location_names: Vec<String>,
    pub source: ThreatSource,
}

impl Threat {
    /// Merge rule metadata with the affected node ids and their display names.
    pub fn from_rule(
        meta: &RuleMeta,
        affected: Vec<String>,
        nodes: &NodeMap,
        source: ThreatSource,
    ) -> Self {
        let location_names: IndexSet<String> = affected
            .iter()
            .map(|id| {
                nodes
                    .get(id)
                    .map(|n| n.display_name().to_string())
                    .unwrap_or_else(|| id.clone())
            })
            .filter(|name| !name.is_empty())
            .collect();

        Self {
            id: meta.id.clone(),
            name: meta.name.clone(),
            stride: meta.stride,
            severity: meta.severity,
            likelihood: meta.likelihood,
            impact: meta.impact,
            category: meta.category.clone(),
            control: meta.control.clone(),
            owasp: meta.owasp.clone(),
            description: meta.description.clone(),
            remediation: meta.remediation.clone(),
            affected,
            location_names: location_names.into_iter().collect(),
            source,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.affected.iter().any(|id| id == node_id)
    }
}

/// Per-STRIDE-letter threat counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrideCounts {
    #[serde(rename = "S")]
    pub spoofing: usize,
    #[serde(rename = "T")]
    pub tampering: usize,
    #[serde(rename = "R")]
    pub repudiation: usize,
    #[serde(rename = "I")]
    pub information_disclosure: usize,
    #[serde(rename = "D")]
    pub denial_of_service: usize,
    #[serde(rename = "E")]
    pub elevation_of_privilege: usize,
}

impl StrideCounts {
    pub fn from_threats(threats: &[Threat]) -> Self {
        let mut counts = [0usize; 6];
        for t in threats {
            counts[t.stride.index()] += 1;
        }
        Self {
            spoofing: counts[0],
            tampering: counts[1],
            repudiation: counts[2],
            information_disclosure: counts[3],
            denial_of_service: counts[4],
            elevation_of_privilege: counts[5],
        }
    }

    pub fn get(&self, stride: Stride) -> usize {
        match stride {
            Stride::Spoofing => self.spoofing,
            Stride::Tampering => self.tampering,
            Stride::Repudiation => self.repudiation,
            Stride::InformationDisclosure => self.information_disclosure,
            Stride::DenialOfService => self.denial_of_service,
            Stride::ElevationOfPrivilege => self.elevation_of_privilege,
        }
    }
}

/// Summary of threats by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatsSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

impl ThreatsSummary {
    pub fn from_threats(threats: &[Threat]) -> Self {
        let mut summary = Self::default();
        for t in threats {
            match t.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
            summary.total += 1;
        }
        summary
    }
}
