//! Prebuilt compliance rule packs
//!
//! Each pack is a fixed list of declarative rules. Installing a pack copies
//! its rules into a [`CustomRuleStore`](super::CustomRuleStore).

use serde_json::Value;

use super::condition::{Condition, OneOrMany};
use super::store::CustomRule;
use crate::graph::{DataClass, NodeType};
use crate::models::{Rating, RuleMeta, Severity, Stride};

/// Pack names accepted by [`prebuilt`].
pub const PACK_NAMES: [&str; 4] = ["healthcare", "fintech", "cloud-native", "zero-trust"];

/// A named, ready-made rule pack
#[derive(Debug, Clone)]
pub struct PrebuiltPack {
    pub name: &'static str,
    pub label: &'static str,
    pub rules: Vec<CustomRule>,
}

/// Look up a prebuilt pack by name. Underscores are accepted in place of
/// hyphens (`cloud_native`).
pub fn prebuilt(name: &str) -> Option<PrebuiltPack> {
    match name.replace('_', "-").as_str() {
        "healthcare" => Some(healthcare()),
        "fintech" => Some(fintech()),
        "cloud-native" => Some(cloud_native()),
        "zero-trust" => Some(zero_trust()),
        _ => None,
    }
}

struct Blueprint {
    id: &'static str,
    name: &'static str,
    stride: Stride,
    severity: Severity,
    likelihood: Rating,
    impact: Rating,
    control: &'static str,
    description: &'static str,
    remediation: [&'static str; 3],
}

fn rule(pack: &str, bp: Blueprint, condition: Condition) -> CustomRule {
    let meta = RuleMeta::new(bp.id, bp.name, bp.stride, bp.severity)
        .with_rating(bp.likelihood, bp.impact)
        .with_control(bp.control)
        .with_description(bp.description)
        .with_remediation(&bp.remediation);
    CustomRule::new(meta, condition).with_pack(pack)
}

fn missing(node_type: NodeType) -> Condition {
    Condition::MissingComponent { node_type }
}

fn database_encrypted() -> Condition {
    Condition::NodeMissingProperty {
        node_type: NodeType::Database,
        prop_key: "encryption".into(),
        prop_value: Value::Bool(true),
        prop_default: Some(Value::Bool(true)),
    }
}

fn weak_transport(bad: &[&str], class: DataClass) -> Condition {
    Condition::EdgeMissingProperty {
        prop_key: "encryption".into(),
        bad_values: bad.iter().map(|s| s.to_string()).collect(),
        data_class_filter: vec![class],
    }
}

fn unauthenticated_edges(from: Option<NodeType>, to: Option<NodeType>) -> Condition {
    Condition::AllEdgesCheck {
        from_node_type: from,
        to_node_type: to,
        prop_key: "auth".into(),
        bad_values: vec!["None".into()],
    }
}

fn healthcare() -> PrebuiltPack {
    let pack = "healthcare";
    PrebuiltPack {
        name: pack,
        label: "Healthcare (HIPAA)",
        rules: vec![
            rule(
                pack,
                Blueprint {
                    id: "HC-001",
                    name: "PHI Data Without Encryption at Rest",
                    stride: Stride::InformationDisclosure,
                    severity: Severity::Critical,
                    likelihood: Rating::High,
                    impact: Rating::High,
                    control: "Confidentiality",
                    description: "Protected Health Information (PHI) stored in databases without \
                        encryption violates HIPAA §164.312(a)(2)(iv). Requires encryption at rest \
                        for all ePHI.",
                    remediation: [
                        "Enable TDE on all databases storing PHI",
                        "Use AES-256 encryption for ePHI columns",
                        "Implement HIPAA-compliant key management",
                    ],
                },
                database_encrypted(),
            ),
            rule(
                pack,
                Blueprint {
                    id: "HC-002",
                    name: "No Audit Trail for PHI Access",
                    stride: Stride::Repudiation,
                    severity: Severity::Critical,
                    likelihood: Rating::High,
                    impact: Rating::High,
                    control: "Non-Repudiation",
                    description: "HIPAA §164.312(b) requires audit controls recording all access \
                        to ePHI. Missing SIEM/audit component means no compliance.",
                    remediation: [
                        "Deploy SIEM with ePHI access dashboards",
                        "Log all SELECT/UPDATE on PHI tables",
                        "Retain audit logs for 6 years per HIPAA",
                    ],
                },
                missing(NodeType::Siem),
            ),
            rule(
                pack,
                Blueprint {
                    id: "HC-003",
                    name: "PHI Transmitted Without TLS 1.2+",
                    stride: Stride::InformationDisclosure,
                    severity: Severity::Critical,
                    likelihood: Rating::High,
                    impact: Rating::High,
                    control: "Confidentiality",
                    description: "HIPAA §164.312(e)(1) requires transmission security for ePHI. \
                        Connections carrying PHI data must use TLS 1.2 or higher.",
                    remediation: [
                        "Enforce TLS 1.2+ on all PHI flows",
                        "Disable SSL/TLS 1.0/1.1",
                        "Use HSTS headers on all endpoints",
                    ],
                },
                weak_transport(
                    &["None", "TLS 1.0/1.1", "TLS 1.2 (weak ciphers)"],
                    DataClass::Phi,
                ),
            ),
            rule(
                pack,
                Blueprint {
                    id: "HC-004",
                    name: "No Identity Provider for PHI Systems",
                    stride: Stride::Spoofing,
                    severity: Severity::High,
                    likelihood: Rating::Medium,
                    impact: Rating::High,
                    control: "Authentication",
                    description: "HIPAA §164.312(d) requires unique user identification. Without \
                        a centralized IdP, user access to ePHI cannot be consistently verified.",
                    remediation: [
                        "Deploy centralized IdP with MFA",
                        "Enforce unique user IDs for all PHI access",
                        "Implement session timeout policies",
                    ],
                },
                missing(NodeType::Idp),
            ),
        ],
    }
}

fn fintech() -> PrebuiltPack {
    let pack = "fintech";
    PrebuiltPack {
        name: pack,
        label: "Fintech (PCI-DSS)",
        rules: vec![
            rule(
                pack,
                Blueprint {
                    id: "FT-001",
                    name: "Cardholder Data Without Encryption",
                    stride: Stride::InformationDisclosure,
                    severity: Severity::Critical,
                    likelihood: Rating::High,
                    impact: Rating::High,
                    control: "Confidentiality",
                    description: "PCI-DSS Req 3.4: Render PAN unreadable anywhere it is stored. \
                        All databases must encrypt cardholder data at rest.",
                    remediation: [
                        "Encrypt all PAN/CHD columns with AES-256",
                        "Implement tokenization for PAN storage",
                        "Use HSMs for key management",
                    ],
                },
                database_encrypted(),
            ),
            rule(
                pack,
                Blueprint {
                    id: "FT-002",
                    name: "PCI Data Over Non-TLS Channel",
                    stride: Stride::InformationDisclosure,
                    severity: Severity::Critical,
                    likelihood: Rating::High,
                    impact: Rating::High,
                    control: "Confidentiality",
                    description: "PCI-DSS Req 4.1: Use strong cryptography and security \
                        protocols to safeguard sensitive cardholder data during transmission.",
                    remediation: [
                        "Enforce TLS 1.2+ on all PCI flows",
                        "Implement certificate pinning for mobile apps",
                        "Disable all weak cipher suites",
                    ],
                },
                weak_transport(&["None", "TLS 1.0/1.1"], DataClass::Pci),
            ),
            rule(
                pack,
                Blueprint {
                    id: "FT-003",
                    name: "No WAF Protecting Payment Endpoints",
                    stride: Stride::Tampering,
                    severity: Severity::Critical,
                    likelihood: Rating::High,
                    impact: Rating::High,
                    control: "Integrity",
                    description: "PCI-DSS Req 6.6: Install a web application firewall in front \
                        of public-facing web applications.",
                    remediation: [
                        "Deploy WAF with OWASP ModSecurity CRS",
                        "Enable bot protection on payment pages",
                        "Log and review WAF alerts daily",
                    ],
                },
                missing(NodeType::Waf),
            ),
            rule(
                pack,
                Blueprint {
                    id: "FT-004",
                    name: "Missing Network Segmentation (CDE)",
                    stride: Stride::ElevationOfPrivilege,
                    severity: Severity::High,
                    likelihood: Rating::Medium,
                    impact: Rating::High,
                    control: "Authorization",
                    description: "PCI-DSS Req 1.3: Prohibit direct public access to CDE. Without \
                        firewall, the cardholder data environment is exposed.",
                    remediation: [
                        "Implement firewall between public and CDE zones",
                        "Use network micro-segmentation",
                        "Restrict all traffic to allow-listed ports",
                    ],
                },
                missing(NodeType::Firewall),
            ),
            rule(
                pack,
                Blueprint {
                    id: "FT-005",
                    name: "Unauthenticated Access to Payment API",
                    stride: Stride::Spoofing,
                    severity: Severity::Critical,
                    likelihood: Rating::High,
                    impact: Rating::High,
                    control: "Authentication",
                    description: "PCI-DSS Req 8.1: All users must have a unique ID and \
                        authenticate before accessing cardholder data.",
                    remediation: [
                        "Require OAuth2 or mTLS on all payment APIs",
                        "Implement API key rotation policies",
                        "Log all authentication events",
                    ],
                },
                Condition::EdgeToNodeType {
                    target_node_type: NodeType::Api,
                    prop_key: "auth".into(),
                    bad_values: vec!["None".into()],
                },
            ),
        ],
    }
}

fn cloud_native() -> PrebuiltPack {
    let pack = "cloud-native";
    PrebuiltPack {
        name: pack,
        label: "Cloud-Native",
        rules: vec![
            rule(
                pack,
                Blueprint {
                    id: "CN-001",
                    name: "Lambda Without VPC Isolation",
                    stride: Stride::ElevationOfPrivilege,
                    severity: Severity::High,
                    likelihood: Rating::Medium,
                    impact: Rating::High,
                    control: "Authorization",
                    description: "Serverless functions running outside a VPC have unrestricted \
                        internet access and cannot be network-segmented.",
                    remediation: [
                        "Deploy Lambda functions inside a VPC",
                        "Use VPC endpoints for AWS services",
                        "Configure security groups for function ENIs",
                    ],
                },
                Condition::NodeMissingProperty {
                    node_type: NodeType::Lambda,
                    prop_key: "vpc".into(),
                    prop_value: Value::Bool(true),
                    prop_default: Some(Value::Bool(false)),
                },
            ),
            rule(
                pack,
                Blueprint {
                    id: "CN-002",
                    name: "Admin IAM Privilege on Compute Node",
                    stride: Stride::ElevationOfPrivilege,
                    severity: Severity::Critical,
                    likelihood: Rating::Medium,
                    impact: Rating::High,
                    control: "Authorization",
                    description: "Compute nodes with admin IAM privileges can escalate to full \
                        account takeover if compromised.",
                    remediation: [
                        "Use least-privilege IAM roles for all compute",
                        "Enable IAM Access Analyzer",
                        "Implement permission boundaries",
                    ],
                },
                Condition::NodeHasProperty {
                    node_types: OneOrMany::Many(vec![
                        NodeType::WebServer,
                        NodeType::Api,
                        NodeType::Microservice,
                        NodeType::Lambda,
                    ]),
                    prop_key: "iamPriv".into(),
                    prop_value: Value::from("admin"),
                },
            ),
            rule(
                pack,
                Blueprint {
                    id: "CN-003",
                    name: "Public Object Storage Bucket",
                    stride: Stride::InformationDisclosure,
                    severity: Severity::Critical,
                    likelihood: Rating::High,
                    impact: Rating::High,
                    control: "Confidentiality",
                    description: "Object storage accessible from internet-zone nodes without \
                        authentication risks public data exposure.",
                    remediation: [
                        "Enable S3 Block Public Access",
                        "Use bucket policies to deny public reads",
                        "Audit bucket ACLs with AWS Config rules",
                    ],
                },
                Condition::PathUnguarded {
                    src_type: vec![NodeType::Internet, NodeType::User, NodeType::Attacker].into(),
                    dst_type: vec![NodeType::Storage].into(),
                    guard_type: vec![NodeType::Waf, NodeType::Firewall, NodeType::Idp].into(),
                },
            ),
            rule(
                pack,
                Blueprint {
                    id: "CN-004",
                    name: "No Service Mesh Between Microservices",
                    stride: Stride::Spoofing,
                    severity: Severity::Medium,
                    likelihood: Rating::Medium,
                    impact: Rating::Medium,
                    control: "Authentication",
                    description: "Microservice-to-microservice calls without mTLS allow service \
                        impersonation within the cluster.",
                    remediation: [
                        "Deploy Istio or Linkerd service mesh",
                        "Enforce mTLS for all east-west traffic",
                        "Implement service identity verification",
                    ],
                },
                unauthenticated_edges(Some(NodeType::Microservice), Some(NodeType::Microservice)),
            ),
        ],
    }
}

fn zero_trust() -> PrebuiltPack {
    let pack = "zero-trust";
    PrebuiltPack {
        name: pack,
        label: "Zero Trust",
        rules: vec![
            rule(
                pack,
                Blueprint {
                    id: "ZT-001",
                    name: "Unauthenticated Internal Data Flow",
                    stride: Stride::Spoofing,
                    severity: Severity::High,
                    likelihood: Rating::High,
                    impact: Rating::High,
                    control: "Authentication",
                    description: "Zero Trust principle: never trust, always verify. Every data \
                        flow must be authenticated regardless of network zone.",
                    remediation: [
                        "Require authentication on ALL connections",
                        "Implement mTLS for service-to-service",
                        "Use identity-aware proxies",
                    ],
                },
                unauthenticated_edges(None, None),
            ),
            rule(
                pack,
                Blueprint {
                    id: "ZT-002",
                    name: "Missing Micro-Segmentation",
                    stride: Stride::ElevationOfPrivilege,
                    severity: Severity::Medium,
                    likelihood: Rating::Medium,
                    impact: Rating::High,
                    control: "Authorization",
                    description: "Zero Trust requires micro-segmentation. All zones should have \
                        firewall or WAF enforcement.",
                    remediation: [
                        "Deploy firewall between every trust zone",
                        "Implement network policies (Calico/Cilium)",
                        "Use security groups per workload",
                    ],
                },
                missing(NodeType::Firewall),
            ),
            rule(
                pack,
                Blueprint {
                    id: "ZT-003",
                    name: "No Continuous Verification (IdP Missing)",
                    stride: Stride::Spoofing,
                    severity: Severity::High,
                    likelihood: Rating::Medium,
                    impact: Rating::High,
                    control: "Authentication",
                    description: "Zero Trust requires continuous identity verification. Without \
                        an IdP, there is no centralized authentication authority.",
                    remediation: [
                        "Deploy centralized IdP (Okta, Azure AD, Keycloak)",
                        "Implement session re-validation on privilege change",
                        "Use short-lived tokens (15 min)",
                    ],
                },
                missing(NodeType::Idp),
            ),
        ],
    }
}
