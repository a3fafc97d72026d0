use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::components;

/// Nodes keyed by id, in insertion order.
pub type NodeMap = IndexMap<String, Node>;

/// Component kinds the diagram editor can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Internet,
    User,
    Attacker,
    Firewall,
    LoadBalancer,
    Vpn,
    Cdn,
    WebServer,
    Api,
    Microservice,
    Lambda,
    Database,
    Cache,
    Storage,
    MessageQueue,
    Waf,
    Idp,
    Siem,
}

impl NodeType {
    pub const ALL: [NodeType; 18] = [
        NodeType::Internet,
        NodeType::User,
        NodeType::Attacker,
        NodeType::Firewall,
        NodeType::LoadBalancer,
        NodeType::Vpn,
        NodeType::Cdn,
        NodeType::WebServer,
        NodeType::Api,
        NodeType::Microservice,
        NodeType::Lambda,
        NodeType::Database,
        NodeType::Cache,
        NodeType::Storage,
        NodeType::MessageQueue,
        NodeType::Waf,
        NodeType::Idp,
        NodeType::Siem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Internet => "internet",
            NodeType::User => "user",
            NodeType::Attacker => "attacker",
            NodeType::Firewall => "firewall",
            NodeType::LoadBalancer => "loadbalancer",
            NodeType::Vpn => "vpn",
            NodeType::Cdn => "cdn",
            NodeType::WebServer => "webserver",
            NodeType::Api => "api",
            NodeType::Microservice => "microservice",
            NodeType::Lambda => "lambda",
            NodeType::Database => "database",
            NodeType::Cache => "cache",
            NodeType::Storage => "storage",
            NodeType::MessageQueue => "messagequeue",
            NodeType::Waf => "waf",
            NodeType::Idp => "idp",
            NodeType::Siem => "siem",
        }
    }

    /// Actors outside the system: internet, user, attacker.
    pub fn is_external(self) -> bool {
        matches!(self, NodeType::Internet | NodeType::User | NodeType::Attacker)
    }

    pub fn is_compute(self) -> bool {
        matches!(
            self,
            NodeType::WebServer | NodeType::Api | NodeType::Microservice | NodeType::Lambda
        )
    }

    pub fn is_datastore(self) -> bool {
        matches!(self, NodeType::Database | NodeType::Cache | NodeType::Storage)
    }

    /// Perimeter controls that filter inbound traffic.
    pub fn is_perimeter_guard(self) -> bool {
        matches!(self, NodeType::Waf | NodeType::Firewall)
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown component type '{s}'"))
    }
}

/// Declared trust level of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    Untrusted,
    Hostile,
    Trusted,
    Internal,
    Restricted,
}

impl TrustLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            TrustLevel::Untrusted => "untrusted",
            TrustLevel::Hostile => "hostile",
            TrustLevel::Trusted => "trusted",
            TrustLevel::Internal => "internal",
            TrustLevel::Restricted => "restricted",
        }
    }

    pub fn is_untrusted(self) -> bool {
        matches!(self, TrustLevel::Untrusted | TrustLevel::Hostile)
    }

    pub fn is_protected(self) -> bool {
        matches!(self, TrustLevel::Internal | TrustLevel::Restricted)
    }
}

/// Visual placement zone on the editor canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Public,
    Dmz,
    Private,
    Isolated,
}

impl Zone {
    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Public => "public",
            Zone::Dmz => "dmz",
            Zone::Private => "private",
            Zone::Isolated => "isolated",
        }
    }
}

/// Security segmentation tier, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustZone {
    Internet,
    Dmz,
    Internal,
    Restricted,
}

impl TrustZone {
    /// internet 0 < dmz 1 < internal 2 < restricted 3
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrustZone::Internet => "internet",
            TrustZone::Dmz => "dmz",
            TrustZone::Internal => "internal",
            TrustZone::Restricted => "restricted",
        }
    }
}

impl From<Zone> for TrustZone {
    fn from(zone: Zone) -> Self {
        match zone {
            Zone::Public => TrustZone::Internet,
            Zone::Dmz => TrustZone::Dmz,
            Zone::Private => TrustZone::Internal,
            Zone::Isolated => TrustZone::Restricted,
        }
    }
}

impl std::fmt::Display for TrustZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// IAM privilege tier held by a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IamPrivilege {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "read-only")]
    ReadOnly,
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "write")]
    Write,
    #[serde(rename = "assumerole")]
    AssumeRole,
    #[serde(rename = "network-bypass")]
    NetworkBypass,
    #[serde(rename = "admin")]
    Admin,
}

impl IamPrivilege {
    pub fn as_str(self) -> &'static str {
        match self {
            IamPrivilege::None => "none",
            IamPrivilege::ReadOnly => "read-only",
            IamPrivilege::Standard => "standard",
            IamPrivilege::Write => "write",
            IamPrivilege::AssumeRole => "assumerole",
            IamPrivilege::NetworkBypass => "network-bypass",
            IamPrivilege::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompromiseImpact {
    Low,
    #[default]
    Medium,
    High,
}

/// Functional role recorded in node props
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Service,
    User,
}

/// Data sensitivity label, on edges (`dataClass`) and node props
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataClass {
    #[serde(rename = "Public", alias = "public")]
    Public,
    #[serde(rename = "Internal", alias = "internal")]
    Internal,
    #[serde(rename = "Confidential", alias = "confidential")]
    Confidential,
    #[serde(rename = "Restricted", alias = "restricted")]
    Restricted,
    #[serde(rename = "secret", alias = "Secret")]
    Secret,
    #[serde(rename = "PII", alias = "pii")]
    Pii,
    #[serde(rename = "PHI", alias = "phi")]
    Phi,
    #[serde(rename = "PCI", alias = "pci")]
    Pci,
}

impl DataClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DataClass::Public => "Public",
            DataClass::Internal => "Internal",
            DataClass::Confidential => "Confidential",
            DataClass::Restricted => "Restricted",
            DataClass::Secret => "secret",
            DataClass::Pii => "PII",
            DataClass::Phi => "PHI",
            DataClass::Pci => "PCI",
        }
    }

    /// PII, PHI or PCI: data covered by external regulation.
    pub fn is_regulated(self) -> bool {
        matches!(self, DataClass::Pii | DataClass::Phi | DataClass::Pci)
    }

    pub fn is_sensitive(self) -> bool {
        !matches!(self, DataClass::Public | DataClass::Internal)
    }

    /// Classifications that make a component a high-value target.
    pub fn is_crown_jewel(self) -> bool {
        self.is_regulated() || self == DataClass::Secret
    }
}

/// Authentication on a data flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthMethod {
    #[serde(rename = "None", alias = "none")]
    None,
    #[serde(rename = "API Key")]
    ApiKey,
    #[serde(rename = "JWT")]
    Jwt,
    #[serde(rename = "OAuth2")]
    OAuth2,
    #[serde(rename = "mTLS")]
    Mtls,
    #[serde(rename = "IAM Role")]
    IamRole,
    #[serde(rename = "Basic Auth")]
    BasicAuth,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthMethod::None => "None",
            AuthMethod::ApiKey => "API Key",
            AuthMethod::Jwt => "JWT",
            AuthMethod::OAuth2 => "OAuth2",
            AuthMethod::Mtls => "mTLS",
            AuthMethod::IamRole => "IAM Role",
            AuthMethod::BasicAuth => "Basic Auth",
        }
    }
}

/// Transport encryption on a data flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encryption {
    #[serde(rename = "None", alias = "none")]
    None,
    #[serde(rename = "TLS 1.0/1.1")]
    Tls10,
    #[serde(rename = "TLS 1.2 (weak ciphers)")]
    Tls12Weak,
    #[serde(rename = "TLS 1.2 (strong)", alias = "TLS 1.2+")]
    Tls12Strong,
    #[serde(rename = "TLS 1.3")]
    Tls13,
}

/// How hard a channel is to intercept
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TlsStrength {
    Plaintext,
    Weak,
    Strong,
}

impl Encryption {
    pub fn as_str(self) -> &'static str {
        match self {
            Encryption::None => "None",
            Encryption::Tls10 => "TLS 1.0/1.1",
            Encryption::Tls12Weak => "TLS 1.2 (weak ciphers)",
            Encryption::Tls12Strong => "TLS 1.2 (strong)",
            Encryption::Tls13 => "TLS 1.3",
        }
    }

    pub fn strength(self) -> TlsStrength {
        match self {
            Encryption::None => TlsStrength::Plaintext,
            Encryption::Tls10 | Encryption::Tls12Weak => TlsStrength::Weak,
            Encryption::Tls12Strong | Encryption::Tls13 => TlsStrength::Strong,
        }
    }
}

/// Which compromised components can use the credential on an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CredScope {
    #[default]
    Shared,
    ServiceBound,
    Vault,
}

impl CredScope {
    pub fn as_str(self) -> &'static str {
        match self {
            CredScope::Shared => "shared",
            CredScope::ServiceBound => "service-bound",
            CredScope::Vault => "vault",
        }
    }
}

/// Network reachability between the endpoints of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkRoute {
    #[default]
    Direct,
    VpcPeering,
    None,
}

impl NetworkRoute {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkRoute::Direct => "direct",
            NetworkRoute::VpcPeering => "vpc-peering",
            NetworkRoute::None => "none",
        }
    }
}

/// Per-node properties; known keys are typed, anything else lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_classification: Option<DataClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposed: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl NodeProps {
    /// Look up a property by its wire key.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        use serde_json::Value;
        match key {
            "auth" => self.auth.map(Value::from),
            "encryption" => self.encryption.map(Value::from),
            "dataClassification" => self
                .data_classification
                .map(|c| Value::from(c.as_str())),
            "role" => self.role.and_then(|r| serde_json::to_value(r).ok()),
            "exposed" => self.exposed.map(Value::from),
            other => self.extra.get(other).filter(|v| !v.is_null()).cloned(),
        }
    }
}

/// A component in the architecture diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust: Option<TrustLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_zone: Option<TrustZone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_priv: Option<IamPrivilege>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compromise_impact: Option<CompromiseImpact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_detector: Option<bool>,
    #[serde(default)]
    pub props: NodeProps,
}

impl Node {
    /// Create a node the way the editor places one: trust, zone, trust zone
    /// and privilege come from the component defaults.
    pub fn new(id: &str, node_type: NodeType) -> Self {
        let def = components::defaults(node_type);
        Self {
            id: id.to_string(),
            node_type,
            label: None,
            zone: Some(def.zone),
            trust: Some(def.trust),
            trust_zone: Some(def.trust_zone),
            iam_priv: Some(def.iam_priv),
            compromise_impact: None,
            is_detector: None,
            props: NodeProps::default(),
        }
    }

    /// A node with nothing but id and type; every other field is left for
    /// normalization to fill.
    pub fn bare(id: &str, node_type: NodeType) -> Self {
        Self {
            id: id.to_string(),
            node_type,
            label: None,
            zone: None,
            trust: None,
            trust_zone: None,
            iam_priv: None,
            compromise_impact: None,
            is_detector: None,
            props: NodeProps::default(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_trust(mut self, trust: TrustLevel) -> Self {
        self.trust = Some(trust);
        self
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn with_trust_zone(mut self, zone: TrustZone) -> Self {
        self.trust_zone = Some(zone);
        self
    }

    pub fn with_privilege(mut self, privilege: IamPrivilege) -> Self {
        self.iam_priv = Some(privilege);
        self
    }

    pub fn with_impact(mut self, impact: CompromiseImpact) -> Self {
        self.compromise_impact = Some(impact);
        self
    }

    pub fn with_props(mut self, props: NodeProps) -> Self {
        self.props = props;
        self
    }

    pub fn with_property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.props.extra.insert(key.to_string(), value.into());
        self
    }

    /// Label if set, otherwise the id.
    pub fn display_name(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.id,
        }
    }

    pub fn trust(&self) -> TrustLevel {
        self.trust
            .unwrap_or_else(|| components::defaults(self.node_type).trust)
    }

    /// Resolved trust zone: declared, else component default.
    pub fn trust_zone(&self) -> TrustZone {
        self.trust_zone
            .unwrap_or_else(|| components::resolve_trust_zone(self.node_type, self.zone))
    }

    pub fn privilege(&self) -> IamPrivilege {
        self.iam_priv
            .unwrap_or_else(|| components::defaults(self.node_type).iam_priv)
    }

    pub fn compromise_impact(&self) -> CompromiseImpact {
        self.compromise_impact.unwrap_or_default()
    }

    pub fn is_detector(&self) -> bool {
        self.is_detector
            .unwrap_or_else(|| components::defaults(self.node_type).is_detector)
    }

    /// iamPriv admin or an admin role in props.
    pub fn is_admin(&self) -> bool {
        self.privilege() == IamPrivilege::Admin || self.props.role == Some(Role::Admin)
    }

    /// Data classification from props; components hold `secret` data when
    /// they sit in the restricted zone or are databases.
    pub fn data_classification(&self) -> DataClass {
        self.props
            .data_classification
            .unwrap_or_else(|| components::default_data_classification(self.node_type, self.trust_zone()))
    }

    /// Top-level attribute by wire key, as the editor would serialize it.
    pub fn attribute(&self, key: &str) -> Option<serde_json::Value> {
        use serde_json::Value;
        match key {
            "id" => Some(Value::from(self.id.as_str())),
            "type" => Some(Value::from(self.node_type.as_str())),
            "label" => self.label.as_deref().map(Value::from),
            "zone" => self.zone.map(|z| Value::from(z.as_str())),
            "trust" => self.trust.map(|t| Value::from(t.as_str())),
            "trustZone" => self.trust_zone.map(|z| Value::from(z.as_str())),
            "iamPriv" => self.iam_priv.map(|p| Value::from(p.as_str())),
            "compromiseImpact" => self
                .compromise_impact
                .and_then(|c| serde_json::to_value(c).ok()),
            "isDetector" => self.is_detector.map(Value::from),
            _ => None,
        }
    }

    /// Props first, then top-level attributes.
    pub fn property(&self, key: &str) -> Option<serde_json::Value> {
        self.props.get(key).or_else(|| self.attribute(key))
    }
}

/// A directed data flow between two components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_class: Option<DataClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<Encryption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_scope: Option<CredScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_route: Option<NetworkRoute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_boundary: Option<String>,
}

impl Edge {
    pub fn new(id: &str, from: &str, to: &str) -> Self {
        Self {
            id: id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            label: None,
            protocol: None,
            data_class: None,
            auth: None,
            encryption: None,
            cred_scope: None,
            network_route: None,
            trust_boundary: None,
        }
    }

    pub fn with_protocol(mut self, protocol: &str) -> Self {
        self.protocol = Some(protocol.to_string());
        self
    }

    pub fn with_data_class(mut self, class: DataClass) -> Self {
        self.data_class = Some(class);
        self
    }

    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_encryption(mut self, encryption: Encryption) -> Self {
        self.encryption = Some(encryption);
        self
    }

    pub fn with_cred_scope(mut self, scope: CredScope) -> Self {
        self.cred_scope = Some(scope);
        self
    }

    pub fn with_network_route(mut self, route: NetworkRoute) -> Self {
        self.network_route = Some(route);
        self
    }

    pub fn with_trust_boundary(mut self, marker: &str) -> Self {
        self.trust_boundary = Some(marker.to_string());
        self
    }

    /// Missing auth counts as none.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self.auth, None | Some(AuthMethod::None))
    }

    /// Missing encryption counts as none.
    pub fn is_unencrypted(&self) -> bool {
        matches!(self.encryption, None | Some(Encryption::None))
    }

    pub fn tls_strength(&self) -> TlsStrength {
        self.encryption
            .map(Encryption::strength)
            .unwrap_or(TlsStrength::Plaintext)
    }

    pub fn cred_scope(&self) -> CredScope {
        self.cred_scope.unwrap_or_default()
    }

    pub fn network_route(&self) -> NetworkRoute {
        self.network_route.unwrap_or_default()
    }

    /// Unclassified flows are treated as public.
    pub fn data_class(&self) -> DataClass {
        self.data_class.unwrap_or(DataClass::Public)
    }

    pub fn protocol_is(&self, protocol: &str) -> bool {
        self.protocol
            .as_deref()
            .is_some_and(|p| p.trim().eq_ignore_ascii_case(protocol))
    }

    /// Any marker other than "No" flags the edge as spanning two domains.
    pub fn crosses_trust_boundary(&self) -> bool {
        self.trust_boundary
            .as_deref()
            .is_some_and(|m| !m.trim().is_empty() && !m.trim().eq_ignore_ascii_case("no"))
    }

    /// Attribute by wire key, rendered as the editor's string value.
    pub fn property(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.clone()),
            "from" => Some(self.from.clone()),
            "to" => Some(self.to.clone()),
            "label" => self.label.clone(),
            "protocol" => self.protocol.clone().filter(|p| !p.is_empty()),
            "dataClass" | "dataClassification" => {
                self.data_class.map(|c| c.as_str().to_string())
            }
            "auth" => self.auth.map(|a| a.as_str().to_string()),
            "encryption" => self.encryption.map(|e| e.as_str().to_string()),
            "credScope" => self.cred_scope.map(|c| c.as_str().to_string()),
            "networkRoute" => self.network_route.map(|r| r.as_str().to_string()),
            "trustBoundary" => self.trust_boundary.clone(),
            _ => None,
        }
    }
}

/// The full architecture model handed over by the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramModel {
    #[serde(default)]
    pub nodes: NodeMap,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl DiagramModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    pub fn add_edge(&mut self, edge: Edge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
