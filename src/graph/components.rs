//! Component catalogue: the defaults a freshly placed component carries.

use super::model::{DataClass, IamPrivilege, NodeType, TrustLevel, TrustZone, Zone};

/// Defaults for one component type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentDefaults {
    pub trust: TrustLevel,
    pub zone: Zone,
    pub trust_zone: TrustZone,
    pub iam_priv: IamPrivilege,
    pub is_detector: bool,
}

const fn def(
    trust: TrustLevel,
    zone: Zone,
    trust_zone: TrustZone,
    iam_priv: IamPrivilege,
    is_detector: bool,
) -> ComponentDefaults {
    ComponentDefaults {
        trust,
        zone,
        trust_zone,
        iam_priv,
        is_detector,
    }
}

pub fn defaults(node_type: NodeType) -> ComponentDefaults {
    use IamPrivilege as P;
    use NodeType::*;
    use TrustLevel as T;
    use TrustZone as TZ;

    match node_type {
        Internet | User => def(T::Untrusted, Zone::Public, TZ::Internet, P::None, false),
        Attacker => def(T::Hostile, Zone::Public, TZ::Internet, P::None, false),
        Firewall | Waf => def(T::Trusted, Zone::Dmz, TZ::Dmz, P::None, true),
        LoadBalancer | Vpn => def(T::Trusted, Zone::Dmz, TZ::Dmz, P::None, false),
        Cdn => def(T::Trusted, Zone::Public, TZ::Internet, P::None, false),
        WebServer | Api | Microservice | Lambda => {
            def(T::Internal, Zone::Private, TZ::Internal, P::Standard, false)
        }
        Database | Cache | Storage => {
            def(T::Restricted, Zone::Isolated, TZ::Restricted, P::None, false)
        }
        MessageQueue => def(T::Internal, Zone::Private, TZ::Internal, P::None, false),
        Idp => def(T::Trusted, Zone::Private, TZ::Internal, P::None, false),
        Siem => def(T::Trusted, Zone::Private, TZ::Internal, P::None, true),
    }
}

/// Trust zone for a node that does not declare one: its canvas zone when
/// placed in one, otherwise the component default.
pub fn resolve_trust_zone(node_type: NodeType, zone: Option<Zone>) -> TrustZone {
    match zone {
        Some(zone) => TrustZone::from(zone),
        None => defaults(node_type).trust_zone,
    }
}

pub fn default_data_classification(node_type: NodeType, trust_zone: TrustZone) -> DataClass {
    if node_type == NodeType::Database {
        return DataClass::Secret;
    }
    match trust_zone {
        TrustZone::Internet => DataClass::Public,
        TrustZone::Dmz | TrustZone::Internal => DataClass::Internal,
        TrustZone::Restricted => DataClass::Secret,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_zone_agrees_with_default_trust_zone() {
        for t in NodeType::ALL {
            let d = defaults(t);
            assert_eq!(TrustZone::from(d.zone), d.trust_zone, "{t}");
        }
    }

    #[test]
    fn test_external_types_are_untrusted() {
        for t in NodeType::ALL.into_iter().filter(|t| t.is_external()) {
            assert!(defaults(t).trust.is_untrusted());
        }
    }

    #[test]
    fn test_resolve_trust_zone_prefers_canvas_zone() {
        assert_eq!(
            resolve_trust_zone(NodeType::Api, Some(Zone::Public)),
            TrustZone::Internet
        );
        assert_eq!(resolve_trust_zone(NodeType::Api, None), TrustZone::Internal);
    }

    #[test]
    fn test_default_data_classification() {
        assert_eq!(
            default_data_classification(NodeType::Database, TrustZone::Dmz),
            DataClass::Secret
        );
        assert_eq!(
            default_data_classification(NodeType::Api, TrustZone::Internet),
            DataClass::Public
        );
        assert_eq!(
            default_data_classification(NodeType::Cache, TrustZone::Restricted),
            DataClass::Secret
        );
    }
}
