//! IAM privilege semantics for the blast simulator

use crate::graph::{AnalysisContext, CompromiseImpact, IamPrivilege, Node};

/// Compromise of this node hands over credentials broad enough to ignore
/// per-edge credential scoping.
pub fn is_high_impact(node: &Node) -> bool {
    node.compromise_impact() == CompromiseImpact::High
        || matches!(
            node.privilege(),
            IamPrivilege::Admin | IamPrivilege::NetworkBypass
        )
}

/// Privileges that can read vault-held credentials.
pub fn can_open_vault(privilege: IamPrivilege) -> bool {
    matches!(
        privilege,
        IamPrivilege::Admin | IamPrivilege::AssumeRole | IamPrivilege::NetworkBypass
    )
}

/// Privileges that let an attacker move without a network edge.
pub fn can_escalate(privilege: IamPrivilege) -> bool {
    matches!(
        privilege,
        IamPrivilege::Admin
            | IamPrivilege::AssumeRole
            | IamPrivilege::Write
            | IamPrivilege::NetworkBypass
    )
}

fn is_low_privilege(privilege: IamPrivilege) -> bool {
    matches!(
        privilege,
        IamPrivilege::None | IamPrivilege::ReadOnly | IamPrivilege::Standard
    )
}

/// Can a holder of `source`'s identity take over `target` directly?
///
/// - admin: anything
/// - network-bypass: anything below admin and network-bypass
/// - assumerole: same trust zone, or a low-privilege target
/// - write: same trust zone and a low-privilege target
pub fn can_take_over(source: &Node, target: &Node) -> bool {
    let same_zone = source.trust_zone() == target.trust_zone();
    let target_priv = target.privilege();
    match source.privilege() {
        IamPrivilege::Admin => true,
        IamPrivilege::NetworkBypass => !matches!(
            target_priv,
            IamPrivilege::Admin | IamPrivilege::NetworkBypass
        ),
        IamPrivilege::AssumeRole => same_zone || is_low_privilege(target_priv),
        IamPrivilege::Write => same_zone && is_low_privilege(target_priv),
        _ => false,
    }
}

/// Every other node `source` could take over by privilege alone, in model
/// order.
pub fn escalation_targets<'a>(ctx: &AnalysisContext<'a>, source: &Node) -> Vec<&'a Node> {
    if !can_escalate(source.privilege()) {
        return Vec::new();
    }
    ctx.select(|n| n.id != source.id && can_take_over(source, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, NodeMap, NodeType, TrustZone};

    fn ids(nodes: Vec<&Node>) -> Vec<&str> {
        nodes.into_iter().map(|n| n.id.as_str()).collect()
    }

    fn fleet(source_priv: IamPrivilege) -> NodeMap {
        let mut map = NodeMap::new();
        let nodes = [
            Node::new("src", NodeType::Microservice).with_privilege(source_priv),
            Node::new("peer", NodeType::Api).with_privilege(IamPrivilege::AssumeRole),
            Node::new("low", NodeType::Lambda)
                .with_privilege(IamPrivilege::ReadOnly)
                .with_trust_zone(TrustZone::Restricted),
            Node::new("boss", NodeType::Api)
                .with_privilege(IamPrivilege::Admin)
                .with_trust_zone(TrustZone::Dmz),
            Node::new("db", NodeType::Database),
        ];
        for n in nodes {
            map.insert(n.id.clone(), n);
        }
        map
    }

    fn targets(source_priv: IamPrivilege) -> Vec<String> {
        let map = fleet(source_priv);
        let edges: Vec<Edge> = Vec::new();
        let ctx = AnalysisContext::build(&map, &edges);
        let source = &map["src"];
        ids(escalation_targets(&ctx, source))
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_admin_reaches_everything_else() {
        assert_eq!(targets(IamPrivilege::Admin), vec!["peer", "low", "boss", "db"]);
    }

    #[test]
    fn test_assumerole_same_zone_or_lower() {
        // peer shares the internal zone; low and db hold low privileges
        assert_eq!(targets(IamPrivilege::AssumeRole), vec!["peer", "low", "db"]);
    }

    #[test]
    fn test_write_needs_same_zone_and_lower() {
        assert!(targets(IamPrivilege::Write).is_empty());

        let mut map = fleet(IamPrivilege::Write);
        map.insert(
            "worker".into(),
            Node::new("worker", NodeType::Microservice).with_privilege(IamPrivilege::Standard),
        );
        let edges: Vec<Edge> = Vec::new();
        let ctx = AnalysisContext::build(&map, &edges);
        assert_eq!(ids(escalation_targets(&ctx, &map["src"])), vec!["worker"]);
    }

    #[test]
    fn test_network_bypass_stops_below_admin() {
        assert_eq!(
            targets(IamPrivilege::NetworkBypass),
            vec!["peer", "low", "db"]
        );
    }

    #[test]
    fn test_standard_cannot_escalate() {
        assert!(targets(IamPrivilege::Standard).is_empty());
    }

    #[test]
    fn test_high_impact_and_vault() {
        assert!(is_high_impact(
            &Node::new("n", NodeType::Api).with_impact(CompromiseImpact::High)
        ));
        assert!(is_high_impact(
            &Node::new("n", NodeType::Api).with_privilege(IamPrivilege::NetworkBypass)
        ));
        assert!(!is_high_impact(&Node::new("n", NodeType::Api)));
        assert!(can_open_vault(IamPrivilege::AssumeRole));
        assert!(!can_open_vault(IamPrivilege::Write));
    }
}
