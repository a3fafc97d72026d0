//! Architecture graph: data model, normalization, adjacency and traversal.

pub mod components;
pub mod context;
pub mod model;
pub mod normalize;
pub mod traversal;

pub use context::AnalysisContext;
pub use model::{
    AuthMethod, CompromiseImpact, CredScope, DataClass, DiagramModel, Edge, Encryption,
    IamPrivilege, NetworkRoute, Node, NodeMap, NodeProps, NodeType, Role, TlsStrength, TrustLevel,
    TrustZone, Zone,
};
pub use normalize::normalize;
pub use traversal::{
    all_paths_bounded, cycle_groups, has_cycle, has_cycle_within, reachable_set, shortest_path,
    trust_boundary_crossings, MAX_PATHS, MAX_PATH_DEPTH,
};
