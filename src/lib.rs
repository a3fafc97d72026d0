//! threatcanvas: design-time threat modeling over architecture graphs.
//!
//! A host builds a [`DiagramModel`] of components and data flows, then hands
//! it to an [`Analyzer`]:
//!
//! ```no_run
//! use threatcanvas::{Analyzer, DiagramModel};
//!
//! # fn main() -> threatcanvas::Result<()> {
//! let mut model = DiagramModel::from_json(
//!     r#"{
//!         "nodes": {
//!             "u1": {"id": "u1", "type": "user"},
//!             "a1": {"id": "a1", "type": "api"}
//!         },
//!         "edges": [{"id": "e1", "from": "u1", "to": "a1", "auth": "None"}]
//!     }"#,
//! )?;
//! let mut analyzer = Analyzer::new();
//! let result = analyzer.run(&mut model)?;
//! for threat in &result.threats {
//!     println!("{} {} {:?}", threat.id, threat.name, threat.affected);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Layout:
//!
//! - [`graph`]: model types, normalization, adjacency and traversal
//! - [`rules`]: the built-in STRIDE and OWASP rule library
//! - [`custom`]: declarative custom rules and rule packs
//! - [`attack_paths`]: entry-to-target paths, trust-boundary scan, path rules
//! - [`blast`]: blast-radius simulation from a compromised component
//! - [`analysis`]: the orchestrator, countermeasure register and assessment
//! - [`config`]: per-project `threatcanvas.toml`

pub mod analysis;
pub mod attack_paths;
pub mod blast;
pub mod config;
pub mod custom;
pub mod error;
pub mod graph;
pub mod logging;
pub mod models;
pub mod rules;

pub use analysis::{AnalysisResult, Analyzer, Assessment};
pub use error::{AnalysisError, Result};
pub use graph::{DiagramModel, Edge, Node, NodeType};
pub use models::{Severity, Stride, Threat};
