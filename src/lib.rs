//! kube-graph library
//!
//! Discovers the workload resources of a Kubernetes/OpenShift namespace and
//! assembles them into a node/link graph for visualization. The binary serves
//! that graph over HTTP; the library can be used on its own with any
//! [`kube::ResourceSource`].

pub mod config;
pub mod discovery;
pub mod fields;
pub mod graph;
pub mod kube;
pub mod models;
pub mod server;

// Re-export commonly used types for convenience
pub use discovery::Discovery;
pub use graph::{Graph, Link, Node};
pub use models::{Project, ResourceKind};
