//! Configuration system for kube-graph
//!
//! Layers built-in defaults, a YAML config file and environment variables.
//! Command-line flags are applied on top by the binary.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::Config;
