//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP listener port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTML document root; the bundled front-end is served when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docroot: Option<PathBuf>,

    /// Kubernetes master URL, overriding the one from the loaded client config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_url: Option<String>,

    /// Path to a kubeconfig file; in-cluster/default config is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,

    /// Namespace graphed when a request does not name one
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Number of resource kinds fetched concurrently per graph
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Seconds to wait for in-flight requests on shutdown
    #[serde(default = "default_shutdown_timeout_seconds")]
    pub shutdown_timeout_seconds: u64,
}

// Default value functions
fn default_port() -> u16 {
    8080
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_fetch_concurrency() -> usize {
    crate::discovery::DEFAULT_FETCH_CONCURRENCY
}

fn default_shutdown_timeout_seconds() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            docroot: None,
            master_url: None,
            kubeconfig: None,
            default_namespace: default_namespace(),
            fetch_concurrency: default_fetch_concurrency(),
            shutdown_timeout_seconds: default_shutdown_timeout_seconds(),
        }
    }
}
