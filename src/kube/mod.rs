//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides the
//! [`ResourceSource`] collaborator the discovery driver lists records through.
//!
//! Client configuration is resolved in this order:
//! 1. An explicit kubeconfig file, if one is configured
//! 2. In-cluster config (if running in a pod)
//! 3. KUBECONFIG environment variable
//! 4. ~/.kube/config
//!
//! A configured master URL overrides the API server address of whichever
//! config was loaded.

mod source;

pub use source::{KubeSource, ResourceSource, SourceError};

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;
use url::Url;

/// Initialize and return a Kubernetes client
pub async fn create_client(master_url: Option<&str>, kubeconfig: Option<&Path>) -> Result<Client> {
    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig: {}", path.display()))?;
            tracing::info!("Using kubeconfig {}", path.display());
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .with_context(|| format!("Failed to load kubeconfig: {}", path.display()))?
        }
        None => Config::infer()
            .await
            .context("Could not infer Kubernetes client configuration")?,
    };

    if let Some(master_url) = master_url {
        config.cluster_url = parse_master_url(master_url)?;
        tracing::info!("Using master URL {}", master_url);
    }

    Client::try_from(config).context("Failed to create Kubernetes client")
}

/// Validate a master URL and convert it to the URI type the client expects
fn parse_master_url(master_url: &str) -> Result<http::Uri> {
    let url = Url::parse(master_url)
        .with_context(|| format!("Invalid master URL: {}", master_url))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(anyhow::anyhow!(
            "Master URL must be an http(s) URL with a host: {}",
            master_url
        ));
    }
    url.as_str()
        .parse::<http::Uri>()
        .with_context(|| format!("Invalid master URL: {}", master_url))
}
