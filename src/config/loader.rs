//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{paths, schema::Config};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Config file (`path`, or the default location when `None`)
    /// 3. Built-in defaults
    ///
    /// A missing file at the default location is not an error; a missing file
    /// that was asked for explicitly is.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = Config::default();

        match path {
            Some(path) => {
                config = Self::load_file(path)?;
            }
            None => {
                let root = paths::root_config_path();
                if root.exists() {
                    config = Self::load_file(&root)?;
                }
            }
        }

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check a loaded configuration for values the server cannot start with
    pub fn validate(config: &Config) -> Result<()> {
        if config.port == 0 {
            return Err(anyhow::anyhow!("port must be between 1 and 65535"));
        }
        if config.fetch_concurrency == 0 {
            return Err(anyhow::anyhow!("fetchConcurrency must be at least 1"));
        }
        if config.default_namespace.is_empty() {
            return Err(anyhow::anyhow!("defaultNamespace must not be empty"));
        }
        if let Some(docroot) = &config.docroot {
            if !docroot.is_dir() {
                return Err(anyhow::anyhow!(
                    "docroot is not a directory: {}",
                    docroot.display()
                ));
            }
        }
        if let Some(master_url) = &config.master_url {
            url::Url::parse(master_url)
                .with_context(|| format!("masterUrl is not a valid URL: {}", master_url))?;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// `KUBECONFIG` is left to the client, which reads it whenever no explicit
    /// kubeconfig is configured.
    fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(val) = port.parse::<u16>() {
                config.port = val;
            }
        }

        if let Ok(docroot) = std::env::var("DOCROOT") {
            if !docroot.is_empty() {
                config.docroot = Some(PathBuf::from(docroot));
            }
        }

        if let Ok(master_url) = std::env::var("MASTERURL") {
            if !master_url.is_empty() {
                config.master_url = Some(master_url);
            }
        }

        if let Ok(namespace) = std::env::var("KUBE_GRAPH_NAMESPACE") {
            if !namespace.is_empty() {
                config.default_namespace = namespace;
            }
        }

        if let Ok(concurrency) = std::env::var("KUBE_GRAPH_FETCH_CONCURRENCY") {
            if let Ok(val) = concurrency.parse::<usize>() {
                config.fetch_concurrency = val;
            }
        }

        config
    }
}
