//! CLI command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::Path;

use kube_graph::config::{ConfigLoader, paths};
use kube_graph::discovery::Discovery;
use kube_graph::kube::ResourceSource;

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Show configuration file path
    Path,
    /// Print the effective configuration
    Show,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand, config_file: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Path => {
            let config_path = config_file
                .map(Path::to_path_buf)
                .unwrap_or_else(paths::root_config_path);
            println!("{}", config_path.display());
        }
        ConfigSubcommand::Show => {
            let config =
                ConfigLoader::load(config_file).context("Failed to load configuration")?;
            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Validate => {
            let result = ConfigLoader::load(config_file)
                .and_then(|config| ConfigLoader::validate(&config));
            match result {
                Ok(()) => {
                    println!("Configuration is valid");
                }
                Err(e) => {
                    eprintln!("Configuration validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Build one graph and print it to stdout as JSON
pub async fn print_graph<S: ResourceSource>(
    discovery: &Discovery<S>,
    namespace: &str,
    pretty: bool,
) -> Result<()> {
    let graph = discovery.build_graph(namespace).await;
    let json = if pretty {
        serde_json::to_string_pretty(&graph)
    } else {
        serde_json::to_string(&graph)
    }
    .context("Failed to serialize graph")?;
    println!("{}", json);
    Ok(())
}

/// Print the visible projects to stdout as JSON
pub async fn print_projects<S: ResourceSource>(discovery: &Discovery<S>) -> Result<()> {
    let projects = discovery
        .list_projects()
        .await
        .context("Failed to list projects")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&projects).context("Failed to serialize projects")?
    );
    Ok(())
}
