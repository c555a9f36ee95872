//! kube-graph - serves the resource graph of a Kubernetes/OpenShift namespace
//!
//! Lists the workloads, controllers, configuration objects, services and
//! routes of a namespace and returns them as a node/link graph that a
//! force-directed front-end can render.

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use kube_graph::config::{Config, ConfigLoader};
use kube_graph::discovery::Discovery;
use kube_graph::kube::{KubeSource, create_client};
use kube_graph::server::{self, AppState};

/// kube-graph - serves the resource graph of a Kubernetes/OpenShift namespace
#[derive(Parser, Debug)]
#[command(name = "kube-graph", version)]
#[command(about = "Serves the resource graph of a Kubernetes/OpenShift namespace", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// HTTP listener port
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// HTML document root - the bundled front-end is served if not specified
    #[arg(long)]
    docroot: Option<PathBuf>,

    /// Kubernetes master URL - overrides the API server of the loaded client config
    #[arg(long, global = true)]
    master_url: Option<String>,

    /// Path to the kubeconfig file - in-cluster or default config is used if not specified
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Namespace graphed when a request does not name one
    #[arg(long, short = 'n', global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Print the graph of a namespace as JSON and exit
    Graph {
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the visible projects as JSON and exit
    Projects,
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: cli::ConfigSubcommand,
    },
}

impl Args {
    /// Apply command-line flags on top of the loaded configuration
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(docroot) = &self.docroot {
            config.docroot = Some(docroot.clone());
        }
        if let Some(master_url) = &self.master_url {
            config.master_url = Some(master_url.clone());
        }
        if let Some(kubeconfig) = &self.kubeconfig {
            config.kubeconfig = Some(kubeconfig.clone());
        }
        if let Some(namespace) = &self.namespace {
            config.default_namespace = namespace.clone();
        }
        config
    }
}

/// Load the configuration layers and apply the command-line flags on top
fn load_config(args: &Args) -> Result<Config> {
    let config = args.apply_to(
        ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?,
    );
    ConfigLoader::validate(&config).context("Invalid configuration")?;
    tracing::debug!("Configuration loaded: {:?}", config);
    Ok(config)
}

/// Connect to the cluster and set up discovery
async fn connect(config: &Config) -> Result<Discovery<KubeSource>> {
    tracing::debug!("Initializing Kubernetes client");
    let client = create_client(config.master_url.as_deref(), config.kubeconfig.as_deref()).await?;
    Ok(Discovery::new(KubeSource::new(client)).with_fetch_concurrency(config.fetch_concurrency))
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Args::parse();

    cli::init_logging(args.debug);

    match args.command.take() {
        Some(Command::Config { subcommand }) => {
            cli::handle_config_command(subcommand, args.config.as_deref())
        }
        Some(Command::Graph { pretty }) => {
            let config = load_config(&args)?;
            let discovery = connect(&config).await?;
            cli::print_graph(&discovery, &config.default_namespace, pretty).await
        }
        Some(Command::Projects) => {
            let config = load_config(&args)?;
            let discovery = connect(&config).await?;
            cli::print_projects(&discovery).await
        }
        None => {
            let config = load_config(&args)?;
            let discovery = connect(&config).await?;
            let state = AppState::new(discovery, config.default_namespace.clone());
            let router = server::router(state, config.docroot.as_deref());
            server::serve(
                router,
                config.port,
                Duration::from_secs(config.shutdown_timeout_seconds),
            )
            .await
        }
    }
}
