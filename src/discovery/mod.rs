//! Resource discovery
//!
//! Builds the dependency graph for one namespace and lists the projects a
//! graph can be built for. Every call starts from an empty [`Graph`]; nothing
//! is cached between requests.
//!
//! Fetches for the different kinds run concurrently, but records are applied
//! to the graph one kind at a time in [`ResourceKind::collection_order`], so
//! name lookups see every node their collector depends on and the graph has a
//! single writer.

pub mod collectors;

use futures::{StreamExt, stream};
use serde_json::Value;

use crate::graph::Graph;
use crate::kube::{ResourceSource, SourceError};
use crate::models::{NAMESPACES_API, PROJECTS_API, Project, ResourceKind};

/// Default number of kinds fetched at the same time
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Graph and project discovery over a [`ResourceSource`]
pub struct Discovery<S> {
    source: S,
    fetch_concurrency: usize,
}

impl<S: ResourceSource> Discovery<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Set how many kinds may be fetched concurrently (at least one)
    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency.max(1);
        self
    }

    /// Build the cleaned resource graph for `namespace`
    ///
    /// A kind that fails to list is logged and contributes no nodes; the rest
    /// of the graph is still built.
    pub async fn build_graph(&self, namespace: &str) -> Graph {
        let fetched: Vec<(ResourceKind, Vec<Value>)> =
            stream::iter(ResourceKind::collection_order().iter().copied())
                .map(|kind| async move { (kind, self.fetch(kind, namespace).await) })
                .buffered(self.fetch_concurrency)
                .collect()
                .await;

        let mut graph = Graph::new();
        for (kind, records) in &fetched {
            collectors::collect(&mut graph, *kind, records);
            tracing::debug!(
                "Collected {} {} records ({} nodes, {} links so far)",
                records.len(),
                kind,
                graph.node_count(),
                graph.link_count()
            );
        }

        graph.clean();
        tracing::debug!(
            "Graph for namespace {}: {} nodes, {} links",
            namespace,
            graph.node_count(),
            graph.link_count()
        );
        graph
    }

    async fn fetch(&self, kind: ResourceKind, namespace: &str) -> Vec<Value> {
        let Some(api) = kind.api() else {
            return Vec::new();
        };
        match self.source.list(&api, namespace).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Skipping {} in namespace {}: {}", kind, namespace, e);
                Vec::new()
            }
        }
    }

    /// List the projects visible to the client
    ///
    /// Uses the OpenShift projects API and falls back to plain namespaces when
    /// that API is not available.
    pub async fn list_projects(&self) -> Result<Vec<Project>, SourceError> {
        let records = match self.source.list(&PROJECTS_API, "").await {
            Ok(records) => records,
            Err(e) => {
                tracing::debug!("Projects unavailable ({}), listing namespaces instead", e);
                self.source.list(&NAMESPACES_API, "").await?
            }
        };

        Ok(records.iter().filter_map(Project::from_record).collect())
    }
}
