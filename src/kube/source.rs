//! Resource listing collaborator
//!
//! The discovery driver never talks to `kube` directly; it goes through
//! [`ResourceSource`], which returns every record of one API resource type as
//! a JSON tree. [`KubeSource`] is the implementation backed by a live cluster.

use async_trait::async_trait;
use kube::api::{Api, ListParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use serde_json::Value;
use thiserror::Error;

use crate::models::ApiDescriptor;

/// Errors returned while listing resources
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to list {api}: {source}")]
    List {
        api: ApiDescriptor,
        #[source]
        source: kube::Error,
    },
    #[error("failed to decode {api} record: {source}")]
    Decode {
        api: ApiDescriptor,
        #[source]
        source: serde_json::Error,
    },
}

/// Lists resource records
#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// List every record of `api` in `namespace`; an empty namespace lists
    /// cluster-wide
    async fn list(&self, api: &ApiDescriptor, namespace: &str) -> Result<Vec<Value>, SourceError>;
}

/// [`ResourceSource`] backed by the Kubernetes dynamic API
#[derive(Clone)]
pub struct KubeSource {
    client: kube::Client,
}

impl KubeSource {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSource for KubeSource {
    async fn list(&self, api: &ApiDescriptor, namespace: &str) -> Result<Vec<Value>, SourceError> {
        let gvk = GroupVersionKind::gvk(api.group, api.version, api.kind);
        let resource = ApiResource::from_gvk_with_plural(&gvk, api.plural);
        let dynamic: Api<DynamicObject> = if namespace.is_empty() {
            Api::all_with(self.client.clone(), &resource)
        } else {
            Api::namespaced_with(self.client.clone(), namespace, &resource)
        };

        let list = dynamic
            .list(&ListParams::default())
            .await
            .map_err(|source| SourceError::List { api: *api, source })?;

        list.items
            .iter()
            .map(|item| {
                serde_json::to_value(item)
                    .map_err(|source| SourceError::Decode { api: *api, source })
            })
            .collect()
    }
}
