//! Resource kind definitions
//!
//! One variant per node kind the graph knows about. Each listable kind carries
//! the API coordinates used to fetch it and the short tag used in the
//! serialized graph, so no string literals for kinds leak into the collectors.

use std::fmt;

/// API coordinates for listing one resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiDescriptor {
    /// API group, empty for the core group
    pub group: &'static str,
    pub version: &'static str,
    /// Plural resource name as used in the REST path
    pub plural: &'static str,
    /// Kind as reported in `kind` fields of the API objects
    pub kind: &'static str,
}

impl ApiDescriptor {
    pub const fn new(
        group: &'static str,
        version: &'static str,
        plural: &'static str,
        kind: &'static str,
    ) -> Self {
        Self {
            group,
            version,
            plural,
            kind,
        }
    }

    /// `group/version`, or just `version` for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for ApiDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.plural, self.api_version())
    }
}

/// OpenShift projects, listed cluster-wide
pub const PROJECTS_API: ApiDescriptor =
    ApiDescriptor::new("project.openshift.io", "v1", "projects", "Project");

/// Core namespaces, used when the projects API is not served
pub const NAMESPACES_API: ApiDescriptor = ApiDescriptor::new("", "v1", "namespaces", "Namespace");

/// Enumeration of all graph node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    // Core workloads
    Pod,
    Deployment,
    ReplicaSet,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
    // OpenShift build and deploy resources
    Build,
    BuildConfig,
    DeploymentConfig,
    // Configuration and storage
    ConfigMap,
    Secret,
    PersistentVolumeClaim,
    // Networking
    Service,
    Route,
    EndpointSlice,
    /// Synthesized from build output digests, never listed
    Image,
}

impl ResourceKind {
    /// Short tag used for the `kind` field of serialized nodes
    pub fn tag(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "pod",
            ResourceKind::Deployment => "deployment",
            ResourceKind::ReplicaSet => "replicaset",
            ResourceKind::StatefulSet => "statefulset",
            ResourceKind::DaemonSet => "daemonset",
            ResourceKind::Job => "job",
            ResourceKind::CronJob => "cronjob",
            ResourceKind::Build => "build",
            ResourceKind::BuildConfig => "buildconfig",
            ResourceKind::DeploymentConfig => "deploymentconfig",
            ResourceKind::ConfigMap => "cm",
            ResourceKind::Secret => "secret",
            ResourceKind::PersistentVolumeClaim => "pvc",
            ResourceKind::Service => "svc",
            ResourceKind::Route => "route",
            ResourceKind::EndpointSlice => "endpointslice",
            ResourceKind::Image => "image",
        }
    }

    /// API coordinates, `None` for kinds that are not fetched from the cluster
    pub fn api(&self) -> Option<ApiDescriptor> {
        let api = match self {
            ResourceKind::Pod => ApiDescriptor::new("", "v1", "pods", "Pod"),
            ResourceKind::Deployment => {
                ApiDescriptor::new("apps", "v1", "deployments", "Deployment")
            }
            ResourceKind::ReplicaSet => {
                ApiDescriptor::new("apps", "v1", "replicasets", "ReplicaSet")
            }
            ResourceKind::StatefulSet => {
                ApiDescriptor::new("apps", "v1", "statefulsets", "StatefulSet")
            }
            ResourceKind::DaemonSet => ApiDescriptor::new("apps", "v1", "daemonsets", "DaemonSet"),
            ResourceKind::Job => ApiDescriptor::new("batch", "v1", "jobs", "Job"),
            ResourceKind::CronJob => ApiDescriptor::new("batch", "v1", "cronjobs", "CronJob"),
            ResourceKind::Build => {
                ApiDescriptor::new("build.openshift.io", "v1", "builds", "Build")
            }
            ResourceKind::BuildConfig => {
                ApiDescriptor::new("build.openshift.io", "v1", "buildconfigs", "BuildConfig")
            }
            ResourceKind::DeploymentConfig => ApiDescriptor::new(
                "apps.openshift.io",
                "v1",
                "deploymentconfigs",
                "DeploymentConfig",
            ),
            ResourceKind::ConfigMap => ApiDescriptor::new("", "v1", "configmaps", "ConfigMap"),
            ResourceKind::Secret => ApiDescriptor::new("", "v1", "secrets", "Secret"),
            ResourceKind::PersistentVolumeClaim => ApiDescriptor::new(
                "",
                "v1",
                "persistentvolumeclaims",
                "PersistentVolumeClaim",
            ),
            ResourceKind::Service => ApiDescriptor::new("", "v1", "services", "Service"),
            ResourceKind::Route => {
                ApiDescriptor::new("route.openshift.io", "v1", "routes", "Route")
            }
            ResourceKind::EndpointSlice => {
                ApiDescriptor::new("discovery.k8s.io", "v1", "endpointslices", "EndpointSlice")
            }
            ResourceKind::Image => return None,
        };
        Some(api)
    }

    /// Kind name as it appears in `kind` fields of references (`Service`, `Pod`, ...)
    pub fn api_kind(&self) -> &'static str {
        match self.api() {
            Some(api) => api.kind,
            None => "Image",
        }
    }

    /// Get all resource kinds
    pub fn all() -> &'static [Self] {
        &[
            ResourceKind::Pod,
            ResourceKind::Deployment,
            ResourceKind::ReplicaSet,
            ResourceKind::StatefulSet,
            ResourceKind::DaemonSet,
            ResourceKind::Job,
            ResourceKind::CronJob,
            ResourceKind::Build,
            ResourceKind::BuildConfig,
            ResourceKind::DeploymentConfig,
            ResourceKind::ConfigMap,
            ResourceKind::Secret,
            ResourceKind::PersistentVolumeClaim,
            ResourceKind::Service,
            ResourceKind::Route,
            ResourceKind::EndpointSlice,
            ResourceKind::Image,
        ]
    }

    /// Listable kinds in the order their collectors run
    ///
    /// Kinds that other collectors resolve by name (ConfigMaps, Secrets, PVCs,
    /// images from builds, Services, Pods) come before the kinds that
    /// reference them.
    pub fn collection_order() -> &'static [Self] {
        &[
            ResourceKind::BuildConfig,
            ResourceKind::Build,
            ResourceKind::DeploymentConfig,
            ResourceKind::Deployment,
            ResourceKind::ReplicaSet,
            ResourceKind::StatefulSet,
            ResourceKind::DaemonSet,
            ResourceKind::CronJob,
            ResourceKind::Job,
            ResourceKind::ConfigMap,
            ResourceKind::Secret,
            ResourceKind::PersistentVolumeClaim,
            ResourceKind::Pod,
            ResourceKind::Service,
            ResourceKind::Route,
            ResourceKind::EndpointSlice,
        ]
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
