//! Per-kind collectors
//!
//! Each fetched record becomes one node, plus an edge from every owner listed
//! in its owner references. Some kinds carry further references that are
//! resolved against nodes already in the graph:
//!
//! - Builds produce an `image` node from their output digest
//! - Pods reference images by digest, ConfigMaps and Secrets through `envFrom`
//!   and `env`, and PVCs, ConfigMaps and Secrets through volumes
//! - Routes reference their backend Services
//! - EndpointSlices reference their target Pods
//!
//! A reference that cannot be resolved is skipped. Edges that point at ids
//! which never became nodes are removed later by [`Graph::clean_links`].

use serde_json::Value;

use crate::fields::{get_list, get_owners, get_string, get_value};
use crate::graph::Graph;
use crate::models::ResourceKind;

/// Marker separating an image reference from its digest
const DIGEST_MARKER: &str = "@sha256:";

/// Annotation kubectl stores the full applied manifest under
const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Add every record of `kind` to the graph
pub fn collect(graph: &mut Graph, kind: ResourceKind, records: &[Value]) {
    for record in records {
        add_record(graph, kind, record);
    }
}

/// Add a single record and the edges derived from it
pub fn add_record(graph: &mut Graph, kind: ResourceKind, record: &Value) {
    let uid = get_string(record, &["metadata", "uid"]);
    if uid.is_empty() {
        tracing::debug!("Skipping {} record without uid", kind);
        return;
    }
    let name = get_string(record, &["metadata", "name"]);

    graph.add_node(uid, kind.tag(), name, Some(stored_object(kind, record)));
    add_owner_links(graph, uid, record);

    match kind {
        ResourceKind::Build => link_build_output(graph, uid, record),
        ResourceKind::Pod => link_pod_references(graph, uid, record),
        ResourceKind::Route => link_route_backends(graph, uid, record),
        ResourceKind::EndpointSlice => link_endpoint_targets(graph, uid, record),
        _ => {}
    }
}

/// The copy of a record kept on its node
///
/// `metadata.managedFields` is dropped from every record. Secrets also lose
/// their payload, including the copy kubectl keeps in the last-applied
/// annotation, since the graph is served without authentication.
fn stored_object(kind: ResourceKind, record: &Value) -> Value {
    let mut object = record.clone();
    let Some(fields) = object.as_object_mut() else {
        return object;
    };

    if kind == ResourceKind::Secret {
        fields.remove("data");
        fields.remove("stringData");
    }

    if let Some(metadata) = fields.get_mut("metadata").and_then(Value::as_object_mut) {
        metadata.remove("managedFields");
        if kind == ResourceKind::Secret {
            if let Some(annotations) = metadata
                .get_mut("annotations")
                .and_then(Value::as_object_mut)
            {
                annotations.remove(LAST_APPLIED_ANNOTATION);
            }
        }
    }

    object
}

fn add_owner_links(graph: &mut Graph, uid: &str, record: &Value) {
    for owner in get_owners(record) {
        graph.add_link(owner, uid);
    }
}

/// Image node id for a digest: everything after the last `:`
pub fn image_id(digest: &str) -> &str {
    digest
        .rsplit_once(':')
        .map(|(_, id)| id)
        .unwrap_or(digest)
}

fn link_build_output(graph: &mut Graph, uid: &str, record: &Value) {
    let digest = get_string(record, &["status", "output", "to", "imageDigest"]);
    if digest.is_empty() {
        return;
    }

    let image = image_id(digest);
    if !graph.node_exists(image) {
        graph.add_node(image, ResourceKind::Image.tag(), digest, None);
    }
    graph.add_link(uid, image);
}

fn link_pod_references(graph: &mut Graph, uid: &str, record: &Value) {
    let containers = get_list(record, &["spec", "initContainers"])
        .iter()
        .chain(get_list(record, &["spec", "containers"]));

    for container in containers {
        link_container_image(graph, uid, container);

        for source in get_list(container, &["envFrom"]) {
            link_by_name(
                graph,
                uid,
                ResourceKind::ConfigMap,
                get_string(source, &["configMapRef", "name"]),
            );
            link_by_name(
                graph,
                uid,
                ResourceKind::Secret,
                get_string(source, &["secretRef", "name"]),
            );
        }

        for var in get_list(container, &["env"]) {
            link_by_name(
                graph,
                uid,
                ResourceKind::ConfigMap,
                get_string(var, &["valueFrom", "configMapKeyRef", "name"]),
            );
            link_by_name(
                graph,
                uid,
                ResourceKind::Secret,
                get_string(var, &["valueFrom", "secretKeyRef", "name"]),
            );
        }
    }

    for volume in get_list(record, &["spec", "volumes"]) {
        if let Some((kind, name)) = volume_reference(volume) {
            link_by_name(graph, uid, kind, name);
        }
    }
}

/// Link a container to the image it runs when the image is pinned by digest
///
/// The image node is created by the build collector; if no build produced it
/// the edge dangles and is dropped during cleanup.
fn link_container_image(graph: &mut Graph, uid: &str, container: &Value) {
    let image = get_string(container, &["image"]);
    if let Some(position) = image.rfind(DIGEST_MARKER) {
        let digest = &image[position + DIGEST_MARKER.len()..];
        if !digest.is_empty() {
            graph.add_link(uid, digest);
        }
    }
}

/// The object a pod volume is backed by, checked in order PVC, ConfigMap, Secret
fn volume_reference(volume: &Value) -> Option<(ResourceKind, &str)> {
    [
        (
            ResourceKind::PersistentVolumeClaim,
            get_string(volume, &["persistentVolumeClaim", "claimName"]),
        ),
        (ResourceKind::ConfigMap, get_string(volume, &["configMap", "name"])),
        (ResourceKind::Secret, get_string(volume, &["secret", "secretName"])),
    ]
    .into_iter()
    .find(|(_, name)| !name.is_empty())
}

fn link_route_backends(graph: &mut Graph, uid: &str, record: &Value) {
    let backends = get_value(record, &["spec", "to"])
        .into_iter()
        .chain(get_list(record, &["spec", "alternateBackends"]));
    for backend in backends {
        link_kind_reference(graph, uid, ResourceKind::Service, backend);
    }
}

fn link_endpoint_targets(graph: &mut Graph, uid: &str, record: &Value) {
    for endpoint in get_list(record, &["endpoints"]) {
        if let Some(target) = get_value(endpoint, &["targetRef"]) {
            link_kind_reference(graph, uid, ResourceKind::Pod, target);
        }
    }
}

/// Follow a `{kind, name}` reference when its kind matches `expected`
fn link_kind_reference(graph: &mut Graph, uid: &str, expected: ResourceKind, reference: &Value) {
    if get_string(reference, &["kind"]) != expected.api_kind() {
        return;
    }
    link_by_name(graph, uid, expected, get_string(reference, &["name"]));
}

/// Link `uid` to the node of `kind` called `name`, if there is one
fn link_by_name(graph: &mut Graph, uid: &str, kind: ResourceKind, name: &str) {
    if name.is_empty() {
        return;
    }
    let target = graph.find_resource(kind.tag(), name);
    if target.is_empty() {
        tracing::trace!("No {} named {} for {}", kind, name, uid);
        return;
    }
    graph.add_link(uid, target);
}
