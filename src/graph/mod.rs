//! Resource dependency graph
//!
//! Nodes are Kubernetes resources (or synthesized container images) and links
//! point from owner to owned, or from referencer to referenced. The graph keeps
//! hash indices next to the ordered node/link sequences so collectors can look
//! up ids and names while populating it, and so the two cleanup passes stay
//! linear.
//!
//! Cleanup order is edges first, then nodes. Running [`Graph::clean_nodes`]
//! before [`Graph::clean_links`] would keep ConfigMaps and Secrets alive through
//! edges that are about to be dropped.

use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::models::ResourceKind;

/// A node in the resource graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Resource uid, or the digest suffix for image nodes
    pub id: String,
    /// Short kind tag (`pod`, `cm`, `svc`, ...)
    pub kind: String,
    /// Resource name
    pub name: String,
    /// The full record as fetched from the API server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<Value>,
}

/// A directed edge between two node ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
}

/// Node/link store for one discovery request
#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    /// id -> position in `nodes`
    #[serde(skip)]
    node_index: HashMap<String, usize>,
    /// `kind/name` -> id
    #[serde(skip)]
    name_index: HashMap<String, String>,
    #[serde(skip)]
    link_index: HashSet<(String, String)>,
    #[serde(skip)]
    link_sources: HashSet<String>,
    #[serde(skip)]
    link_targets: HashSet<String>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph
    ///
    /// A second node with an already known id replaces the first one in place,
    /// so the visible sequence never carries the same id twice.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        object: Option<Value>,
    ) {
        let node = Node {
            id: id.into(),
            kind: kind.into(),
            name: name.into(),
            object,
        };

        let key = name_key(&node.kind, &node.name);

        match self.node_index.get(&node.id) {
            Some(&position) => {
                let previous = &self.nodes[position];
                let previous_key = name_key(&previous.kind, &previous.name);
                if self.name_index.get(&previous_key) == Some(&node.id) {
                    self.name_index.remove(&previous_key);
                }
                self.name_index.insert(key, node.id.clone());
                self.nodes[position] = node;
            }
            None => {
                self.name_index.insert(key, node.id.clone());
                self.node_index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    pub fn node_exists(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&position| &self.nodes[position])
    }

    /// Find the id of the node with the given kind tag and name
    ///
    /// Returns an empty string when nothing matches. Callers skip the edge in
    /// that case; the empty string is never a valid id.
    pub fn find_resource(&self, kind: &str, name: &str) -> String {
        self.name_index
            .get(&name_key(kind, name))
            .cloned()
            .unwrap_or_default()
    }

    /// Add a link; re-adding an existing (source, target) pair does nothing
    pub fn add_link(&mut self, source: impl Into<String>, target: impl Into<String>) {
        let (source, target) = (source.into(), target.into());
        if self.link_exists(&source, &target) {
            return;
        }

        self.link_index.insert((source.clone(), target.clone()));
        self.link_sources.insert(source.clone());
        self.link_targets.insert(target.clone());
        self.links.push(Link { source, target });
    }

    pub fn link_exists(&self, source: &str, target: &str) -> bool {
        self.link_index.contains(&(source.to_string(), target.to_string()))
    }

    /// Drop every link whose source or target is not a known node
    pub fn clean_links(&mut self) {
        let node_index = &self.node_index;
        self.links.retain(|link| {
            node_index.contains_key(&link.source) && node_index.contains_key(&link.target)
        });

        self.link_index.clear();
        self.link_sources.clear();
        self.link_targets.clear();
        for link in &self.links {
            self.link_index.insert((link.source.clone(), link.target.clone()));
            self.link_sources.insert(link.source.clone());
            self.link_targets.insert(link.target.clone());
        }
    }

    /// Drop ConfigMaps and Secrets that no link touches
    ///
    /// Must run after [`Graph::clean_links`].
    pub fn clean_nodes(&mut self) {
        let mut removed = Vec::new();
        self.nodes.retain(|node| {
            let auxiliary = node.kind == ResourceKind::ConfigMap.tag()
                || node.kind == ResourceKind::Secret.tag();
            let linked =
                self.link_sources.contains(&node.id) || self.link_targets.contains(&node.id);
            if auxiliary && !linked {
                removed.push((name_key(&node.kind, &node.name), node.id.clone()));
                return false;
            }
            true
        });

        // A surviving node may own the same name key
        for (key, id) in removed {
            if self.name_index.get(&key) == Some(&id) {
                self.name_index.remove(&key);
            }
        }
        self.node_index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.id.clone(), position))
            .collect();
    }

    /// Run both cleanup passes in the required order
    pub fn clean(&mut self) {
        self.clean_links();
        self.clean_nodes();
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Serialize the graph as `{"nodes": [...], "links": [...]}`
    pub fn to_json(&self) -> Value {
        // Only strings and already-parsed JSON values are reachable here.
        serde_json::to_value(self).expect("graph is always serializable")
    }
}

/// Index key for the name lookup; `/` never appears in kind tags or resource names
fn name_key(kind: &str, name: &str) -> String {
    format!("{}/{}", kind, name)
}
