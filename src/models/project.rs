//! Discoverable projects/namespaces

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::get_string;

/// Annotation OpenShift stores a project's human readable name under
pub const DISPLAY_NAME_ANNOTATION: &str = "openshift.io/display-name";

/// A project (or plain namespace) a graph can be built for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(rename = "displayname")]
    pub display_name: String,
}

impl Project {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
        }
    }

    /// Build a project from a Project or Namespace record
    ///
    /// Returns `None` when the record has no name.
    pub fn from_record(record: &Value) -> Option<Self> {
        let name = get_string(record, &["metadata", "name"]);
        if name.is_empty() {
            return None;
        }
        let display_name = get_string(
            record,
            &["metadata", "annotations", DISPLAY_NAME_ANNOTATION],
        );
        Some(Self::new(name, display_name))
    }
}
