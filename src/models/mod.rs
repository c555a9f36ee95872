//! Model layer
//!
//! Resource kinds the graph understands and the project listing type.

mod project;
mod resource_kind;

pub use project::{DISPLAY_NAME_ANNOTATION, Project};
pub use resource_kind::{ApiDescriptor, NAMESPACES_API, PROJECTS_API, ResourceKind};
