//! Core of the metamodel structural editor.
//! Owns the element graph, its tree projection and every edit invariant;
//! hosts only render the projection and forward user input.

pub mod config;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;
pub mod status;

pub use config::{ConfigError, EditorConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::classify::kind_of;
pub use model::element::{
    Element, ElementData, ElementId, ElementKind, FeatureFlags, Multiplicity, TypeRef,
    UNBOUNDED,
};
pub use model::graph::{GraphError, GraphResult, MetaGraph};
pub use projection::nav::{NavKey, NavOutcome};
pub use projection::tree::{DisplayHandle, DisplayKind, DisplayNode, ProjectionError, TreeProjection};
pub use repo::document_repo::{CodecError, DocumentCodec, JsonDocumentCodec};
pub use service::action_catalog::{ActionCatalog, ActionKind, ActionOutcome, CatalogError, MenuEntry};
pub use service::editor_service::{EditorError, EditorObserver, EditorSession};
pub use service::property_service::{Property, PropertyChange, PropertyError, PropertyValue};
pub use service::property_sheet::{PropertyField, PropertySheet};
pub use service::validator::{ValidationError, ValidationRule};
pub use status::StatusLine;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
