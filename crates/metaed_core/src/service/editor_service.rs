//! Editor session facade exposed to the hosting shell.
//!
//! # Responsibility
//! - Own the graph, its tree projection, naming state and status line.
//! - Route structural actions, property edits and keys through the core
//!   services and keep the projection in step with the graph.
//! - Notify registered observers about selection and status changes.
//!
//! # Invariants
//! - Every graph mutation is mirrored in the projection before the call
//!   returns; the graph/display index never goes stale across calls.
//! - Failed edits and failed loads leave graph and projection unchanged.
//! - Error statuses carry the `Error: ` prefix and stay until replaced.

use crate::config::{ConfigError, EditorConfig};
use crate::model::element::ElementId;
use crate::model::graph::{GraphError, MetaGraph};
use crate::projection::nav::{NavKey, NavOutcome};
use crate::projection::tree::{ProjectionError, TreeProjection};
use crate::repo::document_repo::{CodecError, DocumentCodec};
use crate::service::action_catalog::{
    actions_for, ActionCatalog, ActionKind, ActionOutcome, CatalogError, MenuEntry,
};
use crate::service::property_service::{self, PropertyChange, PropertyError, PropertyValue};
use crate::service::property_sheet::{build_sheet, PropertySheet};
use crate::service::validator::{check_feature_move, ValidationError};
use crate::status::StatusLine;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const DEFAULT_ROOT_NAME: &str = "model";
const DEFAULT_DOCUMENT_LABEL: &str = "untitled";

/// Shell-side listener for session events.
pub trait EditorObserver {
    /// Selection moved; `focus_name_field` asks for inline rename.
    fn selection_changed(&mut self, element: Option<ElementId>, focus_name_field: bool);

    /// Property values of `element` changed and the sheet should reload.
    fn properties_refreshed(&mut self, _element: ElementId) {}

    /// Status text changed; `None` when it was cleared.
    fn status_changed(&mut self, _text: Option<&str>) {}
}

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    Config(ConfigError),
    Graph(GraphError),
    Catalog(CatalogError),
    Property(PropertyError),
    Projection(ProjectionError),
    Codec(CodecError),
    Validation(ValidationError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Graph(err) => write!(f, "{err}"),
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Property(err) => write!(f, "{err}"),
            Self::Projection(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Graph(err) => Some(err),
            Self::Catalog(err) => Some(err),
            Self::Property(err) => Some(err),
            Self::Projection(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<ConfigError> for EditorError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<GraphError> for EditorError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}

impl From<CatalogError> for EditorError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<PropertyError> for EditorError {
    fn from(value: PropertyError) -> Self {
        Self::Property(value)
    }
}

impl From<ProjectionError> for EditorError {
    fn from(value: ProjectionError) -> Self {
        Self::Projection(value)
    }
}

impl From<CodecError> for EditorError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<ValidationError> for EditorError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// One open document: graph, projection and session state.
pub struct EditorSession {
    config: EditorConfig,
    graph: MetaGraph,
    projection: TreeProjection,
    catalog: ActionCatalog,
    status: StatusLine,
    observers: Vec<Box<dyn EditorObserver>>,
    document_label: String,
}

impl EditorSession {
    /// Creates a session over an empty root package.
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        Self::with_graph(config, MetaGraph::new(DEFAULT_ROOT_NAME), DEFAULT_DOCUMENT_LABEL)
    }

    /// Creates a session and renders `graph` under `document_label`.
    pub fn with_graph(
        config: EditorConfig,
        graph: MetaGraph,
        document_label: impl Into<String>,
    ) -> Result<Self, EditorError> {
        config.validate()?;
        let document_label = document_label.into();
        let projection = TreeProjection::render(&graph, document_label.clone(), config.expand_on_render);
        Ok(Self {
            catalog: ActionCatalog::new(config.default_attribute_type.trim()),
            status: StatusLine::new(config.status_clear_delay()),
            config,
            graph,
            projection,
            observers: Vec::new(),
            document_label,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn graph(&self) -> &MetaGraph {
        &self.graph
    }

    pub fn projection(&self) -> &TreeProjection {
        &self.projection
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn document_label(&self) -> &str {
        &self.document_label
    }

    pub fn add_observer(&mut self, observer: Box<dyn EditorObserver>) {
        self.observers.push(observer);
    }

    /// Replaces the document and rebuilds the projection from scratch.
    ///
    /// Resets default-name counters and clears the selection.
    pub fn render(&mut self, graph: MetaGraph, document_label: impl Into<String>) {
        self.document_label = document_label.into();
        self.projection = TreeProjection::render(
            &graph,
            self.document_label.clone(),
            self.config.expand_on_render,
        );
        self.graph = graph;
        self.catalog.reset_counters();
        info!(
            "event=document_render module=editor status=ok elements={} nodes={}",
            self.graph.len(),
            self.projection.len()
        );
        self.notify_selection(None, false);
    }

    /// Parses `text` with `codec` and renders it.
    ///
    /// On failure the current document stays loaded and an error status is
    /// shown.
    pub fn load_document(
        &mut self,
        codec: &dyn DocumentCodec,
        text: &str,
        document_label: impl Into<String>,
    ) -> Result<(), EditorError> {
        let document_label = document_label.into();
        match codec.parse(text) {
            Ok(graph) => {
                self.render(graph, document_label.clone());
                self.set_status(format!("Loaded '{document_label}'"));
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=document_load module=editor status=error format={}",
                    codec.format_name()
                );
                self.set_error_status(&err);
                Err(err.into())
            }
        }
    }

    /// Serializes the current graph with `codec`.
    pub fn save_document(&self, codec: &dyn DocumentCodec) -> Result<String, EditorError> {
        Ok(codec.serialize(&self.graph)?)
    }

    /// Context-menu entries for `element`.
    pub fn actions_for(&self, element: ElementId) -> Vec<MenuEntry> {
        actions_for(&self.graph, element)
    }

    /// Selects the display node of `element`, or clears the selection.
    pub fn select(&mut self, element: Option<ElementId>) -> Result<(), EditorError> {
        let handle = match element {
            Some(element) => Some(
                self.projection
                    .handle_of(element)
                    .ok_or(ProjectionError::NotProjected(element))?,
            ),
            None => None,
        };
        if self.projection.select(handle)? {
            self.notify_selection(element, false);
        }
        Ok(())
    }

    pub fn selected_element(&self) -> Option<ElementId> {
        self.projection.selected_element()
    }

    /// Creates a child of `parent` through an add action.
    pub fn add_child_element(
        &mut self,
        parent: ElementId,
        action: ActionKind,
    ) -> Result<ActionOutcome, EditorError> {
        if action == ActionKind::Delete {
            let kind = self.graph.kind_of(parent);
            return Err(CatalogError::ActionNotPermitted { action, kind }.into());
        }
        self.execute_action(parent, action)
    }

    /// Deletes `element` and its subtree.
    pub fn delete_element(&mut self, element: ElementId) -> Result<ActionOutcome, EditorError> {
        self.execute_action(element, ActionKind::Delete)
    }

    /// Runs one context-menu action and mirrors it in the projection.
    pub fn execute_action(
        &mut self,
        element: ElementId,
        action: ActionKind,
    ) -> Result<ActionOutcome, EditorError> {
        // Resolve the display node before the graph changes.
        let handle = self.projection.handle_of(element);
        if action != ActionKind::Delete && handle.is_none() {
            return Err(ProjectionError::NotProjected(element).into());
        }

        let outcome = self.catalog.execute(&mut self.graph, element, action)?;
        if let Some(created) = outcome.created {
            if let Some(parent) = handle {
                self.projection.insert(&self.graph, parent, created)?;
                self.notify_selection(Some(created), outcome.focus_name_field);
            }
        } else if !outcome.removed.is_empty() {
            let selected_before = self.projection.selection();
            match handle {
                Some(handle) => {
                    self.projection.remove(handle)?;
                }
                None => warn!(
                    "event=projection_remove module=editor status=skipped reason=not_projected"
                ),
            }
            for touched in &outcome.touched {
                self.projection.relabel(&self.graph, *touched);
            }
            if selected_before.is_some() && self.projection.selection().is_none() {
                self.notify_selection(None, false);
            }
        }
        self.set_status(outcome.message.clone());
        Ok(outcome)
    }

    /// Moves `element` under `new_parent` in graph and projection.
    ///
    /// Moving to the current container changes nothing.
    pub fn move_element(&mut self, element: ElementId, new_parent: ElementId) -> Result<(), EditorError> {
        if self.graph.container(element) == Some(new_parent) {
            return Ok(());
        }
        if let Err(err) = check_feature_move(&self.graph, element, new_parent) {
            warn!(
                "event=element_move module=editor status=rejected rule={}",
                err.rule().as_str()
            );
            self.set_error_status(&err);
            return Err(err.into());
        }
        let handle = self
            .projection
            .handle_of(element)
            .ok_or(ProjectionError::NotProjected(element))?;
        let parent_handle = self
            .projection
            .handle_of(new_parent)
            .ok_or(ProjectionError::NotProjected(new_parent))?;
        self.graph.move_element(element, new_parent)?;
        self.projection.reparent(&self.graph, handle, parent_handle)?;
        self.projection.relabel(&self.graph, element);
        debug!(
            "event=element_moved module=editor status=ok kind={}",
            self.graph.kind_of(element)
        );
        Ok(())
    }

    /// Applies one property-sheet edit and refreshes affected labels.
    ///
    /// A rejected edit sets an error status and changes nothing; observers
    /// still get `properties_refreshed` so the sheet drops the edit.
    pub fn update_property(
        &mut self,
        element: ElementId,
        property: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<PropertyChange, EditorError> {
        let change = match property_service::apply(&mut self.graph, element, property, value.into()) {
            Ok(change) => change,
            Err(err) => {
                self.set_error_status(&err);
                for observer in &mut self.observers {
                    observer.properties_refreshed(element);
                }
                return Err(err.into());
            }
        };
        if change.refresh_tree {
            self.projection.refresh_labels(&self.graph);
        } else {
            for id in &change.relabel {
                self.projection.relabel(&self.graph, *id);
            }
        }
        for observer in &mut self.observers {
            observer.properties_refreshed(element);
        }
        Ok(change)
    }

    /// Applies one navigation key; Delete runs the delete action.
    pub fn handle_key(&mut self, key: NavKey) -> Result<NavOutcome, EditorError> {
        let before = self.projection.selected_element();
        let outcome = self.projection.navigate(key);
        match outcome {
            NavOutcome::DeleteRequested(element) => {
                self.delete_element(element)?;
            }
            NavOutcome::Selected(_) => {
                let after = self.projection.selected_element();
                if after != before {
                    self.notify_selection(after, false);
                }
            }
            NavOutcome::Expanded(_) | NavOutcome::Collapsed(_) | NavOutcome::Unchanged => {}
        }
        Ok(outcome)
    }

    /// Property sheet for the current selection.
    pub fn property_sheet(&self) -> PropertySheet {
        build_sheet(&self.graph, self.projection.selected_element())
    }

    /// Expires the status message. Returns `true` when it was cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        let cleared = self.status.tick(now);
        if cleared {
            for observer in &mut self.observers {
                observer.status_changed(None);
            }
        }
        cleared
    }

    fn set_status(&mut self, text: String) {
        self.status.set(text);
        let current = self.status.text();
        for observer in &mut self.observers {
            observer.status_changed(current);
        }
    }

    fn set_error_status(&mut self, err: &dyn Display) {
        self.status.set_error(err);
        let current = self.status.text();
        for observer in &mut self.observers {
            observer.status_changed(current);
        }
    }

    fn notify_selection(&mut self, element: Option<ElementId>, focus_name_field: bool) {
        for observer in &mut self.observers {
            observer.selection_changed(element, focus_name_field);
        }
    }
}
