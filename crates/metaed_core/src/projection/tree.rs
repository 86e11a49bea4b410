//! Incrementally updated tree projection of the metamodel graph.
//!
//! # Responsibility
//! - Own display nodes in an append-only arena addressed by `DisplayHandle`.
//! - Keep the element → handle index in step with every splice.
//! - Track expansion state and the current selection.
//!
//! # Invariants
//! - The index is total and injective over projected elements: one handle
//!   per element, and every live non-root node is indexed.
//! - Handles are never reused; a removed slot stays empty until the next
//!   full render.
//! - Only `render` rebuilds the tree; every other operation edits it in place.

use crate::model::classify::{is_classifier, kind_of};
use crate::model::element::{ElementId, ElementKind};
use crate::model::graph::MetaGraph;
use crate::projection::label::{label_for, label_mentions};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable arena address of one display node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayHandle(usize);

impl DisplayHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a display node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    /// Synthetic document root; wraps no element.
    Root,
    Element(ElementKind),
}

/// Projection-layer mirror of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    id: Uuid,
    element: Option<ElementId>,
    kind: DisplayKind,
    label: String,
    children: Vec<DisplayHandle>,
    expanded: bool,
    parent: Option<DisplayHandle>,
}

impl DisplayNode {
    /// Generated identity, stable for the node's lifetime.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mirrored element; `None` for the synthetic root.
    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    pub fn kind(&self) -> DisplayKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn children(&self) -> &[DisplayHandle] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn parent(&self) -> Option<DisplayHandle> {
        self.parent
    }
}

/// Errors from projection edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// Handle does not address a live node.
    NodeNotFound(DisplayHandle),
    /// Element is not present in the graph.
    ElementNotFound(ElementId),
    /// Element already has a display node.
    AlreadyProjected(ElementId),
    /// Element has no display node.
    NotProjected(ElementId),
    /// The synthetic root cannot be removed or moved.
    RootImmutable,
    /// Target parent lies inside the subtree being moved.
    InvalidParent(DisplayHandle),
}

impl Display for ProjectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(handle) => write!(f, "display node not found: #{}", handle.0),
            Self::ElementNotFound(id) => write!(f, "element not found: {id}"),
            Self::AlreadyProjected(id) => write!(f, "element already projected: {id}"),
            Self::NotProjected(id) => write!(f, "element not projected: {id}"),
            Self::RootImmutable => write!(f, "document root node cannot be changed"),
            Self::InvalidParent(handle) => {
                write!(f, "display node #{} cannot take this child", handle.0)
            }
        }
    }
}

impl Error for ProjectionError {}

/// Tree of display nodes plus index, expansion and selection state.
#[derive(Debug, Clone)]
pub struct TreeProjection {
    nodes: Vec<Option<DisplayNode>>,
    index: HashMap<ElementId, DisplayHandle>,
    root: DisplayHandle,
    selection: Option<DisplayHandle>,
}

impl TreeProjection {
    /// Creates a projection holding only the synthetic root.
    pub fn empty(document_label: impl Into<String>) -> Self {
        let root = DisplayNode {
            id: Uuid::new_v4(),
            element: None,
            kind: DisplayKind::Root,
            label: document_label.into(),
            children: Vec::new(),
            expanded: true,
            parent: None,
        };
        Self {
            nodes: vec![Some(root)],
            index: HashMap::new(),
            root: DisplayHandle(0),
            selection: None,
        }
    }

    /// Builds the full projection of `graph` under a synthetic root.
    ///
    /// Only the root starts expanded unless `expand_all` is set.
    pub fn render(graph: &MetaGraph, document_label: impl Into<String>, expand_all: bool) -> Self {
        let mut projection = Self::empty(document_label);
        let root = projection.root;
        projection.project_subtree(graph, root, graph.root(), expand_all);
        debug!(
            "event=projection_render module=projection status=ok nodes={}",
            projection.len()
        );
        projection
    }

    fn project_subtree(
        &mut self,
        graph: &MetaGraph,
        parent: DisplayHandle,
        element: ElementId,
        expanded: bool,
    ) {
        let Some(record) = graph.get(element) else {
            return;
        };
        let handle = self.allocate(parent, element, kind_of(record), label_for(graph, element));
        if let Some(node) = self.node_mut(handle) {
            node.expanded = expanded;
        }
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(handle);
        }
        for child in graph.children(element) {
            self.project_subtree(graph, handle, child, expanded);
        }
    }

    fn allocate(
        &mut self,
        parent: DisplayHandle,
        element: ElementId,
        kind: ElementKind,
        label: String,
    ) -> DisplayHandle {
        let handle = DisplayHandle(self.nodes.len());
        self.nodes.push(Some(DisplayNode {
            id: Uuid::new_v4(),
            element: Some(element),
            kind: DisplayKind::Element(kind),
            label,
            children: Vec::new(),
            expanded: false,
            parent: Some(parent),
        }));
        self.index.insert(element, handle);
        handle
    }

    pub fn root(&self) -> DisplayHandle {
        self.root
    }

    pub fn node(&self, handle: DisplayHandle) -> Option<&DisplayNode> {
        self.nodes.get(handle.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, handle: DisplayHandle) -> Option<&mut DisplayNode> {
        self.nodes.get_mut(handle.0).and_then(Option::as_mut)
    }

    fn require(&self, handle: DisplayHandle) -> Result<&DisplayNode, ProjectionError> {
        self.node(handle).ok_or(ProjectionError::NodeNotFound(handle))
    }

    /// Number of live display nodes, synthetic root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label of the node mirroring `element`.
    pub fn label_of(&self, element: ElementId) -> Option<&str> {
        self.find(element)
            .and_then(|handle| self.node(handle))
            .map(DisplayNode::label)
    }

    /// Looks up the display node of `element` through the index only.
    pub fn indexed(&self, element: ElementId) -> Option<DisplayHandle> {
        self.index
            .get(&element)
            .copied()
            .filter(|handle| self.node(*handle).and_then(DisplayNode::element) == Some(element))
    }

    /// Looks up the display node of `element` without repairing the index.
    pub fn find(&self, element: ElementId) -> Option<DisplayHandle> {
        self.indexed(element).or_else(|| self.search(element))
    }

    /// Looks up the display node of `element`, falling back to a full-tree
    /// search and repairing the index when the search succeeds.
    pub fn handle_of(&mut self, element: ElementId) -> Option<DisplayHandle> {
        if let Some(handle) = self.indexed(element) {
            return Some(handle);
        }
        let found = self.search(element);
        match found {
            Some(handle) => {
                warn!(
                    "event=projection_index_miss module=projection status=repaired handle={}",
                    handle.0
                );
                self.index.insert(element, handle);
            }
            None => {
                debug!("event=projection_lookup module=projection status=miss element={element}");
            }
        }
        found
    }

    fn search(&self, element: ElementId) -> Option<DisplayHandle> {
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if node.element == Some(element) {
                return Some(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    pub fn selection(&self) -> Option<DisplayHandle> {
        self.selection
    }

    pub fn selected_element(&self) -> Option<ElementId> {
        self.selection
            .and_then(|handle| self.node(handle))
            .and_then(DisplayNode::element)
    }

    /// Sets the selection. Returns whether it changed.
    pub fn select(&mut self, handle: Option<DisplayHandle>) -> Result<bool, ProjectionError> {
        if let Some(handle) = handle {
            self.require(handle)?;
        }
        let changed = self.selection != handle;
        self.selection = handle;
        Ok(changed)
    }

    pub fn toggle(&mut self, handle: DisplayHandle) -> Result<bool, ProjectionError> {
        let node = self
            .node_mut(handle)
            .ok_or(ProjectionError::NodeNotFound(handle))?;
        node.expanded = !node.expanded;
        Ok(node.expanded)
    }

    pub fn set_expanded(&mut self, handle: DisplayHandle, expanded: bool) -> Result<(), ProjectionError> {
        let node = self
            .node_mut(handle)
            .ok_or(ProjectionError::NodeNotFound(handle))?;
        node.expanded = expanded;
        Ok(())
    }

    /// Expands `handle` and every node below it.
    pub fn expand_all(&mut self, handle: DisplayHandle) -> Result<(), ProjectionError> {
        self.set_subtree_expanded(handle, true)
    }

    /// Collapses `handle` and every node below it.
    pub fn collapse_all(&mut self, handle: DisplayHandle) -> Result<(), ProjectionError> {
        self.set_subtree_expanded(handle, false)
    }

    fn set_subtree_expanded(&mut self, handle: DisplayHandle, expanded: bool) -> Result<(), ProjectionError> {
        self.require(handle)?;
        for current in self.subtree(handle) {
            if let Some(node) = self.node_mut(current) {
                node.expanded = expanded;
            }
        }
        Ok(())
    }

    /// Pre-order handles of the subtree rooted at `handle`.
    pub fn subtree(&self, handle: DisplayHandle) -> Vec<DisplayHandle> {
        let mut out = Vec::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Pre-order list of visible nodes: descends only into expanded nodes.
    pub fn visible(&self) -> Vec<DisplayHandle> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            if node.expanded {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Depth of `handle` below the synthetic root (root is 0).
    pub fn depth(&self, handle: DisplayHandle) -> usize {
        let mut depth = 0;
        let mut cursor = self.node(handle).and_then(DisplayNode::parent);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.node(parent).and_then(DisplayNode::parent);
        }
        depth
    }

    /// Child position for a new node of `kind` under `parent`.
    ///
    /// Mirrors graph slot order: attributes before references before
    /// operations, classifiers before sub-packages.
    fn insert_position(&self, parent: &DisplayNode, kind: ElementKind) -> usize {
        let stops: &[ElementKind] = match kind {
            ElementKind::Attribute => &[ElementKind::Reference, ElementKind::Operation],
            ElementKind::Reference => &[ElementKind::Operation],
            ElementKind::Class | ElementKind::Enum | ElementKind::Unknown => &[ElementKind::Package],
            _ => &[],
        };
        parent
            .children
            .iter()
            .position(|child| {
                self.node(*child).is_some_and(|node| match node.kind {
                    DisplayKind::Element(child_kind) => stops.contains(&child_kind),
                    DisplayKind::Root => false,
                })
            })
            .unwrap_or(parent.children.len())
    }

    /// Projects one newly created element under `parent`, expands the
    /// parent and selects the new node.
    pub fn insert(
        &mut self,
        graph: &MetaGraph,
        parent: DisplayHandle,
        element: ElementId,
    ) -> Result<DisplayHandle, ProjectionError> {
        let record = graph
            .get(element)
            .ok_or(ProjectionError::ElementNotFound(element))?;
        if self.indexed(element).is_some() {
            return Err(ProjectionError::AlreadyProjected(element));
        }
        let kind = kind_of(record);
        let position = self.insert_position(self.require(parent)?, kind);

        let handle = self.allocate(parent, element, kind, label_for(graph, element));
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.insert(position, handle);
            parent_node.expanded = true;
        }
        self.selection = Some(handle);
        self.relabel_parent_operation(graph, parent);
        Ok(handle)
    }

    /// Removes `handle` and its subtree. Returns the elements that lost
    /// their display node. Clears the selection when it pointed inside.
    pub fn remove(&mut self, handle: DisplayHandle) -> Result<Vec<ElementId>, ProjectionError> {
        let parent = self
            .require(handle)?
            .parent
            .ok_or(ProjectionError::RootImmutable)?;
        let doomed = self.subtree(handle);
        let doomed_set: HashSet<DisplayHandle> = doomed.iter().copied().collect();

        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|child| *child != handle);
        }
        let mut removed = Vec::with_capacity(doomed.len());
        for current in doomed {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                if let Some(element) = node.element {
                    if self.index.get(&element) == Some(&current) {
                        self.index.remove(&element);
                    }
                    removed.push(element);
                }
            }
        }
        if self.selection.is_some_and(|selected| doomed_set.contains(&selected)) {
            self.selection = None;
        }
        Ok(removed)
    }

    /// Moves `handle` under `new_parent` at the kind-specific position.
    pub fn reparent(
        &mut self,
        graph: &MetaGraph,
        handle: DisplayHandle,
        new_parent: DisplayHandle,
    ) -> Result<(), ProjectionError> {
        let node = self.require(handle)?;
        let old_parent = node.parent.ok_or(ProjectionError::RootImmutable)?;
        let kind = match node.kind {
            DisplayKind::Element(kind) => kind,
            DisplayKind::Root => return Err(ProjectionError::RootImmutable),
        };
        self.require(new_parent)?;
        if self.subtree(handle).contains(&new_parent) {
            return Err(ProjectionError::InvalidParent(new_parent));
        }

        if let Some(parent_node) = self.node_mut(old_parent) {
            parent_node.children.retain(|child| *child != handle);
        }
        let position = self.insert_position(self.require(new_parent)?, kind);
        if let Some(parent_node) = self.node_mut(new_parent) {
            parent_node.children.insert(position, handle);
            parent_node.expanded = true;
        }
        if let Some(node) = self.node_mut(handle) {
            node.parent = Some(new_parent);
        }
        self.relabel_parent_operation(graph, old_parent);
        self.relabel_parent_operation(graph, new_parent);
        Ok(())
    }

    /// Recomputes the label of `element`, plus every label that embeds its
    /// name when it is a classifier. Returns the number of labels updated.
    ///
    /// A lookup miss is logged and ignored.
    pub fn relabel(&mut self, graph: &MetaGraph, element: ElementId) -> usize {
        let Some(handle) = self.handle_of(element) else {
            warn!("event=projection_relabel module=projection status=skipped reason=not_projected");
            return 0;
        };
        let mut updated = self.relabel_handle(graph, handle);
        if let Some(parent) = self.node(handle).and_then(DisplayNode::parent) {
            updated += self.relabel_parent_operation(graph, parent);
        }
        let kind = graph.kind_of(element);
        if is_classifier(kind) || kind == ElementKind::Unknown {
            updated += self.relabel_dependents(graph, element);
        }
        updated
    }

    /// Relabels every node whose label embeds the name of `classifier`.
    pub fn relabel_dependents(&mut self, graph: &MetaGraph, classifier: ElementId) -> usize {
        let dependents: Vec<DisplayHandle> = self
            .index
            .iter()
            .filter(|(element, _)| label_mentions(graph, **element, classifier))
            .map(|(_, handle)| *handle)
            .collect();
        dependents
            .into_iter()
            .map(|handle| self.relabel_handle(graph, handle))
            .sum()
    }

    /// Recomputes every label in place without touching structure,
    /// expansion or selection.
    pub fn refresh_labels(&mut self, graph: &MetaGraph) -> usize {
        let handles: Vec<DisplayHandle> = self.index.values().copied().collect();
        handles
            .into_iter()
            .map(|handle| self.relabel_handle(graph, handle))
            .sum()
    }

    fn relabel_handle(&mut self, graph: &MetaGraph, handle: DisplayHandle) -> usize {
        let Some(element) = self.node(handle).and_then(DisplayNode::element) else {
            return 0;
        };
        let label = label_for(graph, element);
        match self.node_mut(handle) {
            Some(node) if node.label != label => {
                node.label = label;
                1
            }
            _ => 0,
        }
    }

    /// Operation labels list their parameters, so parameter edits reach up.
    fn relabel_parent_operation(&mut self, graph: &MetaGraph, parent: DisplayHandle) -> usize {
        match self.node(parent).map(DisplayNode::kind) {
            Some(DisplayKind::Element(ElementKind::Operation)) => self.relabel_handle(graph, parent),
            _ => 0,
        }
    }

    /// Checks that every live node mirrors a live element and that the
    /// index is total and injective. Returns a description of the first
    /// violation.
    pub fn check_consistency(&self, graph: &MetaGraph) -> Result<(), String> {
        let mut seen = HashSet::new();
        for handle in self.subtree(self.root) {
            let Some(node) = self.node(handle) else {
                continue;
            };
            match node.element {
                None if handle == self.root => {}
                None => return Err(format!("node #{} wraps no element", handle.0)),
                Some(element) => {
                    if !graph.contains(element) {
                        return Err(format!("node #{} mirrors a removed element", handle.0));
                    }
                    if !seen.insert(element) {
                        return Err(format!("element {element} projected twice"));
                    }
                    if self.index.get(&element) != Some(&handle) {
                        return Err(format!("index entry for node #{} is stale", handle.0));
                    }
                }
            }
            for child in &node.children {
                if self.node(*child).and_then(DisplayNode::parent) != Some(handle) {
                    return Err(format!("child #{} names another parent", child.0));
                }
            }
        }
        if seen.len() != self.index.len() {
            return Err(format!(
                "index holds {} entries for {} projected nodes",
                self.index.len(),
                seen.len()
            ));
        }
        Ok(())
    }
}
