//! In-memory metamodel graph.
//!
//! # Responsibility
//! - Own element records keyed by stable `ElementId`.
//! - Provide ordered containment slots, container lookup and typed setters.
//! - Keep Reference opposites symmetric through a single mutation path.
//!
//! # Invariants
//! - Every non-root element has exactly one container, and the container's
//!   slot lists it exactly once.
//! - `set_opposite` is the only code that writes an opposite slot, so
//!   `a.opposite == b` implies `b.opposite == a`.
//! - Removing an element removes its whole subtree and clears every
//!   cross-reference into it.

use crate::model::classify::{kind_of, kind_of_data};
use crate::model::element::{
    Element, ElementData, ElementId, ElementKind, FeatureFlags, Multiplicity, TypeRef,
};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors from graph reads and mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Element id is not present in the graph.
    ElementNotFound(ElementId),
    /// Element exists but the operation needs another kind.
    WrongKind {
        id: ElementId,
        expected: &'static str,
        found: ElementKind,
    },
    /// Parent kind has no slot for the child kind.
    InvalidContainment {
        parent: ElementKind,
        child: ElementKind,
    },
    /// Moving the element would place it inside its own subtree.
    ContainmentCycle {
        element: ElementId,
        parent: ElementId,
    },
    /// Element has no container (document root).
    NoContainer(ElementId),
    /// The document root cannot be removed.
    RootNotRemovable,
    /// Loaded data breaks a structural invariant.
    Integrity(String),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElementNotFound(id) => write!(f, "element not found: {id}"),
            Self::WrongKind {
                id,
                expected,
                found,
            } => write!(f, "element {id} must be {expected}, found {found}"),
            Self::InvalidContainment { parent, child } => {
                write!(f, "{parent} cannot contain {child}")
            }
            Self::ContainmentCycle { element, parent } => write!(
                f,
                "moving {element} under {parent} would create a containment cycle"
            ),
            Self::NoContainer(id) => write!(f, "element has no container: {id}"),
            Self::RootNotRemovable => write!(f, "document root cannot be removed"),
            Self::Integrity(message) => write!(f, "graph integrity violation: {message}"),
        }
    }
}

impl Error for GraphError {}

/// Ordered multi-valued containment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Classifiers,
    Subpackages,
    Attributes,
    References,
    Operations,
    Parameters,
    Literals,
}

/// Returns the slot a child of `child` kind occupies inside `parent`.
pub fn slot_for(parent: ElementKind, child: ElementKind) -> Option<Slot> {
    match (parent, child) {
        (ElementKind::Package, ElementKind::Class | ElementKind::Enum | ElementKind::Unknown) => {
            Some(Slot::Classifiers)
        }
        (ElementKind::Package, ElementKind::Package) => Some(Slot::Subpackages),
        (ElementKind::Class, ElementKind::Attribute) => Some(Slot::Attributes),
        (ElementKind::Class, ElementKind::Reference) => Some(Slot::References),
        (ElementKind::Class, ElementKind::Operation) => Some(Slot::Operations),
        (ElementKind::Operation, ElementKind::Parameter) => Some(Slot::Parameters),
        (ElementKind::Enum, ElementKind::EnumLiteral) => Some(Slot::Literals),
        _ => None,
    }
}

fn slot_items(data: &ElementData, slot: Slot) -> Option<&Vec<ElementId>> {
    match (data, slot) {
        (ElementData::Package(p), Slot::Classifiers) => Some(&p.classifiers),
        (ElementData::Package(p), Slot::Subpackages) => Some(&p.subpackages),
        (ElementData::Class(c), Slot::Attributes) => Some(&c.attributes),
        (ElementData::Class(c), Slot::References) => Some(&c.references),
        (ElementData::Class(c), Slot::Operations) => Some(&c.operations),
        (ElementData::Operation(o), Slot::Parameters) => Some(&o.parameters),
        (ElementData::Enum(e), Slot::Literals) => Some(&e.literals),
        _ => None,
    }
}

fn slot_items_mut(data: &mut ElementData, slot: Slot) -> Option<&mut Vec<ElementId>> {
    match (data, slot) {
        (ElementData::Package(p), Slot::Classifiers) => Some(&mut p.classifiers),
        (ElementData::Package(p), Slot::Subpackages) => Some(&mut p.subpackages),
        (ElementData::Class(c), Slot::Attributes) => Some(&mut c.attributes),
        (ElementData::Class(c), Slot::References) => Some(&mut c.references),
        (ElementData::Class(c), Slot::Operations) => Some(&mut c.operations),
        (ElementData::Operation(o), Slot::Parameters) => Some(&mut o.parameters),
        (ElementData::Enum(e), Slot::Literals) => Some(&mut e.literals),
        _ => None,
    }
}

fn typed_slots_mut(data: &mut ElementData) -> Option<(&mut Option<TypeRef>, &mut Multiplicity)> {
    match data {
        ElementData::Attribute(d) => Some((&mut d.e_type, &mut d.multiplicity)),
        ElementData::Reference(d) => Some((&mut d.e_type, &mut d.multiplicity)),
        ElementData::Operation(d) => Some((&mut d.e_type, &mut d.multiplicity)),
        ElementData::Parameter(d) => Some((&mut d.e_type, &mut d.multiplicity)),
        _ => None,
    }
}

/// Outcome of removing one element subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedSubtree {
    /// Former container of the removed element.
    pub container: ElementId,
    /// Removed element ids, subtree root first.
    pub removed: Vec<ElementId>,
    /// Surviving elements whose data changed during cleanup.
    pub touched: Vec<ElementId>,
}

/// Id-keyed store of metamodel elements rooted at one Package.
#[derive(Debug, Clone)]
pub struct MetaGraph {
    root: ElementId,
    elements: HashMap<ElementId, Element>,
}

impl MetaGraph {
    /// Creates a graph holding only the document root Package.
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = Uuid::new_v4();
        let mut elements = HashMap::new();
        elements.insert(
            root,
            Element {
                id: root,
                container: None,
                name: root_name.into(),
                data: ElementData::package(),
            },
        );
        Self { root, elements }
    }

    /// Rebuilds a graph from loaded records and checks its invariants.
    pub fn from_elements(root: ElementId, elements: Vec<Element>) -> GraphResult<Self> {
        let mut map = HashMap::with_capacity(elements.len());
        for element in elements {
            let id = element.id;
            if map.insert(id, element).is_some() {
                return Err(GraphError::Integrity(format!("duplicate element id {id}")));
            }
        }
        let graph = Self {
            root,
            elements: map,
        };
        graph.check_integrity()?;
        Ok(graph)
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Loads one element or reports it missing.
    pub fn require(&self, id: ElementId) -> GraphResult<&Element> {
        self.elements.get(&id).ok_or(GraphError::ElementNotFound(id))
    }

    fn get_mut(&mut self, id: ElementId) -> GraphResult<&mut Element> {
        self.elements
            .get_mut(&id)
            .ok_or(GraphError::ElementNotFound(id))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Kind of one element; `Unknown` when absent.
    pub fn kind_of(&self, id: ElementId) -> ElementKind {
        self.elements
            .get(&id)
            .map_or(ElementKind::Unknown, kind_of)
    }

    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.elements.get(&id).map(|element| element.name.as_str())
    }

    pub fn container(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id).and_then(|element| element.container)
    }

    /// Contained children in display order.
    ///
    /// Packages list classifiers before sub-packages; classes list
    /// attributes, then references, then operations.
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        let Some(element) = self.elements.get(&id) else {
            return Vec::new();
        };
        match &element.data {
            ElementData::Package(p) => p
                .classifiers
                .iter()
                .chain(p.subpackages.iter())
                .copied()
                .collect(),
            ElementData::Class(c) => c
                .attributes
                .iter()
                .chain(c.references.iter())
                .chain(c.operations.iter())
                .copied()
                .collect(),
            ElementData::Operation(o) => o.parameters.clone(),
            ElementData::Enum(e) => e.literals.clone(),
            _ => Vec::new(),
        }
    }

    /// Pre-order walk of the subtree rooted at `id`, including `id`.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.elements.contains_key(&current) || !visited.insert(current) {
                continue;
            }
            out.push(current);
            let children = self.children(current);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// All elements reachable from the root, in document order.
    pub fn in_document_order(&self) -> Vec<&Element> {
        self.descendants(self.root)
            .into_iter()
            .filter_map(|id| self.elements.get(&id))
            .collect()
    }

    /// First classifier (Class, Enum or opaque) with `name`, in document order.
    pub fn find_classifier(&self, name: &str) -> Option<ElementId> {
        self.in_document_order()
            .into_iter()
            .find(|element| {
                element.name == name
                    && matches!(
                        element.data,
                        ElementData::Class(_) | ElementData::Enum(_) | ElementData::Opaque { .. }
                    )
            })
            .map(|element| element.id)
    }

    pub fn super_types(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(&id)
            .and_then(Element::as_class)
            .map(|class| class.super_types.as_slice())
            .unwrap_or_default()
    }

    pub fn e_type(&self, id: ElementId) -> Option<&TypeRef> {
        self.elements
            .get(&id)
            .and_then(|element| element.data.e_type())
    }

    pub fn multiplicity(&self, id: ElementId) -> Option<Multiplicity> {
        self.elements
            .get(&id)
            .and_then(|element| element.data.multiplicity())
    }

    pub fn opposite(&self, id: ElementId) -> Option<ElementId> {
        self.elements
            .get(&id)
            .and_then(Element::as_reference)
            .and_then(|reference| reference.opposite)
    }

    pub fn is_containment(&self, id: ElementId) -> bool {
        self.elements
            .get(&id)
            .and_then(Element::as_reference)
            .is_some_and(|reference| reference.containment)
    }

    pub fn flags(&self, id: ElementId) -> Option<FeatureFlags> {
        match &self.elements.get(&id)?.data {
            ElementData::Attribute(d) => Some(d.flags),
            ElementData::Reference(d) => Some(d.flags),
            _ => None,
        }
    }

    /// Creates one element and links it into the matching slot of `parent`.
    pub fn add_child(
        &mut self,
        parent: ElementId,
        name: impl Into<String>,
        data: ElementData,
    ) -> GraphResult<ElementId> {
        let parent_kind = kind_of(self.require(parent)?);
        let child_kind = kind_of_data(&data);
        let slot = slot_for(parent_kind, child_kind).ok_or(GraphError::InvalidContainment {
            parent: parent_kind,
            child: child_kind,
        })?;

        let id = Uuid::new_v4();
        self.elements.insert(
            id,
            Element {
                id,
                container: None,
                name: name.into(),
                data,
            },
        );
        self.attach(parent, id, slot)?;
        debug!(
            "event=element_linked module=graph status=ok parent_kind={} child_kind={}",
            parent_kind, child_kind
        );
        Ok(id)
    }

    fn attach(&mut self, parent: ElementId, child: ElementId, slot: Slot) -> GraphResult<()> {
        let parent_element = self.get_mut(parent)?;
        let parent_kind = kind_of(parent_element);
        let items = slot_items_mut(&mut parent_element.data, slot).ok_or(
            GraphError::InvalidContainment {
                parent: parent_kind,
                child: ElementKind::Unknown,
            },
        )?;
        if !items.contains(&child) {
            items.push(child);
        }
        self.get_mut(child)?.container = Some(parent);
        Ok(())
    }

    /// Removes `child` from its container's slot and returns the container.
    fn detach(&mut self, child: ElementId) -> GraphResult<ElementId> {
        let element = self.require(child)?;
        let child_kind = kind_of(element);
        let container = element.container.ok_or(GraphError::NoContainer(child))?;
        let container_kind = self.kind_of(container);
        let slot = slot_for(container_kind, child_kind).ok_or(GraphError::InvalidContainment {
            parent: container_kind,
            child: child_kind,
        })?;
        if let Some(items) = slot_items_mut(&mut self.get_mut(container)?.data, slot) {
            items.retain(|item| *item != child);
        }
        self.get_mut(child)?.container = None;
        Ok(container)
    }

    /// Reparents one element, appending it to the matching slot of `new_parent`.
    pub fn move_element(&mut self, element: ElementId, new_parent: ElementId) -> GraphResult<()> {
        let child_kind = kind_of(self.require(element)?);
        let parent_kind = kind_of(self.require(new_parent)?);
        let slot = slot_for(parent_kind, child_kind).ok_or(GraphError::InvalidContainment {
            parent: parent_kind,
            child: child_kind,
        })?;
        if self.container(element).is_none() {
            return Err(GraphError::NoContainer(element));
        }
        if self.descendants(element).contains(&new_parent) {
            return Err(GraphError::ContainmentCycle {
                element,
                parent: new_parent,
            });
        }
        if self.container(element) == Some(new_parent) {
            return Ok(());
        }
        self.detach(element)?;
        self.attach(new_parent, element, slot)
    }

    /// Removes `id` and its subtree, cleaning up references into it.
    pub fn remove_subtree(&mut self, id: ElementId) -> GraphResult<RemovedSubtree> {
        self.require(id)?;
        if id == self.root {
            return Err(GraphError::RootNotRemovable);
        }
        let removed = self.descendants(id);
        let removed_set: HashSet<ElementId> = removed.iter().copied().collect();
        let container = self.detach(id)?;
        let mut touched = vec![container];

        for removed_id in &removed {
            if let Some(partner) = self.opposite(*removed_id) {
                if !removed_set.contains(&partner) {
                    self.set_opposite(*removed_id, None)?;
                    touched.push(partner);
                }
            }
        }

        for element in self.elements.values_mut() {
            if removed_set.contains(&element.id) {
                continue;
            }
            let mut changed = false;
            if let ElementData::Class(class) = &mut element.data {
                let before = class.super_types.len();
                class.super_types.retain(|s| !removed_set.contains(s));
                changed |= before != class.super_types.len();
            }
            if let Some((e_type, _)) = typed_slots_mut(&mut element.data) {
                let dangling = e_type
                    .as_ref()
                    .and_then(TypeRef::classifier)
                    .is_some_and(|target| removed_set.contains(&target));
                if dangling {
                    *e_type = None;
                    changed = true;
                }
            }
            if changed {
                touched.push(element.id);
            }
        }

        for removed_id in &removed {
            self.elements.remove(removed_id);
        }
        touched.sort();
        touched.dedup();
        Ok(RemovedSubtree {
            container,
            removed,
            touched,
        })
    }

    pub fn set_name(&mut self, id: ElementId, name: impl Into<String>) -> GraphResult<()> {
        self.get_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_ns_uri(&mut self, id: ElementId, ns_uri: impl Into<String>) -> GraphResult<()> {
        match &mut self.get_mut(id)?.data {
            ElementData::Package(p) => {
                p.ns_uri = ns_uri.into();
                Ok(())
            }
            other => Err(wrong_kind(id, "Package", other)),
        }
    }

    pub fn set_ns_prefix(
        &mut self,
        id: ElementId,
        ns_prefix: impl Into<String>,
    ) -> GraphResult<()> {
        match &mut self.get_mut(id)?.data {
            ElementData::Package(p) => {
                p.ns_prefix = ns_prefix.into();
                Ok(())
            }
            other => Err(wrong_kind(id, "Package", other)),
        }
    }

    pub fn set_abstract(&mut self, id: ElementId, value: bool) -> GraphResult<()> {
        match &mut self.get_mut(id)?.data {
            ElementData::Class(c) => {
                c.is_abstract = value;
                Ok(())
            }
            other => Err(wrong_kind(id, "Class", other)),
        }
    }

    pub fn set_interface(&mut self, id: ElementId, value: bool) -> GraphResult<()> {
        match &mut self.get_mut(id)?.data {
            ElementData::Class(c) => {
                c.is_interface = value;
                Ok(())
            }
            other => Err(wrong_kind(id, "Class", other)),
        }
    }

    /// Replaces the super-type list. Cycle checks belong to the caller.
    pub fn set_super_types(&mut self, id: ElementId, super_types: Vec<ElementId>) -> GraphResult<()> {
        for super_type in &super_types {
            let kind = self.kind_of(*super_type);
            if kind != ElementKind::Class {
                return Err(GraphError::WrongKind {
                    id: *super_type,
                    expected: "Class",
                    found: kind,
                });
            }
        }
        match &mut self.get_mut(id)?.data {
            ElementData::Class(c) => {
                c.super_types = super_types;
                Ok(())
            }
            other => Err(wrong_kind(id, "Class", other)),
        }
    }

    pub fn set_type(&mut self, id: ElementId, e_type: Option<TypeRef>) -> GraphResult<()> {
        if let Some(target) = e_type.as_ref().and_then(TypeRef::classifier) {
            self.require(target)?;
        }
        let element = self.get_mut(id)?;
        let found = kind_of(element);
        match typed_slots_mut(&mut element.data) {
            Some((slot, _)) => {
                *slot = e_type;
                Ok(())
            }
            None => Err(GraphError::WrongKind {
                id,
                expected: "a typed element",
                found,
            }),
        }
    }

    pub fn set_multiplicity(&mut self, id: ElementId, multiplicity: Multiplicity) -> GraphResult<()> {
        let element = self.get_mut(id)?;
        let found = kind_of(element);
        match typed_slots_mut(&mut element.data) {
            Some((_, slot)) => {
                *slot = multiplicity;
                Ok(())
            }
            None => Err(GraphError::WrongKind {
                id,
                expected: "a typed element",
                found,
            }),
        }
    }

    pub fn set_containment(&mut self, id: ElementId, containment: bool) -> GraphResult<()> {
        match &mut self.get_mut(id)?.data {
            ElementData::Reference(r) => {
                r.containment = containment;
                Ok(())
            }
            other => Err(wrong_kind(id, "Reference", other)),
        }
    }

    pub fn set_flags(&mut self, id: ElementId, flags: FeatureFlags) -> GraphResult<()> {
        match &mut self.get_mut(id)?.data {
            ElementData::Attribute(d) => {
                d.flags = flags;
                Ok(())
            }
            ElementData::Reference(d) => {
                d.flags = flags;
                Ok(())
            }
            other => Err(wrong_kind(id, "Attribute or Reference", other)),
        }
    }

    pub fn set_literal(&mut self, id: ElementId, literal: impl Into<String>) -> GraphResult<()> {
        match &mut self.get_mut(id)?.data {
            ElementData::EnumLiteral(l) => {
                l.literal = literal.into();
                Ok(())
            }
            other => Err(wrong_kind(id, "Enum Literal", other)),
        }
    }

    pub fn set_literal_value(&mut self, id: ElementId, value: i32) -> GraphResult<()> {
        match &mut self.get_mut(id)?.data {
            ElementData::EnumLiteral(l) => {
                l.value = value;
                Ok(())
            }
            other => Err(wrong_kind(id, "Enum Literal", other)),
        }
    }

    /// Pairs `reference` with `other`, or unpairs it when `other` is `None`.
    ///
    /// Any previous partner of either side is unpaired first. Returns the
    /// references that lost their partner as a side effect.
    pub fn set_opposite(
        &mut self,
        reference: ElementId,
        other: Option<ElementId>,
    ) -> GraphResult<Vec<ElementId>> {
        self.require_reference(reference)?;
        if let Some(other) = other {
            self.require_reference(other)?;
        }

        let mut unpaired = Vec::new();
        if let Some(previous) = self.opposite(reference) {
            if previous != reference {
                self.write_opposite(previous, None)?;
                unpaired.push(previous);
            }
        }
        self.write_opposite(reference, None)?;

        if let Some(other) = other {
            if let Some(previous) = self.opposite(other) {
                if previous != reference && previous != other {
                    self.write_opposite(previous, None)?;
                    unpaired.push(previous);
                }
            }
            self.write_opposite(reference, Some(other))?;
            self.write_opposite(other, Some(reference))?;
        }
        unpaired.retain(|id| Some(*id) != other);
        Ok(unpaired)
    }

    fn require_reference(&self, id: ElementId) -> GraphResult<()> {
        let element = self.require(id)?;
        match element.data {
            ElementData::Reference(_) => Ok(()),
            ref other => Err(wrong_kind(id, "Reference", other)),
        }
    }

    fn write_opposite(&mut self, id: ElementId, value: Option<ElementId>) -> GraphResult<()> {
        match &mut self.get_mut(id)?.data {
            ElementData::Reference(r) => {
                r.opposite = value;
                Ok(())
            }
            other => Err(wrong_kind(id, "Reference", other)),
        }
    }

    /// Verifies containment, opposite symmetry and acyclic inheritance.
    pub fn check_integrity(&self) -> GraphResult<()> {
        let root = self
            .elements
            .get(&self.root)
            .ok_or_else(|| GraphError::Integrity("root element missing".to_string()))?;
        if kind_of(root) != ElementKind::Package || root.container.is_some() {
            return Err(GraphError::Integrity(
                "root must be an uncontained Package".to_string(),
            ));
        }

        for element in self.elements.values() {
            self.check_containment(element)?;
            self.check_cross_references(element)?;
        }

        let reachable = self.descendants(self.root).len();
        if reachable != self.elements.len() {
            return Err(GraphError::Integrity(format!(
                "{} element(s) unreachable from root",
                self.elements.len() - reachable
            )));
        }

        for element in self.elements.values() {
            if element.as_class().is_some() && self.reaches_via_super_types(element.id, element.id)
            {
                return Err(GraphError::Integrity(format!(
                    "inheritance cycle through class `{}`",
                    element.name
                )));
            }
        }
        Ok(())
    }

    fn check_containment(&self, element: &Element) -> GraphResult<()> {
        let kind = kind_of(element);
        if element.id != self.root {
            let container_id = element.container.ok_or_else(|| {
                GraphError::Integrity(format!("`{}` has no container", element.name))
            })?;
            let container = self.elements.get(&container_id).ok_or_else(|| {
                GraphError::Integrity(format!("`{}` has a missing container", element.name))
            })?;
            let count = slot_for(kind_of(container), kind)
                .and_then(|slot| slot_items(&container.data, slot))
                .map_or(0, |items| items.iter().filter(|id| **id == element.id).count());
            if count != 1 {
                return Err(GraphError::Integrity(format!(
                    "`{}` listed {count} time(s) by its container",
                    element.name
                )));
            }
        }
        for child in self.children(element.id) {
            let listed = self.elements.get(&child).ok_or_else(|| {
                GraphError::Integrity(format!("`{}` lists a missing child", element.name))
            })?;
            if listed.container != Some(element.id) {
                return Err(GraphError::Integrity(format!(
                    "`{}` lists `{}` which names another container",
                    element.name, listed.name
                )));
            }
        }
        Ok(())
    }

    fn check_cross_references(&self, element: &Element) -> GraphResult<()> {
        if let Some(partner) = element.as_reference().and_then(|r| r.opposite) {
            if self.opposite(partner) != Some(element.id) {
                return Err(GraphError::Integrity(format!(
                    "opposite of `{}` is not symmetric",
                    element.name
                )));
            }
        }
        for super_type in self.super_types(element.id) {
            if self.kind_of(*super_type) != ElementKind::Class {
                return Err(GraphError::Integrity(format!(
                    "super type of `{}` is not a class",
                    element.name
                )));
            }
        }
        if let Some(target) = element.data.e_type().and_then(TypeRef::classifier) {
            if !self.elements.contains_key(&target) {
                return Err(GraphError::Integrity(format!(
                    "type of `{}` points at a missing classifier",
                    element.name
                )));
            }
        }
        Ok(())
    }

    /// Whether `target` is reachable from `start` by following super types.
    pub fn reaches_via_super_types(&self, start: ElementId, target: ElementId) -> bool {
        let mut visited = HashSet::new();
        let mut stack: Vec<ElementId> = self.super_types(start).to_vec();
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend_from_slice(self.super_types(current));
        }
        false
    }
}

fn wrong_kind(id: ElementId, expected: &'static str, data: &ElementData) -> GraphError {
    GraphError::WrongKind {
        id,
        expected,
        found: kind_of_data(data),
    }
}
