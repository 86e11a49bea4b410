//! Structural actions offered per element kind.
//!
//! # Responsibility
//! - List the add/delete actions permitted on one element.
//! - Execute an action against the graph: create-and-link with a default
//!   name, or remove a subtree.
//! - Own the session-scoped default-name counters.
//!
//! # Invariants
//! - Interfaces never offer Add Attribute / Add Reference.
//! - `Unknown` elements offer nothing and cannot be deleted.
//! - Counters only grow between resets; a generated name never repeats a
//!   sibling's name.

use crate::model::classify::{is_interface, kind_of};
use crate::model::element::{ElementData, ElementId, ElementKind, TypeRef};
use crate::model::graph::{GraphError, MetaGraph};
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Structural action on one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    AddClass,
    AddEnum,
    AddSubPackage,
    AddAttribute,
    AddReference,
    AddOperation,
    AddParameter,
    AddLiteral,
    Delete,
}

impl ActionKind {
    /// Context-menu label.
    pub fn label(self) -> &'static str {
        match self {
            Self::AddClass => "Add Class",
            Self::AddEnum => "Add Enum",
            Self::AddSubPackage => "Add Sub-Package",
            Self::AddAttribute => "Add Attribute",
            Self::AddReference => "Add Reference",
            Self::AddOperation => "Add Operation",
            Self::AddParameter => "Add Parameter",
            Self::AddLiteral => "Add Literal",
            Self::Delete => "Delete",
        }
    }

    /// Kind of element an add action creates; `None` for delete.
    pub fn created_kind(self) -> Option<ElementKind> {
        match self {
            Self::AddClass => Some(ElementKind::Class),
            Self::AddEnum => Some(ElementKind::Enum),
            Self::AddSubPackage => Some(ElementKind::Package),
            Self::AddAttribute => Some(ElementKind::Attribute),
            Self::AddReference => Some(ElementKind::Reference),
            Self::AddOperation => Some(ElementKind::Operation),
            Self::AddParameter => Some(ElementKind::Parameter),
            Self::AddLiteral => Some(ElementKind::EnumLiteral),
            Self::Delete => None,
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One context-menu row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Action {
        label: &'static str,
        kind: ActionKind,
    },
    /// Separates add actions from delete.
    Divider,
}

impl MenuEntry {
    fn of(kind: ActionKind) -> Self {
        Self::Action {
            label: kind.label(),
            kind,
        }
    }

    pub fn action(&self) -> Option<ActionKind> {
        match self {
            Self::Action { kind, .. } => Some(*kind),
            Self::Divider => None,
        }
    }
}

/// Ordered context-menu entries for `element`.
///
/// Missing and `Unknown` elements get an empty menu. Delete is only offered
/// on contained elements, after a divider when add actions precede it.
pub fn actions_for(graph: &MetaGraph, element: ElementId) -> Vec<MenuEntry> {
    let Some(record) = graph.get(element) else {
        return Vec::new();
    };
    let adds: Vec<ActionKind> = match kind_of(record) {
        ElementKind::Package => vec![
            ActionKind::AddClass,
            ActionKind::AddEnum,
            ActionKind::AddSubPackage,
        ],
        ElementKind::Class if is_interface(record) => vec![ActionKind::AddOperation],
        ElementKind::Class => vec![
            ActionKind::AddAttribute,
            ActionKind::AddReference,
            ActionKind::AddOperation,
        ],
        ElementKind::Operation => vec![ActionKind::AddParameter],
        ElementKind::Enum => vec![ActionKind::AddLiteral],
        ElementKind::Unknown => return Vec::new(),
        ElementKind::Attribute
        | ElementKind::Reference
        | ElementKind::Parameter
        | ElementKind::EnumLiteral => Vec::new(),
    };

    let mut entries: Vec<MenuEntry> = adds.into_iter().map(MenuEntry::of).collect();
    if record.container().is_some() {
        if !entries.is_empty() {
            entries.push(MenuEntry::Divider);
        }
        entries.push(MenuEntry::of(ActionKind::Delete));
    }
    entries
}

fn default_name(kind: ElementKind, counter: u32) -> String {
    match kind {
        ElementKind::Package => format!("package{counter}"),
        ElementKind::Class => format!("Class{counter}"),
        ElementKind::Enum => format!("Enum{counter}"),
        ElementKind::Attribute => format!("attribute{counter}"),
        ElementKind::Reference => format!("reference{counter}"),
        ElementKind::Operation => format!("operation{counter}"),
        ElementKind::Parameter => format!("parameter{counter}"),
        ElementKind::EnumLiteral => format!("LITERAL_{counter}"),
        ElementKind::Unknown => format!("element{counter}"),
    }
}

/// Per-kind default-name counters for one editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingState {
    counters: HashMap<ElementKind, u32>,
}

impl NamingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every counter; called on document load.
    pub fn reset(&mut self) {
        self.counters.clear();
    }

    /// Last counter value handed out for `kind` (0 when none yet).
    pub fn current(&self, kind: ElementKind) -> u32 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    /// Advances the counter for `kind` until the name is not taken.
    pub fn next_name(&mut self, kind: ElementKind, is_taken: impl Fn(&str) -> bool) -> String {
        let counter = self.counters.entry(kind).or_insert(0);
        loop {
            *counter += 1;
            let candidate = default_name(kind, *counter);
            if !is_taken(candidate.as_str()) {
                return candidate;
            }
        }
    }
}

/// Result of one executed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub action: ActionKind,
    /// Newly created element, for add actions.
    pub created: Option<ElementId>,
    /// Removed elements (subtree root first), for delete.
    pub removed: Vec<ElementId>,
    /// Surviving elements whose data changed as a side effect.
    pub touched: Vec<ElementId>,
    /// User-facing status text.
    pub message: String,
    /// Whether the caller should offer inline rename right away.
    pub focus_name_field: bool,
}

impl ActionOutcome {
    fn message_only(action: ActionKind, message: String) -> Self {
        Self {
            action,
            created: None,
            removed: Vec::new(),
            touched: Vec::new(),
            message,
            focus_name_field: false,
        }
    }
}

/// Errors from action execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Target element does not exist.
    ElementNotFound(ElementId),
    /// Action is not offered for this element.
    ActionNotPermitted {
        action: ActionKind,
        kind: ElementKind,
    },
    /// Graph-level failure.
    Graph(GraphError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElementNotFound(id) => write!(f, "element not found: {id}"),
            Self::ActionNotPermitted { action, kind } => {
                write!(f, "action `{action}` is not available on {kind}")
            }
            Self::Graph(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Graph(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GraphError> for CatalogError {
    fn from(value: GraphError) -> Self {
        match value {
            GraphError::ElementNotFound(id) => Self::ElementNotFound(id),
            other => Self::Graph(other),
        }
    }
}

/// Executes structural actions and owns session naming state.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    naming: NamingState,
    default_attribute_type: String,
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::new("EString")
    }
}

impl ActionCatalog {
    /// Creates a catalog; new Attributes and Parameters get `default_attribute_type`.
    pub fn new(default_attribute_type: impl Into<String>) -> Self {
        Self {
            naming: NamingState::new(),
            default_attribute_type: default_attribute_type.into(),
        }
    }

    pub fn naming(&self) -> &NamingState {
        &self.naming
    }

    /// Resets default-name counters for a newly loaded document.
    pub fn reset_counters(&mut self) {
        self.naming.reset();
    }

    /// Runs `action` on `element`.
    ///
    /// Delete on an element without container fails softly: the outcome
    /// carries only a message and the graph is unchanged.
    pub fn execute(
        &mut self,
        graph: &mut MetaGraph,
        element: ElementId,
        action: ActionKind,
    ) -> Result<ActionOutcome, CatalogError> {
        let kind = kind_of(graph.require(element)?);
        match action.created_kind() {
            Some(created_kind) => {
                let permitted = actions_for(graph, element)
                    .iter()
                    .any(|entry| entry.action() == Some(action));
                if !permitted {
                    return Err(CatalogError::ActionNotPermitted { action, kind });
                }
                self.create(graph, element, action, created_kind)
            }
            None => {
                if kind == ElementKind::Unknown {
                    return Err(CatalogError::ActionNotPermitted { action, kind });
                }
                self.delete(graph, element, kind)
            }
        }
    }

    fn create(
        &mut self,
        graph: &mut MetaGraph,
        parent: ElementId,
        action: ActionKind,
        created_kind: ElementKind,
    ) -> Result<ActionOutcome, CatalogError> {
        let siblings: Vec<String> = graph
            .children(parent)
            .into_iter()
            .filter_map(|id| graph.name(id).map(str::to_string))
            .collect();
        let name = self
            .naming
            .next_name(created_kind, |candidate| siblings.iter().any(|s| s == candidate));

        let default_type = || Some(TypeRef::primitive(self.default_attribute_type.clone()));
        let data = match created_kind {
            ElementKind::Package => ElementData::package(),
            ElementKind::Class => ElementData::class(),
            ElementKind::Enum => ElementData::enumeration(),
            ElementKind::Attribute => ElementData::attribute(default_type()),
            ElementKind::Reference => ElementData::reference(None),
            ElementKind::Operation => ElementData::operation(),
            ElementKind::Parameter => ElementData::parameter(default_type()),
            ElementKind::EnumLiteral => {
                let ordinal = i32::try_from(graph.children(parent).len()).unwrap_or(i32::MAX);
                ElementData::literal(name.clone(), ordinal)
            }
            ElementKind::Unknown => {
                return Err(CatalogError::ActionNotPermitted {
                    action,
                    kind: graph.kind_of(parent),
                })
            }
        };

        let created = graph.add_child(parent, name.clone(), data)?;
        let parent_name = graph.name(parent).unwrap_or_default();
        info!(
            "event=element_added module=catalog status=ok kind={} parent_kind={}",
            created_kind,
            graph.kind_of(parent)
        );
        Ok(ActionOutcome {
            action,
            created: Some(created),
            removed: Vec::new(),
            touched: Vec::new(),
            message: format!("Created {created_kind} '{name}' in '{parent_name}'"),
            focus_name_field: true,
        })
    }

    fn delete(
        &mut self,
        graph: &mut MetaGraph,
        element: ElementId,
        kind: ElementKind,
    ) -> Result<ActionOutcome, CatalogError> {
        let name = graph.name(element).unwrap_or_default().to_string();
        if graph.container(element).is_none() {
            warn!("event=element_delete module=catalog status=skipped reason=no_container kind={kind}");
            return Ok(ActionOutcome::message_only(
                ActionKind::Delete,
                format!("Cannot delete {kind} '{name}': no container found"),
            ));
        }

        let removed = graph.remove_subtree(element)?;
        info!(
            "event=element_deleted module=catalog status=ok kind={} removed={} touched={}",
            kind,
            removed.removed.len(),
            removed.touched.len()
        );
        Ok(ActionOutcome {
            action: ActionKind::Delete,
            created: None,
            removed: removed.removed,
            touched: removed.touched,
            message: format!("Deleted {kind} '{name}'"),
            focus_name_field: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::NamingState;
    use crate::model::element::ElementKind;

    #[test]
    fn counters_are_per_kind_and_monotonic() {
        let mut naming = NamingState::new();
        assert_eq!(naming.next_name(ElementKind::Class, |_| false), "Class1");
        assert_eq!(naming.next_name(ElementKind::Class, |_| false), "Class2");
        assert_eq!(
            naming.next_name(ElementKind::Attribute, |_| false),
            "attribute1"
        );
        assert_eq!(
            naming.next_name(ElementKind::EnumLiteral, |_| false),
            "LITERAL_1"
        );
        assert_eq!(naming.current(ElementKind::Class), 2);
    }

    #[test]
    fn taken_names_are_skipped() {
        let mut naming = NamingState::new();
        let name = naming.next_name(ElementKind::Class, |candidate| {
            candidate == "Class1" || candidate == "Class2"
        });
        assert_eq!(name, "Class3");
    }

    #[test]
    fn reset_starts_over() {
        let mut naming = NamingState::new();
        naming.next_name(ElementKind::Enum, |_| false);
        naming.reset();
        assert_eq!(naming.next_name(ElementKind::Enum, |_| false), "Enum1");
    }
}
