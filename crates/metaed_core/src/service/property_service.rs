//! Property-sheet edit orchestration.
//!
//! # Responsibility
//! - Map one `(property, value)` edit onto graph setters.
//! - Run the matching invariant checks before any mutation.
//! - Apply automatic opposite corrections and report what to relabel.
//!
//! # Invariants
//! - A rejected edit leaves the graph untouched.
//! - Opposite slots change only through `MetaGraph::set_opposite`.
//! - `many` is the authoritative multiplicity toggle.

use crate::model::classify::{is_typed, kind_of};
use crate::model::element::{
    is_primitive_type, ElementId, ElementKind, FeatureFlags, Multiplicity, TypeRef, UNBOUNDED,
};
use crate::model::graph::{GraphError, MetaGraph};
use crate::service::validator::{
    check_double_containment, check_interface, check_many_to_many, check_super_types,
    retype_correction, ValidationError, ValidationRule,
};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Editable property, named as in the property sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Name,
    NsUri,
    NsPrefix,
    Abstract,
    Interface,
    SuperTypes,
    EType,
    LowerBound,
    UpperBound,
    Many,
    Multiplicity,
    Containment,
    Opposite,
    Volatile,
    Transient,
    Id,
    Literal,
    Value,
}

const TYPED_FIELDS: &[Property] = &[
    Property::Name,
    Property::EType,
    Property::LowerBound,
    Property::UpperBound,
    Property::Many,
];

impl Property {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::NsUri => "nsURI",
            Self::NsPrefix => "nsPrefix",
            Self::Abstract => "abstract",
            Self::Interface => "interface",
            Self::SuperTypes => "eSuperTypes",
            Self::EType => "eType",
            Self::LowerBound => "lowerBound",
            Self::UpperBound => "upperBound",
            Self::Many => "many",
            Self::Multiplicity => "multiplicity",
            Self::Containment => "containment",
            Self::Opposite => "eOpposite",
            Self::Volatile => "volatile",
            Self::Transient => "transient",
            Self::Id => "iD",
            Self::Literal => "literal",
            Self::Value => "value",
        }
    }

    /// Property-sheet fields for `kind`, in display order.
    pub fn fields_for(kind: ElementKind) -> &'static [Property] {
        match kind {
            ElementKind::Package => &[Self::Name, Self::NsUri, Self::NsPrefix],
            ElementKind::Class => &[Self::Name, Self::Abstract, Self::Interface, Self::SuperTypes],
            ElementKind::Attribute => &[
                Self::Name,
                Self::EType,
                Self::LowerBound,
                Self::UpperBound,
                Self::Many,
                Self::Id,
                Self::Volatile,
                Self::Transient,
            ],
            ElementKind::Reference => &[
                Self::Name,
                Self::EType,
                Self::LowerBound,
                Self::UpperBound,
                Self::Many,
                Self::Containment,
                Self::Opposite,
                Self::Volatile,
                Self::Transient,
            ],
            ElementKind::Operation | ElementKind::Parameter => TYPED_FIELDS,
            ElementKind::EnumLiteral => &[Self::Name, Self::Literal, Self::Value],
            ElementKind::Enum | ElementKind::Unknown => &[Self::Name],
        }
    }

    pub fn applies_to(self, kind: ElementKind) -> bool {
        match self {
            Self::Multiplicity => is_typed(kind),
            other => Self::fields_for(kind).contains(&other),
        }
    }

    /// Whether committing this property can change a tree label.
    pub fn affects_label(self) -> bool {
        matches!(
            self,
            Self::Name
                | Self::EType
                | Self::Containment
                | Self::UpperBound
                | Self::Many
                | Self::Multiplicity
                | Self::Opposite
                | Self::SuperTypes
        )
    }

    /// Whether labels elsewhere in the tree may depend on this property.
    pub fn is_structural(self) -> bool {
        matches!(self, Self::SuperTypes | Self::Opposite | Self::EType)
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = PropertyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let property = match value {
            "name" => Self::Name,
            "nsURI" => Self::NsUri,
            "nsPrefix" => Self::NsPrefix,
            "abstract" => Self::Abstract,
            "interface" => Self::Interface,
            "eSuperTypes" => Self::SuperTypes,
            "eType" => Self::EType,
            "lowerBound" => Self::LowerBound,
            "upperBound" => Self::UpperBound,
            "many" => Self::Many,
            "multiplicity" => Self::Multiplicity,
            "containment" => Self::Containment,
            "eOpposite" => Self::Opposite,
            "volatile" => Self::Volatile,
            "transient" => Self::Transient,
            "iD" => Self::Id,
            "literal" => Self::Literal,
            "value" => Self::Value,
            other => return Err(PropertyError::UnknownProperty(other.to_string())),
        };
        Ok(property)
    }
}

/// Value coming from the property sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Element(Option<ElementId>),
    Elements(Vec<ElementId>),
    Type(Option<TypeRef>),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Errors from property updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// Property name is not recognized.
    UnknownProperty(String),
    /// Target element does not exist.
    ElementNotFound(ElementId),
    /// Property does not exist on this kind of element.
    NotApplicable {
        property: Property,
        kind: ElementKind,
    },
    /// Value has the wrong shape for the property.
    InvalidValue { property: Property, reason: String },
    /// A blocking invariant rejected the edit.
    Validation(ValidationError),
    /// Graph-level failure.
    Graph(GraphError),
}

impl PropertyError {
    /// Violated rule, when the edit was rejected by validation.
    pub fn rule(&self) -> Option<ValidationRule> {
        match self {
            Self::Validation(err) => Some(err.rule()),
            _ => None,
        }
    }
}

impl Display for PropertyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownProperty(name) => write!(f, "unknown property `{name}`"),
            Self::ElementNotFound(id) => write!(f, "element not found: {id}"),
            Self::NotApplicable { property, kind } => {
                write!(f, "property `{property}` does not apply to {kind}")
            }
            Self::InvalidValue { property, reason } => {
                write!(f, "invalid value for `{property}`: {reason}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Graph(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PropertyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Graph(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for PropertyError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<GraphError> for PropertyError {
    fn from(value: GraphError) -> Self {
        match value {
            GraphError::ElementNotFound(id) => Self::ElementNotFound(id),
            other => Self::Graph(other),
        }
    }
}

/// What one committed edit changed, for projection refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub element: ElementId,
    pub property: Property,
    /// Elements whose labels must be recomputed.
    pub relabel: Vec<ElementId>,
    /// References unpaired as an automatic correction.
    pub corrections: Vec<ElementId>,
    /// Labels across the tree may depend on the change.
    pub refresh_tree: bool,
}

/// Applies one property edit by property-sheet name.
pub fn apply(
    graph: &mut MetaGraph,
    element: ElementId,
    property_name: &str,
    value: PropertyValue,
) -> Result<PropertyChange, PropertyError> {
    let property = property_name.parse::<Property>()?;
    apply_property(graph, element, property, value)
}

/// Applies one property edit: validate, commit, correct.
pub fn apply_property(
    graph: &mut MetaGraph,
    element: ElementId,
    property: Property,
    value: PropertyValue,
) -> Result<PropertyChange, PropertyError> {
    let kind = kind_of(graph.require(element)?);
    if !property.applies_to(kind) {
        return Err(PropertyError::NotApplicable { property, kind });
    }

    let result = commit(graph, element, kind, property, value);
    let mut corrections = match result {
        Ok(corrections) => corrections,
        Err(err) => {
            if let Some(rule) = err.rule() {
                warn!(
                    "event=property_rejected module=property status=error property={} rule={}",
                    property,
                    rule.as_str()
                );
            }
            return Err(err);
        }
    };
    corrections.sort();
    corrections.dedup();

    let mut relabel = Vec::new();
    if property.affects_label() {
        relabel.push(element);
        if property == Property::Opposite {
            relabel.extend(graph.opposite(element));
        }
        relabel.extend(corrections.iter().copied());
    }
    debug!(
        "event=property_applied module=property status=ok property={} kind={} corrections={}",
        property,
        kind,
        corrections.len()
    );
    Ok(PropertyChange {
        element,
        property,
        relabel,
        corrections,
        refresh_tree: property.is_structural(),
    })
}

/// Validates and commits; returns references unpaired as corrections.
fn commit(
    graph: &mut MetaGraph,
    element: ElementId,
    kind: ElementKind,
    property: Property,
    value: PropertyValue,
) -> Result<Vec<ElementId>, PropertyError> {
    match property {
        Property::Name => {
            let name = expect_text(property, value)?;
            let name = name.trim();
            if name.is_empty() {
                return Err(PropertyError::InvalidValue {
                    property,
                    reason: "name cannot be empty".to_string(),
                });
            }
            graph.set_name(element, name)?;
        }
        Property::NsUri => graph.set_ns_uri(element, expect_text(property, value)?)?,
        Property::NsPrefix => graph.set_ns_prefix(element, expect_text(property, value)?)?,
        Property::Abstract => graph.set_abstract(element, expect_bool(property, value)?)?,
        Property::Interface => {
            let interface = expect_bool(property, value)?;
            check_interface(graph, element, interface)?;
            graph.set_interface(element, interface)?;
        }
        Property::SuperTypes => {
            let mut candidates = expect_elements(property, value)?;
            let mut seen = Vec::with_capacity(candidates.len());
            candidates.retain(|id| {
                let fresh = !seen.contains(id);
                seen.push(*id);
                fresh
            });
            if let Some(bad) = candidates
                .iter()
                .find(|id| graph.kind_of(**id) != ElementKind::Class)
            {
                return Err(PropertyError::InvalidValue {
                    property,
                    reason: format!("super type {bad} is not a class"),
                });
            }
            check_super_types(graph, element, &candidates)?;
            graph.set_super_types(element, candidates)?;
        }
        Property::EType => {
            let e_type = expect_type(graph, property, value)?;
            if let Some(target) = e_type.as_ref().and_then(TypeRef::classifier) {
                if !graph.contains(target) {
                    return Err(PropertyError::InvalidValue {
                        property,
                        reason: format!("type {target} does not exist"),
                    });
                }
            }
            let mut corrections = Vec::new();
            if kind == ElementKind::Reference {
                let is_class = e_type
                    .as_ref()
                    .and_then(TypeRef::classifier)
                    .is_some_and(|target| graph.kind_of(target) == ElementKind::Class);
                if e_type.is_some() && !is_class {
                    return Err(PropertyError::InvalidValue {
                        property,
                        reason: "a reference must be typed by a class".to_string(),
                    });
                }
                if let Some(opposite) = retype_correction(graph, element, e_type.as_ref()) {
                    graph.set_opposite(element, None)?;
                    corrections.push(opposite);
                }
            }
            graph.set_type(element, e_type)?;
            return Ok(corrections);
        }
        Property::LowerBound => {
            let lower = expect_int(property, value)?;
            let current = graph.multiplicity(element).unwrap_or_default();
            if lower < 0 || (current.upper != UNBOUNDED && lower > current.upper) {
                return Err(PropertyError::InvalidValue {
                    property,
                    reason: format!("lower bound {lower} is outside 0..{}", current.upper),
                });
            }
            graph.set_multiplicity(element, Multiplicity::new(lower, current.upper))?;
        }
        Property::UpperBound | Property::Many | Property::Multiplicity => {
            let current = graph.multiplicity(element).unwrap_or_default();
            let proposed = match property {
                Property::Many => current.with_many(expect_bool(property, value)?),
                Property::UpperBound => {
                    let upper = expect_int(property, value)?;
                    if upper == 0 || upper < UNBOUNDED {
                        return Err(PropertyError::InvalidValue {
                            property,
                            reason: "upper bound must be -1 or positive".to_string(),
                        });
                    }
                    let lower = if upper == UNBOUNDED {
                        current.lower
                    } else {
                        current.lower.min(upper)
                    };
                    Multiplicity::new(lower, upper)
                }
                _ => {
                    let text = expect_text(property, value)?;
                    Multiplicity::parse(&text).ok_or_else(|| PropertyError::InvalidValue {
                        property,
                        reason: format!("`{text}` is not a multiplicity"),
                    })?
                }
            };
            if kind == ElementKind::Reference {
                check_many_to_many(graph, element, proposed, graph.opposite(element))?;
            }
            graph.set_multiplicity(element, proposed)?;
        }
        Property::Containment => {
            let containment = expect_bool(property, value)?;
            check_double_containment(graph, element, containment, graph.opposite(element))?;
            graph.set_containment(element, containment)?;
        }
        Property::Opposite => {
            let other = expect_element(property, value)?;
            if let Some(other) = other {
                if graph.kind_of(other) != ElementKind::Reference {
                    return Err(PropertyError::InvalidValue {
                        property,
                        reason: format!("{other} is not a reference"),
                    });
                }
                check_double_containment(graph, element, graph.is_containment(element), Some(other))?;
                let multiplicity = graph.multiplicity(element).unwrap_or_default();
                check_many_to_many(graph, element, multiplicity, Some(other))?;
            }
            return Ok(graph.set_opposite(element, other)?);
        }
        Property::Volatile | Property::Transient | Property::Id => {
            let flag = expect_bool(property, value)?;
            let mut flags: FeatureFlags = graph.flags(element).unwrap_or_default();
            match property {
                Property::Volatile => flags.volatile = flag,
                Property::Transient => flags.transient = flag,
                _ => flags.id = flag,
            }
            graph.set_flags(element, flags)?;
        }
        Property::Literal => graph.set_literal(element, expect_text(property, value)?)?,
        Property::Value => graph.set_literal_value(element, expect_int(property, value)?)?,
    }
    Ok(Vec::new())
}

fn invalid(property: Property, expected: &str, value: &PropertyValue) -> PropertyError {
    PropertyError::InvalidValue {
        property,
        reason: format!("expected {expected}, got {value:?}"),
    }
}

fn expect_text(property: Property, value: PropertyValue) -> Result<String, PropertyError> {
    match value {
        PropertyValue::Text(text) => Ok(text),
        other => Err(invalid(property, "text", &other)),
    }
}

fn expect_bool(property: Property, value: PropertyValue) -> Result<bool, PropertyError> {
    match value {
        PropertyValue::Bool(flag) => Ok(flag),
        PropertyValue::Text(ref text) => match text.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(invalid(property, "true or false", &value)),
        },
        other => Err(invalid(property, "a boolean", &other)),
    }
}

fn expect_int(property: Property, value: PropertyValue) -> Result<i32, PropertyError> {
    let wide = match value {
        PropertyValue::Int(number) => number,
        PropertyValue::Text(ref text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(property, "an integer", &value))?,
        other => return Err(invalid(property, "an integer", &other)),
    };
    i32::try_from(wide).map_err(|_| PropertyError::InvalidValue {
        property,
        reason: format!("{wide} is out of range"),
    })
}

fn expect_element(property: Property, value: PropertyValue) -> Result<Option<ElementId>, PropertyError> {
    match value {
        PropertyValue::Element(element) => Ok(element),
        PropertyValue::Text(ref text) if text.trim().is_empty() => Ok(None),
        other => Err(invalid(property, "an element", &other)),
    }
}

fn expect_elements(property: Property, value: PropertyValue) -> Result<Vec<ElementId>, PropertyError> {
    match value {
        PropertyValue::Elements(elements) => Ok(elements),
        PropertyValue::Element(element) => Ok(element.into_iter().collect()),
        other => Err(invalid(property, "a list of elements", &other)),
    }
}

/// Accepts a `TypeRef`, an element id, or a type name (primitive first,
/// then classifier lookup). Empty text clears the type.
fn expect_type(
    graph: &MetaGraph,
    property: Property,
    value: PropertyValue,
) -> Result<Option<TypeRef>, PropertyError> {
    match value {
        PropertyValue::Type(e_type) => Ok(e_type),
        PropertyValue::Element(element) => Ok(element.map(TypeRef::Classifier)),
        PropertyValue::Text(ref text) => {
            let name = text.trim();
            if name.is_empty() {
                Ok(None)
            } else if is_primitive_type(name) {
                Ok(Some(TypeRef::primitive(name)))
            } else {
                graph
                    .find_classifier(name)
                    .map(|id| Some(TypeRef::Classifier(id)))
                    .ok_or_else(|| PropertyError::InvalidValue {
                        property,
                        reason: format!("no type named `{name}`"),
                    })
            }
        }
        other => Err(invalid(property, "a type", &other)),
    }
}
