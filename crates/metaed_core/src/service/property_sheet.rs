//! Read-only property sheet for the current selection.

use crate::model::element::{ElementData, ElementId};
use crate::model::graph::MetaGraph;
use crate::projection::label::type_name;
use crate::service::property_service::Property;

/// One displayed `(property, value)` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyField {
    pub property: Property,
    pub value: String,
}

/// Sheet contents; `Empty` when nothing (or a removed element) is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySheet {
    Empty,
    Element {
        element: ElementId,
        /// `"<Kind>: <name>"`.
        header: String,
        fields: Vec<PropertyField>,
    },
}

impl PropertySheet {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn field(&self, property: Property) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Element { fields, .. } => fields
                .iter()
                .find(|field| field.property == property)
                .map(|field| field.value.as_str()),
        }
    }
}

/// Builds the sheet for `selected`; a stale id yields `Empty`.
pub fn build_sheet(graph: &MetaGraph, selected: Option<ElementId>) -> PropertySheet {
    let Some(element) = selected.and_then(|id| graph.get(id)) else {
        return PropertySheet::Empty;
    };
    let id = element.id();
    let kind = graph.kind_of(id);
    let fields = Property::fields_for(kind)
        .iter()
        .map(|property| PropertyField {
            property: *property,
            value: field_value(graph, id, *property),
        })
        .collect();
    PropertySheet::Element {
        element: id,
        header: format!("{}: {}", kind.display_name(), element.name),
        fields,
    }
}

fn field_value(graph: &MetaGraph, id: ElementId, property: Property) -> String {
    let Some(element) = graph.get(id) else {
        return String::new();
    };
    let multiplicity = graph.multiplicity(id).unwrap_or_default();
    let flags = graph.flags(id).unwrap_or_default();
    match property {
        Property::Name => element.name.clone(),
        Property::NsUri => element
            .as_package()
            .map(|p| p.ns_uri.clone())
            .unwrap_or_default(),
        Property::NsPrefix => element
            .as_package()
            .map(|p| p.ns_prefix.clone())
            .unwrap_or_default(),
        Property::Abstract => element.as_class().is_some_and(|c| c.is_abstract).to_string(),
        Property::Interface => element.as_class().is_some_and(|c| c.is_interface).to_string(),
        Property::SuperTypes => graph
            .super_types(id)
            .iter()
            .filter_map(|super_type| graph.name(*super_type))
            .collect::<Vec<_>>()
            .join(", "),
        Property::EType => graph
            .e_type(id)
            .map(|e_type| type_name(graph, Some(e_type)))
            .unwrap_or_default(),
        Property::LowerBound => multiplicity.lower.to_string(),
        Property::UpperBound => multiplicity.upper.to_string(),
        Property::Many => multiplicity.is_many().to_string(),
        Property::Multiplicity => multiplicity.to_string(),
        Property::Containment => graph.is_containment(id).to_string(),
        Property::Opposite => graph
            .opposite(id)
            .and_then(|opposite| graph.name(opposite))
            .unwrap_or_default()
            .to_string(),
        Property::Volatile => flags.volatile.to_string(),
        Property::Transient => flags.transient.to_string(),
        Property::Id => flags.id.to_string(),
        Property::Literal => match &element.data {
            ElementData::EnumLiteral(literal) => literal.literal.clone(),
            _ => String::new(),
        },
        Property::Value => match &element.data {
            ElementData::EnumLiteral(literal) => literal.value.to_string(),
            _ => String::new(),
        },
    }
}
