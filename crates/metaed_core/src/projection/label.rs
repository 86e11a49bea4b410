//! Display labels for projected elements.
//!
//! Formats:
//! - Attribute / Parameter: `name : Type` plus `[*]` when many-valued.
//! - Reference: same as Attribute, plus ` [containment]` when containing.
//! - Class: `name`, or `name → Super` showing the first super type only.
//! - Operation: `name(p1: T1, p2: T2): Return`.
//! - Everything else: `name`.

use crate::model::element::{ElementData, ElementId, Multiplicity, TypeRef};
use crate::model::graph::MetaGraph;

/// Shown when a type points nowhere.
pub const UNRESOLVED_TYPE: &str = "?";
/// Shown for operations without a return type.
pub const VOID_TYPE: &str = "void";

/// Resolves a type reference to the name shown in labels.
pub fn type_name(graph: &MetaGraph, e_type: Option<&TypeRef>) -> String {
    match e_type {
        Some(TypeRef::Primitive(name)) => name.clone(),
        Some(TypeRef::Classifier(id)) => graph
            .name(*id)
            .map_or_else(|| UNRESOLVED_TYPE.to_string(), str::to_string),
        None => UNRESOLVED_TYPE.to_string(),
    }
}

fn many_marker(multiplicity: Multiplicity) -> &'static str {
    if multiplicity.is_many() {
        "[*]"
    } else {
        ""
    }
}

/// Computes the label for one element from its current properties.
pub fn label_for(graph: &MetaGraph, id: ElementId) -> String {
    let Some(element) = graph.get(id) else {
        return String::new();
    };
    let name = element.name.as_str();
    match &element.data {
        ElementData::Class(class) => match class.super_types.first() {
            Some(super_type) => format!(
                "{name} \u{2192} {}",
                graph.name(*super_type).unwrap_or(UNRESOLVED_TYPE)
            ),
            None => name.to_string(),
        },
        ElementData::Attribute(attribute) => format!(
            "{name} : {}{}",
            type_name(graph, attribute.e_type.as_ref()),
            many_marker(attribute.multiplicity)
        ),
        ElementData::Parameter(parameter) => format!(
            "{name} : {}{}",
            type_name(graph, parameter.e_type.as_ref()),
            many_marker(parameter.multiplicity)
        ),
        ElementData::Reference(reference) => {
            let mut label = format!(
                "{name} : {}{}",
                type_name(graph, reference.e_type.as_ref()),
                many_marker(reference.multiplicity)
            );
            if reference.containment {
                label.push_str(" [containment]");
            }
            label
        }
        ElementData::Operation(operation) => {
            let parameters = operation
                .parameters
                .iter()
                .filter_map(|param_id| graph.get(*param_id))
                .map(|param| {
                    format!(
                        "{}: {}",
                        param.name,
                        type_name(graph, param.data.e_type())
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            let return_type = match operation.e_type.as_ref() {
                Some(e_type) => type_name(graph, Some(e_type)),
                None => VOID_TYPE.to_string(),
            };
            format!("{name}({parameters}): {return_type}")
        }
        ElementData::Package(_)
        | ElementData::Enum(_)
        | ElementData::EnumLiteral(_)
        | ElementData::Opaque { .. } => name.to_string(),
    }
}

/// Whether the label of `id` embeds the name of `classifier`.
pub fn label_mentions(graph: &MetaGraph, id: ElementId, classifier: ElementId) -> bool {
    let Some(element) = graph.get(id) else {
        return false;
    };
    let targets = |e_type: Option<&TypeRef>| e_type.and_then(TypeRef::classifier) == Some(classifier);
    match &element.data {
        ElementData::Class(class) => class.super_types.first() == Some(&classifier),
        ElementData::Attribute(_) | ElementData::Reference(_) | ElementData::Parameter(_) => {
            targets(element.data.e_type())
        }
        ElementData::Operation(operation) => {
            targets(operation.e_type.as_ref())
                || operation
                    .parameters
                    .iter()
                    .any(|param_id| targets(graph.e_type(*param_id)))
        }
        _ => false,
    }
}
