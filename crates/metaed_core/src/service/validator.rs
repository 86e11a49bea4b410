//! Semantic invariant checks for proposed edits.
//!
//! # Responsibility
//! - Decide whether a proposed property change may commit.
//! - Compute the automatic opposite corrections that accompany a commit.
//!
//! # Invariants
//! - Every function here is pure: it reads the graph and never mutates it.
//! - Blocking rules: inheritance cycle, double containment, many-to-many
//!   opposites, interface with features.
//! - Corrections (not failures): re-pairing an opposite unpairs old
//!   partners; retyping a paired reference unpairs it.

use crate::model::classify::{is_feature, is_interface};
use crate::model::element::{ElementId, Multiplicity, TypeRef};
use crate::model::graph::MetaGraph;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifies which blocking rule rejected an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    InheritanceCycle,
    DoubleContainment,
    ManyToMany,
    InterfaceExclusivity,
}

impl ValidationRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InheritanceCycle => "inheritance_cycle",
            Self::DoubleContainment => "double_containment",
            Self::ManyToMany => "many_to_many",
            Self::InterfaceExclusivity => "interface_exclusivity",
        }
    }
}

/// Blocking validation failure with the names involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Candidate super type is the class itself or already inherits from it.
    InheritanceCycle { class: String, candidate: String },
    /// Both sides of an opposite pair would be containment references.
    DoubleContainment { reference: String, opposite: String },
    /// Both sides of an opposite pair would be many-valued.
    ManyToMany { reference: String, opposite: String },
    /// Class owns attributes or references and cannot become an interface.
    InterfaceHasFeatures { class: String, feature_count: usize },
}

impl ValidationError {
    pub fn rule(&self) -> ValidationRule {
        match self {
            Self::InheritanceCycle { .. } => ValidationRule::InheritanceCycle,
            Self::DoubleContainment { .. } => ValidationRule::DoubleContainment,
            Self::ManyToMany { .. } => ValidationRule::ManyToMany,
            Self::InterfaceHasFeatures { .. } => ValidationRule::InterfaceExclusivity,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InheritanceCycle { class, candidate } if class == candidate => {
                write!(f, "class `{class}` cannot be its own super type")
            }
            Self::InheritanceCycle { class, candidate } => write!(
                f,
                "`{candidate}` already inherits from `{class}`; adding it as a super type would create a cycle"
            ),
            Self::DoubleContainment {
                reference,
                opposite,
            } => write!(
                f,
                "`{reference}` and its opposite `{opposite}` cannot both be containment references"
            ),
            Self::ManyToMany {
                reference,
                opposite,
            } => write!(
                f,
                "`{reference}` and its opposite `{opposite}` cannot both be many-valued"
            ),
            Self::InterfaceHasFeatures {
                class,
                feature_count,
            } => write!(
                f,
                "class `{class}` owns {feature_count} attribute(s)/reference(s) and cannot become an interface"
            ),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

fn name_of(graph: &MetaGraph, id: ElementId) -> String {
    graph.name(id).unwrap_or_default().to_string()
}

/// Rejects `candidate` as a super type of `class` when it would close a cycle.
///
/// Terminates on already-malformed graphs: the walk keeps a visited set.
pub fn check_super_type(graph: &MetaGraph, class: ElementId, candidate: ElementId) -> ValidationResult {
    if candidate == class || graph.reaches_via_super_types(candidate, class) {
        return Err(ValidationError::InheritanceCycle {
            class: name_of(graph, class),
            candidate: name_of(graph, candidate),
        });
    }
    Ok(())
}

/// Checks every entry of a proposed super-type list.
pub fn check_super_types(graph: &MetaGraph, class: ElementId, candidates: &[ElementId]) -> ValidationResult {
    candidates
        .iter()
        .try_for_each(|candidate| check_super_type(graph, class, *candidate))
}

/// Rejects a pairing where both sides would hold containment.
///
/// `containment` is the proposed flag of `reference`; the opposite side's
/// flag is read from the graph.
pub fn check_double_containment(
    graph: &MetaGraph,
    reference: ElementId,
    containment: bool,
    opposite: Option<ElementId>,
) -> ValidationResult {
    let Some(opposite) = opposite else {
        return Ok(());
    };
    if containment && opposite != reference && graph.is_containment(opposite) {
        return Err(ValidationError::DoubleContainment {
            reference: name_of(graph, reference),
            opposite: name_of(graph, opposite),
        });
    }
    Ok(())
}

/// Rejects a pairing where both sides would be many-valued.
///
/// `multiplicity` is the proposed multiplicity of `reference`.
pub fn check_many_to_many(
    graph: &MetaGraph,
    reference: ElementId,
    multiplicity: Multiplicity,
    opposite: Option<ElementId>,
) -> ValidationResult {
    let Some(opposite) = opposite else {
        return Ok(());
    };
    let opposite_many = graph
        .multiplicity(opposite)
        .is_some_and(Multiplicity::is_many);
    if multiplicity.is_many() && opposite != reference && opposite_many {
        return Err(ValidationError::ManyToMany {
            reference: name_of(graph, reference),
            opposite: name_of(graph, opposite),
        });
    }
    Ok(())
}

/// Rejects switching a class with attributes or references to interface.
/// Operations do not count.
pub fn check_interface(graph: &MetaGraph, class: ElementId, interface: bool) -> ValidationResult {
    if !interface {
        return Ok(());
    }
    let feature_count = graph
        .get(class)
        .and_then(|element| element.as_class())
        .map_or(0, |data| data.feature_count());
    if feature_count > 0 {
        return Err(ValidationError::InterfaceHasFeatures {
            class: name_of(graph, class),
            feature_count,
        });
    }
    Ok(())
}

/// Rejects moving an attribute or reference into an interface class.
pub fn check_feature_move(graph: &MetaGraph, element: ElementId, new_parent: ElementId) -> ValidationResult {
    if !is_feature(graph.kind_of(element)) {
        return Ok(());
    }
    let Some(target) = graph.get(new_parent).filter(|target| is_interface(target)) else {
        return Ok(());
    };
    let feature_count = target.as_class().map_or(0, |data| data.feature_count());
    Err(ValidationError::InterfaceHasFeatures {
        class: name_of(graph, new_parent),
        feature_count: feature_count + 1,
    })
}

/// References that lose their partner when `reference` is paired with `other`.
pub fn opposite_corrections(
    graph: &MetaGraph,
    reference: ElementId,
    other: Option<ElementId>,
) -> Vec<ElementId> {
    let mut unpaired = Vec::new();
    if let Some(previous) = graph.opposite(reference) {
        if Some(previous) != other && previous != reference {
            unpaired.push(previous);
        }
    }
    if let Some(other) = other {
        if let Some(previous) = graph.opposite(other) {
            if previous != reference && previous != other && !unpaired.contains(&previous) {
                unpaired.push(previous);
            }
        }
    }
    unpaired
}

/// Opposite to unpair when `reference` is retyped to `new_type`, if any.
///
/// An unchanged type keeps the pair.
pub fn retype_correction(
    graph: &MetaGraph,
    reference: ElementId,
    new_type: Option<&TypeRef>,
) -> Option<ElementId> {
    let opposite = graph.opposite(reference)?;
    if graph.e_type(reference) == new_type {
        return None;
    }
    Some(opposite)
}
