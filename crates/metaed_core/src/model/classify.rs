//! Element kind classification.
//!
//! Pure and total: every element maps to exactly one `ElementKind`;
//! `MetaGraph::kind_of` maps a missing element to `ElementKind::Unknown`. Callers branch on the
//! result instead of probing element shape themselves.

use crate::model::element::{Element, ElementData, ElementKind};

/// Classifies one element by its data discriminant.
pub fn kind_of(element: &Element) -> ElementKind {
    kind_of_data(&element.data)
}

pub fn kind_of_data(data: &ElementData) -> ElementKind {
    match data {
        ElementData::Package(_) => ElementKind::Package,
        ElementData::Class(_) => ElementKind::Class,
        ElementData::Enum(_) => ElementKind::Enum,
        ElementData::Attribute(_) => ElementKind::Attribute,
        ElementData::Reference(_) => ElementKind::Reference,
        ElementData::Operation(_) => ElementKind::Operation,
        ElementData::Parameter(_) => ElementKind::Parameter,
        ElementData::EnumLiteral(_) => ElementKind::EnumLiteral,
        ElementData::Opaque { .. } => ElementKind::Unknown,
    }
}

/// Class or Enum. Opaque classifiers stay `Unknown` and are excluded.
pub fn is_classifier(kind: ElementKind) -> bool {
    matches!(kind, ElementKind::Class | ElementKind::Enum)
}

/// Attribute or Reference.
pub fn is_feature(kind: ElementKind) -> bool {
    matches!(kind, ElementKind::Attribute | ElementKind::Reference)
}

/// Kinds whose label embeds a resolved type name.
pub fn is_typed(kind: ElementKind) -> bool {
    matches!(
        kind,
        ElementKind::Attribute
            | ElementKind::Reference
            | ElementKind::Operation
            | ElementKind::Parameter
    )
}

/// Class currently classified as an interface.
pub fn is_interface(element: &Element) -> bool {
    element.as_class().is_some_and(|class| class.is_interface)
}

#[cfg(test)]
mod tests {
    use super::{is_classifier, is_feature, is_typed, kind_of_data};
    use crate::model::element::{ElementData, ElementKind};
    use crate::model::graph::MetaGraph;
    use uuid::Uuid;

    #[test]
    fn missing_element_is_unknown() {
        assert_eq!(MetaGraph::new("p").kind_of(Uuid::new_v4()), ElementKind::Unknown);
    }

    #[test]
    fn every_variant_has_a_kind() {
        assert_eq!(kind_of_data(&ElementData::package()), ElementKind::Package);
        assert_eq!(kind_of_data(&ElementData::class()), ElementKind::Class);
        assert_eq!(kind_of_data(&ElementData::enumeration()), ElementKind::Enum);
        assert_eq!(
            kind_of_data(&ElementData::attribute(None)),
            ElementKind::Attribute
        );
        assert_eq!(
            kind_of_data(&ElementData::reference(None)),
            ElementKind::Reference
        );
        assert_eq!(kind_of_data(&ElementData::operation()), ElementKind::Operation);
        assert_eq!(
            kind_of_data(&ElementData::parameter(None)),
            ElementKind::Parameter
        );
        assert_eq!(
            kind_of_data(&ElementData::literal("A", 0)),
            ElementKind::EnumLiteral
        );
        assert_eq!(
            kind_of_data(&ElementData::opaque("EDataType")),
            ElementKind::Unknown
        );
    }

    #[test]
    fn kind_groups() {
        assert!(is_classifier(ElementKind::Enum));
        assert!(!is_classifier(ElementKind::Unknown));
        assert!(is_feature(ElementKind::Reference));
        assert!(!is_feature(ElementKind::Operation));
        assert!(is_typed(ElementKind::Operation));
        assert!(!is_typed(ElementKind::EnumLiteral));
    }
}
