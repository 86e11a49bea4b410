use metaed_core::service::property_service::{apply, apply_property};
use metaed_core::{
    ElementData, ElementId, ElementKind, MetaGraph, Multiplicity, Property, PropertyError,
    PropertyValue, TypeRef, ValidationRule,
};

struct Fixture {
    graph: MetaGraph,
    a: ElementId,
    b: ElementId,
    r1: ElementId,
    r2: ElementId,
}

fn two_classes_with_references() -> Fixture {
    let mut graph = MetaGraph::new("p");
    let root = graph.root();
    let a = graph.add_child(root, "A", ElementData::class()).unwrap();
    let b = graph.add_child(root, "B", ElementData::class()).unwrap();
    let r1 = graph.add_child(a, "r1", ElementData::reference(None)).unwrap();
    let r2 = graph.add_child(b, "r2", ElementData::reference(None)).unwrap();
    apply(&mut graph, r1, "eType", PropertyValue::Element(Some(b))).unwrap();
    apply(&mut graph, r2, "eType", PropertyValue::Element(Some(a))).unwrap();
    Fixture { graph, a, b, r1, r2 }
}

#[test]
fn unknown_and_inapplicable_properties_are_rejected() {
    let mut fx = two_classes_with_references();

    let err = apply(&mut fx.graph, fx.a, "colour", "red".into()).unwrap_err();
    assert_eq!(err, PropertyError::UnknownProperty("colour".to_string()));

    let err = apply(&mut fx.graph, fx.a, "containment", true.into()).unwrap_err();
    assert_eq!(
        err,
        PropertyError::NotApplicable {
            property: Property::Containment,
            kind: ElementKind::Class,
        }
    );
}

#[test]
fn type_accepts_primitive_and_classifier_names() {
    let mut graph = MetaGraph::new("p");
    let class = graph.add_child(graph.root(), "Person", ElementData::class()).unwrap();
    let attribute = graph
        .add_child(class, "age", ElementData::attribute(None))
        .unwrap();
    let enumeration = graph
        .add_child(graph.root(), "Kind", ElementData::enumeration())
        .unwrap();

    apply(&mut graph, attribute, "eType", "EInt".into()).unwrap();
    assert_eq!(graph.e_type(attribute), Some(&TypeRef::primitive("EInt")));

    apply(&mut graph, attribute, "eType", "Kind".into()).unwrap();
    assert_eq!(graph.e_type(attribute), Some(&TypeRef::Classifier(enumeration)));

    apply(&mut graph, attribute, "eType", "".into()).unwrap();
    assert_eq!(graph.e_type(attribute), None);

    let err = apply(&mut graph, attribute, "eType", "Nope".into()).unwrap_err();
    assert!(matches!(err, PropertyError::InvalidValue { property: Property::EType, .. }));
}

#[test]
fn references_must_target_classes() {
    let mut fx = two_classes_with_references();
    let err = apply(&mut fx.graph, fx.r1, "eType", "EString".into()).unwrap_err();
    assert!(matches!(err, PropertyError::InvalidValue { .. }));
    assert_eq!(fx.graph.e_type(fx.r1), Some(&TypeRef::Classifier(fx.b)));
}

#[test]
fn opposite_is_symmetric_and_clears_both_sides() {
    let mut fx = two_classes_with_references();

    let change = apply(&mut fx.graph, fx.r1, "eOpposite", PropertyValue::Element(Some(fx.r2))).unwrap();
    assert_eq!(fx.graph.opposite(fx.r1), Some(fx.r2));
    assert_eq!(fx.graph.opposite(fx.r2), Some(fx.r1));
    assert!(change.relabel.contains(&fx.r2));

    apply(&mut fx.graph, fx.r1, "eOpposite", PropertyValue::Element(None)).unwrap();
    assert_eq!(fx.graph.opposite(fx.r1), None);
    assert_eq!(fx.graph.opposite(fx.r2), None);
    fx.graph.check_integrity().unwrap();
}

#[test]
fn re_pairing_unpairs_the_previous_partner() {
    let mut fx = two_classes_with_references();
    let r3 = fx
        .graph
        .add_child(fx.b, "r3", ElementData::reference(Some(TypeRef::Classifier(fx.a))))
        .unwrap();
    apply(&mut fx.graph, fx.r1, "eOpposite", PropertyValue::Element(Some(fx.r2))).unwrap();

    let change = apply(&mut fx.graph, fx.r1, "eOpposite", PropertyValue::Element(Some(r3))).unwrap();
    assert_eq!(change.corrections, vec![fx.r2]);
    assert_eq!(fx.graph.opposite(fx.r2), None);
    assert_eq!(fx.graph.opposite(r3), Some(fx.r1));
    fx.graph.check_integrity().unwrap();
}

#[test]
fn containment_on_both_sides_is_rejected() {
    let mut fx = two_classes_with_references();
    apply(&mut fx.graph, fx.r1, "eOpposite", PropertyValue::Element(Some(fx.r2))).unwrap();
    apply(&mut fx.graph, fx.r1, "containment", true.into()).unwrap();

    let err = apply(&mut fx.graph, fx.r2, "containment", true.into()).unwrap_err();
    assert_eq!(err.rule(), Some(ValidationRule::DoubleContainment));
    assert!(!fx.graph.is_containment(fx.r2));
    assert!(fx.graph.is_containment(fx.r1));
}

#[test]
fn pairing_two_containments_is_rejected() {
    let mut fx = two_classes_with_references();
    apply(&mut fx.graph, fx.r1, "containment", true.into()).unwrap();
    apply(&mut fx.graph, fx.r2, "containment", true.into()).unwrap();

    let err = apply(&mut fx.graph, fx.r1, "eOpposite", PropertyValue::Element(Some(fx.r2))).unwrap_err();
    assert_eq!(err.rule(), Some(ValidationRule::DoubleContainment));
    assert_eq!(fx.graph.opposite(fx.r1), None);
}

#[test]
fn many_to_many_is_rejected_from_every_entry_point() {
    let mut fx = two_classes_with_references();
    apply(&mut fx.graph, fx.r1, "eOpposite", PropertyValue::Element(Some(fx.r2))).unwrap();
    apply(&mut fx.graph, fx.r1, "many", true.into()).unwrap();
    assert!(fx.graph.multiplicity(fx.r1).unwrap().is_many());

    for (property, value) in [
        ("many", PropertyValue::Bool(true)),
        ("upperBound", PropertyValue::Int(-1)),
        ("multiplicity", PropertyValue::Text("0..*".to_string())),
    ] {
        let err = apply(&mut fx.graph, fx.r2, property, value).unwrap_err();
        assert_eq!(err.rule(), Some(ValidationRule::ManyToMany), "{property}");
        assert!(!fx.graph.multiplicity(fx.r2).unwrap().is_many());
    }
}

#[test]
fn many_toggle_sets_upper_bound() {
    let mut graph = MetaGraph::new("p");
    let class = graph.add_child(graph.root(), "A", ElementData::class()).unwrap();
    let attribute = graph
        .add_child(class, "tags", ElementData::attribute(Some(TypeRef::primitive("EString"))))
        .unwrap();

    apply(&mut graph, attribute, "many", true.into()).unwrap();
    assert_eq!(graph.multiplicity(attribute), Some(Multiplicity::new(0, -1)));
    apply(&mut graph, attribute, "many", "false".into()).unwrap();
    assert_eq!(graph.multiplicity(attribute), Some(Multiplicity::new(0, 1)));

    apply(&mut graph, attribute, "multiplicity", "1..*".into()).unwrap();
    assert_eq!(graph.multiplicity(attribute), Some(Multiplicity::new(1, -1)));

    let err = apply(&mut graph, attribute, "upperBound", PropertyValue::Int(0)).unwrap_err();
    assert!(matches!(err, PropertyError::InvalidValue { .. }));
    let err = apply(&mut graph, attribute, "multiplicity", "3..1".into()).unwrap_err();
    assert!(matches!(err, PropertyError::InvalidValue { .. }));
}

#[test]
fn super_type_cycles_leave_list_unchanged() {
    let mut graph = MetaGraph::new("p");
    let root = graph.root();
    let a = graph.add_child(root, "A", ElementData::class()).unwrap();
    let b = graph.add_child(root, "B", ElementData::class()).unwrap();
    apply(&mut graph, b, "eSuperTypes", PropertyValue::Elements(vec![a])).unwrap();

    let err = apply(&mut graph, a, "eSuperTypes", PropertyValue::Elements(vec![b])).unwrap_err();
    assert_eq!(err.rule(), Some(ValidationRule::InheritanceCycle));
    assert!(graph.super_types(a).is_empty());

    let err = apply(&mut graph, a, "eSuperTypes", PropertyValue::Elements(vec![a])).unwrap_err();
    assert_eq!(err.rule(), Some(ValidationRule::InheritanceCycle));
    assert_eq!(graph.super_types(b), &[a]);
}

#[test]
fn interface_switch_requires_featureless_class() {
    let mut graph = MetaGraph::new("p");
    let class = graph.add_child(graph.root(), "A", ElementData::class()).unwrap();
    graph.add_child(class, "r", ElementData::reference(None)).unwrap();

    let err = apply(&mut graph, class, "interface", true.into()).unwrap_err();
    assert_eq!(err.rule(), Some(ValidationRule::InterfaceExclusivity));
    assert!(!graph.get(class).unwrap().as_class().unwrap().is_interface);
}

#[test]
fn retyping_a_paired_reference_unpairs_both_sides() {
    let mut fx = two_classes_with_references();
    apply(&mut fx.graph, fx.r1, "eOpposite", PropertyValue::Element(Some(fx.r2))).unwrap();

    let change = apply_property(
        &mut fx.graph,
        fx.r1,
        Property::EType,
        PropertyValue::Type(Some(TypeRef::Classifier(fx.a))),
    )
    .unwrap();
    assert_eq!(change.corrections, vec![fx.r2]);
    assert_eq!(fx.graph.opposite(fx.r1), None);
    assert_eq!(fx.graph.opposite(fx.r2), None);
    assert!(change.refresh_tree);
}

#[test]
fn scalar_properties_round_through_the_graph() {
    let mut graph = MetaGraph::new("p");
    let root = graph.root();
    apply(&mut graph, root, "nsURI", "http://example.org/p".into()).unwrap();
    apply(&mut graph, root, "nsPrefix", "p".into()).unwrap();
    let package = graph.get(root).unwrap().as_package().unwrap();
    assert_eq!(package.ns_uri, "http://example.org/p");
    assert_eq!(package.ns_prefix, "p");

    let color = graph.add_child(root, "Color", ElementData::enumeration()).unwrap();
    let red = graph.add_child(color, "RED", ElementData::literal("RED", 0)).unwrap();
    apply(&mut graph, red, "value", "7".into()).unwrap();
    apply(&mut graph, red, "literal", "red".into()).unwrap();
    match &graph.get(red).unwrap().data {
        ElementData::EnumLiteral(literal) => {
            assert_eq!(literal.value, 7);
            assert_eq!(literal.literal, "red");
        }
        other => panic!("unexpected data {other:?}"),
    }

    let class = graph.add_child(root, "A", ElementData::class()).unwrap();
    let id = graph.add_child(class, "id", ElementData::attribute(None)).unwrap();
    apply(&mut graph, id, "iD", true.into()).unwrap();
    apply(&mut graph, id, "transient", true.into()).unwrap();
    let flags = graph.flags(id).unwrap();
    assert!(flags.id && flags.transient && !flags.volatile);

    let change = apply(&mut graph, class, "name", "  Account ".into()).unwrap();
    assert_eq!(graph.name(class), Some("Account"));
    assert_eq!(change.relabel, vec![class]);
}

#[test]
fn names_are_trimmed_and_must_not_be_empty() {
    let mut fx = two_classes_with_references();

    apply(&mut fx.graph, fx.a, "name", "  Order ".into()).unwrap();
    assert_eq!(fx.graph.name(fx.a), Some("Order"));

    let err = apply(&mut fx.graph, fx.a, "name", "   ".into()).unwrap_err();
    assert!(matches!(
        err,
        PropertyError::InvalidValue {
            property: Property::Name,
            ..
        }
    ));
    assert_eq!(fx.graph.name(fx.a), Some("Order"));
}
