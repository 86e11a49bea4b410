use metaed_core::{
    DisplayKind, ElementData, ElementId, ElementKind, MetaGraph, Multiplicity, NavKey,
    NavOutcome, ProjectionError, TreeProjection, TypeRef,
};

struct Shop {
    graph: MetaGraph,
    order: ElementId,
    item: ElementId,
    total: ElementId,
    items: ElementId,
    add: ElementId,
}

fn shop() -> Shop {
    let mut graph = MetaGraph::new("shop");
    let root = graph.root();
    let order = graph.add_child(root, "Order", ElementData::class()).unwrap();
    let item = graph.add_child(root, "Item", ElementData::class()).unwrap();
    let total = graph
        .add_child(order, "total", ElementData::attribute(Some(TypeRef::primitive("EDouble"))))
        .unwrap();
    let items = graph
        .add_child(order, "items", ElementData::reference(Some(TypeRef::Classifier(item))))
        .unwrap();
    graph.set_multiplicity(items, Multiplicity::MANY).unwrap();
    graph.set_containment(items, true).unwrap();
    let add = graph.add_child(order, "add", ElementData::operation()).unwrap();
    graph
        .add_child(add, "item", ElementData::parameter(Some(TypeRef::Classifier(item))))
        .unwrap();
    Shop {
        graph,
        order,
        item,
        total,
        items,
        add,
    }
}

#[test]
fn render_mirrors_every_element_once() {
    let shop = shop();
    let projection = TreeProjection::render(&shop.graph, "shop.json", false);

    assert_eq!(projection.len(), shop.graph.len() + 1);
    projection.check_consistency(&shop.graph).unwrap();

    let root = projection.node(projection.root()).unwrap();
    assert_eq!(root.kind(), DisplayKind::Root);
    assert_eq!(root.label(), "shop.json");
    assert!(root.is_expanded());
    assert_eq!(projection.visible().len(), 2);
}

#[test]
fn labels_follow_element_properties() {
    let shop = shop();
    let projection = TreeProjection::render(&shop.graph, "shop", true);

    assert_eq!(projection.label_of(shop.total), Some("total : EDouble"));
    assert_eq!(projection.label_of(shop.items), Some("items : Item[*] [containment]"));
    assert_eq!(projection.label_of(shop.add), Some("add(item: Item): void"));
    assert_eq!(projection.label_of(shop.order), Some("Order"));
}

#[test]
fn children_keep_feature_order() {
    let shop = shop();
    let projection = TreeProjection::render(&shop.graph, "shop", true);
    let order = projection.find(shop.order).unwrap();
    let kinds: Vec<DisplayKind> = projection
        .node(order)
        .unwrap()
        .children()
        .iter()
        .map(|child| projection.node(*child).unwrap().kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            DisplayKind::Element(ElementKind::Attribute),
            DisplayKind::Element(ElementKind::Reference),
            DisplayKind::Element(ElementKind::Operation),
        ]
    );
}

#[test]
fn keyboard_navigation_walks_visible_nodes() {
    let shop = shop();
    let mut projection = TreeProjection::render(&shop.graph, "shop", false);
    let package = projection.find(shop.graph.root()).unwrap();

    assert_eq!(projection.navigate(NavKey::Down), NavOutcome::Selected(projection.root()));
    assert_eq!(projection.navigate(NavKey::Down), NavOutcome::Selected(package));
    assert_eq!(projection.navigate(NavKey::Down), NavOutcome::Unchanged);

    assert_eq!(projection.navigate(NavKey::Right), NavOutcome::Expanded(package));
    let order = projection.find(shop.order).unwrap();
    assert_eq!(projection.navigate(NavKey::Right), NavOutcome::Selected(order));
    assert_eq!(projection.navigate(NavKey::Enter), NavOutcome::Expanded(order));
    assert_eq!(projection.navigate(NavKey::Left), NavOutcome::Collapsed(order));
    assert_eq!(projection.navigate(NavKey::Left), NavOutcome::Selected(package));
    assert_eq!(projection.navigate(NavKey::Up), NavOutcome::Selected(projection.root()));
    assert_eq!(projection.navigate(NavKey::Up), NavOutcome::Unchanged);
}

#[test]
fn delete_key_requests_deletion_except_on_roots() {
    let shop = shop();
    let mut projection = TreeProjection::render(&shop.graph, "shop", true);

    let total = projection.find(shop.total).unwrap();
    projection.select(Some(total)).unwrap();
    assert_eq!(projection.navigate(NavKey::Delete), NavOutcome::DeleteRequested(shop.total));

    let root = projection.root();
    projection.select(Some(root)).unwrap();
    assert_eq!(projection.navigate(NavKey::Delete), NavOutcome::Unchanged);
}

#[test]
fn insert_expands_parent_and_selects_new_node() {
    let mut shop = shop();
    let mut projection = TreeProjection::render(&shop.graph, "shop", false);
    let order = projection.find(shop.order).unwrap();

    let quantity = shop
        .graph
        .add_child(shop.order, "quantity", ElementData::attribute(Some(TypeRef::primitive("EInt"))))
        .unwrap();
    let handle = projection.insert(&shop.graph, order, quantity).unwrap();

    assert_eq!(projection.selection(), Some(handle));
    assert!(projection.node(order).unwrap().is_expanded());
    // Attributes land before the first reference.
    assert_eq!(projection.node(order).unwrap().children()[1], handle);
    projection.check_consistency(&shop.graph).unwrap();

    let err = projection.insert(&shop.graph, order, quantity).unwrap_err();
    assert_eq!(err, ProjectionError::AlreadyProjected(quantity));
}

#[test]
fn parameter_insert_relabels_operation() {
    let mut shop = shop();
    let mut projection = TreeProjection::render(&shop.graph, "shop", true);
    let add = projection.find(shop.add).unwrap();

    let count = shop
        .graph
        .add_child(shop.add, "count", ElementData::parameter(Some(TypeRef::primitive("EInt"))))
        .unwrap();
    projection.insert(&shop.graph, add, count).unwrap();
    assert_eq!(projection.label_of(shop.add), Some("add(item: Item, count: EInt): void"));
}

#[test]
fn remove_drops_subtree_and_selection() {
    let mut shop = shop();
    let mut projection = TreeProjection::render(&shop.graph, "shop", true);
    let order = projection.find(shop.order).unwrap();
    let total = projection.find(shop.total).unwrap();
    projection.select(Some(total)).unwrap();

    shop.graph.remove_subtree(shop.order).unwrap();
    let removed = projection.remove(order).unwrap();

    assert_eq!(removed.len(), 5);
    assert_eq!(projection.selection(), None);
    assert_eq!(projection.find(shop.total), None);
    projection.check_consistency(&shop.graph).unwrap();
    assert_eq!(projection.remove(projection.root()), Err(ProjectionError::RootImmutable));
}

#[test]
fn renaming_a_class_relabels_dependents() {
    let mut shop = shop();
    let mut projection = TreeProjection::render(&shop.graph, "shop", true);

    shop.graph.set_name(shop.item, "Product").unwrap();
    let updated = projection.relabel(&shop.graph, shop.item);

    assert_eq!(updated, 4);
    assert_eq!(projection.label_of(shop.item), Some("Product"));
    assert_eq!(projection.label_of(shop.items), Some("items : Product[*] [containment]"));
    assert_eq!(projection.label_of(shop.add), Some("add(item: Product): void"));
}

#[test]
fn relabel_of_unknown_element_is_a_no_op() {
    let shop = shop();
    let mut projection = TreeProjection::render(&shop.graph, "shop", true);
    let stranger = MetaGraph::new("other").root();
    assert_eq!(projection.relabel(&shop.graph, stranger), 0);
}

#[test]
fn reparent_moves_node_with_its_subtree() {
    let mut shop = shop();
    let mut projection = TreeProjection::render(&shop.graph, "shop", true);
    let total = projection.find(shop.total).unwrap();
    let item = projection.find(shop.item).unwrap();

    shop.graph.move_element(shop.total, shop.item).unwrap();
    projection.reparent(&shop.graph, total, item).unwrap();

    assert_eq!(projection.node(total).unwrap().parent(), Some(item));
    projection.check_consistency(&shop.graph).unwrap();

    let order = projection.find(shop.order).unwrap();
    let err = projection.reparent(&shop.graph, order, order).unwrap_err();
    assert_eq!(err, ProjectionError::InvalidParent(order));
}

#[test]
fn render_text_marks_selection_and_expansion() {
    let mut graph = MetaGraph::new("p");
    let class = graph.add_child(graph.root(), "A", ElementData::class()).unwrap();
    graph
        .add_child(class, "x", ElementData::attribute(Some(TypeRef::primitive("EInt"))))
        .unwrap();
    let mut projection = TreeProjection::render(&graph, "doc", true);
    let handle = projection.find(class).unwrap();
    projection.select(Some(handle)).unwrap();

    assert_eq!(
        projection.render_text(),
        " - doc\n   - p\n>    - A\n       . x : EInt"
    );
}

#[test]
fn expand_all_and_collapse_all_cover_the_subtree() {
    let shop = shop();
    let mut projection = TreeProjection::render(&shop.graph, "shop", false);
    let root = projection.root();

    projection.expand_all(root).unwrap();
    assert_eq!(projection.visible().len(), projection.len());

    projection.collapse_all(root).unwrap();
    assert_eq!(projection.visible(), vec![root]);

    let order = projection.find(shop.order).unwrap();
    assert!(!projection.node(order).unwrap().is_expanded());
}
