use metaed_core::repo::document_repo::{DocumentSnapshot, FORMAT_VERSION};
use metaed_core::{
    CodecError, DocumentCodec, ElementData, ElementKind, JsonDocumentCodec, MetaGraph,
    Multiplicity, TypeRef,
};

fn library() -> MetaGraph {
    let mut graph = MetaGraph::new("library");
    let root = graph.root();
    let book = graph.add_child(root, "Book", ElementData::class()).unwrap();
    let shelf = graph.add_child(root, "Shelf", ElementData::class()).unwrap();
    let books = graph
        .add_child(shelf, "books", ElementData::reference(Some(TypeRef::Classifier(book))))
        .unwrap();
    let shelf_ref = graph
        .add_child(book, "shelf", ElementData::reference(Some(TypeRef::Classifier(shelf))))
        .unwrap();
    graph.set_multiplicity(books, Multiplicity::MANY).unwrap();
    graph.set_opposite(books, Some(shelf_ref)).unwrap();
    graph
        .add_child(root, "Timestamp", ElementData::opaque("EDataType"))
        .unwrap();
    graph
}

#[test]
fn saved_document_loads_back_with_same_structure() {
    let graph = library();
    let codec = JsonDocumentCodec::pretty();

    let text = codec.serialize(&graph).unwrap();
    let loaded = codec.parse(&text).unwrap();

    assert_eq!(loaded.root(), graph.root());
    assert_eq!(loaded.len(), graph.len());
    let books = loaded.find_classifier("Shelf").map(|shelf| loaded.children(shelf)[0]).unwrap();
    let partner = loaded.opposite(books).unwrap();
    assert_eq!(loaded.name(partner), Some("shelf"));
    assert_eq!(loaded.opposite(partner), Some(books));

    let opaque = loaded.find_classifier("Timestamp").unwrap();
    assert_eq!(loaded.kind_of(opaque), ElementKind::Unknown);
}

#[test]
fn malformed_text_is_a_parse_error() {
    let err = JsonDocumentCodec::new().parse("[1, 2").unwrap_err();
    assert!(matches!(err, CodecError::Parse(_)));
}

#[test]
fn unknown_format_version_is_rejected() {
    let mut snapshot = DocumentSnapshot::from_graph(&library());
    snapshot.format_version = FORMAT_VERSION + 1;
    let text = serde_json::to_string(&snapshot).unwrap();

    let err = JsonDocumentCodec::new().parse(&text).unwrap_err();
    assert_eq!(err, CodecError::UnsupportedVersion(FORMAT_VERSION + 1));
}

#[test]
fn documents_breaking_invariants_are_rejected() {
    let mut snapshot = DocumentSnapshot::from_graph(&library());
    // Drop the last element but keep it listed by its container.
    snapshot.elements.pop();
    let text = serde_json::to_string(&snapshot).unwrap();

    let err = JsonDocumentCodec::new().parse(&text).unwrap_err();
    assert!(matches!(err, CodecError::Integrity(_)));
}

#[test]
fn snapshot_lists_root_first() {
    let graph = library();
    let snapshot = DocumentSnapshot::from_graph(&graph);
    assert_eq!(snapshot.format_version, FORMAT_VERSION);
    assert_eq!(snapshot.elements[0].id(), graph.root());
    assert_eq!(snapshot.elements.len(), graph.len());
}
