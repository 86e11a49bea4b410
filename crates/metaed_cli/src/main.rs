//! CLI entry point for the metamodel editor core.
//!
//! # Responsibility
//! - Load a JSON document (or a built-in sample) and print its tree.
//! - Start file logging when `--log-dir` is given.

use clap::Parser;
use log::info;
use metaed_core::{
    init_logging, DocumentCodec, EditorConfig, EditorSession, ElementData, GraphError,
    JsonDocumentCodec, MetaGraph, Multiplicity, TypeRef,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Renders a metamodel document as an indented tree.
#[derive(Debug, Parser)]
#[command(name = "metaed_cli", version, about)]
struct Args {
    /// JSON document to load; a built-in sample is used when omitted
    document: Option<PathBuf>,
    /// Absolute directory for rotating log files
    #[arg(long)]
    log_dir: Option<String>,
    /// JSON editor config
    #[arg(long)]
    config: Option<PathBuf>,
}

fn sample_graph() -> Result<MetaGraph, GraphError> {
    let mut graph = MetaGraph::new("library");
    let root = graph.root();
    let book = graph.add_child(root, "Book", ElementData::class())?;
    let library = graph.add_child(root, "Library", ElementData::class())?;
    let genre = graph.add_child(root, "Genre", ElementData::enumeration())?;
    for (value, name) in ["FICTION", "SCIENCE"].into_iter().enumerate() {
        let value = i32::try_from(value).unwrap_or(i32::MAX);
        graph.add_child(genre, name, ElementData::literal(name, value))?;
    }

    graph.add_child(book, "title", ElementData::attribute(Some(TypeRef::primitive("EString"))))?;
    graph.add_child(book, "genre", ElementData::attribute(Some(TypeRef::Classifier(genre))))?;
    let books = graph.add_child(library, "books", ElementData::reference(Some(TypeRef::Classifier(book))))?;
    graph.set_multiplicity(books, Multiplicity::MANY)?;
    graph.set_containment(books, true)?;
    let find = graph.add_child(library, "findByTitle", ElementData::operation())?;
    graph.set_type(find, Some(TypeRef::Classifier(book)))?;
    graph.add_child(find, "title", ElementData::parameter(Some(TypeRef::primitive("EString"))))?;
    Ok(graph)
}

fn run(args: Args) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|err| format!("cannot read config `{}`: {err}", path.display()))?;
            EditorConfig::from_json_str(&text).map_err(|err| err.to_string())?
        }
        None => EditorConfig::default(),
    };
    if let Some(log_dir) = args.log_dir.or_else(|| config.log_dir.clone()) {
        init_logging(&config.log_level, &log_dir)?;
    }
    config.expand_on_render = true;

    let codec = JsonDocumentCodec::pretty();
    let session = match &args.document {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|err| format!("cannot read document `{}`: {err}", path.display()))?;
            let graph = codec.parse(&text).map_err(|err| err.to_string())?;
            EditorSession::with_graph(config, graph, path.display().to_string())
        }
        None => {
            let graph = sample_graph().map_err(|err| err.to_string())?;
            EditorSession::with_graph(config, graph, "sample")
        }
    }
    .map_err(|err| err.to_string())?;

    info!(
        "event=cli_render module=cli status=ok elements={}",
        session.graph().len()
    );
    println!("{}", session.projection().render_text());
    println!("metaed_core version={}", metaed_core::core_version());
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{sample_graph, Args};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn flags_and_document_are_parsed() {
        let args = Args::try_parse_from([
            "metaed_cli",
            "model.json",
            "--log-dir",
            "/tmp/metaed",
            "--config",
            "editor.json",
        ])
        .unwrap();
        assert_eq!(args.document, Some(PathBuf::from("model.json")));
        assert_eq!(args.log_dir.as_deref(), Some("/tmp/metaed"));
        assert_eq!(args.config, Some(PathBuf::from("editor.json")));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Args::try_parse_from(["metaed_cli", "--verbose"]).is_err());
    }

    #[test]
    fn sample_graph_passes_integrity_check() {
        sample_graph().unwrap().check_integrity().unwrap();
    }
}
