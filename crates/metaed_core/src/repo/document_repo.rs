//! Document codec contract and the JSON implementation.

use crate::model::element::{Element, ElementId};
use crate::model::graph::{GraphError, MetaGraph};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Snapshot format version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// Result type used by codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors from document parsing and serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Text is not a well-formed document.
    Parse(String),
    /// Document declares a format version this crate cannot read.
    UnsupportedVersion(u32),
    /// Document parsed but violates graph invariants.
    Integrity(GraphError),
    /// Graph could not be written out.
    Serialize(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "cannot parse document: {message}"),
            Self::UnsupportedVersion(version) => write!(
                f,
                "unsupported document format version {version}; expected {FORMAT_VERSION}"
            ),
            Self::Integrity(err) => write!(f, "document is inconsistent: {err}"),
            Self::Serialize(message) => write!(f, "cannot serialize document: {message}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Integrity(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GraphError> for CodecError {
    fn from(value: GraphError) -> Self {
        Self::Integrity(value)
    }
}

/// Exchange-format boundary consumed at document load and save.
pub trait DocumentCodec {
    /// Short format name for logs and status messages.
    fn format_name(&self) -> &'static str;
    fn parse(&self, text: &str) -> CodecResult<MetaGraph>;
    fn serialize(&self, graph: &MetaGraph) -> CodecResult<String>;
}

/// On-disk shape of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub format_version: u32,
    pub root: ElementId,
    /// Elements in document order, root first.
    pub elements: Vec<Element>,
}

impl DocumentSnapshot {
    pub fn from_graph(graph: &MetaGraph) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            root: graph.root(),
            elements: graph.in_document_order().into_iter().cloned().collect(),
        }
    }

    /// Rebuilds the graph; fails on version mismatch or broken invariants.
    pub fn into_graph(self) -> CodecResult<MetaGraph> {
        if self.format_version != FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion(self.format_version));
        }
        Ok(MetaGraph::from_elements(self.root, self.elements)?)
    }
}

/// JSON codec backed by serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentCodec {
    pretty: bool,
}

impl JsonDocumentCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output for hand-edited documents.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl DocumentCodec for JsonDocumentCodec {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, text: &str) -> CodecResult<MetaGraph> {
        let snapshot: DocumentSnapshot = serde_json::from_str(text).map_err(|err| {
            warn!(
                "event=document_parse module=document status=error line={} column={}",
                err.line(),
                err.column()
            );
            CodecError::Parse(err.to_string())
        })?;
        let graph = snapshot.into_graph()?;
        info!(
            "event=document_parse module=document status=ok elements={}",
            graph.len()
        );
        Ok(graph)
    }

    fn serialize(&self, graph: &MetaGraph) -> CodecResult<String> {
        let snapshot = DocumentSnapshot::from_graph(graph);
        let text = if self.pretty {
            serde_json::to_string_pretty(&snapshot)
        } else {
            serde_json::to_string(&snapshot)
        };
        text.map_err(|err| CodecError::Serialize(err.to_string()))
    }
}
