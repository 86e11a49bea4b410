//! Document load/save boundary.
//!
//! # Responsibility
//! - Convert between exchange-format text and an in-memory `MetaGraph`.
//! - Keep format details out of the editor services.
//!
//! # Invariants
//! - A parsed graph has passed `MetaGraph::check_integrity()`.

pub mod document_repo;
