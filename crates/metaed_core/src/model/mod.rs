//! Metamodel object graph.
//!
//! # Responsibility
//! - Define element records, kinds and value types (`element`).
//! - Classify elements into kinds without probing their shape (`classify`).
//! - Store elements and apply invariant-preserving mutations (`graph`).
//!
//! # Invariants
//! - Every element is identified by a stable `ElementId`.
//! - Containment forms a tree rooted at one Package.

pub mod classify;
pub mod element;
pub mod graph;
