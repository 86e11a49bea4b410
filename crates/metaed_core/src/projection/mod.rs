//! Tree projection of the metamodel.
//!
//! # Responsibility
//! - Mirror Package → Classifier → Feature → Parameter (and Enum → Literal)
//!   as display nodes with labels, expansion and selection (`tree`).
//! - Format labels from current element properties (`label`).
//! - Drive selection and expansion from navigation keys (`nav`).
//!
//! # Invariants
//! - The projection is only rebuilt on document load; edits are applied
//!   incrementally so selection and expansion survive.

pub mod label;
pub mod nav;
pub mod tree;
