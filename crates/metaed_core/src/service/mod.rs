//! Editor use-case services.
//!
//! # Responsibility
//! - Validate proposed edits against metamodel invariants (`validator`).
//! - Offer and run structural actions per element kind (`action_catalog`).
//! - Apply property-sheet edits with corrections (`property_service`).
//! - Present the selection as a property sheet (`property_sheet`).
//! - Tie graph, projection and status together for the shell
//!   (`editor_service`).
//!
//! # Invariants
//! - Graph mutations happen only after every blocking check passed.

pub mod action_catalog;
pub mod editor_service;
pub mod property_service;
pub mod property_sheet;
pub mod validator;
