//! Structural rules
//!
//! `invariants` finds violations and reports them all; `validation` turns
//! the first one found into an error.

pub mod invariants;
pub mod validation;

pub use validation::validate_tree;
