//! Shared helpers for validating uploaded input.

pub mod validation;
