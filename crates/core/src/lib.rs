//! Dealflow domain logic.
//!
//! Pure types and functions shared by the repository and API layers.
//! Nothing in this crate performs I/O; everything is synchronous and
//! deterministic so it can be exercised directly in unit tests.

pub mod error;
pub mod opportunity;
pub mod pagination;
pub mod similarity;
pub mod types;
