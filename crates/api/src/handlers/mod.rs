//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate persistence to the repositories in `dealflow_db` and
//! scoring to the pure functions in `dealflow_core`, mapping errors via
//! [`crate::error::AppError`].

pub mod opportunity;
pub mod similar_deals;
