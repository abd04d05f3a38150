//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod opportunity_repo;

pub use opportunity_repo::OpportunityRepo;
