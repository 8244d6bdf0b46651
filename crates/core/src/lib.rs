//! Domain logic for machine maintenance tracking.
//!
//! This crate has no internal dependencies and performs no I/O: it holds the
//! shared vocabularies, input validators, and the predictive analytics engine
//! that the repository and binary crates build on.

pub mod error;
pub mod machine;
pub mod maintenance;
pub mod predictive;
pub mod roles;
pub mod security;
pub mod types;
pub mod validation;
