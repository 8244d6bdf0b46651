//! Entity rows and their create/update DTOs.
//!
//! Each module also owns the defaulting and validation for its entity, so
//! both store implementations prepare rows the same way.

pub mod account;
pub mod machine;
pub mod maintenance_record;
pub mod security_event;
