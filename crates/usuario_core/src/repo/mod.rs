//! Repository layer: persistence contract and its implementations.
//!
//! # Responsibility
//! - Define the backend contract the user store depends on.
//! - Isolate SQLite query details from the store and the CLI.
//!
//! # Invariants
//! - Repository APIs report semantic errors (`NotFound`, `DuplicateEmail`)
//!   separately from transport errors.

pub mod memory_repo;
pub mod user_repo;
