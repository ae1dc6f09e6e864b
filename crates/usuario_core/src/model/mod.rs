//! Domain model for managed users.
//!
//! # Responsibility
//! - Define the canonical user record and the proposed field set (`UserDraft`).
//! - Own the field validation gate used by every write path.
//!
//! # Invariants
//! - Every stored user is identified by a store-assigned `UserId`.
//! - Deletion is a hard delete; ids are never handed out twice.

pub mod user;
