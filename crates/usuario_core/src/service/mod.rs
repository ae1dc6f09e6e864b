//! Core use-case services.
//!
//! # Responsibility
//! - Turn repository primitives into the user store's lifecycle operations.
//! - Keep the CLI decoupled from storage details.

pub mod user_service;
