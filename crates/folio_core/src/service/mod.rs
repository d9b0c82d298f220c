//! Core use-case services consumed by the presentation layer.
//!
//! # Responsibility
//! - Own the canonical document and route persistence to the active backend.
//! - Gate edit mode behind the access secret.
//! - Produce edited documents without mutating the input.
//!
//! # Invariants
//! - Backend failures end at the store boundary as notifications.
//! - Presentation never holds a writable reference to the stored document.

pub mod access_gate;
pub mod backend;
pub mod content_store;
pub mod field_mutator;
pub mod notification;
