//! Portfolio content model.
//!
//! # Responsibility
//! - Define the single editable aggregate rendered by the presentation layer.
//! - Provide the seed document used when nothing has been persisted yet.
//!
//! # Invariants
//! - A `ContentDocument` is always fully populated.
//! - Array elements are addressed by position; order is presentation order.

pub mod content;
pub mod profile_image;
