//! Remote realtime store integration.
//!
//! # Responsibility
//! - Define the three primitives the core needs from a remote document
//!   store: point read, wholesale write, and change subscription.
//! - Decide once per process whether a remote store is usable.
//!
//! # Invariants
//! - At most one remote client exists per process-wide slot.
//! - Selection failures degrade to "no remote backend" and never propagate.

pub mod backend_selector;
pub mod remote;
pub mod rest_client;
