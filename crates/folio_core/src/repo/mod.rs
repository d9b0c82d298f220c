//! Local key-value persistence.
//!
//! # Responsibility
//! - Define the string-keyed store contract used as the local fallback.
//! - Keep SQLite details inside the core persistence boundary.
//!
//! # Invariants
//! - `set` replaces any prior value for the key wholesale.

pub mod kv_repo;
