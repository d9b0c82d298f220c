//! Password gate for edit mode.
//!
//! # Responsibility
//! - Verify a candidate secret against a fixed SHA-256 reference digest.
//! - Track the session's authorized/editing state.
//!
//! # Invariants
//! - `editing` implies `authorized`.
//! - `authorized` never reverts within a session; `close` only ends editing.
//! - The check runs entirely in-process against a digest shipped with the
//!   client. It is a convenience gate, not a security boundary.

use crate::service::notification::{emit, Notification, NotificationSink};
use log::info;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Lowercase hex SHA-256 digest of the edit secret.
pub const REFERENCE_DIGEST_HEX: &str =
    "84f3ee8f646c896e01ed7933bed50414ae8c8000e44880fa0e0d530e71f3b46e";

/// Session access flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessState {
    authorized: bool,
    editing: bool,
}

impl AccessState {
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }
}

/// Lowercase hex SHA-256 of the UTF-8 bytes of `secret`.
pub fn digest_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Edit-mode state machine guarded by a secret digest.
pub struct AccessGate {
    state: AccessState,
    reference_digest: String,
    notifier: Arc<dyn NotificationSink>,
}

impl AccessGate {
    pub fn new(notifier: Arc<dyn NotificationSink>) -> Self {
        Self::with_reference_digest(notifier, REFERENCE_DIGEST_HEX)
    }

    /// Gate checking against a caller-provided hex digest.
    pub fn with_reference_digest(
        notifier: Arc<dyn NotificationSink>,
        reference_digest: &str,
    ) -> Self {
        Self {
            state: AccessState::default(),
            reference_digest: reference_digest.trim().to_ascii_lowercase(),
            notifier,
        }
    }

    pub fn state(&self) -> AccessState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state.editing
    }

    /// Checks `secret`; on match enters edit mode.
    ///
    /// Emits one success or error notification either way.
    pub fn attempt_unlock(&mut self, secret: &str) -> bool {
        if digest_secret(secret) != self.reference_digest {
            info!("event=unlock module=access status=denied");
            emit(
                self.notifier.as_ref(),
                Notification::error("Incorrect password."),
            );
            return false;
        }

        self.state = AccessState {
            authorized: true,
            editing: true,
        };
        info!("event=unlock module=access status=ok");
        emit(
            self.notifier.as_ref(),
            Notification::success("Edit mode enabled."),
        );
        true
    }

    /// Leaves edit mode; authorization is kept for the session.
    pub fn close(&mut self) {
        self.state.editing = false;
    }

    /// Enters edit mode, prompting for the secret only when not yet authorized.
    ///
    /// `prompt` returning `None` (cancelled) leaves state unchanged and emits
    /// nothing. Returns whether edit mode is active afterwards.
    pub fn request_edit<F>(&mut self, prompt: F) -> bool
    where
        F: FnOnce() -> Option<String>,
    {
        if self.state.authorized {
            self.state.editing = true;
            return true;
        }
        match prompt() {
            Some(secret) => self.attempt_unlock(&secret),
            None => false,
        }
    }
}
