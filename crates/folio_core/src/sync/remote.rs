//! Remote store contract and subscription guard.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Callback receiving the current value at a subscribed path.
///
/// `None` means the path holds no value.
pub type RemoteListener = Box<dyn Fn(Option<Value>) + Send + 'static>;

/// Remote store errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Client could not be constructed from the given settings.
    InvalidConfig(String),
    /// Request never produced a response (DNS, TLS, timeout ...).
    Transport(String),
    /// Server answered with a non-success status.
    Status { code: u16, body: String },
    /// Response or request body was not valid JSON.
    Decode(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(message) => write!(f, "invalid remote config: {message}"),
            Self::Transport(message) => write!(f, "remote transport error: {message}"),
            Self::Status { code, body } => write!(f, "remote store returned HTTP {code}: {body}"),
            Self::Decode(message) => write!(f, "remote payload decode error: {message}"),
        }
    }
}

impl Error for RemoteError {}

/// Networked document store with push-style change delivery.
pub trait RealtimeStore: Send + Sync {
    /// Reads the value at `path`; `Ok(None)` when nothing is stored.
    fn read(&self, path: &str) -> RemoteResult<Option<Value>>;

    /// Replaces the whole value at `path`.
    fn write(&self, path: &str, value: &Value) -> RemoteResult<()>;

    /// Delivers the value at `path` now and after every change, until the
    /// returned guard is dropped.
    fn subscribe(&self, path: &str, listener: RemoteListener) -> RemoteResult<Subscription>;
}

/// Guard for one live subscription.
///
/// Dropping (or calling [`Subscription::cancel`]) runs the teardown exactly once.
#[must_use = "dropping a subscription cancels it immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Cancels the subscription now.
    pub fn cancel(mut self) {
        self.run_teardown();
    }

    fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.teardown.is_some())
            .finish()
    }
}
