//! Once-per-process remote backend selection.
//!
//! # Responsibility
//! - Decide whether a remote realtime store is usable for this process.
//! - Own the single remote client instance behind an explicit once-only slot.
//!
//! # Invariants
//! - A slot runs its decision at most once; later calls return the cached
//!   result, so at most one client is ever constructed per slot.
//! - Incomplete config, construction errors and connector panics all yield
//!   `None`; nothing propagates to callers.

use crate::config::{ConfigError, RemoteConfig};
use crate::sync::remote::{RealtimeStore, RemoteError, RemoteResult};
use crate::sync::rest_client::RestRealtimeClient;
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

static PROCESS_SLOT: ClientSlot = ClientSlot::new();

/// Usable handle to the process's remote client.
#[derive(Clone)]
pub struct BackendHandle {
    client: Arc<dyn RealtimeStore>,
}

impl BackendHandle {
    pub fn new(client: Arc<dyn RealtimeStore>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> Arc<dyn RealtimeStore> {
        Arc::clone(&self.client)
    }

    /// Whether both handles point at the same underlying client instance.
    pub fn shares_client_with(&self, other: &BackendHandle) -> bool {
        Arc::ptr_eq(&self.client, &other.client)
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle").finish_non_exhaustive()
    }
}

/// Why no remote backend was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Required remote settings are absent; local fallback is expected.
    ConfigIncomplete(ConfigError),
    /// Client construction failed.
    InitFailure(RemoteError),
    /// Client construction panicked.
    InitPanicked,
}

impl Display for SelectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigIncomplete(err) => write!(f, "remote config incomplete: {err}"),
            Self::InitFailure(err) => write!(f, "remote client init failed: {err}"),
            Self::InitPanicked => write!(f, "remote client init panicked"),
        }
    }
}

impl Error for SelectionError {}

/// Factory for remote clients.
pub trait RemoteConnector {
    fn connect(&self, config: &RemoteConfig) -> RemoteResult<Arc<dyn RealtimeStore>>;
}

/// Connector producing [`RestRealtimeClient`] instances.
#[derive(Debug, Clone, Copy)]
pub struct RestConnector {
    pub poll_interval: Duration,
}

impl Default for RestConnector {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl RemoteConnector for RestConnector {
    fn connect(&self, config: &RemoteConfig) -> RemoteResult<Arc<dyn RealtimeStore>> {
        let client = RestRealtimeClient::new(config, self.poll_interval)?;
        Ok(Arc::new(client))
    }
}

/// Once-only holder of a backend decision and its client.
pub struct ClientSlot {
    decision: OnceCell<Option<BackendHandle>>,
}

impl Default for ClientSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSlot {
    pub const fn new() -> Self {
        Self {
            decision: OnceCell::new(),
        }
    }

    /// Returns the cached decision, deciding first if this is the first call.
    pub fn select(
        &self,
        config: &RemoteConfig,
        connector: &dyn RemoteConnector,
    ) -> Option<BackendHandle> {
        self.decision
            .get_or_init(|| match try_connect(config, connector) {
                Ok(handle) => {
                    info!("event=backend_select module=sync status=ok backend=remote");
                    Some(handle)
                }
                Err(err @ SelectionError::ConfigIncomplete(_)) => {
                    debug!(
                        "event=backend_select module=sync status=fallback backend=local reason={}",
                        err
                    );
                    None
                }
                Err(err) => {
                    warn!(
                        "event=backend_select module=sync status=fallback backend=local reason={}",
                        err
                    );
                    None
                }
            })
            .clone()
    }

    /// Whether this slot already made its decision.
    pub fn is_decided(&self) -> bool {
        self.decision.get().is_some()
    }
}

/// Selects the process-wide backend.
///
/// The first call decides; every later call in the same process returns a
/// handle to the same client (or `None` again), regardless of `config`.
pub fn select_backend(config: &RemoteConfig) -> Option<BackendHandle> {
    select_backend_with(config, &RestConnector::default())
}

/// Like [`select_backend`] with an explicit connector for the first decision.
pub fn select_backend_with(
    config: &RemoteConfig,
    connector: &dyn RemoteConnector,
) -> Option<BackendHandle> {
    PROCESS_SLOT.select(config, connector)
}

fn try_connect(
    config: &RemoteConfig,
    connector: &dyn RemoteConnector,
) -> Result<BackendHandle, SelectionError> {
    config
        .check_complete()
        .map_err(SelectionError::ConfigIncomplete)?;

    match catch_unwind(AssertUnwindSafe(|| connector.connect(config))) {
        Ok(Ok(client)) => Ok(BackendHandle::new(client)),
        Ok(Err(err)) => Err(SelectionError::InitFailure(err)),
        Err(_) => Err(SelectionError::InitPanicked),
    }
}
