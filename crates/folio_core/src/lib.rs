//! Core content synchronization and access logic for folio.
//! This crate owns the portfolio document, its persistence and the edit gate.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use config::{ConfigError, FolioConfig, RemoteConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::content::{Certification, Contact, ContentDocument, Project};
pub use model::profile_image::{encode_data_uri, ProfileImage, ProfileImageError};
pub use repo::kv_repo::{KvError, KvResult, KvStore, SqliteKvStore};
pub use service::access_gate::{digest_secret, AccessGate, AccessState, REFERENCE_DIGEST_HEX};
pub use service::backend::{
    backend_for, BackendError, BackendKind, BackendResult, DocumentBackend, DocumentFeed,
    LocalBackend, PendingWrite, RemoteBackend, WriteProgress, DOCUMENT_PATH, LOCAL_DOCUMENT_KEY,
};
pub use service::content_store::{ContentStore, LoadOutcome, SaveOutcome, StoreState};
pub use service::field_mutator::{
    with_field, CertificationField, ContactField, FieldPath, FieldPathError, ProjectField,
};
pub use service::notification::{
    Notification, NotificationKind, NotificationLog, NotificationSink,
};
pub use sync::backend_selector::{
    select_backend, select_backend_with, BackendHandle, ClientSlot, RemoteConnector,
    RestConnector, SelectionError,
};
pub use sync::remote::{RealtimeStore, RemoteError, RemoteListener, RemoteResult, Subscription};
pub use sync::rest_client::RestRealtimeClient;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
