//! Document persistence backends.
//!
//! # Responsibility
//! - Present remote and local storage behind one `DocumentBackend` contract.
//! - Translate between `ContentDocument` and each store's value format.
//!
//! # Invariants
//! - Both backends store the whole document at one well-known location and
//!   replace it wholesale on write.
//! - A stored value that cannot be decoded is treated as absent.
//! - Remote writes never run on the caller's thread; they are queued to one
//!   writer thread per backend and complete in submission order.

use crate::model::content::ContentDocument;
use crate::repo::kv_repo::{KvError, KvStore};
use crate::sync::backend_selector::BackendHandle;
use crate::sync::remote::{RealtimeStore, RemoteError, RemoteResult, Subscription};
use log::{debug, info, warn};
use once_cell::unsync::OnceCell;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Remote path holding the document.
pub const DOCUMENT_PATH: &str = "portfolio";
/// Local store key holding the serialized document.
pub const LOCAL_DOCUMENT_KEY: &str = "portfolio";

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

#[derive(Debug)]
pub enum BackendError {
    Remote(RemoteError),
    Local(KvError),
    Encode(serde_json::Error),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "{err}"),
            Self::Local(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode document: {err}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::Local(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<RemoteError> for BackendError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

impl From<KvError> for BackendError {
    fn from(value: KvError) -> Self {
        Self::Local(value)
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Sequence of documents produced by one `open_feed` call.
///
/// Live feeds keep their remote subscription alive until dropped.
pub struct DocumentFeed {
    rx: Receiver<ContentDocument>,
    subscription: Option<Subscription>,
}

impl DocumentFeed {
    /// Finite feed yielding `document` once (or nothing).
    pub fn once(document: Option<ContentDocument>) -> Self {
        let (tx, rx) = mpsc::channel();
        if let Some(document) = document {
            // Receiver is alive; send cannot fail here.
            let _ = tx.send(document);
        }
        Self {
            rx,
            subscription: None,
        }
    }

    /// Feed driven by a remote subscription.
    pub fn live(rx: Receiver<ContentDocument>, subscription: Subscription) -> Self {
        Self {
            rx,
            subscription: Some(subscription),
        }
    }

    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    /// Next already-delivered document, without blocking.
    pub fn try_next(&self) -> Option<ContentDocument> {
        self.rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next document.
    pub fn next_timeout(&self, timeout: Duration) -> Option<ContentDocument> {
        match self.rx.recv_timeout(timeout) {
            Ok(document) => Some(document),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// How far a write got by the time `DocumentBackend::write` returned.
#[derive(Debug)]
pub enum WriteProgress {
    /// Stored synchronously.
    Done,
    /// Handed to a background writer; the result arrives later.
    Queued(PendingWrite),
}

/// Completion handle for one queued write.
#[derive(Debug)]
pub struct PendingWrite {
    rx: Receiver<RemoteResult<()>>,
}

impl PendingWrite {
    /// The write result if it already arrived, without blocking.
    pub fn try_result(&self) -> Option<BackendResult<()>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result.map_err(BackendError::from)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(writer_stopped())),
        }
    }

    /// Waits up to `timeout` for the write result.
    pub fn wait(&self, timeout: Duration) -> Option<BackendResult<()>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result.map_err(BackendError::from)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(writer_stopped())),
        }
    }
}

/// Storage strategy used by the content store.
pub trait DocumentBackend {
    fn kind(&self) -> BackendKind;

    /// Starts delivering the stored document.
    fn open_feed(&self) -> BackendResult<DocumentFeed>;

    /// Replaces the stored document, or queues the replacement.
    ///
    /// `Err` means the write could not even be started.
    fn write(&self, document: &ContentDocument) -> BackendResult<WriteProgress>;
}

struct WriteJob {
    value: Value,
    reply: Sender<RemoteResult<()>>,
}

/// Backend writing to and subscribing on the remote store.
pub struct RemoteBackend {
    client: Arc<dyn RealtimeStore>,
    writer: OnceCell<Sender<WriteJob>>,
}

impl RemoteBackend {
    pub fn new(client: Arc<dyn RealtimeStore>) -> Self {
        Self {
            client,
            writer: OnceCell::new(),
        }
    }

    fn writer(&self) -> BackendResult<&Sender<WriteJob>> {
        self.writer
            .get_or_try_init(|| spawn_writer(Arc::clone(&self.client)))
    }
}

/// Starts the writer thread; it exits once the backend (the only sender) is dropped.
fn spawn_writer(client: Arc<dyn RealtimeStore>) -> BackendResult<Sender<WriteJob>> {
    let (jobs, job_rx) = mpsc::channel::<WriteJob>();
    thread::Builder::new()
        .name("folio-remote-write".to_string())
        .spawn(move || {
            for job in job_rx {
                let result = client.write(DOCUMENT_PATH, &job.value);
                // Receiver gone means the store stopped waiting.
                let _ = job.reply.send(result);
            }
            debug!("event=remote_write module=service status=stopped");
        })
        .map_err(|err| RemoteError::Transport(format!("failed to start writer: {err}")))?;
    Ok(jobs)
}

fn writer_stopped() -> BackendError {
    BackendError::Remote(RemoteError::Transport(
        "remote writer stopped before reporting".to_string(),
    ))
}

impl DocumentBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn open_feed(&self) -> BackendResult<DocumentFeed> {
        let (tx, rx) = mpsc::channel();
        let subscription = self.client.subscribe(
            DOCUMENT_PATH,
            Box::new(move |value: Option<Value>| {
                let Some(value) = value else {
                    return;
                };
                if let Some(document) = decode_remote(value) {
                    // Receiver gone means the feed was torn down.
                    let _ = tx.send(document);
                }
            }),
        )?;
        info!("event=feed_open module=service status=ok backend=remote");
        Ok(DocumentFeed::live(rx, subscription))
    }

    fn write(&self, document: &ContentDocument) -> BackendResult<WriteProgress> {
        let value = serde_json::to_value(document)?;
        let (reply, rx) = mpsc::channel();
        self.writer()?
            .send(WriteJob { value, reply })
            .map_err(|_| writer_stopped())?;
        Ok(WriteProgress::Queued(PendingWrite { rx }))
    }
}

/// Backend storing the serialized document in the local key-value store.
pub struct LocalBackend {
    store: Box<dyn KvStore>,
}

impl LocalBackend {
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self { store }
    }
}

impl DocumentBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn open_feed(&self) -> BackendResult<DocumentFeed> {
        let document = self
            .store
            .get(LOCAL_DOCUMENT_KEY)?
            .and_then(|raw| match serde_json::from_str::<ContentDocument>(&raw) {
                Ok(document) => Some(document),
                Err(err) => {
                    warn!(
                        "event=feed_open module=service status=invalid backend=local bytes={} error={}",
                        raw.len(),
                        err
                    );
                    None
                }
            });
        Ok(DocumentFeed::once(document))
    }

    fn write(&self, document: &ContentDocument) -> BackendResult<WriteProgress> {
        let raw = serde_json::to_string(document)?;
        self.store.set(LOCAL_DOCUMENT_KEY, &raw)?;
        Ok(WriteProgress::Done)
    }
}

/// Picks the backend for this process from the selector's decision.
pub fn backend_for(
    handle: Option<BackendHandle>,
    local: Box<dyn KvStore>,
) -> Box<dyn DocumentBackend> {
    match handle {
        Some(handle) => Box::new(RemoteBackend::new(handle.client())),
        None => Box::new(LocalBackend::new(local)),
    }
}

fn decode_remote(value: Value) -> Option<ContentDocument> {
    match serde_json::from_value::<ContentDocument>(value) {
        Ok(document) => Some(document),
        Err(err) => {
            warn!(
                "event=feed_update module=service status=invalid backend=remote error={}",
                err
            );
            None
        }
    }
}
