//! Content store: owner of the canonical document.
//!
//! # Responsibility
//! - Hold the current `ContentDocument` and hand out read-only views.
//! - Load through the active backend and apply remote updates.
//! - Persist on explicit `save` and report the outcome as a notification.
//!
//! # Invariants
//! - The document starts at the seed and is only replaced by a loaded
//!   document, a remote update, or a caller-supplied edit.
//! - A failed save never alters the in-memory document.
//! - Nothing is persisted without an explicit `save`.
//! - `save` never waits on the network: remote writes are queued and their
//!   outcome is applied later by `poll_updates`, `poll_saves` or
//!   `wait_for_save`. The state reads `Saving` until then.
//! - At most one live feed exists; replacing or unloading it cancels the
//!   previous subscription.
//! - With a profile image cap configured, no path lets an oversized embedded
//!   image into the document.

use crate::model::content::ContentDocument;
use crate::model::profile_image::{encode_data_uri, ProfileImage, ProfileImageError};
use crate::service::access_gate::AccessState;
use crate::service::backend::{
    BackendKind, BackendResult, DocumentBackend, DocumentFeed, PendingWrite, WriteProgress,
};
use crate::service::field_mutator::{with_field, FieldPath};
use crate::service::notification::{emit, Notification, NotificationSink};
use log::{debug, error, info};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

const IMAGE_TOO_LARGE: &str = "Profile image is too large.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Unloaded,
    Loaded,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored document replaced the seed.
    Loaded,
    /// Nothing stored; the current document is kept.
    Empty,
    /// Remote subscription established; documents arrive via `poll_updates`.
    Subscribed,
    /// Backend read failed; the current document is kept.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Write queued; the outcome is reported once it completes.
    Pending,
    SavedRemotely,
    SavedLocally,
    Failed,
}

impl SaveOutcome {
    pub fn is_saved(self) -> bool {
        matches!(self, Self::SavedRemotely | Self::SavedLocally)
    }
}

struct InFlightSave {
    write: PendingWrite,
    document: ContentDocument,
    kind: BackendKind,
}

/// Owner of the portfolio document for one client session.
pub struct ContentStore {
    backend: Box<dyn DocumentBackend>,
    notifier: Arc<dyn NotificationSink>,
    document: ContentDocument,
    persisted: ContentDocument,
    feed: Option<DocumentFeed>,
    /// `Unloaded` or `Loaded`; `Saving` is derived from `saves`.
    state: StoreState,
    saves: VecDeque<InFlightSave>,
    max_profile_image_bytes: Option<usize>,
}

impl ContentStore {
    pub fn new(backend: Box<dyn DocumentBackend>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            backend,
            notifier,
            document: ContentDocument::seed(),
            persisted: ContentDocument::seed(),
            feed: None,
            state: StoreState::Unloaded,
            saves: VecDeque::new(),
            max_profile_image_bytes: None,
        }
    }

    /// Caps embedded profile images accepted by `set_profile_image`.
    pub fn with_profile_image_limit(mut self, limit: Option<usize>) -> Self {
        self.max_profile_image_bytes = limit;
        self
    }

    pub fn document(&self) -> &ContentDocument {
        &self.document
    }

    pub fn state(&self) -> StoreState {
        if self.saves.is_empty() {
            self.state
        } else {
            StoreState::Saving
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Whether a live remote subscription is active.
    pub fn is_subscribed(&self) -> bool {
        self.feed.as_ref().is_some_and(DocumentFeed::is_live)
    }

    /// Whether the document differs from the last loaded or saved value.
    pub fn is_dirty(&self) -> bool {
        self.document != self.persisted
    }

    /// Loads the document through the active backend.
    ///
    /// Any previous subscription is cancelled first. Failures keep the
    /// current document, leave the store `Unloaded` and emit one error
    /// notification.
    pub fn load(&mut self) -> LoadOutcome {
        self.feed = None;
        let kind = self.backend.kind();

        let feed = match self.backend.open_feed() {
            Ok(feed) => feed,
            Err(err) => {
                error!(
                    "event=content_load module=service status=error backend={} error={}",
                    kind.as_str(),
                    err
                );
                self.state = StoreState::Unloaded;
                emit(
                    self.notifier.as_ref(),
                    Notification::error("Could not load saved content."),
                );
                return LoadOutcome::Failed;
            }
        };
        self.state = StoreState::Loaded;

        if feed.is_live() {
            self.feed = Some(feed);
            self.poll_updates();
            info!(
                "event=content_load module=service status=ok backend={} mode=subscribed",
                kind.as_str()
            );
            return LoadOutcome::Subscribed;
        }

        match feed.try_next() {
            Some(document) => {
                self.apply_loaded(document);
                info!(
                    "event=content_load module=service status=ok backend={} mode=read",
                    kind.as_str()
                );
                LoadOutcome::Loaded
            }
            None => {
                debug!(
                    "event=content_load module=service status=empty backend={}",
                    kind.as_str()
                );
                LoadOutcome::Empty
            }
        }
    }

    /// Applies finished saves, then every update already delivered by the
    /// live feed.
    ///
    /// Returns the number of documents applied; the last one wins.
    pub fn poll_updates(&mut self) -> usize {
        self.poll_saves();
        let mut latest = None;
        let mut applied = 0;
        if let Some(feed) = &self.feed {
            while let Some(document) = feed.try_next() {
                latest = Some(document);
                applied += 1;
            }
        }
        if let Some(document) = latest {
            self.apply_loaded(document);
        }
        applied
    }

    /// Blocks up to `timeout` for the next remote update, then applies it
    /// together with any that queued behind it.
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        let Some(document) = self.feed.as_ref().and_then(|feed| feed.next_timeout(timeout))
        else {
            return false;
        };
        self.apply_loaded(document);
        self.poll_updates();
        true
    }

    /// Cancels the live subscription, if any.
    pub fn unload(&mut self) {
        if self.feed.take().is_some() {
            debug!("event=content_unload module=service status=ok");
        }
        self.state = StoreState::Unloaded;
    }

    /// Holds a document produced by the field mutator.
    ///
    /// Returns `false` when it carries an embedded profile image over the cap.
    pub fn replace(&mut self, document: ContentDocument) -> bool {
        self.accept(document)
    }

    /// Applies one field edit when `access` is in edit mode.
    ///
    /// Returns `false` and leaves the document untouched otherwise.
    pub fn edit(
        &mut self,
        access: &AccessState,
        path: FieldPath,
        value: impl Into<String>,
    ) -> bool {
        if !access.is_editing() {
            debug!("event=field_edit module=service status=rejected reason=not_editing");
            return false;
        }
        let next = with_field(&self.document, path, value);
        self.accept(next)
    }

    /// Embeds `bytes` as the profile image when `access` is in edit mode.
    ///
    /// Rejected images (wrong type, over the configured cap) emit one error
    /// notification and leave the document untouched.
    pub fn set_profile_image(
        &mut self,
        access: &AccessState,
        bytes: &[u8],
        mime: &str,
    ) -> bool {
        if !access.is_editing() {
            return false;
        }
        match encode_data_uri(bytes, mime, self.max_profile_image_bytes) {
            Ok(uri) => {
                self.document = with_field(&self.document, FieldPath::ProfileImage, uri);
                true
            }
            Err(err) => {
                let message = match err {
                    ProfileImageError::TooLarge { .. } => IMAGE_TOO_LARGE,
                    _ => "Profile image could not be used.",
                };
                info!("event=profile_image module=service status=rejected error={err}");
                emit(self.notifier.as_ref(), Notification::error(message));
                false
            }
        }
    }

    /// Persists the current document through the active backend.
    ///
    /// Local writes finish before returning. Remote writes are queued and
    /// return `Pending`; their single success or error notification is
    /// emitted when the completion is applied. Never retries.
    pub fn save(&mut self) -> SaveOutcome {
        let kind = self.backend.kind();
        let document = self.document.clone();
        match self.backend.write(&document) {
            Ok(WriteProgress::Done) => self.finish_save(kind, document, Ok(())),
            Ok(WriteProgress::Queued(write)) => {
                debug!(
                    "event=content_save module=service status=pending backend={} queued={}",
                    kind.as_str(),
                    self.saves.len() + 1
                );
                self.saves.push_back(InFlightSave {
                    write,
                    document,
                    kind,
                });
                SaveOutcome::Pending
            }
            Err(err) => self.finish_save(kind, document, Err(err)),
        }
    }

    /// Applies every queued save that already completed, oldest first.
    ///
    /// Returns the outcome of the last one applied.
    pub fn poll_saves(&mut self) -> Option<SaveOutcome> {
        let mut last = None;
        while let Some(result) = self.saves.front().and_then(|save| save.write.try_result()) {
            last = self.settle_front(result).or(last);
        }
        last
    }

    /// Blocks up to `timeout` for the oldest queued save, then applies it and
    /// any later ones that already completed.
    pub fn wait_for_save(&mut self, timeout: Duration) -> Option<SaveOutcome> {
        let result = self.saves.front()?.write.wait(timeout)?;
        let outcome = self.settle_front(result)?;
        Some(self.poll_saves().unwrap_or(outcome))
    }

    fn settle_front(&mut self, result: BackendResult<()>) -> Option<SaveOutcome> {
        let save = self.saves.pop_front()?;
        Some(self.finish_save(save.kind, save.document, result))
    }

    fn finish_save(
        &mut self,
        kind: BackendKind,
        document: ContentDocument,
        result: BackendResult<()>,
    ) -> SaveOutcome {
        match result {
            Ok(()) => {
                self.persisted = document;
                info!(
                    "event=content_save module=service status=ok backend={}",
                    kind.as_str()
                );
                let (outcome, message) = match kind {
                    BackendKind::Remote => (
                        SaveOutcome::SavedRemotely,
                        "Saved to the cloud. Changes sync across devices.",
                    ),
                    BackendKind::Local => (
                        SaveOutcome::SavedLocally,
                        "Saved locally. Changes stay on this device.",
                    ),
                };
                emit(self.notifier.as_ref(), Notification::success(message));
                outcome
            }
            Err(err) => {
                error!(
                    "event=content_save module=service status=error backend={} error={}",
                    kind.as_str(),
                    err
                );
                emit(
                    self.notifier.as_ref(),
                    Notification::error("Failed to save content. Please try again."),
                );
                SaveOutcome::Failed
            }
        }
    }

    fn accept(&mut self, next: ContentDocument) -> bool {
        if !self.profile_image_fits(&next) {
            return false;
        }
        self.document = next;
        true
    }

    fn profile_image_fits(&self, candidate: &ContentDocument) -> bool {
        let Some(limit) = self.max_profile_image_bytes else {
            return true;
        };
        if candidate.profile_image == self.document.profile_image {
            return true;
        }
        match ProfileImage::parse(&candidate.profile_image).embedded_size() {
            Some(size) if size > limit => {
                info!(
                    "event=profile_image module=service status=rejected size={size} limit={limit}"
                );
                emit(self.notifier.as_ref(), Notification::error(IMAGE_TOO_LARGE));
                false
            }
            _ => true,
        }
    }

    fn apply_loaded(&mut self, document: ContentDocument) {
        self.persisted = document.clone();
        self.document = document;
    }
}
