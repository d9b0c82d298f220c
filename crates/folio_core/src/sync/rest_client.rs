//! REST client for realtime-database style document stores.
//!
//! # Responsibility
//! - Map `read`/`write` onto `GET`/`PUT {database_url}/{path}.json`, adding
//!   `auth={auth_token}` only when a request credential is configured.
//! - Emulate change subscription with a cancellable watcher thread that
//!   re-reads the path and reports only changed values.
//!
//! # Invariants
//! - JSON `null` is reported as "no value".
//! - The web API key is never sent; credentials never appear in errors or logs.
//! - Cancelling a subscription returns without waiting for an in-flight read;
//!   the watcher delivers nothing once it sees the stop signal.

use crate::config::RemoteConfig;
use crate::logging::sanitize_message;
use crate::sync::remote::{RealtimeStore, RemoteError, RemoteListener, RemoteResult, Subscription};
use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ERROR_BODY_CHARS: usize = 200;
const FORBIDDEN_SEGMENT_CHARS: &[char] = &['.', '#', '$', '[', ']'];

/// Blocking HTTP client for one remote database.
#[derive(Clone)]
pub struct RestRealtimeClient {
    base_url: Url,
    auth_token: Option<String>,
    http: Client,
    poll_interval: Duration,
}

impl std::fmt::Debug for RestRealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestRealtimeClient")
            .field("base_url", &self.base_url.as_str())
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl RestRealtimeClient {
    /// Builds a client from complete remote settings.
    ///
    /// # Errors
    /// - `InvalidConfig` when a required field is missing, the database URL
    ///   is not an absolute http(s) URL, or the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig, poll_interval: Duration) -> RemoteResult<Self> {
        config
            .api_key()
            .ok_or_else(|| RemoteError::InvalidConfig("apiKey is missing".to_string()))?;
        let database_url = config
            .database_url()
            .ok_or_else(|| RemoteError::InvalidConfig("databaseURL is missing".to_string()))?;
        let base_url = parse_base_url(database_url)?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| RemoteError::InvalidConfig(err.without_url().to_string()))?;

        Ok(Self {
            base_url,
            auth_token: config.auth_token().map(str::to_string),
            http,
            poll_interval,
        })
    }

    /// Resource URL for `path`, without credentials.
    pub fn endpoint(&self, path: &str) -> RemoteResult<Url> {
        let segments = path
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();
        let Some((last, parents)) = segments.split_last() else {
            return Err(RemoteError::InvalidConfig(format!(
                "remote path `{path}` is empty"
            )));
        };
        if let Some(bad) = segments
            .iter()
            .find(|segment| segment.contains(FORBIDDEN_SEGMENT_CHARS))
        {
            return Err(RemoteError::InvalidConfig(format!(
                "remote path segment `{bad}` contains a reserved character"
            )));
        }

        let mut url = self.base_url.clone();
        {
            let mut path_segments = url.path_segments_mut().map_err(|_| {
                RemoteError::InvalidConfig("databaseURL cannot be a base URL".to_string())
            })?;
            path_segments.pop_if_empty();
            path_segments.extend(parents.iter().copied());
            path_segments.push(&format!("{last}.json"));
        }
        Ok(url)
    }

    fn authorized_url(&self, path: &str) -> RemoteResult<Url> {
        let mut url = self.endpoint(path)?;
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }
}

impl RealtimeStore for RestRealtimeClient {
    fn read(&self, path: &str) -> RemoteResult<Option<Value>> {
        let url = self.authorized_url(path)?;
        let response = self.http.get(url).send().map_err(transport_error)?;
        let body = successful_body(response)?;
        let value: Value =
            serde_json::from_str(&body).map_err(|err| RemoteError::Decode(err.to_string()))?;
        Ok((!value.is_null()).then_some(value))
    }

    fn write(&self, path: &str, value: &Value) -> RemoteResult<()> {
        let url = self.authorized_url(path)?;
        let response = self
            .http
            .put(url)
            .json(value)
            .send()
            .map_err(transport_error)?;
        successful_body(response)?;
        Ok(())
    }

    fn subscribe(&self, path: &str, listener: RemoteListener) -> RemoteResult<Subscription> {
        // Validate up front so a bad path fails the call, not the watcher.
        self.endpoint(path)?;

        let watcher = self.clone();
        let watched_path = path.to_string();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("folio-remote-watch".to_string())
            .spawn(move || {
                let mut last_seen: Option<Option<Value>> = None;
                loop {
                    let read = watcher.read(&watched_path);
                    if stop_requested(&stop_rx) {
                        break;
                    }
                    match read {
                        Ok(value) if last_seen.as_ref() != Some(&value) => {
                            listener(value.clone());
                            last_seen = Some(value);
                        }
                        Ok(_) => {}
                        Err(err) => warn!(
                            "event=remote_watch module=sync status=error path={} error={}",
                            watched_path, err
                        ),
                    }
                    match stop_rx.recv_timeout(watcher.poll_interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!(
                    "event=remote_watch module=sync status=stopped path={}",
                    watched_path
                );
            })
            .map_err(|err| RemoteError::Transport(format!("failed to start watcher: {err}")))?;

        debug!("event=remote_watch module=sync status=start path={path}");
        Ok(Subscription::new(move || {
            // A watcher blocked in `read` exits on its own once the request ends.
            let _ = stop_tx.send(());
        }))
    }
}

fn stop_requested(stop_rx: &Receiver<()>) -> bool {
    !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty))
}

fn parse_base_url(raw: &str) -> RemoteResult<Url> {
    let url = Url::parse(raw)
        .map_err(|err| RemoteError::InvalidConfig(format!("databaseURL is malformed: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RemoteError::InvalidConfig(format!(
            "databaseURL scheme `{}` is not http(s)",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(RemoteError::InvalidConfig(
            "databaseURL must include a host".to_string(),
        ));
    }
    Ok(url)
}

fn successful_body(response: Response) -> RemoteResult<String> {
    let status = response.status();
    let body = response.text().map_err(transport_error)?;
    if !status.is_success() {
        return Err(RemoteError::Status {
            code: status.as_u16(),
            body: sanitize_message(&body, MAX_ERROR_BODY_CHARS),
        });
    }
    Ok(body)
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport(err.without_url().to_string())
}
