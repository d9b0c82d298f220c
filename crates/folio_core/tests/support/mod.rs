#![allow(dead_code)]

use folio_core::db::DbError;
use folio_core::{
    KvError, KvResult, KvStore, Notification, NotificationKind, RealtimeStore, RemoteConfig,
    RemoteConnector, RemoteError, RemoteListener, RemoteResult, Subscription,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

pub const EDIT_SECRET: &str = "edit123";

/// In-process realtime store that notifies subscribers synchronously.
#[derive(Default)]
pub struct FakeRealtimeStore {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    values: HashMap<String, Value>,
    listeners: Vec<(u64, String, RemoteListener)>,
    next_listener_id: u64,
    reads: usize,
    writes: usize,
    subscriptions: usize,
    cancellations: usize,
    fail_writes: bool,
    write_delay: Option<Duration>,
}

impl FakeRealtimeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulates another device writing `value` at `path`.
    pub fn push_external(&self, path: &str, value: Value) {
        let mut state = self.lock();
        state.values.insert(path.to_string(), value.clone());
        notify(&state, path, Some(value));
    }

    pub fn value_at(&self, path: &str) -> Option<Value> {
        self.lock().values.get(path).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Makes every later write take at least `delay`, like a slow network.
    pub fn set_write_delay(&self, delay: Duration) {
        self.lock().write_delay = Some(delay);
    }

    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    pub fn subscriptions(&self) -> usize {
        self.lock().subscriptions
    }

    pub fn cancellations(&self) -> usize {
        self.lock().cancellations
    }

    pub fn active_listeners(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake store lock")
    }
}

fn notify(state: &FakeState, path: &str, value: Option<Value>) {
    for (_, listener_path, listener) in &state.listeners {
        if listener_path == path {
            listener(value.clone());
        }
    }
}

impl RealtimeStore for FakeRealtimeStore {
    fn read(&self, path: &str) -> RemoteResult<Option<Value>> {
        let mut state = self.lock();
        state.reads += 1;
        Ok(state.values.get(path).cloned())
    }

    fn write(&self, path: &str, value: &Value) -> RemoteResult<()> {
        let delay = self.lock().write_delay;
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        let mut state = self.lock();
        if state.fail_writes {
            return Err(RemoteError::Transport("network unreachable".to_string()));
        }
        state.writes += 1;
        state.values.insert(path.to_string(), value.clone());
        notify(&state, path, Some(value.clone()));
        Ok(())
    }

    fn subscribe(&self, path: &str, listener: RemoteListener) -> RemoteResult<Subscription> {
        let mut state = self.lock();
        listener(state.values.get(path).cloned());
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        state.subscriptions += 1;
        state.listeners.push((id, path.to_string(), listener));

        let shared = Arc::clone(&self.state);
        Ok(Subscription::new(move || {
            let mut state = shared.lock().expect("fake store lock");
            state.listeners.retain(|(listener_id, _, _)| *listener_id != id);
            state.cancellations += 1;
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    Succeed,
    Fail,
    Panic,
}

/// Connector handing out one shared fake client and counting calls.
pub struct CountingConnector {
    pub store: Arc<FakeRealtimeStore>,
    mode: ConnectMode,
    calls: AtomicUsize,
}

impl CountingConnector {
    pub fn new(mode: ConnectMode) -> Self {
        Self {
            store: FakeRealtimeStore::new(),
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteConnector for CountingConnector {
    fn connect(&self, _config: &RemoteConfig) -> RemoteResult<Arc<dyn RealtimeStore>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            ConnectMode::Succeed => {
                let client: Arc<dyn RealtimeStore> = self.store.clone();
                Ok(client)
            }
            ConnectMode::Fail => Err(RemoteError::InvalidConfig(
                "project does not exist".to_string(),
            )),
            ConnectMode::Panic => panic!("connector exploded"),
        }
    }
}

/// Local store whose writes fail like a full disk.
#[derive(Default)]
pub struct FullDiskKvStore {
    pub value: Option<String>,
}

impl KvStore for FullDiskKvStore {
    fn get(&self, _key: &str) -> KvResult<Option<String>> {
        Ok(self.value.clone())
    }

    fn set(&self, _key: &str, _value: &str) -> KvResult<()> {
        Err(KvError::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
            Some("database or disk is full".to_string()),
        ))))
    }
}

/// Local store whose reads start failing once `fail_reads` is set.
#[derive(Default)]
pub struct FlakyKvStore {
    pub value: Option<String>,
    pub fail_reads: Arc<AtomicBool>,
}

impl KvStore for FlakyKvStore {
    fn get(&self, _key: &str) -> KvResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(KvError::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
                Some("disk I/O error".to_string()),
            ))));
        }
        Ok(self.value.clone())
    }

    fn set(&self, _key: &str, _value: &str) -> KvResult<()> {
        Ok(())
    }
}

pub fn complete_remote_config() -> RemoteConfig {
    RemoteConfig::new("test-api-key", "https://folio-test.example.com")
}

pub fn kinds(notifications: &[Notification]) -> Vec<NotificationKind> {
    notifications.iter().map(|entry| entry.kind).collect()
}
