//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load the portfolio document through the selected backend and print it.
//! - Apply one gated field edit and save it, for manual end-to-end checks.
//!
//! Usage:
//! - `folio_cli` prints version, backend and document.
//! - `folio_cli unlock <secret> set <field> <value>` edits one field and saves.

use folio_core::{
    backend_for, core_version, init_logging_from_config, select_backend_with, AccessGate,
    ContentStore, FieldPath, FolioConfig, LoadOutcome, Notification, NotificationSink,
    RestConnector, SaveOutcome, SqliteKvStore,
};
use log::info;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

const FIRST_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(5);
const SAVE_TIMEOUT: Duration = Duration::from_secs(15);

struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn notify(&self, notification: Notification) {
        println!(
            "notice kind={} message={}",
            notification.kind.as_str(),
            notification.message
        );
    }
}

enum Command {
    Show,
    Set {
        secret: String,
        path: FieldPath,
        value: String,
    },
}

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("folio_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let command = parse_command(args)?;
    let config = FolioConfig::from_env().map_err(|err| err.to_string())?;
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("folio_cli logging disabled: {err}");
    }
    println!("folio_core version={}", core_version());

    let connector = RestConnector {
        poll_interval: config.poll_interval(),
    };
    let handle = select_backend_with(&config.remote, &connector);
    let local = SqliteKvStore::open(config.local_db_path()).map_err(|err| err.to_string())?;
    let notifier: Arc<dyn NotificationSink> = Arc::new(StdoutSink);
    let mut store = ContentStore::new(backend_for(handle, Box::new(local)), Arc::clone(&notifier))
        .with_profile_image_limit(config.max_profile_image_bytes);
    println!("folio backend={}", store.backend_kind().as_str());

    if store.load() == LoadOutcome::Subscribed {
        // An empty remote path never produces a snapshot; keep the seed then.
        store.wait_for_update(FIRST_SNAPSHOT_TIMEOUT);
    }

    if let Command::Set {
        secret,
        path,
        value,
    } = command
    {
        let mut gate = AccessGate::new(notifier);
        if !gate.attempt_unlock(&secret) {
            return Err("edit mode not enabled".to_string());
        }
        if !store.edit(&gate.state(), path, value) {
            return Err(format!("`{path}` rejected"));
        }
        let outcome = match store.save() {
            SaveOutcome::Pending => store.wait_for_save(SAVE_TIMEOUT),
            done => Some(done),
        };
        if !outcome.is_some_and(SaveOutcome::is_saved) {
            return Err(format!("could not save `{path}`"));
        }
        info!("event=cli_edit module=cli status=ok path={path}");
    }

    let json = serde_json::to_string_pretty(store.document()).map_err(|err| err.to_string())?;
    println!("{json}");
    store.unload();
    Ok(())
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    match args {
        [] => Ok(Command::Show),
        [unlock, secret, set, path, value] if unlock == "unlock" && set == "set" => {
            let path = path.parse::<FieldPath>().map_err(|err| err.to_string())?;
            Ok(Command::Set {
                secret: secret.clone(),
                path,
                value: value.clone(),
            })
        }
        _ => Err("usage: folio_cli [unlock <secret> set <field> <value>]".to_string()),
    }
}
