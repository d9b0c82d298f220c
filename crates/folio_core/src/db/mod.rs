//! SQLite file behind the local fallback key-value store.
//!
//! The database holds a single `kv_entries` table. Connections handed out by
//! [`open_db`] / [`open_db_in_memory`] are already migrated, so callers in
//! `repo` never see a half-initialized schema.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Local database failures.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected an open, pragma, migration or statement.
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build; refuse to touch it.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "local store error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "local store was created by a newer version \
                 (schema {found}, this build reads up to {supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
