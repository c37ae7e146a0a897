//! Store layer for the `users` table.
//!
//! `StoreContext` is built once by the binary and lent to every `UserDao`.
//! Opening a connection also brings the schema up to date, so a repository
//! only ever sees a connection whose `users` table is ready.
//!
//! # Errors
//! - `Sqlite`: open, pragma or migration failure from the driver.
//! - `UnsupportedSchemaVersion`: the file was written by a newer binary.
//! - `Closed`: `StoreContext::shutdown` already ran.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod context;
pub mod migrations;
mod open;

pub use context::{StoreContext, StoreLocation, StoreSettings};
pub use open::{open_db, open_db_in_memory, open_store};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Returned for every call after `StoreContext::shutdown`. The gateway
    /// degrades it to an empty result and logs `error_code=db_error`.
    Closed,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Closed => write!(f, "store has been shut down"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Closed => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
