//! Store context: the single owner of the SQLite connection.
//!
//! # Responsibility
//! - Hold static store settings read once at startup.
//! - Open the connection at most once and hand out borrows of it.
//! - Close the connection on `shutdown`.
//!
//! # Invariants
//! - At most one connection is opened per context lifetime.
//! - After `shutdown`, every `connection()` call fails with `DbError::Closed`.

use super::open::open_store;
use super::{DbError, DbResult};
use log::{info, warn};
use once_cell::unsync::OnceCell;
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

pub(crate) const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the user table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    InMemory,
}

/// Static connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub location: StoreLocation,
    pub busy_timeout: Duration,
}

impl StoreSettings {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::InMemory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

/// Application-wide store handle, constructed once and passed by reference.
pub struct StoreContext {
    settings: StoreSettings,
    conn: OnceCell<Connection>,
    closed: bool,
}

impl StoreContext {
    /// Builds a context without touching the store yet.
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            conn: OnceCell::new(),
            closed: false,
        }
    }

    /// Builds a context and opens the store immediately.
    ///
    /// # Errors
    /// - Returns the open/migration error; startup code treats it as fatal.
    pub fn open(settings: StoreSettings) -> DbResult<Self> {
        let context = Self::new(settings);
        context.connection()?;
        Ok(context)
    }

    /// Returns the shared connection, opening it on first use.
    pub fn connection(&self) -> DbResult<&Connection> {
        if self.closed {
            return Err(DbError::Closed);
        }
        self.conn.get_or_try_init(|| open_store(&self.settings))
    }

    pub fn is_open(&self) -> bool {
        !self.closed && self.conn.get().is_some()
    }

    /// Closes the connection. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let Some(conn) = self.conn.take() else {
            return;
        };
        match conn.close() {
            Ok(()) => info!("event=store_shutdown module=db status=ok"),
            Err((_conn, err)) => warn!(
                "event=store_shutdown module=db status=error error_code=db_close_failed error={}",
                err
            ),
        }
    }
}
