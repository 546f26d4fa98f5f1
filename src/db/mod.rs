//! Database layer for the task board.

pub mod tasks;

use crate::error::StoreResult;
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Where the connection comes from.
#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Memory,
}

/// Database handle wrapping a lazily opened SQLite connection.
///
/// Cloning is cheap; all clones share the same connection.
#[derive(Clone)]
pub struct Database {
    source: Arc<Source>,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl Database {
    /// Open or create the database at the given path and create the schema.
    ///
    /// Runs schema creation exactly once; any failure is returned to the caller.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = Self::connect_lazy(path);
        db.ensure_schema()?;
        Ok(db)
    }

    /// Create a handle that opens the file on first use.
    ///
    /// Nothing touches the filesystem here, so this never fails. Use
    /// [`Database::ensure_schema`] (directly or through the readiness gate)
    /// before serving requests.
    pub fn connect_lazy<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source: Arc::new(Source::File(path.as_ref().to_path_buf())),
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            source: Arc::new(Source::Memory),
            conn: Arc::new(Mutex::new(Some(conn))),
        };

        db.ensure_schema()?;

        Ok(db)
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match self.source.as_ref() {
            Source::File(path) => Some(path),
            Source::Memory => None,
        }
    }

    /// Create the tasks table if it does not exist yet.
    pub fn ensure_schema(&self) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let report = embedded::migrations::runner().run(conn)?;
            for migration in report.applied_migrations() {
                debug!(migration = %migration, "Applied migration");
            }
            Ok(())
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the backing file with the pragmas every connection needs.
    fn open_connection(&self) -> StoreResult<Connection> {
        match self.source.as_ref() {
            Source::File(path) => {
                let conn = Connection::open(path)?;
                conn.execute_batch(
                    "PRAGMA journal_mode=WAL;
                     PRAGMA busy_timeout=5000;",
                )?;
                debug!(path = %path.display(), "Opened database connection");
                Ok(conn)
            }
            Source::Memory => Ok(Connection::open_in_memory()?),
        }
    }

    /// Execute a function with mutable access to the connection, opening it if needed.
    ///
    /// A failed open leaves the handle disconnected so the next call tries again.
    pub fn with_conn_mut<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T>,
    {
        let mut guard = self.lock();
        let conn = match guard.take() {
            Some(conn) => conn,
            None => self.open_connection()?,
        };
        f(guard.insert(conn))
    }

    /// Execute a function with shared access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        self.with_conn_mut(|conn| f(conn))
    }

    /// Run `f` as one session: begin, run, commit on success.
    ///
    /// Any error (or panic) drops the transaction, which rolls it back, and
    /// the connection lock is released on every path.
    pub fn with_session<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> StoreResult<T>,
    {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        })
    }
}
