//! Record store: owner of the backend connection and transaction scope.
//!
//! # Responsibility
//! - Own exactly one migrated SQLite connection per store instance.
//! - Bound every unit of work to a scoped write transaction or read session.
//!
//! # Invariants
//! - At most one session is active per store at any time.
//! - `with_transaction` commits only when `work` returns `Ok`; any error
//!   rolls back before it is returned to the caller.
//! - An uncommitted transaction is rolled back on drop, including during
//!   unwinding, so the connection is never left inside a transaction.

use crate::db::{bootstrap_connection, open_db, open_db_in_memory, DbError, DbResult};
use log::{debug, error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Explicitly constructed, caller-owned handle to the student database.
pub struct RecordStore {
    conn: Mutex<Connection>,
}

impl RecordStore {
    /// Opens (or creates) a file-backed store with migrations applied.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::wrap(open_db(path)?))
    }

    /// Opens a private in-memory store with migrations applied.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::wrap(open_db_in_memory()?))
    }

    /// Adopts an existing connection, configuring and migrating it first.
    pub fn from_connection(mut conn: Connection) -> DbResult<Self> {
        bootstrap_connection(&mut conn)?;
        Ok(Self::wrap(conn))
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Runs `work` inside a write transaction.
    ///
    /// The transaction is started with `BEGIN IMMEDIATE` so the write lock is
    /// taken up front. Commits when `work` returns `Ok`, otherwise rolls back
    /// and returns the error produced by `work` unchanged.
    ///
    /// # Errors
    /// - Failing to begin or commit surfaces as `E::from(DbError)`.
    /// - Errors returned by `work` are propagated after rollback.
    pub fn with_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<DbError>,
    {
        let started_at = Instant::now();
        let mut conn = self.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DbError::from)?;

        match work(&tx) {
            Ok(value) => {
                tx.commit().map_err(DbError::from)?;
                debug!(
                    "event=tx_commit module=store status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                match tx.rollback() {
                    Ok(()) => warn!(
                        "event=tx_rollback module=store status=ok duration_ms={}",
                        started_at.elapsed().as_millis()
                    ),
                    Err(rollback_err) => error!(
                        "event=tx_rollback module=store status=error duration_ms={} error={}",
                        started_at.elapsed().as_millis(),
                        rollback_err
                    ),
                }
                Err(err)
            }
        }
    }

    /// Runs `work` against the connection without opening a transaction.
    ///
    /// Intended for read-only statements; each statement sees its own
    /// autocommit snapshot.
    pub fn with_read_session<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
    {
        let conn = self.lock();
        work(&conn)
    }

    /// Closes the underlying connection, reporting any close-time failure.
    pub fn close(self) -> DbResult<()> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        match conn.close() {
            Ok(()) => {
                info!("event=db_close module=store status=ok");
                Ok(())
            }
            Err((_, err)) => {
                error!("event=db_close module=store status=error error={err}");
                Err(err.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic inside `work` drops its transaction first, which rolls back,
        // so a poisoned connection is still consistent.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
