//! Appspec Failure Log Store
//!
//! Append-only persistence for [`FailureRecord`]s, backed by SQLite.
//!
//! # Architecture
//!
//! - `FailureLog` is the capability the rest of the system depends on
//! - `SqliteFailureLog` implements it over a single `rusqlite` connection
//! - Records are inserted and read back; there is no update or delete path
//!
//! # Examples
//!
//! ```
//! use appspec_domain::{ErrorSource, FailureRecord};
//! use appspec_store::{FailureLog, SqliteFailureLog};
//!
//! let log = SqliteFailureLog::in_memory().unwrap();
//! assert!(log.is_ready());
//!
//! let record = FailureRecord::new("todo app", ErrorSource::Network, "network down", None);
//! log.insert(&record).unwrap();
//! assert_eq!(log.recent(10, None).unwrap().len(), 1);
//! ```

#![warn(missing_docs)]

use appspec_domain::{ErrorSource, FailureId, FailureRecord};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur during failure log operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The store has not finished initializing, or was shut off
    #[error("Failure log is not ready")]
    NotReady,

    /// A stored row could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Capability to persist and read back failure records
pub trait FailureLog: Send + Sync {
    /// Whether the backing database is usable
    fn is_ready(&self) -> bool;

    /// Append a record
    fn insert(&self, record: &FailureRecord) -> Result<(), StoreError>;

    /// Most recent records first, optionally restricted to one category
    fn recent(
        &self,
        limit: usize,
        source: Option<ErrorSource>,
    ) -> Result<Vec<FailureRecord>, StoreError>;
}

/// SQLite-based implementation of FailureLog
///
/// The connection is guarded by a mutex; every operation is a single
/// statement, so contention stays short.
pub struct SqliteFailureLog {
    conn: Mutex<Connection>,
    ready: AtomicBool,
}

impl SqliteFailureLog {
    /// Open (or create) a failure log at the given database path
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use appspec_store::SqliteFailureLog;
    ///
    /// let log = SqliteFailureLog::open("appspec.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory failure log (useful for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
            ready: AtomicBool::new(true),
        })
    }

    /// Mark the store unusable; subsequent inserts are refused
    pub fn shut_down(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    /// Total number of stored records
    pub fn count(&self) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM failure_logs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::NotReady)
    }

    fn failure_id_to_bytes(id: FailureId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    fn bytes_to_failure_id(bytes: &[u8]) -> Result<FailureId, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!(
                "Expected 16 bytes for FailureId, got {}",
                bytes.len()
            ))
        })?;
        Ok(FailureId::from_value(u128::from_be_bytes(arr)))
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FailureRecord> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_failure_id(&id_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
        })?;

        let source_str: String = row.get(3)?;
        let error_source = source_str.parse::<ErrorSource>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                Box::new(StoreError::InvalidData(e)),
            )
        })?;

        Ok(FailureRecord {
            id,
            timestamp: row.get::<_, i64>(1)? as u64,
            user_input: row.get(2)?,
            error_source,
            error_message: row.get(4)?,
            raw_response: row.get(5)?,
        })
    }
}

impl FailureLog for SqliteFailureLog {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn insert(&self, record: &FailureRecord) -> Result<(), StoreError> {
        if !self.is_ready() {
            return Err(StoreError::NotReady);
        }

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO failure_logs (id, timestamp, user_input, error_source, error_message, raw_response)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Self::failure_id_to_bytes(record.id),
                record.timestamp as i64,
                &record.user_input,
                record.error_source.as_str(),
                &record.error_message,
                &record.raw_response,
            ],
        )?;

        Ok(())
    }

    fn recent(
        &self,
        limit: usize,
        source: Option<ErrorSource>,
    ) -> Result<Vec<FailureRecord>, StoreError> {
        let mut sql = String::from(
            "SELECT id, timestamp, user_input, error_source, error_message, raw_response
             FROM failure_logs WHERE 1=1",
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(source) = source {
            sql.push_str(" AND error_source = ?");
            params.push(Box::new(source.as_str()));
        }

        // id breaks ties between records written in the same millisecond
        sql.push_str(" ORDER BY timestamp DESC, id DESC LIMIT ?");
        params.push(Box::new(limit as i64));

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let records = stmt
            .query_map(&param_refs[..], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
