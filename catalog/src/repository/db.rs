//! Database Connection and Setup
//!
//! Opens the SQLite database, runs migrations and provides the transaction
//! boundary every service operation runs inside.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::DomainResult;
use super::error::{StoreError, StoreResult};

/// Database state wrapper
///
/// Holds the single connection shared by all service calls. Clones share
/// the same connection.
#[derive(Clone)]
pub struct DbState {
    conn: Arc<Mutex<Connection>>,
}

impl DbState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Acquire the connection for the duration of one operation
    pub async fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}

/// Initialize database with path; `":memory:"` opens a private in-memory DB
pub fn init_db(db_path: &Path, busy_timeout: Duration) -> StoreResult<DbState> {
    let conn = if db_path.as_os_str() == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(db_path)?
    };
    conn.busy_timeout(busy_timeout)?;

    run_migrations(&conn)?;

    Ok(DbState::new(conn))
}

/// Run `f` inside an immediate transaction.
///
/// The write lock is taken up front so a check-then-insert sequence cannot
/// interleave with another writer on the same file. Any error returned by
/// `f` drops the transaction, rolling back every write made during the call.
pub fn in_transaction<T>(
    conn: &mut Connection,
    f: impl FnOnce(&Transaction<'_>) -> DomainResult<T>,
) -> DomainResult<T> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(StoreError::from)?;
    let value = f(&tx)?;
    tx.commit().map_err(StoreError::from)?;
    Ok(value)
}

/// Run read-only `f` inside a deferred transaction so all reads observe one snapshot
pub fn read_only<T>(
    conn: &mut Connection,
    f: impl FnOnce(&Transaction<'_>) -> DomainResult<T>,
) -> DomainResult<T> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Deferred)
        .map_err(StoreError::from)?;
    let value = f(&tx)?;
    tx.finish().map_err(StoreError::from)?;
    Ok(value)
}

/// Counter that moves whenever another connection commits to the database.
///
/// Commits made on `conn` itself leave it unchanged.
pub fn data_version(conn: &Connection) -> StoreResult<i64> {
    let version = conn.query_row("PRAGMA data_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Current time as stored in `created_at` / `updated_at`
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS namespaces (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL,
            code_lower TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_namespaces_code_lower ON namespaces(code_lower);",
    )?;

    // Tag type codes are matched exactly, so the index uses the raw code
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tag_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL,
            display_name TEXT NOT NULL,
            order_number INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_tag_types_code ON tag_types(code);",
    )?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_type_id INTEGER NOT NULL REFERENCES tag_types(id),
            code TEXT NOT NULL,
            code_lower TEXT NOT NULL,
            display_name TEXT NOT NULL,
            description TEXT,
            parent_tag_id INTEGER REFERENCES tags(id),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_tags_type_code ON tags(tag_type_id, code_lower);
        CREATE INDEX IF NOT EXISTS idx_tags_parent ON tags(parent_tag_id);",
    )?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS business_object_definitions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            namespace_id INTEGER NOT NULL REFERENCES namespaces(id),
            name TEXT NOT NULL,
            name_lower TEXT NOT NULL,
            data_provider_name TEXT NOT NULL,
            description TEXT,
            display_name TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_bdefs_namespace_name
            ON business_object_definitions(namespace_id, name_lower);",
    )?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS business_object_definition_tags (
            business_object_definition_id INTEGER NOT NULL REFERENCES business_object_definitions(id),
            tag_id INTEGER NOT NULL REFERENCES tags(id),
            created_at INTEGER NOT NULL,
            PRIMARY KEY (business_object_definition_id, tag_id)
        );
        CREATE INDEX IF NOT EXISTS idx_bdef_tags_tag ON business_object_definition_tags(tag_id);",
    )?;

    Ok(())
}
