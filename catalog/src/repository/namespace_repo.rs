//! Namespace Repository
//!
//! SQLite-backed implementation for Namespace CRUD operations.

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::key::lookup_key;
use crate::domain::Namespace;
use super::db::now_millis;
use super::error::{StoreError, StoreResult};
use super::traits::Repository;

const SELECT_NAMESPACE: &str = "SELECT id, code FROM namespaces";

/// SQLite implementation of Namespace repository
pub struct NamespaceRepository<'a> {
    conn: &'a Connection,
}

impl<'a> NamespaceRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Find a namespace by code, ignoring case
    pub fn get_by_code(&self, code: &str) -> StoreResult<Option<Namespace>> {
        let sql = format!("{} WHERE code_lower = ?", SELECT_NAMESPACE);
        let namespace = self
            .conn
            .query_row(&sql, params![lookup_key(code)], row_to_namespace)
            .optional()?;
        Ok(namespace)
    }

    /// Number of business object definitions registered in the namespace
    pub fn count_business_object_definitions(&self, id: i64) -> StoreResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM business_object_definitions WHERE namespace_id = ?",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl Repository<Namespace> for NamespaceRepository<'_> {
    fn create(&self, entity: &Namespace) -> StoreResult<Namespace> {
        let now = now_millis();
        self.conn.execute(
            "INSERT INTO namespaces (code, code_lower, created_at, updated_at) VALUES (?, ?, ?, ?)",
            params![entity.code, lookup_key(&entity.code), now, now],
        )?;

        let id = self.conn.last_insert_rowid();
        self.find_by_id(id)?
            .ok_or_else(|| StoreError::MissingReference(format!("namespace {}", id)))
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<Namespace>> {
        let sql = format!("{} WHERE id = ?", SELECT_NAMESPACE);
        let namespace = self
            .conn
            .query_row(&sql, params![id], row_to_namespace)
            .optional()?;
        Ok(namespace)
    }

    fn list(&self) -> StoreResult<Vec<Namespace>> {
        let sql = format!("{} ORDER BY code_lower", SELECT_NAMESPACE);
        let mut stmt = self.conn.prepare(&sql)?;
        let namespaces = stmt
            .query_map([], row_to_namespace)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(namespaces)
    }

    fn delete(&self, id: i64) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM namespaces WHERE id = ?", params![id])?;
        Ok(())
    }
}

fn row_to_namespace(row: &rusqlite::Row) -> rusqlite::Result<Namespace> {
    Ok(Namespace {
        id: row.get(0)?,
        code: row.get(1)?,
    })
}
