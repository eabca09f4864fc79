//! Tag Type Repository
//!
//! SQLite-backed implementation for TagType CRUD operations. Tag type codes
//! are matched exactly.

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{TagType, TagTypeKey};
use super::db::now_millis;
use super::error::{StoreError, StoreResult};
use super::traits::{MutableRepository, Repository};

const SELECT_TAG_TYPE: &str = "SELECT id, code, display_name, order_number FROM tag_types";

/// SQLite implementation of TagType repository
pub struct TagTypeRepository<'a> {
    conn: &'a Connection,
}

impl<'a> TagTypeRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get_by_key(&self, key: &TagTypeKey) -> StoreResult<Option<TagType>> {
        let sql = format!("{} WHERE code = ?", SELECT_TAG_TYPE);
        let tag_type = self
            .conn
            .query_row(&sql, params![key.tag_type_code], row_to_tag_type)
            .optional()?;
        Ok(tag_type)
    }

    /// All tag type keys, by order number then code
    pub fn list_keys(&self) -> StoreResult<Vec<TagTypeKey>> {
        Ok(self.list()?.iter().map(TagType::key).collect())
    }

    pub fn count_tags(&self, id: i64) -> StoreResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM tags WHERE tag_type_id = ?",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl Repository<TagType> for TagTypeRepository<'_> {
    fn create(&self, entity: &TagType) -> StoreResult<TagType> {
        let now = now_millis();
        self.conn.execute(
            "INSERT INTO tag_types (code, display_name, order_number, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            params![entity.tag_type_code, entity.display_name, entity.tag_type_order, now, now],
        )?;

        let id = self.conn.last_insert_rowid();
        self.find_by_id(id)?
            .ok_or_else(|| StoreError::MissingReference(format!("tag type {}", id)))
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<TagType>> {
        let sql = format!("{} WHERE id = ?", SELECT_TAG_TYPE);
        let tag_type = self
            .conn
            .query_row(&sql, params![id], row_to_tag_type)
            .optional()?;
        Ok(tag_type)
    }

    fn list(&self) -> StoreResult<Vec<TagType>> {
        let sql = format!("{} ORDER BY order_number, code", SELECT_TAG_TYPE);
        let mut stmt = self.conn.prepare(&sql)?;
        let tag_types = stmt
            .query_map([], row_to_tag_type)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tag_types)
    }

    fn delete(&self, id: i64) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM tag_types WHERE id = ?", params![id])?;
        Ok(())
    }
}

impl MutableRepository<TagType> for TagTypeRepository<'_> {
    fn update(&self, entity: &TagType) -> StoreResult<TagType> {
        let changed = self.conn.execute(
            "UPDATE tag_types SET display_name = ?, order_number = ?, updated_at = ? WHERE id = ?",
            params![entity.display_name, entity.tag_type_order, now_millis(), entity.id],
        )?;
        if changed == 0 {
            return Err(StoreError::MissingReference(format!("tag type {}", entity.id)));
        }
        self.find_by_id(entity.id)?
            .ok_or_else(|| StoreError::MissingReference(format!("tag type {}", entity.id)))
    }
}

fn row_to_tag_type(row: &rusqlite::Row) -> rusqlite::Result<TagType> {
    Ok(TagType {
        id: row.get(0)?,
        tag_type_code: row.get(1)?,
        display_name: row.get(2)?,
        tag_type_order: row.get(3)?,
    })
}
