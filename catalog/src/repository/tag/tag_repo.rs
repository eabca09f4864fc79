//! Tag Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Tag CRUD operations.
//! Tags are resolved by tag type code (exact) and tag code (ignoring case).

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::key::lookup_key;
use crate::domain::{Tag, TagKey};
use super::super::db::now_millis;
use super::super::error::{StoreError, StoreResult};
use super::super::traits::{MutableRepository, Repository};

pub(crate) const SELECT_TAG: &str = "SELECT t.id, tt.code, t.code, t.display_name, t.description, t.parent_tag_id
     FROM tags t JOIN tag_types tt ON tt.id = t.tag_type_id";

/// SQLite implementation of Tag repository
pub struct TagRepository<'a> {
    pub(super) conn: &'a Connection,
}

impl<'a> TagRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get_by_key(&self, key: &TagKey) -> StoreResult<Option<Tag>> {
        let sql = format!("{} WHERE tt.code = ? AND t.code_lower = ?", SELECT_TAG);
        let tag = self
            .conn
            .query_row(
                &sql,
                params![key.tag_type_code, lookup_key(&key.tag_code)],
                row_to_tag,
            )
            .optional()?;
        Ok(tag)
    }

    /// All tags of one tag type, ordered by code
    pub fn list_by_tag_type(&self, tag_type_code: &str) -> StoreResult<Vec<Tag>> {
        let sql = format!("{} WHERE tt.code = ? ORDER BY t.code_lower", SELECT_TAG);
        let mut stmt = self.conn.prepare(&sql)?;
        let tags = stmt
            .query_map(params![tag_type_code], row_to_tag)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }
}

impl Repository<Tag> for TagRepository<'_> {
    fn create(&self, entity: &Tag) -> StoreResult<Tag> {
        let now = now_millis();
        let changed = self.conn.execute(
            "INSERT INTO tags (tag_type_id, code, code_lower, display_name, description, parent_tag_id, created_at, updated_at)
             SELECT id, ?, ?, ?, ?, ?, ?, ? FROM tag_types WHERE code = ?",
            params![
                entity.tag_code,
                lookup_key(&entity.tag_code),
                entity.display_name,
                entity.description,
                entity.parent_tag_id,
                now,
                now,
                entity.tag_type_code
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::MissingReference(format!(
                "tag type \"{}\"",
                entity.tag_type_code
            )));
        }

        let id = self.conn.last_insert_rowid();
        self.find_by_id(id)?
            .ok_or_else(|| StoreError::MissingReference(format!("tag {}", id)))
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<Tag>> {
        let sql = format!("{} WHERE t.id = ?", SELECT_TAG);
        let tag = self
            .conn
            .query_row(&sql, params![id], row_to_tag)
            .optional()?;
        Ok(tag)
    }

    fn list(&self) -> StoreResult<Vec<Tag>> {
        let sql = format!("{} ORDER BY t.id", SELECT_TAG);
        let mut stmt = self.conn.prepare(&sql)?;
        let tags = stmt
            .query_map([], row_to_tag)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn delete(&self, id: i64) -> StoreResult<()> {
        self.conn.execute("DELETE FROM tags WHERE id = ?", params![id])?;
        Ok(())
    }
}

impl MutableRepository<Tag> for TagRepository<'_> {
    fn update(&self, entity: &Tag) -> StoreResult<Tag> {
        let changed = self.conn.execute(
            "UPDATE tags SET display_name = ?, description = ?, parent_tag_id = ?, updated_at = ? WHERE id = ?",
            params![
                entity.display_name,
                entity.description,
                entity.parent_tag_id,
                now_millis(),
                entity.id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::MissingReference(format!("tag {}", entity.id)));
        }
        self.find_by_id(entity.id)?
            .ok_or_else(|| StoreError::MissingReference(format!("tag {}", entity.id)))
    }
}

/// Convert a database row selected with `SELECT_TAG` to Tag
pub(crate) fn row_to_tag(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        tag_type_code: row.get(1)?,
        tag_code: row.get(2)?,
        display_name: row.get(3)?,
        description: row.get(4)?,
        parent_tag_id: row.get(5)?,
    })
}
