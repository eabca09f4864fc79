//! Tag Hierarchy Operations
//!
//! Queries over the stored parent reference of tags. The in-memory closure
//! queries live in `crate::hierarchy`; these read straight from storage.

use rusqlite::params;

use super::super::error::StoreResult;
use super::tag_repo::TagRepository;

/// Trait for tag hierarchy operations
pub trait TagHierarchyOperations {
    /// Number of direct children of a tag
    fn count_child_tags(&self, parent_tag_id: i64) -> StoreResult<i64>;
}

impl TagHierarchyOperations for TagRepository<'_> {
    fn count_child_tags(&self, parent_tag_id: i64) -> StoreResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM tags WHERE parent_tag_id = ?",
            params![parent_tag_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
