//! Business Object Definition - Tag Relationship Operations
//!
//! Operations for managing the many-to-many relationship between business
//! object definitions and tags.

use rusqlite::params;

use crate::domain::{BusinessObjectDefinitionTag, Tag};
use crate::repository::tag::{row_to_tag, SELECT_TAG};
use super::super::db::now_millis;
use super::super::error::StoreResult;
use super::bdef_repo::BusinessObjectDefinitionRepository;

/// Trait for business object definition - tag relationship operations
pub trait BusinessObjectDefinitionTagOperations {
    /// Associate a tag with a definition; a duplicate pair is a unique violation
    fn add_tag(&self, bdef_id: i64, tag_id: i64) -> StoreResult<BusinessObjectDefinitionTag>;

    /// Remove an association; returns whether it existed
    fn remove_tag(&self, bdef_id: i64, tag_id: i64) -> StoreResult<bool>;

    fn has_tag(&self, bdef_id: i64, tag_id: i64) -> StoreResult<bool>;

    /// Tags associated with a definition, by tag type then code
    fn get_tags(&self, bdef_id: i64) -> StoreResult<Vec<Tag>>;

    /// Number of definitions associated with a tag
    fn count_with_tag(&self, tag_id: i64) -> StoreResult<i64>;
}

impl BusinessObjectDefinitionTagOperations for BusinessObjectDefinitionRepository<'_> {
    fn add_tag(&self, bdef_id: i64, tag_id: i64) -> StoreResult<BusinessObjectDefinitionTag> {
        self.conn.execute(
            "INSERT INTO business_object_definition_tags (business_object_definition_id, tag_id, created_at)
             VALUES (?, ?, ?)",
            params![bdef_id, tag_id, now_millis()],
        )?;

        Ok(BusinessObjectDefinitionTag {
            business_object_definition_id: bdef_id,
            tag_id,
        })
    }

    fn remove_tag(&self, bdef_id: i64, tag_id: i64) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM business_object_definition_tags WHERE business_object_definition_id = ? AND tag_id = ?",
            params![bdef_id, tag_id],
        )?;
        Ok(changed > 0)
    }

    fn has_tag(&self, bdef_id: i64, tag_id: i64) -> StoreResult<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM business_object_definition_tags
                           WHERE business_object_definition_id = ? AND tag_id = ?)",
            params![bdef_id, tag_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn get_tags(&self, bdef_id: i64) -> StoreResult<Vec<Tag>> {
        let sql = format!(
            "{} JOIN business_object_definition_tags bt ON bt.tag_id = t.id
             WHERE bt.business_object_definition_id = ?
             ORDER BY tt.order_number, tt.code, t.code_lower",
            SELECT_TAG
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let tags = stmt
            .query_map(params![bdef_id], row_to_tag)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn count_with_tag(&self, tag_id: i64) -> StoreResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM business_object_definition_tags WHERE tag_id = ?",
            params![tag_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
