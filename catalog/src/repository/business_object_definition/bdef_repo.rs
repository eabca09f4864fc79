//! Business Object Definition Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for BusinessObjectDefinition CRUD operations.
//! Both parts of the key are resolved through lower-cased shadow columns,
//! which also back the UNIQUE index.

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::key::lookup_key;
use crate::domain::{BusinessObjectDefinition, BusinessObjectDefinitionKey};
use super::super::db::now_millis;
use super::super::error::{StoreError, StoreResult};
use super::super::traits::{MutableRepository, Repository};

pub(super) const SELECT_BDEF: &str = "SELECT b.id, n.code, b.name, b.data_provider_name, b.description, b.display_name
     FROM business_object_definitions b JOIN namespaces n ON n.id = b.namespace_id";

/// SQLite implementation of BusinessObjectDefinition repository
pub struct BusinessObjectDefinitionRepository<'a> {
    pub(super) conn: &'a Connection,
}

impl<'a> BusinessObjectDefinitionRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Find a business object definition by key, ignoring case on both parts
    pub fn get_by_key(
        &self,
        key: &BusinessObjectDefinitionKey,
    ) -> StoreResult<Option<BusinessObjectDefinition>> {
        let sql = format!("{} WHERE n.code_lower = ? AND b.name_lower = ?", SELECT_BDEF);
        let bdef = self
            .conn
            .query_row(
                &sql,
                params![
                    lookup_key(&key.namespace),
                    lookup_key(&key.business_object_definition_name)
                ],
                row_to_bdef,
            )
            .optional()?;
        Ok(bdef)
    }
}

impl Repository<BusinessObjectDefinition> for BusinessObjectDefinitionRepository<'_> {
    fn create(&self, entity: &BusinessObjectDefinition) -> StoreResult<BusinessObjectDefinition> {
        let now = now_millis();
        let changed = self.conn.execute(
            "INSERT INTO business_object_definitions
                (namespace_id, name, name_lower, data_provider_name, description, display_name, created_at, updated_at)
             SELECT id, ?, ?, ?, ?, ?, ?, ? FROM namespaces WHERE code_lower = ?",
            params![
                entity.business_object_definition_name,
                lookup_key(&entity.business_object_definition_name),
                entity.data_provider_name,
                entity.description,
                entity.display_name,
                now,
                now,
                lookup_key(&entity.namespace)
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::MissingReference(format!(
                "namespace \"{}\"",
                entity.namespace
            )));
        }

        let id = self.conn.last_insert_rowid();
        self.find_by_id(id)?.ok_or_else(|| {
            StoreError::MissingReference(format!("business object definition {}", id))
        })
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<BusinessObjectDefinition>> {
        let sql = format!("{} WHERE b.id = ?", SELECT_BDEF);
        let bdef = self
            .conn
            .query_row(&sql, params![id], row_to_bdef)
            .optional()?;
        Ok(bdef)
    }

    fn list(&self) -> StoreResult<Vec<BusinessObjectDefinition>> {
        let sql = format!("{} ORDER BY n.code_lower, b.name_lower", SELECT_BDEF);
        let mut stmt = self.conn.prepare(&sql)?;
        let bdefs = stmt
            .query_map([], row_to_bdef)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bdefs)
    }

    /// Delete the definition together with its tag associations
    fn delete(&self, id: i64) -> StoreResult<()> {
        self.conn.execute(
            "DELETE FROM business_object_definition_tags WHERE business_object_definition_id = ?",
            params![id],
        )?;
        self.conn.execute(
            "DELETE FROM business_object_definitions WHERE id = ?",
            params![id],
        )?;
        Ok(())
    }
}

impl MutableRepository<BusinessObjectDefinition> for BusinessObjectDefinitionRepository<'_> {
    fn update(&self, entity: &BusinessObjectDefinition) -> StoreResult<BusinessObjectDefinition> {
        let changed = self.conn.execute(
            "UPDATE business_object_definitions
             SET data_provider_name = ?, description = ?, display_name = ?, updated_at = ?
             WHERE id = ?",
            params![
                entity.data_provider_name,
                entity.description,
                entity.display_name,
                now_millis(),
                entity.id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::MissingReference(format!(
                "business object definition {}",
                entity.id
            )));
        }
        self.find_by_id(entity.id)?.ok_or_else(|| {
            StoreError::MissingReference(format!("business object definition {}", entity.id))
        })
    }
}

/// Convert a database row selected with `SELECT_BDEF` to BusinessObjectDefinition
pub(super) fn row_to_bdef(row: &rusqlite::Row) -> rusqlite::Result<BusinessObjectDefinition> {
    Ok(BusinessObjectDefinition {
        id: row.get(0)?,
        namespace: row.get(1)?,
        business_object_definition_name: row.get(2)?,
        data_provider_name: row.get(3)?,
        description: row.get(4)?,
        display_name: row.get(5)?,
    })
}
