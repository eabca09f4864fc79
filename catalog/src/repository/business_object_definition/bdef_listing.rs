//! Business Object Definition Listing Operations
//!
//! Key listing (optionally scoped to a namespace) and tag-filtered listing.

use std::collections::HashSet;

use rusqlite::params;

use crate::domain::key::{is_blank, lookup_key};
use crate::domain::{BusinessObjectDefinition, BusinessObjectDefinitionKey, Tag};
use super::super::error::StoreResult;
use super::super::traits::Repository;
use super::bdef_repo::{row_to_bdef, BusinessObjectDefinitionRepository, SELECT_BDEF};

const SELECT_KEY: &str = "SELECT n.code, b.name
     FROM business_object_definitions b JOIN namespaces n ON n.id = b.namespace_id";

/// Trait for business object definition listing operations
pub trait BusinessObjectDefinitionListingOperations {
    /// Keys of every business object definition
    fn list_keys(&self) -> StoreResult<Vec<BusinessObjectDefinitionKey>>;

    /// Keys of the definitions in `namespace` (matched ignoring case).
    ///
    /// A missing or blank namespace lists every key.
    fn list_keys_by_namespace(
        &self,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<BusinessObjectDefinitionKey>>;

    /// Definitions associated with any of `tags`, each returned once.
    ///
    /// Tags are used as given: descendants are only considered when the
    /// caller includes them. An empty slice returns every definition.
    fn list_by_tags(&self, tags: &[Tag]) -> StoreResult<HashSet<BusinessObjectDefinition>>;
}

impl BusinessObjectDefinitionListingOperations for BusinessObjectDefinitionRepository<'_> {
    fn list_keys(&self) -> StoreResult<Vec<BusinessObjectDefinitionKey>> {
        let sql = format!("{} ORDER BY n.code_lower, b.name_lower", SELECT_KEY);
        let mut stmt = self.conn.prepare(&sql)?;
        let keys = stmt
            .query_map([], row_to_key)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn list_keys_by_namespace(
        &self,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<BusinessObjectDefinitionKey>> {
        let namespace = match namespace {
            Some(ns) if !is_blank(Some(ns)) => ns,
            _ => return self.list_keys(),
        };

        let sql = format!("{} WHERE n.code_lower = ? ORDER BY b.name_lower", SELECT_KEY);
        let mut stmt = self.conn.prepare(&sql)?;
        let keys = stmt
            .query_map(params![lookup_key(namespace)], row_to_key)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn list_by_tags(&self, tags: &[Tag]) -> StoreResult<HashSet<BusinessObjectDefinition>> {
        if tags.is_empty() {
            return Ok(self.list()?.into_iter().collect());
        }

        let sql = format!(
            "{} JOIN business_object_definition_tags bt ON bt.business_object_definition_id = b.id
             WHERE bt.tag_id = ?",
            SELECT_BDEF
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let mut result = HashSet::new();
        for tag in tags {
            for bdef in stmt.query_map(params![tag.id], row_to_bdef)? {
                result.insert(bdef?);
            }
        }
        Ok(result)
    }
}

fn row_to_key(row: &rusqlite::Row) -> rusqlite::Result<BusinessObjectDefinitionKey> {
    Ok(BusinessObjectDefinitionKey {
        namespace: row.get(0)?,
        business_object_definition_name: row.get(1)?,
    })
}
