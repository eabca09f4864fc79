//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations borrow a connection (usually an open transaction) so that
//! every call made during one service operation observes the same transaction.

use crate::domain::Entity;
use super::error::StoreResult;

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type.
pub trait Repository<T: Entity> {
    /// Insert a new entity and re-read it, returning the row as stored
    /// (generated id and any storage-side normalization included).
    fn create(&self, entity: &T) -> StoreResult<T>;

    /// Find entity by ID
    fn find_by_id(&self, id: T::Id) -> StoreResult<Option<T>>;

    /// List all entities
    fn list(&self) -> StoreResult<Vec<T>>;

    /// Delete entity by ID
    fn delete(&self, id: T::Id) -> StoreResult<()>;
}

/// Repositories of entities with attributes that change after creation.
///
/// Keys are never rewritten; only the non-key attributes are updated.
pub trait MutableRepository<T: Entity>: Repository<T> {
    /// Update the mutable attributes of an existing entity and re-read it
    fn update(&self, entity: &T) -> StoreResult<T>;
}
