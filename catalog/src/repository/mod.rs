//! Repository Layer
//!
//! Data access abstractions and their SQLite implementations.

mod traits;
mod db;
mod error;
mod namespace_repo;
mod tag_type_repo;
pub mod tag;
pub mod business_object_definition;


pub use traits::{MutableRepository, Repository};
pub use db::{data_version, init_db, in_transaction, read_only, DbState};
pub use error::{StoreError, StoreResult};
pub use namespace_repo::NamespaceRepository;
pub use tag_type_repo::TagTypeRepository;
pub use tag::{TagRepository, TagHierarchyOperations};
pub use business_object_definition::{
    BusinessObjectDefinitionListingOperations, BusinessObjectDefinitionRepository,
    BusinessObjectDefinitionTagOperations,
};
