//! Domain Layer
//!
//! Catalog entities, request types, errors and key normalization.
//! This layer has NO storage dependencies (serde only).

mod entity;
pub mod key;
mod namespace;
mod tag_type;
mod tag;
mod business_object_definition;

pub use entity::{Entity, DomainError, DomainResult};
pub use namespace::Namespace;
pub use tag_type::{TagType, TagTypeKey, TagTypeCreateRequest, TagTypeUpdateRequest};
pub use tag::{Tag, TagKey, TagCreateRequest, TagUpdateRequest};
pub use business_object_definition::{
    BusinessObjectDefinition, BusinessObjectDefinitionCreateRequest, BusinessObjectDefinitionKey,
    BusinessObjectDefinitionTag, BusinessObjectDefinitionTagKey,
    BusinessObjectDefinitionUpdateRequest,
};
