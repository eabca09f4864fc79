//! Service Layer
//!
//! Catalog operations over the repositories, one trait per entity kind,
//! all implemented by [`CatalogService`].

mod traits;
mod catalog_service;
mod namespace_service;
mod tag_type_service;
mod tag_service;
mod bdef_service;

#[cfg(test)]
mod tests;

pub use traits::{
    BusinessObjectDefinitionService, NamespaceService, TagService, TagTypeService,
};
pub use catalog_service::CatalogService;
