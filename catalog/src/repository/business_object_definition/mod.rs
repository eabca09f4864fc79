//! Business Object Definition Repository Module
//!
//! This module provides business object definition repository functionality
//! split into specialized sub-modules:
//! - bdef_repo: Core CRUD operations and key resolution
//! - bdef_listing: Key listing and tag-filtered listing
//! - bdef_tag: Business object definition - tag relationships

mod bdef_repo;
mod bdef_listing;
mod bdef_tag;

pub use bdef_repo::BusinessObjectDefinitionRepository;

// Re-export all operation traits so they can be used by importing BusinessObjectDefinitionRepository
pub use bdef_listing::BusinessObjectDefinitionListingOperations;
pub use bdef_tag::BusinessObjectDefinitionTagOperations;
