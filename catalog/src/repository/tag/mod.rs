//! Tag Repository Module
//!
//! This module provides tag repository functionality split into specialized sub-modules:
//! - tag_repo: Core CRUD operations and key resolution
//! - tag_hierarchy: Parent-child queries over the stored parent references

mod tag_repo;
mod tag_hierarchy;

pub use tag_repo::TagRepository;
pub(crate) use tag_repo::{row_to_tag, SELECT_TAG};

// Re-export the operation trait so it can be used by importing TagRepository
pub use tag_hierarchy::TagHierarchyOperations;
