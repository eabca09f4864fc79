//! Service Layer - Public Traits
//!
//! The catalog API exposed to callers, one trait per entity kind. Every
//! operation normalizes its input, resolves existing rows and then mutates
//! or reports, inside a single transaction.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    BusinessObjectDefinition, BusinessObjectDefinitionCreateRequest, BusinessObjectDefinitionKey,
    BusinessObjectDefinitionTagKey, BusinessObjectDefinitionUpdateRequest, DomainResult,
    Namespace, Tag, TagCreateRequest, TagKey, TagType, TagTypeCreateRequest, TagTypeKey,
    TagTypeUpdateRequest, TagUpdateRequest,
};

#[async_trait]
pub trait NamespaceService: Send + Sync {
    async fn create_namespace(&self, code: &str) -> DomainResult<Namespace>;

    async fn get_namespace(&self, code: &str) -> DomainResult<Namespace>;

    /// Fails when definitions are still registered in the namespace
    async fn delete_namespace(&self, code: &str) -> DomainResult<Namespace>;

    async fn get_namespaces(&self) -> DomainResult<Vec<Namespace>>;
}

#[async_trait]
pub trait TagTypeService: Send + Sync {
    /// Create a tag type; the code is matched exactly after trimming
    async fn create_tag_type(&self, request: TagTypeCreateRequest) -> DomainResult<TagType>;

    async fn update_tag_type(
        &self,
        key: TagTypeKey,
        request: TagTypeUpdateRequest,
    ) -> DomainResult<TagType>;

    async fn get_tag_type(&self, key: TagTypeKey) -> DomainResult<TagType>;

    /// Fails when tags of this type still exist
    async fn delete_tag_type(&self, key: TagTypeKey) -> DomainResult<TagType>;

    /// All tag type keys, by order number then code
    async fn get_tag_types(&self) -> DomainResult<Vec<TagTypeKey>>;
}

#[async_trait]
pub trait TagService: Send + Sync {
    async fn create_tag(&self, request: TagCreateRequest) -> DomainResult<Tag>;

    /// Replace display name, description and parent; rejects a parent cycle
    async fn update_tag(&self, key: TagKey, request: TagUpdateRequest) -> DomainResult<Tag>;

    async fn get_tag(&self, key: TagKey) -> DomainResult<Tag>;

    /// Fails when the tag has children or is attached to definitions
    async fn delete_tag(&self, key: TagKey) -> DomainResult<Tag>;

    async fn get_tags(&self, tag_type_code: &str) -> DomainResult<Vec<TagKey>>;

    /// The tag followed by all of its descendants
    async fn get_tag_with_descendants(&self, key: TagKey) -> DomainResult<Vec<Arc<Tag>>>;

    /// Parent chain of the tag, nearest first
    async fn get_tag_ancestors(&self, key: TagKey) -> DomainResult<Vec<Arc<Tag>>>;
}

#[async_trait]
pub trait BusinessObjectDefinitionService: Send + Sync {
    async fn create_business_object_definition(
        &self,
        request: BusinessObjectDefinitionCreateRequest,
    ) -> DomainResult<BusinessObjectDefinition>;

    async fn update_business_object_definition(
        &self,
        key: BusinessObjectDefinitionKey,
        request: BusinessObjectDefinitionUpdateRequest,
    ) -> DomainResult<BusinessObjectDefinition>;

    /// Resolve a definition by key, ignoring case on both parts
    async fn get_business_object_definition(
        &self,
        key: BusinessObjectDefinitionKey,
    ) -> DomainResult<BusinessObjectDefinition>;

    /// Delete a definition and its tag associations
    async fn delete_business_object_definition(
        &self,
        key: BusinessObjectDefinitionKey,
    ) -> DomainResult<BusinessObjectDefinition>;

    /// Keys in `namespace`, or every key when it is missing or blank
    async fn get_business_object_definition_keys(
        &self,
        namespace: Option<&str>,
    ) -> DomainResult<Vec<BusinessObjectDefinitionKey>>;

    /// Definitions tagged with any of `tag_keys`, each once.
    ///
    /// Tags are not expanded to their descendants; combine with
    /// `TagService::get_tag_with_descendants` for branch semantics.
    /// No tags returns every definition.
    async fn get_business_object_definitions_by_tags(
        &self,
        tag_keys: Vec<TagKey>,
    ) -> DomainResult<HashSet<BusinessObjectDefinition>>;

    async fn create_business_object_definition_tag(
        &self,
        key: BusinessObjectDefinitionTagKey,
    ) -> DomainResult<BusinessObjectDefinitionTagKey>;

    async fn delete_business_object_definition_tag(
        &self,
        key: BusinessObjectDefinitionTagKey,
    ) -> DomainResult<BusinessObjectDefinitionTagKey>;

    async fn get_business_object_definition_tags(
        &self,
        key: BusinessObjectDefinitionKey,
    ) -> DomainResult<Vec<TagKey>>;
}
