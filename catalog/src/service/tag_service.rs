//! Tag Service
//!
//! Tags are written to storage first; the in-memory hierarchy follows once
//! the transaction has committed, before the connection is released.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::Connection;

use crate::domain::key::{validate_optional_parameter, validate_string_parameter};
use crate::domain::{
    DomainError, DomainResult, Tag, TagCreateRequest, TagKey, TagTypeKey, TagUpdateRequest,
};
use crate::repository::{
    BusinessObjectDefinitionRepository, BusinessObjectDefinitionTagOperations, MutableRepository,
    Repository, TagHierarchyOperations, TagRepository, TagTypeRepository,
};
use super::catalog_service::CatalogService;
use super::tag_type_service::{tag_type_not_found, validate_tag_type_key};
use super::traits::TagService;

/// Validates the tag key and returns it with both parts trimmed
pub(super) fn validate_tag_key(key: &TagKey) -> DomainResult<TagKey> {
    Ok(TagKey::new(
        validate_string_parameter("tag type code", Some(&key.tag_type_code))?,
        validate_string_parameter("tag code", Some(&key.tag_code))?,
    ))
}

/// Resolve a tag by key or fail with `NotFound`
pub(super) fn resolve_tag(conn: &Connection, key: &TagKey) -> DomainResult<Tag> {
    TagRepository::new(conn).get_by_key(key)?.ok_or_else(|| {
        DomainError::NotFound(format!(
            "Tag with code \"{}\" doesn't exist for tag type code \"{}\".",
            key.tag_code, key.tag_type_code
        ))
    })
}

/// Resolve the requested parent; it must belong to the same tag type
fn resolve_parent(conn: &Connection, key: &TagKey, parent_key: &TagKey) -> DomainResult<Tag> {
    if parent_key.tag_type_code != key.tag_type_code {
        return Err(DomainError::InvalidInput(format!(
            "Parent tag type code \"{}\" must match the tag type code \"{}\".",
            parent_key.tag_type_code, key.tag_type_code
        )));
    }
    resolve_tag(conn, parent_key)
}

/// True when `candidate` is the tag `tag_id` or one of its descendants
fn is_self_or_descendant(repo: &TagRepository, tag_id: i64, candidate: &Tag) -> DomainResult<bool> {
    let mut current = Some(candidate.clone());
    while let Some(tag) = current {
        if tag.id == tag_id {
            return Ok(true);
        }
        current = match tag.parent_tag_id {
            Some(parent_id) => repo.find_by_id(parent_id)?,
            None => None,
        };
    }
    Ok(false)
}

fn already_exists_message(key: &TagKey) -> String {
    format!(
        "Unable to create tag with tag type code \"{}\" and tag code \"{}\" because it already exists.",
        key.tag_type_code, key.tag_code
    )
}

#[async_trait]
impl TagService for CatalogService {
    async fn create_tag(&self, request: TagCreateRequest) -> DomainResult<Tag> {
        let key = validate_tag_key(&request.tag_key)?;
        let display_name = validate_string_parameter("display name", Some(&request.display_name))?;
        let description = validate_optional_parameter(request.description.as_deref());
        let parent_key = request
            .parent_tag_key
            .as_ref()
            .map(validate_tag_key)
            .transpose()?;

        let tag = self
            .write_tag(|tx| {
                let tag_type_key = TagTypeKey::new(key.tag_type_code.clone());
                if TagTypeRepository::new(tx).get_by_key(&tag_type_key)?.is_none() {
                    return Err(tag_type_not_found(&tag_type_key));
                }

                let repo = TagRepository::new(tx);
                if repo.get_by_key(&key)?.is_some() {
                    return Err(DomainError::AlreadyExists(already_exists_message(&key)));
                }

                let parent = match &parent_key {
                    Some(parent_key) => Some(resolve_parent(tx, &key, parent_key)?),
                    None => None,
                };

                repo.create(&Tag {
                    id: 0,
                    tag_type_code: key.tag_type_code.clone(),
                    tag_code: key.tag_code.clone(),
                    display_name: display_name.clone(),
                    description: description.clone(),
                    parent_tag_id: parent.map(|p| p.id),
                })
                .map_err(|e| e.or_already_exists(|| already_exists_message(&key)))
            }, |forest, tag: &Tag| forest.insert(tag.clone()))
            .await?;

        log::info!("Created tag {} (id {})", tag.key(), tag.id);
        Ok(tag)
    }

    async fn update_tag(&self, key: TagKey, request: TagUpdateRequest) -> DomainResult<Tag> {
        let key = validate_tag_key(&key)?;
        let display_name = validate_string_parameter("display name", Some(&request.display_name))?;
        let description = validate_optional_parameter(request.description.as_deref());
        let parent_key = request
            .parent_tag_key
            .as_ref()
            .map(validate_tag_key)
            .transpose()?;

        let tag = self
            .write_tag(|tx| {
                let repo = TagRepository::new(tx);
                let mut tag = resolve_tag(tx, &key)?;

                let parent = match &parent_key {
                    Some(parent_key) => Some(resolve_parent(tx, &key, parent_key)?),
                    None => None,
                };
                if let Some(parent) = &parent {
                    if is_self_or_descendant(&repo, tag.id, parent)? {
                        return Err(DomainError::InvalidInput(format!(
                            "Tag {} cannot be its own ancestor; {} is the tag itself or one of its descendants.",
                            tag.key(),
                            parent.key()
                        )));
                    }
                }

                tag.display_name = display_name.clone();
                tag.description = description.clone();
                tag.parent_tag_id = parent.map(|p| p.id);
                Ok(repo.update(&tag)?)
            }, |forest, tag: &Tag| forest.update(tag.clone()))
            .await?;

        log::info!("Updated tag {}", tag.key());
        Ok(tag)
    }

    async fn get_tag(&self, key: TagKey) -> DomainResult<Tag> {
        let key = validate_tag_key(&key)?;
        self.read(|tx| resolve_tag(tx, &key)).await
    }

    async fn delete_tag(&self, key: TagKey) -> DomainResult<Tag> {
        let key = validate_tag_key(&key)?;

        let tag = self
            .write_tag(|tx| {
                let repo = TagRepository::new(tx);
                let tag = resolve_tag(tx, &key)?;

                if repo.count_child_tags(tag.id)? > 0 {
                    return Err(DomainError::InvalidInput(format!(
                        "Unable to delete tag {} because it has child tags.",
                        tag.key()
                    )));
                }
                if BusinessObjectDefinitionRepository::new(tx).count_with_tag(tag.id)? > 0 {
                    return Err(DomainError::InvalidInput(format!(
                        "Unable to delete tag {} because it is associated with business object definitions.",
                        tag.key()
                    )));
                }

                repo.delete(tag.id)?;
                Ok(tag)
            }, |forest, tag: &Tag| forest.remove(tag.id))
            .await?;

        log::info!("Deleted tag {}", tag.key());
        Ok(tag)
    }

    async fn get_tags(&self, tag_type_code: &str) -> DomainResult<Vec<TagKey>> {
        let tag_type_key = validate_tag_type_key(&TagTypeKey::new(tag_type_code))?;
        self.read(|tx| {
            if TagTypeRepository::new(tx).get_by_key(&tag_type_key)?.is_none() {
                return Err(tag_type_not_found(&tag_type_key));
            }
            let tags = TagRepository::new(tx).list_by_tag_type(&tag_type_key.tag_type_code)?;
            Ok(tags.iter().map(Tag::key).collect())
        })
        .await
    }

    async fn get_tag_with_descendants(&self, key: TagKey) -> DomainResult<Vec<Arc<Tag>>> {
        let key = validate_tag_key(&key)?;
        self.read_tag_hierarchy(
            |tx| resolve_tag(tx, &key),
            |forest, id| forest.descendants_and_self(id),
        )
        .await
    }

    async fn get_tag_ancestors(&self, key: TagKey) -> DomainResult<Vec<Arc<Tag>>> {
        let key = validate_tag_key(&key)?;
        self.read_tag_hierarchy(|tx| resolve_tag(tx, &key), |forest, id| forest.ancestors(id))
            .await
    }
}
