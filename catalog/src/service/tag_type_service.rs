//! Tag Type Service
//!
//! Tag type codes are trimmed and then matched exactly: "REGION" and
//! "region" are two distinct tag types.

use async_trait::async_trait;

use crate::domain::key::validate_string_parameter;
use crate::domain::{
    DomainError, DomainResult, TagType, TagTypeCreateRequest, TagTypeKey, TagTypeUpdateRequest,
};
use crate::repository::{MutableRepository, Repository, TagTypeRepository};
use super::catalog_service::CatalogService;
use super::traits::TagTypeService;

/// Validates the tag type key and returns it with the code trimmed
pub(super) fn validate_tag_type_key(key: &TagTypeKey) -> DomainResult<TagTypeKey> {
    Ok(TagTypeKey::new(validate_string_parameter(
        "tag type code",
        Some(&key.tag_type_code),
    )?))
}

pub(super) fn tag_type_not_found(key: &TagTypeKey) -> DomainError {
    DomainError::NotFound(format!(
        "Tag type with code \"{}\" doesn't exist.",
        key.tag_type_code
    ))
}

fn already_exists_message(key: &TagTypeKey) -> String {
    format!(
        "Unable to create tag type with code \"{}\" because it already exists.",
        key.tag_type_code
    )
}

#[async_trait]
impl TagTypeService for CatalogService {
    async fn create_tag_type(&self, request: TagTypeCreateRequest) -> DomainResult<TagType> {
        // Validate and trim the request parameters
        let key = validate_tag_type_key(&request.tag_type_key)?;
        let display_name = validate_string_parameter("display name", Some(&request.display_name))?;

        let tag_type = self
            .write(|tx| {
                let repo = TagTypeRepository::new(tx);

                // Validate the tag type does not already exist
                if repo.get_by_key(&key)?.is_some() {
                    return Err(DomainError::AlreadyExists(already_exists_message(&key)));
                }

                // A concurrent writer may still win the race; the unique index reports it
                repo.create(&TagType {
                    id: 0,
                    tag_type_code: key.tag_type_code.clone(),
                    display_name: display_name.clone(),
                    tag_type_order: request.tag_type_order,
                })
                .map_err(|e| e.or_already_exists(|| already_exists_message(&key)))
            })
            .await?;

        log::info!(
            "Created tag type \"{}\" (id {})",
            tag_type.tag_type_code,
            tag_type.id
        );
        Ok(tag_type)
    }

    async fn update_tag_type(
        &self,
        key: TagTypeKey,
        request: TagTypeUpdateRequest,
    ) -> DomainResult<TagType> {
        let key = validate_tag_type_key(&key)?;
        let display_name = validate_string_parameter("display name", Some(&request.display_name))?;

        let tag_type = self
            .write(|tx| {
                let repo = TagTypeRepository::new(tx);
                let mut tag_type = repo
                    .get_by_key(&key)?
                    .ok_or_else(|| tag_type_not_found(&key))?;

                tag_type.display_name = display_name.clone();
                tag_type.tag_type_order = request.tag_type_order;
                Ok(repo.update(&tag_type)?)
            })
            .await?;

        log::info!("Updated tag type \"{}\"", tag_type.tag_type_code);
        Ok(tag_type)
    }

    async fn get_tag_type(&self, key: TagTypeKey) -> DomainResult<TagType> {
        let key = validate_tag_type_key(&key)?;
        self.read(|tx| {
            TagTypeRepository::new(tx)
                .get_by_key(&key)?
                .ok_or_else(|| tag_type_not_found(&key))
        })
        .await
    }

    async fn delete_tag_type(&self, key: TagTypeKey) -> DomainResult<TagType> {
        let key = validate_tag_type_key(&key)?;

        let tag_type = self
            .write(|tx| {
                let repo = TagTypeRepository::new(tx);
                let tag_type = repo
                    .get_by_key(&key)?
                    .ok_or_else(|| tag_type_not_found(&key))?;
                if repo.count_tags(tag_type.id)? > 0 {
                    return Err(DomainError::InvalidInput(format!(
                        "Unable to delete tag type with code \"{}\" because it has tags.",
                        tag_type.tag_type_code
                    )));
                }
                repo.delete(tag_type.id)?;
                Ok(tag_type)
            })
            .await?;

        log::info!("Deleted tag type \"{}\"", tag_type.tag_type_code);
        Ok(tag_type)
    }

    async fn get_tag_types(&self) -> DomainResult<Vec<TagTypeKey>> {
        self.read(|tx| Ok(TagTypeRepository::new(tx).list_keys()?)).await
    }
}
