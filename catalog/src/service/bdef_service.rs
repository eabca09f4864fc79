//! Business Object Definition Service
//!
//! Definitions are resolved by namespace and name, both ignoring case.
//! Tag filtering is literal: a tag matches only the definitions linked to
//! it directly.

use std::collections::HashSet;

use async_trait::async_trait;
use rusqlite::Connection;

use crate::domain::key::{validate_optional_parameter, validate_string_parameter};
use crate::domain::{
    BusinessObjectDefinition, BusinessObjectDefinitionCreateRequest, BusinessObjectDefinitionKey,
    BusinessObjectDefinitionTagKey, BusinessObjectDefinitionUpdateRequest, DomainError,
    DomainResult, Tag, TagKey,
};
use crate::repository::{
    BusinessObjectDefinitionListingOperations, BusinessObjectDefinitionRepository,
    BusinessObjectDefinitionTagOperations, MutableRepository, NamespaceRepository, Repository,
};
use super::catalog_service::CatalogService;
use super::namespace_service::namespace_not_found;
use super::tag_service::{resolve_tag, validate_tag_key};
use super::traits::BusinessObjectDefinitionService;

fn validate_key(key: &BusinessObjectDefinitionKey) -> DomainResult<BusinessObjectDefinitionKey> {
    Ok(BusinessObjectDefinitionKey::new(
        validate_string_parameter("namespace", Some(&key.namespace))?,
        validate_string_parameter(
            "business object definition name",
            Some(&key.business_object_definition_name),
        )?,
    ))
}

fn resolve(
    conn: &Connection,
    key: &BusinessObjectDefinitionKey,
) -> DomainResult<BusinessObjectDefinition> {
    BusinessObjectDefinitionRepository::new(conn)
        .get_by_key(key)?
        .ok_or_else(|| {
            DomainError::NotFound(format!(
                "Business object definition with name \"{}\" doesn't exist for namespace \"{}\".",
                key.business_object_definition_name, key.namespace
            ))
        })
}

fn already_exists_message(key: &BusinessObjectDefinitionKey) -> String {
    format!(
        "Unable to create business object definition with name \"{}\" because it already exists for namespace \"{}\".",
        key.business_object_definition_name, key.namespace
    )
}

fn tag_already_exists_message(bdef: &BusinessObjectDefinition, tag: &Tag) -> String {
    format!(
        "Tag with tag type code \"{}\" and tag code \"{}\" already exists for business object definition {{{}}}.",
        tag.tag_type_code,
        tag.tag_code,
        bdef.key()
    )
}

#[async_trait]
impl BusinessObjectDefinitionService for CatalogService {
    async fn create_business_object_definition(
        &self,
        request: BusinessObjectDefinitionCreateRequest,
    ) -> DomainResult<BusinessObjectDefinition> {
        let key = validate_key(&BusinessObjectDefinitionKey::new(
            request.namespace.as_str(),
            request.business_object_definition_name.as_str(),
        ))?;
        let data_provider_name =
            validate_string_parameter("data provider name", Some(&request.data_provider_name))?;
        let description = validate_optional_parameter(request.description.as_deref());
        let display_name = validate_optional_parameter(request.display_name.as_deref());

        let bdef = self
            .write(|tx| {
                if NamespaceRepository::new(tx).get_by_code(&key.namespace)?.is_none() {
                    return Err(namespace_not_found(&key.namespace));
                }

                let repo = BusinessObjectDefinitionRepository::new(tx);
                if repo.get_by_key(&key)?.is_some() {
                    return Err(DomainError::AlreadyExists(already_exists_message(&key)));
                }

                repo.create(&BusinessObjectDefinition {
                    id: 0,
                    namespace: key.namespace.clone(),
                    business_object_definition_name: key.business_object_definition_name.clone(),
                    data_provider_name: data_provider_name.clone(),
                    description: description.clone(),
                    display_name: display_name.clone(),
                })
                .map_err(|e| e.or_already_exists(|| already_exists_message(&key)))
            })
            .await?;

        log::info!("Created business object definition {{{}}} (id {})", bdef.key(), bdef.id);
        Ok(bdef)
    }

    async fn update_business_object_definition(
        &self,
        key: BusinessObjectDefinitionKey,
        request: BusinessObjectDefinitionUpdateRequest,
    ) -> DomainResult<BusinessObjectDefinition> {
        let key = validate_key(&key)?;
        let description = validate_optional_parameter(request.description.as_deref());
        let display_name = validate_optional_parameter(request.display_name.as_deref());

        let bdef = self
            .write(|tx| {
                let mut bdef = resolve(tx, &key)?;
                bdef.description = description.clone();
                bdef.display_name = display_name.clone();
                Ok(BusinessObjectDefinitionRepository::new(tx).update(&bdef)?)
            })
            .await?;

        log::info!("Updated business object definition {{{}}}", bdef.key());
        Ok(bdef)
    }

    async fn get_business_object_definition(
        &self,
        key: BusinessObjectDefinitionKey,
    ) -> DomainResult<BusinessObjectDefinition> {
        let key = validate_key(&key)?;
        self.read(|tx| resolve(tx, &key)).await
    }

    async fn delete_business_object_definition(
        &self,
        key: BusinessObjectDefinitionKey,
    ) -> DomainResult<BusinessObjectDefinition> {
        let key = validate_key(&key)?;

        let bdef = self
            .write(|tx| {
                let bdef = resolve(tx, &key)?;
                BusinessObjectDefinitionRepository::new(tx).delete(bdef.id)?;
                Ok(bdef)
            })
            .await?;

        log::info!("Deleted business object definition {{{}}}", bdef.key());
        Ok(bdef)
    }

    async fn get_business_object_definition_keys(
        &self,
        namespace: Option<&str>,
    ) -> DomainResult<Vec<BusinessObjectDefinitionKey>> {
        let namespace = validate_optional_parameter(namespace);
        self.read(|tx| {
            Ok(BusinessObjectDefinitionRepository::new(tx)
                .list_keys_by_namespace(namespace.as_deref())?)
        })
        .await
    }

    async fn get_business_object_definitions_by_tags(
        &self,
        tag_keys: Vec<TagKey>,
    ) -> DomainResult<HashSet<BusinessObjectDefinition>> {
        let tag_keys = tag_keys
            .iter()
            .map(validate_tag_key)
            .collect::<DomainResult<Vec<_>>>()?;

        self.read(|tx| {
            let tags = tag_keys
                .iter()
                .map(|key| resolve_tag(tx, key))
                .collect::<DomainResult<Vec<_>>>()?;
            let bdefs = BusinessObjectDefinitionRepository::new(tx).list_by_tags(&tags)?;
            log::debug!("{} tags matched {} business object definitions", tags.len(), bdefs.len());
            Ok(bdefs)
        })
        .await
    }

    async fn create_business_object_definition_tag(
        &self,
        key: BusinessObjectDefinitionTagKey,
    ) -> DomainResult<BusinessObjectDefinitionTagKey> {
        let bdef_key = validate_key(&key.business_object_definition_key)?;
        let tag_key = validate_tag_key(&key.tag_key)?;

        let created = self
            .write(|tx| {
                let bdef = resolve(tx, &bdef_key)?;
                let tag = resolve_tag(tx, &tag_key)?;

                let repo = BusinessObjectDefinitionRepository::new(tx);
                if repo.has_tag(bdef.id, tag.id)? {
                    return Err(DomainError::AlreadyExists(tag_already_exists_message(&bdef, &tag)));
                }
                repo.add_tag(bdef.id, tag.id)
                    .map_err(|e| e.or_already_exists(|| tag_already_exists_message(&bdef, &tag)))?;

                Ok(BusinessObjectDefinitionTagKey {
                    business_object_definition_key: bdef.key(),
                    tag_key: tag.key(),
                })
            })
            .await?;

        log::info!(
            "Tagged business object definition {{{}}} with {}",
            created.business_object_definition_key,
            created.tag_key
        );
        Ok(created)
    }

    async fn delete_business_object_definition_tag(
        &self,
        key: BusinessObjectDefinitionTagKey,
    ) -> DomainResult<BusinessObjectDefinitionTagKey> {
        let bdef_key = validate_key(&key.business_object_definition_key)?;
        let tag_key = validate_tag_key(&key.tag_key)?;

        let deleted = self
            .write(|tx| {
                let bdef = resolve(tx, &bdef_key)?;
                let tag = resolve_tag(tx, &tag_key)?;

                if !BusinessObjectDefinitionRepository::new(tx).remove_tag(bdef.id, tag.id)? {
                    return Err(DomainError::NotFound(format!(
                        "Tag with tag type code \"{}\" and tag code \"{}\" doesn't exist for business object definition {{{}}}.",
                        tag.tag_type_code,
                        tag.tag_code,
                        bdef.key()
                    )));
                }

                Ok(BusinessObjectDefinitionTagKey {
                    business_object_definition_key: bdef.key(),
                    tag_key: tag.key(),
                })
            })
            .await?;

        log::info!(
            "Removed tag {} from business object definition {{{}}}",
            deleted.tag_key,
            deleted.business_object_definition_key
        );
        Ok(deleted)
    }

    async fn get_business_object_definition_tags(
        &self,
        key: BusinessObjectDefinitionKey,
    ) -> DomainResult<Vec<TagKey>> {
        let key = validate_key(&key)?;
        self.read(|tx| {
            let bdef = resolve(tx, &key)?;
            let tags = BusinessObjectDefinitionRepository::new(tx).get_tags(bdef.id)?;
            Ok(tags.iter().map(Tag::key).collect())
        })
        .await
    }
}
