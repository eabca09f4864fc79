//! Namespace Service

use async_trait::async_trait;

use crate::domain::key::validate_string_parameter;
use crate::domain::{DomainError, DomainResult, Namespace};
use crate::repository::{NamespaceRepository, Repository};
use super::catalog_service::CatalogService;
use super::traits::NamespaceService;

pub(super) fn namespace_not_found(code: &str) -> DomainError {
    DomainError::NotFound(format!("Namespace \"{}\" doesn't exist.", code))
}

#[async_trait]
impl NamespaceService for CatalogService {
    async fn create_namespace(&self, code: &str) -> DomainResult<Namespace> {
        let code = validate_string_parameter("namespace", Some(code))?;

        let namespace = self
            .write(|tx| {
                let repo = NamespaceRepository::new(tx);
                if repo.get_by_code(&code)?.is_some() {
                    return Err(DomainError::AlreadyExists(already_exists_message(&code)));
                }
                repo.create(&Namespace::new(0, code.clone()))
                    .map_err(|e| e.or_already_exists(|| already_exists_message(&code)))
            })
            .await?;

        log::info!("Created namespace \"{}\" (id {})", namespace.code, namespace.id);
        Ok(namespace)
    }

    async fn get_namespace(&self, code: &str) -> DomainResult<Namespace> {
        let code = validate_string_parameter("namespace", Some(code))?;
        self.read(|tx| {
            NamespaceRepository::new(tx)
                .get_by_code(&code)?
                .ok_or_else(|| namespace_not_found(&code))
        })
        .await
    }

    async fn delete_namespace(&self, code: &str) -> DomainResult<Namespace> {
        let code = validate_string_parameter("namespace", Some(code))?;

        let namespace = self
            .write(|tx| {
                let repo = NamespaceRepository::new(tx);
                let namespace = repo
                    .get_by_code(&code)?
                    .ok_or_else(|| namespace_not_found(&code))?;
                if repo.count_business_object_definitions(namespace.id)? > 0 {
                    return Err(DomainError::InvalidInput(format!(
                        "Unable to delete namespace \"{}\" because it has business object definitions.",
                        namespace.code
                    )));
                }
                repo.delete(namespace.id)?;
                Ok(namespace)
            })
            .await?;

        log::info!("Deleted namespace \"{}\"", namespace.code);
        Ok(namespace)
    }

    async fn get_namespaces(&self) -> DomainResult<Vec<Namespace>> {
        self.read(|tx| Ok(NamespaceRepository::new(tx).list()?)).await
    }
}

fn already_exists_message(code: &str) -> String {
    format!("Unable to create namespace \"{}\" because it already exists.", code)
}
