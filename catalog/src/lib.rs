//! Metadata Catalog
//!
//! Namespaced business object definitions, tag types and tag hierarchies
//! over an embedded SQLite database.
//!
//! - `domain`: entities, requests, errors and key normalization
//! - `repository`: SQLite access, one repository per entity kind
//! - `hierarchy`: in-memory tag forest answering closure queries
//! - `service`: the catalog API, see [`CatalogService`]

pub mod config;
pub mod domain;
pub mod hierarchy;
pub mod repository;
pub mod service;

pub use config::CatalogConfig;
pub use domain::{DomainError, DomainResult};
pub use hierarchy::TagForest;
pub use service::{
    BusinessObjectDefinitionService, CatalogService, NamespaceService, TagService, TagTypeService,
};

/// Open the catalog described by `config`.
///
/// Installs file logging when a log directory is configured, opens and
/// migrates the database and loads the tag hierarchy.
pub async fn open(config: &CatalogConfig) -> DomainResult<CatalogService> {
    if let Some(log_dir) = &config.log_dir {
        rolling_logger::init_logger(log_dir, &config.app_name).map_err(DomainError::Internal)?;
    }

    let db = repository::init_db(&config.db_path, config.busy_timeout())?;
    log::info!("Catalog database opened at {}", config.db_path.display());

    CatalogService::open(db).await
}
