//! Catalog Configuration
//!
//! Loaded from an optional JSON file, then overridden by environment
//! variables. Missing fields take their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

pub const ENV_DB_PATH: &str = "CATALOG_DB_PATH";
pub const ENV_LOG_DIR: &str = "CATALOG_LOG_DIR";

/// Database path that opens a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogConfig {
    pub db_path: PathBuf,
    /// Directory for rolled log files; no file logging when unset
    pub log_dir: Option<PathBuf>,
    pub app_name: String,
    pub busy_timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("catalog.db"),
            log_dir: None,
            app_name: "meta-catalog".to_string(),
            busy_timeout_ms: 5_000,
        }
    }
}

impl CatalogConfig {
    /// Configuration backed by an in-memory database, mostly for tests
    pub fn in_memory() -> Self {
        Self {
            db_path: PathBuf::from(IN_MEMORY),
            ..Self::default()
        }
    }

    /// Read a JSON config file and apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::InvalidInput(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            DomainError::InvalidInput(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        Ok(config.with_env_overrides())
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(db_path) = lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            self.db_path = PathBuf::from(db_path.trim());
        }
        if let Some(log_dir) = lookup(ENV_LOG_DIR).filter(|v| !v.trim().is_empty()) {
            self.log_dir = Some(PathBuf::from(log_dir.trim()));
        }
        self
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only test that reads the process environment, so env changes stay local to it
    #[test]
    fn test_load_applies_defaults_and_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{ "dbPath": "/tmp/other.db", "busyTimeoutMs": 250 }"#).unwrap();

        std::env::remove_var(ENV_DB_PATH);
        std::env::remove_var(ENV_LOG_DIR);
        let config = CatalogConfig::load(&path).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
        assert_eq!(config.app_name, "meta-catalog");
        assert_eq!(config.log_dir, None);

        std::env::set_var(ENV_DB_PATH, IN_MEMORY);
        std::env::set_var(ENV_LOG_DIR, dir.path());
        let config = CatalogConfig::load(&path).unwrap();
        let from_env = CatalogConfig::from_env();
        std::env::remove_var(ENV_DB_PATH);
        std::env::remove_var(ENV_LOG_DIR);

        assert_eq!(config.db_path, PathBuf::from(IN_MEMORY));
        assert_eq!(config.log_dir.as_deref(), Some(dir.path()));
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
        assert_eq!(from_env.db_path, PathBuf::from(IN_MEMORY));
        assert_eq!(from_env.busy_timeout_ms, 5_000);
    }

    #[test]
    fn test_overrides() {
        let config = CatalogConfig::default().with_overrides(|name| match name {
            ENV_DB_PATH => Some(" :memory: ".to_string()),
            ENV_LOG_DIR => Some("".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, PathBuf::from(IN_MEMORY));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(CatalogConfig::load(&path).unwrap_err().is_invalid_input());
        assert!(CatalogConfig::load(dir.path().join("missing.json"))
            .unwrap_err()
            .is_invalid_input());
    }
}
