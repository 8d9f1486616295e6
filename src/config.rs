//! Store configuration
//!
//! Selects and configures the repository backend. Loaded from JSON,
//! e.g. `{"repository": {"type": "file", "path": "/var/lib/attacks.jsonl"}}`.

use crate::error::{AttackStoreError, Result};
use crate::repository::file::FileRepository;
use crate::repository::memory::MemoryRepository;
use crate::store::AttackStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Repository backend selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum RepositoryConfig {
    /// In-memory repository (lost on restart)
    #[default]
    Memory,
    /// Append-only JSON Lines file
    #[serde(rename_all = "camelCase")]
    File {
        path: PathBuf,
        /// Call `sync_data` after every append
        #[serde(default)]
        sync_writes: bool,
    },
}

/// Top-level attack store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    #[serde(default)]
    pub repository: RepositoryConfig,
}

impl StoreConfig {
    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AttackStoreError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Read configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AttackStoreError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json).map_err(|e| match e {
            AttackStoreError::Config(reason) => {
                AttackStoreError::Config(format!("{} ({})", reason, path.display()))
            }
            other => other,
        })
    }

    /// Build an `AttackStore` with the configured repository
    pub async fn build(&self) -> Result<AttackStore> {
        let store = match &self.repository {
            RepositoryConfig::Memory => AttackStore::new(MemoryRepository::new()),
            RepositoryConfig::File { path, sync_writes } => {
                if path.as_os_str().is_empty() {
                    return Err(AttackStoreError::Config(
                        "File repository path cannot be empty".to_string(),
                    ));
                }
                AttackStore::new(FileRepository::open(path.clone(), *sync_writes).await?)
            }
        };

        tracing::info!(repository = %store.repository_name(), "Attack store configured");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_memory() {
        assert_eq!(StoreConfig::default().repository, RepositoryConfig::Memory);
        assert_eq!(StoreConfig::from_json("{}").unwrap(), StoreConfig::default());
    }

    #[test]
    fn test_parse_file_config() {
        let config = StoreConfig::from_json(
            r#"{"repository": {"type": "file", "path": "/tmp/attacks.jsonl", "syncWrites": true}}"#,
        )
        .unwrap();

        assert_eq!(
            config.repository,
            RepositoryConfig::File {
                path: PathBuf::from("/tmp/attacks.jsonl"),
                sync_writes: true,
            }
        );
    }

    #[test]
    fn test_sync_writes_defaults_off() {
        let config =
            StoreConfig::from_json(r#"{"repository": {"type": "file", "path": "a.jsonl"}}"#)
                .unwrap();
        assert!(matches!(
            config.repository,
            RepositoryConfig::File { sync_writes: false, .. }
        ));
    }

    #[test]
    fn test_unknown_repository_type() {
        let err = StoreConfig::from_json(r#"{"repository": {"type": "redis"}}"#).unwrap_err();
        assert!(matches!(err, AttackStoreError::Config(_)));
    }

    #[test]
    fn test_from_file_missing() {
        let err = StoreConfig::from_file("/tmp/nonexistent-a3s-attack-config.json").unwrap_err();
        assert!(err.to_string().contains("nonexistent-a3s-attack-config.json"));
    }

    #[test]
    fn test_config_serialization() {
        let config = StoreConfig {
            repository: RepositoryConfig::File {
                path: PathBuf::from("attacks.jsonl"),
                sync_writes: false,
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"type\":\"file\""));
        assert!(json.contains("\"syncWrites\":false"));
    }

    #[tokio::test]
    async fn test_build_memory_store() {
        let store = StoreConfig::default().build().await.unwrap();
        assert_eq!(store.repository_name(), "memory");
    }

    #[tokio::test]
    async fn test_build_file_store() {
        let dir = std::env::temp_dir().join(format!("a3s-attack-store-test-{}", uuid::Uuid::new_v4()));
        let config = StoreConfig {
            repository: RepositoryConfig::File {
                path: dir.join("attacks.jsonl"),
                sync_writes: true,
            },
        };

        let store = config.build().await.unwrap();
        assert_eq!(store.repository_name(), "file");
        assert!(dir.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_build_rejects_empty_path() {
        let config = StoreConfig {
            repository: RepositoryConfig::File {
                path: PathBuf::new(),
                sync_writes: false,
            },
        };
        let err = config.build().await.err().unwrap();
        assert!(matches!(err, AttackStoreError::Config(_)));
    }
}
