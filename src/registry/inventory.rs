use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::Tag;
use crate::error::{RetentionError, Result};
use crate::registry::RegistryClient;

/// Credentials an inventory accepts on login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryCredentials {
    pub username: String,
    pub password: String,
}

/// On-disk layout of a registry inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub repository: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<InventoryCredentials>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Registry backed by a JSON inventory file.
///
/// Deleting a tag removes it from the inventory and rewrites the file, so a
/// later run sees the result of earlier ones.
pub struct InventoryRegistry {
    path: PathBuf,
    inventory: Mutex<Inventory>,
}

impl InventoryRegistry {
    /// Load the inventory at `path` and check it describes `repository`
    pub async fn open(path: impl AsRef<Path>, repository: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            RetentionError::registry(format!("cannot read inventory {}: {}", path.display(), e))
        })?;
        let inventory: Inventory = serde_json::from_str(&text)?;

        if inventory.repository != repository {
            return Err(RetentionError::registry(format!(
                "inventory {} describes repository '{}', not '{}'",
                path.display(),
                inventory.repository,
                repository
            )));
        }

        debug!(path = %path.display(), tags = inventory.tags.len(), "Loaded inventory");
        Ok(InventoryRegistry {
            path,
            inventory: Mutex::new(inventory),
        })
    }

    /// Writes `inventory` to a sibling file and renames it over the
    /// inventory, so readers see either the old or the new content.
    async fn persist(&self, inventory: &Inventory) -> Result<()> {
        let text = serde_json::to_string_pretty(inventory)?;
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        tokio::fs::write(&staging, text).await?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl RegistryClient for InventoryRegistry {
    async fn login(&self, username: &str, password: &str) -> Result<()> {
        let inventory = self.inventory.lock().await;
        match &inventory.credentials {
            Some(expected) if expected.username != username || expected.password != password => {
                Err(RetentionError::authentication(format!(
                    "credentials for '{}' rejected by {}",
                    username, inventory.repository
                )))
            }
            _ => Ok(()),
        }
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.inventory.lock().await.tags.clone())
    }

    async fn delete_tag(&self, name: &str) -> Result<()> {
        let mut inventory = self.inventory.lock().await;
        let position = inventory
            .tags
            .iter()
            .position(|tag| tag.name == name)
            .ok_or_else(|| {
                RetentionError::registry(format!(
                    "tag '{}' not found in {}",
                    name, inventory.repository
                ))
            })?;

        let mut updated = inventory.clone();
        updated.tags.remove(position);
        self.persist(&updated).await?;
        *inventory = updated;
        Ok(())
    }
}
