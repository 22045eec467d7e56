use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::Tag;
use crate::error::{RetentionError, Result};
use crate::registry::RegistryClient;

/// A call received by [MockRegistry]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    Login { username: String },
    ListTags,
    DeleteTag { name: String },
}

/// Mock registry for testing without a real registry
pub struct MockRegistry {
    tags: Vec<Tag>,
    credentials: Option<(String, String)>,
    failing_deletes: HashSet<String>,
    fail_listing: bool,
    calls: Mutex<Vec<RegistryCall>>,
}

impl MockRegistry {
    /// Create a mock registry serving `tags`
    pub fn new(tags: Vec<Tag>) -> Self {
        MockRegistry {
            tags,
            credentials: None,
            failing_deletes: HashSet::new(),
            fail_listing: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Only accept these credentials on login
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Make deleting `name` fail
    pub fn fail_delete(mut self, name: impl Into<String>) -> Self {
        self.failing_deletes.insert(name.into());
        self
    }

    /// Make listing tags fail
    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Every call received so far, in order
    pub async fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().await.clone()
    }

    /// Names passed to `delete_tag` so far, in order
    pub async fn deleted(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                RegistryCall::DeleteTag { name } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn login(&self, username: &str, password: &str) -> Result<()> {
        self.calls.lock().await.push(RegistryCall::Login {
            username: username.to_string(),
        });

        match &self.credentials {
            Some((user, pass)) if user != username || pass != password => Err(
                RetentionError::authentication(format!("invalid credentials for '{}'", username)),
            ),
            _ => Ok(()),
        }
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.calls.lock().await.push(RegistryCall::ListTags);

        if self.fail_listing {
            return Err(RetentionError::registry("listing tags failed"));
        }
        Ok(self.tags.clone())
    }

    async fn delete_tag(&self, name: &str) -> Result<()> {
        self.calls.lock().await.push(RegistryCall::DeleteTag {
            name: name.to_string(),
        });

        if self.failing_deletes.contains(name) {
            return Err(RetentionError::registry(format!("cannot delete tag '{}'", name)));
        }
        Ok(())
    }
}
