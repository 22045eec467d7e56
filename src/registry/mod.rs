//! Registry client abstraction layer
//!
//! The retention engine never talks to a registry directly. Everything it
//! needs goes through the [RegistryClient] trait, so network clients,
//! offline inventories and test doubles are interchangeable.
//!
//! - [inventory::InventoryRegistry]: a registry snapshot stored as a JSON file
//! - [mock::MockRegistry]: an in-memory client that records calls, for testing

pub mod inventory;
pub mod mock;

pub use inventory::InventoryRegistry;
pub use mock::MockRegistry;

use async_trait::async_trait;

use crate::domain::Tag;
use crate::error::Result;

/// Operations the retention run needs from a registry.
///
/// A client is bound to one repository. Timeouts, retries and pagination are
/// the client's concern; callers issue each call once and await it.
///
/// ## Error Handling
///
/// Implementations report failed logins as
/// [crate::error::RetentionError::Authentication] and every other failure as
/// [crate::error::RetentionError::Registry].
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Authenticate against the registry
    ///
    /// # Returns
    /// * `Ok(())` - Subsequent calls are authorized
    /// * `Err` - If the credentials are rejected
    async fn login(&self, username: &str, password: &str) -> Result<()>;

    /// List every tag in the repository with its timestamps and images
    async fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Delete one tag by name
    ///
    /// Fails if the registry refuses the deletion or the tag does not exist.
    async fn delete_tag(&self, name: &str) -> Result<()>;
}
