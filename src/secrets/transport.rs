//! The vault collaborator: the four calls the provider makes against PrivX.
//!
//! Implementations must be `Send + Sync` so one transport can serve
//! concurrent operations. Errors for absent secrets must carry the vault's
//! own wording so [`crate::errors::is_not_found`] can recognise them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::RoleHandle;
use crate::errors::Result;

/// One secret as PrivX stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretDocument {
    pub name: String,

    /// `None` when the vault returned no payload at all, which is not the
    /// same thing as an empty object.
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl SecretDocument {
    pub fn new(name: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            data: Some(data),
        }
    }
}

/// Listing entry; the listing carries names only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSummary {
    pub name: String,
}

/// One page of the vault's secret listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretPage {
    /// Count as reported by the vault
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub items: Vec<SecretSummary>,
}

/// Create-or-replace request for a whole secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretRequest {
    pub name: String,
    pub read_roles: Vec<RoleHandle>,
    pub write_roles: Vec<RoleHandle>,
    pub data: Map<String, Value>,
}

/// Access to the PrivX vault.
#[async_trait]
pub trait VaultTransport: Send + Sync + std::fmt::Debug {
    /// Fetch one secret by name.
    async fn get_document(&self, name: &str) -> Result<SecretDocument>;

    /// Fetch up to `limit` listing entries starting at `offset`.
    async fn list_documents(&self, offset: usize, limit: usize) -> Result<SecretPage>;

    /// Create the secret, replacing any previous document under that name.
    async fn create_or_replace_document(&self, request: &SecretRequest) -> Result<()>;

    /// Delete one secret by name.
    async fn delete_document(&self, name: &str) -> Result<()>;
}
