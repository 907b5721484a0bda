//! In-memory vault for local development and tests.
//!
//! Behaves like PrivX where the provider can observe it: listings come back
//! in name order, creation replaces the whole document, and absent names
//! fail with PrivX's own "Secret not found" wording.
//!
//! # Example
//!
//! ```rust,ignore
//! use privx_secrets::secrets::{InMemoryVault, PrivxSecretsClient, RemoteRef, SecretsClient};
//!
//! let vault = InMemoryVault::new();
//! vault.insert("db", serde_json::json!({"user": "admin"})).await;
//!
//! let client = PrivxSecretsClient::new(std::sync::Arc::new(vault), Default::default());
//! let user = client.get_secret(&RemoteRef::new("db").with_property("user")).await?;
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::transport::{SecretDocument, SecretPage, SecretRequest, SecretSummary, VaultTransport};
use super::types::RoleHandle;
use crate::errors::{Error, Result};

/// A stored secret together with the roles it was created with.
#[derive(Debug, Clone)]
struct StoredSecret {
    document: SecretDocument,
    read_roles: Vec<RoleHandle>,
    write_roles: Vec<RoleHandle>,
}

/// Vault contents held in a sorted map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVault {
    secrets: Arc<RwLock<BTreeMap<String, StoredSecret>>>,
}

fn not_found(name: &str) -> Error {
    Error::transport(format!("404 Not Found: Secret not found: {}", name))
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under `name`. Non-object values are stored without a payload.
    pub async fn insert(&self, name: &str, data: Value) {
        let document = SecretDocument {
            name: name.to_string(),
            data: match data {
                Value::Object(map) => Some(map),
                _ => None,
            },
        };
        self.store(document, Vec::new(), Vec::new()).await;
    }

    /// Store a secret whose payload is absent.
    pub async fn insert_without_data(&self, name: &str) {
        let document = SecretDocument {
            name: name.to_string(),
            data: None,
        };
        self.store(document, Vec::new(), Vec::new()).await;
    }

    async fn store(
        &self,
        document: SecretDocument,
        read_roles: Vec<RoleHandle>,
        write_roles: Vec<RoleHandle>,
    ) {
        let stored = StoredSecret {
            document,
            read_roles,
            write_roles,
        };
        self.secrets
            .write()
            .await
            .insert(stored.document.name.clone(), stored);
    }

    /// Read and write roles a secret was created with.
    pub async fn roles(&self, name: &str) -> Option<(Vec<RoleHandle>, Vec<RoleHandle>)> {
        self.secrets
            .read()
            .await
            .get(name)
            .map(|stored| (stored.read_roles.clone(), stored.write_roles.clone()))
    }

    pub async fn len(&self) -> usize {
        self.secrets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.secrets.read().await.is_empty()
    }
}

#[async_trait]
impl VaultTransport for InMemoryVault {
    async fn get_document(&self, name: &str) -> Result<SecretDocument> {
        self.secrets
            .read()
            .await
            .get(name)
            .map(|stored| stored.document.clone())
            .ok_or_else(|| not_found(name))
    }

    async fn list_documents(&self, offset: usize, limit: usize) -> Result<SecretPage> {
        let secrets = self.secrets.read().await;
        let items: Vec<SecretSummary> = secrets
            .keys()
            .skip(offset)
            .take(limit)
            .map(|name| SecretSummary { name: name.clone() })
            .collect();

        Ok(SecretPage {
            count: secrets.len(),
            items,
        })
    }

    async fn create_or_replace_document(&self, request: &SecretRequest) -> Result<()> {
        let document = SecretDocument::new(request.name.clone(), request.data.clone());
        self.store(document, request.read_roles.clone(), request.write_roles.clone()).await;
        Ok(())
    }

    async fn delete_document(&self, name: &str) -> Result<()> {
        self.secrets
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| not_found(name))
    }
}
