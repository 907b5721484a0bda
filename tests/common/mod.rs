//! Common test utilities for all integration tests.
//!
//! Provides a call-counting vault transport and seeding helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use privx_secrets::secrets::{
    ClientConfig, InMemoryVault, PrivxSecretsClient, SecretDocument, SecretPage, SecretRequest,
    VaultTransport,
};
use privx_secrets::{Error, Result};

/// Wraps an [`InMemoryVault`], counting calls and optionally failing them.
#[derive(Debug, Default)]
pub struct CountingTransport {
    pub vault: InMemoryVault,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    /// When set, every call fails with this vault message
    pub failure: Option<String>,
    /// When set, `get_document` fails for this one name
    pub failing_name: Option<String>,
}

impl CountingTransport {
    pub fn new(vault: InMemoryVault) -> Self {
        Self {
            vault,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Fail `get_document` for `name` only.
    pub fn with_failing_name(mut self, name: &str) -> Self {
        self.failing_name = Some(name.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(Error::transport(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VaultTransport for CountingTransport {
    async fn get_document(&self, name: &str) -> Result<SecretDocument> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.failing_name.as_deref() == Some(name) {
            return Err(Error::transport("503 Service Unavailable: vault sealed"));
        }
        self.vault.get_document(name).await
    }

    async fn list_documents(&self, offset: usize, limit: usize) -> Result<SecretPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.vault.list_documents(offset, limit).await
    }

    async fn create_or_replace_document(&self, request: &SecretRequest) -> Result<()> {
        self.check()?;
        self.vault.create_or_replace_document(request).await
    }

    async fn delete_document(&self, name: &str) -> Result<()> {
        self.check()?;
        self.vault.delete_document(name).await
    }
}

/// Seed `count` secrets named `{prefix}-{index:03}`.
pub async fn seed(vault: &InMemoryVault, prefix: &str, count: usize) {
    for index in 0..count {
        let name = format!("{}-{:03}", prefix, index);
        vault.insert(&name, json!({"name": name, "index": index})).await;
    }
}

/// Client over `transport` with fixed default roles.
pub fn client(transport: Arc<CountingTransport>) -> PrivxSecretsClient {
    let config = ClientConfig {
        namespace: "default".to_string(),
        default_read_roles: vec!["role-read".to_string()],
        default_write_roles: vec!["role-write".to_string()],
    };
    PrivxSecretsClient::new(transport, config)
}
