//! Secret access operations exposed to the control plane.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Instrument;

use super::decoding::decode;
use super::navigator::{resolve_map, resolve_value};
use super::search::find_all;
use super::transport::{SecretRequest, VaultTransport};
use super::types::{
    pack_roles, FindRef, PushSecretData, PushSecretRemoteRef, RemoteRef, SourceSecret,
};
use crate::errors::{is_not_found, Error, Result};
use crate::vault_span;

/// Name looked up by [`SecretsClient::validate`]. It must never exist in PrivX.
pub const VALIDATION_SENTINEL_KEY: &str = "2F0vZqCe0Z3XU5";

/// Operations the control plane drives against a secret store.
///
/// # Security Considerations
///
/// - Implementations MUST NOT log secret values
/// - "Not found" is absorbed by delete, exists and validate; every other
///   failure propagates unchanged and is never retried here
#[async_trait]
pub trait SecretsClient: Send + Sync {
    /// Fetch one value, optionally projected to a property and decoded.
    ///
    /// # Errors
    ///
    /// - [`Error::PropertyNotFound`] if the property is absent or null
    /// - [`Error::SecretDataMissing`] if the secret has no payload
    /// - [`Error::Decode`] / [`Error::UnsupportedStrategy`] for decoding problems
    async fn get_secret(&self, remote_ref: &RemoteRef) -> Result<Vec<u8>>;

    /// Fetch a key/value map from one secret. No decoding is applied.
    async fn get_secret_map(&self, remote_ref: &RemoteRef) -> Result<BTreeMap<String, Vec<u8>>>;

    /// Search all secrets by name; each value is the whole document as JSON.
    async fn get_all_secrets(&self, find: &FindRef) -> Result<BTreeMap<String, Vec<u8>>>;

    /// Write one key of `source` as a new secret, replacing any existing one.
    async fn push_secret(&self, source: &SourceSecret, data: &PushSecretData) -> Result<()>;

    /// Delete a secret. Deleting an absent secret succeeds.
    async fn delete_secret(&self, remote_ref: &PushSecretRemoteRef) -> Result<()>;

    /// Whether a secret exists at the remote location.
    async fn secret_exists(&self, remote_ref: &PushSecretRemoteRef) -> Result<bool>;

    /// Check that the store is reachable and the credentials are accepted.
    async fn validate(&self) -> Result<()>;

    /// Release resources held by the client.
    async fn close(&self) -> Result<()>;
}

/// Immutable per-client settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Namespace the client acts on behalf of
    pub namespace: String,

    /// Role IDs granted read access on pushed secrets
    pub default_read_roles: Vec<String>,

    /// Role IDs granted write access on pushed secrets
    pub default_write_roles: Vec<String>,
}

/// [`SecretsClient`] backed by a PrivX vault.
///
/// Holds no mutable state beyond what the transport keeps, so one instance
/// can serve concurrent operations.
#[derive(Debug, Clone)]
pub struct PrivxSecretsClient {
    transport: Arc<dyn VaultTransport>,
    config: ClientConfig,
}

impl PrivxSecretsClient {
    pub fn new(transport: Arc<dyn VaultTransport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the single-field document written by a push.
    ///
    /// The value is stored as standard base64 text; read it back with the
    /// `base64` or `auto` decoding strategy. A key missing from the source is
    /// stored as null.
    fn push_request(&self, name: String, source: &SourceSecret, secret_key: &str) -> SecretRequest {
        let value = source
            .data
            .get(secret_key)
            .map_or(Value::Null, |bytes| Value::String(STANDARD.encode(bytes)));

        let mut data = Map::new();
        data.insert(secret_key.to_string(), value);

        SecretRequest {
            name,
            read_roles: pack_roles(&self.config.default_read_roles),
            write_roles: pack_roles(&self.config.default_write_roles),
            data,
        }
    }
}

#[async_trait]
impl SecretsClient for PrivxSecretsClient {
    async fn get_secret(&self, remote_ref: &RemoteRef) -> Result<Vec<u8>> {
        let span = vault_span!("get_secret", remote_ref.key, property = ?remote_ref.selector());
        async {
            let document = self.transport.get_document(&remote_ref.key).await?;
            let value = resolve_value(&remote_ref.key, &document, remote_ref.selector())?;

            // Whole-document JSON is returned as-is
            if remote_ref.selector().is_none() {
                return Ok(value);
            }
            decode(&value, remote_ref.decoding_strategy.as_deref())
        }
        .instrument(span)
        .await
    }

    async fn get_secret_map(&self, remote_ref: &RemoteRef) -> Result<BTreeMap<String, Vec<u8>>> {
        let span = vault_span!("get_secret_map", remote_ref.key, property = ?remote_ref.selector());
        async {
            let document = self.transport.get_document(&remote_ref.key).await?;
            resolve_map(&remote_ref.key, &document, remote_ref.selector())
        }
        .instrument(span)
        .await
    }

    async fn get_all_secrets(&self, find: &FindRef) -> Result<BTreeMap<String, Vec<u8>>> {
        let pattern = find.name.as_ref().map_or("", |name| name.regexp.as_str());
        let span = vault_span!("get_all_secrets", pattern);
        find_all(self.transport.as_ref(), find).instrument(span).await
    }

    async fn push_secret(&self, source: &SourceSecret, data: &PushSecretData) -> Result<()> {
        let name = if data.remote_key.is_empty() {
            &source.name
        } else {
            &data.remote_key
        };
        if name.is_empty() {
            return Err(Error::NoName);
        }

        let request = self.push_request(name.clone(), source, &data.secret_key);
        let span = vault_span!("push_secret", request.name, secret_key = %data.secret_key);

        match self
            .transport
            .create_or_replace_document(&request)
            .instrument(span)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    remote_key = %request.name,
                    read_roles = ?self.config.default_read_roles,
                    write_roles = ?self.config.default_write_roles,
                    "Pushed secret to PrivX"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    remote_key = %request.name,
                    read_roles = ?self.config.default_read_roles,
                    write_roles = ?self.config.default_write_roles,
                    "Failed to push secret to PrivX"
                );
                Err(e)
            }
        }
    }

    async fn delete_secret(&self, remote_ref: &PushSecretRemoteRef) -> Result<()> {
        let span = vault_span!("delete_secret", remote_ref.remote_key);
        match self
            .transport
            .delete_document(&remote_ref.remote_key)
            .instrument(span)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => {
                tracing::debug!(remote_key = %remote_ref.remote_key, "Secret already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn secret_exists(&self, remote_ref: &PushSecretRemoteRef) -> Result<bool> {
        let lookup = RemoteRef::new(remote_ref.remote_key.as_str());
        match self.get_secret(&lookup).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn validate(&self) -> Result<()> {
        let sentinel = RemoteRef::new(VALIDATION_SENTINEL_KEY);
        match self.get_secret(&sentinel).await {
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "PrivX store validation failed");
                Err(e)
            }
            Ok(_) => Err(Error::validation(format!(
                "validation sentinel secret '{}' unexpectedly exists",
                VALIDATION_SENTINEL_KEY
            ))),
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
