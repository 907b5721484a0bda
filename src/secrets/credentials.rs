//! Resolution of credential references held in the store configuration.
//!
//! The store names its OAuth credentials by reference (secret name plus key)
//! rather than embedding them. A [`CredentialResolver`] turns such a
//! reference into the credential value, typically by reading the host's own
//! key-value secrets.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::types::SecretString;
use crate::errors::{Error, Result};

/// Reference to one key of a host secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    /// Name of the host secret
    pub name: String,

    /// Key within the host secret
    pub key: String,

    /// Namespace override; the caller's namespace applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl SecretKeySelector {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            namespace: None,
        }
    }

    /// Namespace the reference resolves in.
    pub fn effective_namespace<'a>(&'a self, default: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(default)
    }
}

/// Look up credential values by reference.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Resolve `selector` within `namespace`.
    ///
    /// # Errors
    ///
    /// - [`Error::CredentialNotFound`] if the secret or key is absent
    async fn resolve(&self, namespace: &str, selector: &SecretKeySelector) -> Result<SecretString>;
}

/// Resolver over a fixed table of `(namespace, name, key)` entries.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialResolver {
    entries: HashMap<(String, String, String), SecretString>,
}

impl StaticCredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a credential value.
    pub fn with_entry(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<SecretString>,
    ) -> Self {
        self.entries
            .insert((namespace.into(), name.into(), key.into()), value.into());
        self
    }
}

#[async_trait]
impl CredentialResolver for StaticCredentialResolver {
    async fn resolve(&self, namespace: &str, selector: &SecretKeySelector) -> Result<SecretString> {
        let namespace = selector.effective_namespace(namespace);
        let entry = (
            namespace.to_string(),
            selector.name.clone(),
            selector.key.clone(),
        );
        self.entries
            .get(&entry)
            .cloned()
            .ok_or_else(|| Error::CredentialNotFound {
                namespace: namespace.to_string(),
                name: selector.name.clone(),
                key: selector.key.clone(),
            })
    }
}
