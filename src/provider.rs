//! # Provider Registration
//!
//! Entry point the control plane uses to turn a store definition into a
//! working [`PrivxSecretsClient`].

use std::sync::Arc;

use crate::config::{PrivxOAuth, PrivxProvider, SecretStoreProvider, SecretStoreSpec};
use crate::errors::{Error, Result};
use crate::observability::log_store_info;
use crate::secrets::{
    ClientConfig, CredentialResolver, OAuthCredentials, PrivxHttpTransport, PrivxSecretsClient,
    SecretKeySelector,
};

/// Which directions of synchronization a store supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCapabilities {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceStatus {
    Maintained,
    Deprecated,
}

fn no_store_auth(field: &str) -> Error {
    Error::config(format!(
        "no PrivX authorisation from SecretStore definition (missing {})",
        field
    ))
}

fn check_selector(selector: &SecretKeySelector, field: &str) -> Result<()> {
    if selector.name.is_empty() || selector.key.is_empty() {
        return Err(no_store_auth(field));
    }
    Ok(())
}

/// PrivX provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct Provider;

impl Provider {
    pub fn new() -> Self {
        Self
    }

    /// Provider block this provider registers under.
    pub fn spec() -> SecretStoreProvider {
        SecretStoreProvider {
            privx: Some(PrivxProvider::default()),
        }
    }

    pub fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::ReadWrite
    }

    pub fn maintenance_status(&self) -> MaintenanceStatus {
        MaintenanceStatus::Maintained
    }

    /// Check a store definition without contacting PrivX.
    pub fn validate_store(&self, store: &SecretStoreSpec) -> Result<()> {
        let privx = Self::privx(store)?;
        privx.validate()?;
        Self::oauth(privx).map(|_| ())
    }

    /// Build a client for `store`, resolving its OAuth credentials on behalf
    /// of `namespace`.
    ///
    /// Credential references resolve in the selector's own namespace, then
    /// the store's `auth.namespace`, then `namespace`.
    pub async fn new_client(
        &self,
        store: &SecretStoreSpec,
        resolver: &dyn CredentialResolver,
        namespace: &str,
    ) -> Result<PrivxSecretsClient> {
        self.validate_store(store)?;
        let privx = Self::privx(store)?;
        let oauth = Self::oauth(privx)?;

        let auth_namespace = privx
            .auth
            .as_ref()
            .and_then(|auth| auth.namespace.as_deref())
            .unwrap_or(namespace);
        let credentials = OAuthCredentials {
            client_id: resolver
                .resolve(auth_namespace, &oauth.client_id_ref)
                .await?,
            client_secret: resolver
                .resolve(auth_namespace, &oauth.client_secret_ref)
                .await?,
        };

        let transport = PrivxHttpTransport::new(privx.server_url()?, credentials, privx.timeout())?;

        log_store_info(
            &privx.server,
            namespace,
            privx.default_read_roles.len(),
            privx.default_write_roles.len(),
        );

        let config = ClientConfig {
            namespace: namespace.to_string(),
            default_read_roles: privx.default_read_roles.clone(),
            default_write_roles: privx.default_write_roles.clone(),
        };
        Ok(PrivxSecretsClient::new(Arc::new(transport), config))
    }

    fn privx(store: &SecretStoreSpec) -> Result<&PrivxProvider> {
        store
            .provider
            .privx
            .as_ref()
            .ok_or_else(|| no_store_auth("spec.provider.privx"))
    }

    fn oauth(privx: &PrivxProvider) -> Result<&PrivxOAuth> {
        let oauth = privx
            .auth
            .as_ref()
            .and_then(|auth| auth.oauth.as_ref())
            .ok_or_else(|| no_store_auth("spec.provider.privx.auth.oauth"))?;

        check_selector(
            &oauth.client_id_ref,
            "spec.provider.privx.auth.oauth.oAuthClientIdRef",
        )?;
        check_selector(
            &oauth.client_secret_ref,
            "spec.provider.privx.auth.oauth.oAuthClientSecretRef",
        )?;
        Ok(oauth)
    }
}
