//! PrivX vault access for external secret synchronization.
//!
//! # Architecture
//!
//! The secrets system is built around the [`SecretsClient`] trait, which the
//! control plane drives for every synchronized secret:
//! - **get_secret**: One value, optionally a single property, optionally decoded
//! - **get_secret_map**: A key/value map out of one secret
//! - **get_all_secrets**: Regex search by name across the whole vault
//! - **push_secret** / **delete_secret** / **secret_exists**: Write-back
//! - **validate**: Reachability and credential check
//!
//! [`PrivxSecretsClient`] implements it on top of a [`VaultTransport`]: the
//! REST transport in [`http`] for production and [`InMemoryVault`] for tests
//! and local development.
//!
//! # Example
//!
//! ```rust,ignore
//! use privx_secrets::secrets::{
//!     ClientConfig, OAuthCredentials, PrivxHttpTransport, PrivxSecretsClient, RemoteRef,
//!     SecretsClient,
//! };
//! use std::sync::Arc;
//!
//! let transport = PrivxHttpTransport::new(server_url, credentials, timeout)?;
//! let client = PrivxSecretsClient::new(Arc::new(transport), ClientConfig::default());
//!
//! let remote_ref = RemoteRef::new("db")
//!     .with_property("password")
//!     .with_decoding_strategy("Base64");
//! let password = client.get_secret(&remote_ref).await?;
//! ```
//!
//! # Security Considerations
//!
//! - Secret values are never logged or placed in error messages
//! - Credentials are held in [`SecretString`], zeroed on drop
//! - Pushed values are stored base64-encoded; read them back with `Base64` or `Auto`

pub mod client;
pub mod coerce;
pub mod credentials;
pub mod decoding;
pub mod http;
pub mod memory;
pub mod navigator;
pub mod search;
pub mod transport;
pub mod types;

pub use client::{ClientConfig, PrivxSecretsClient, SecretsClient, VALIDATION_SENTINEL_KEY};
pub use credentials::{CredentialResolver, SecretKeySelector, StaticCredentialResolver};
pub use decoding::DecodingStrategy;
pub use http::{OAuthCredentials, PrivxHttpTransport};
pub use memory::InMemoryVault;
pub use search::PAGE_SIZE;
pub use transport::{SecretDocument, SecretPage, SecretRequest, SecretSummary, VaultTransport};
pub use types::{
    pack_roles, ConversionStrategy, FindName, FindRef, PushSecretData, PushSecretRemoteRef,
    RemoteRef, RoleHandle, SecretString, SourceSecret,
};
