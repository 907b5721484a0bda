//! # PrivX Secrets
//!
//! Secret-store provider that synchronizes secrets between a Kubernetes-style
//! control plane and the PrivX vault.
//!
//! ## Architecture
//!
//! ```text
//! Control plane → Provider → PrivxSecretsClient → VaultTransport → PrivX REST API
//!                    ↓              ↓
//!          CredentialResolver   navigator / decoding / search
//! ```
//!
//! ## Core Components
//!
//! - **Provider**: Validates store definitions and builds clients
//! - **SecretsClient**: Get, map, search, push, delete, exists and validate
//! - **VaultTransport**: The four vault calls, over HTTP or in memory
//! - **Errors**: One error type plus the "secret not found" classifier
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use privx_secrets::secrets::{RemoteRef, SecretsClient, StaticCredentialResolver};
//! use privx_secrets::{Provider, ProviderSettings, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = ProviderSettings::load(Some("privx.toml"))?;
//!     privx_secrets::observability::init_logging(&settings.logging)?;
//!
//!     let resolver = StaticCredentialResolver::new()
//!         .with_entry("default", "privx-oauth", "id", "client-id")
//!         .with_entry("default", "privx-oauth", "secret", "client-secret");
//!     let client = Provider::new().new_client(&settings.store, &resolver, "default").await?;
//!
//!     client.validate().await?;
//!     let user = client.get_secret(&RemoteRef::new("db").with_property("user")).await?;
//!     println!("{} bytes", user.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod observability;
pub mod provider;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::{ProviderSettings, SecretStoreSpec};
pub use errors::{is_not_found, Error, Result};
pub use provider::{MaintenanceStatus, Provider, StoreCapabilities};
pub use secrets::{PrivxSecretsClient, SecretsClient};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
