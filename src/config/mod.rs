//! # Configuration Management
//!
//! Store configuration for the PrivX provider and the settings used to run
//! it. Settings load from an optional file and `PRIVX__`-prefixed
//! environment variables through the `config` crate, then are checked with
//! `validator` plus a few rules it cannot express.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

use crate::errors::{Error, Result};
use crate::secrets::credentials::SecretKeySelector;

fn default_timeout_seconds() -> u64 {
    30
}

/// OAuth client credentials, by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivxOAuth {
    #[serde(rename = "oAuthClientIdRef", alias = "client_id_ref")]
    pub client_id_ref: SecretKeySelector,
    #[serde(rename = "oAuthClientSecretRef", alias = "client_secret_ref")]
    pub client_secret_ref: SecretKeySelector,
}

/// How the provider authenticates with PrivX.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivxAuth {
    /// Namespace the credential references resolve in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<PrivxOAuth>,
}

/// PrivX store definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrivxProvider {
    /// Server address, e.g. `https://privx.example.com`
    #[validate(length(min = 1, message = "Server address cannot be empty"))]
    pub server: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<PrivxAuth>,

    /// Role IDs granted read access on secrets this store creates
    #[serde(default, alias = "default_read_roles")]
    pub default_read_roles: Vec<String>,

    /// Role IDs granted write access on secrets this store creates
    #[serde(default, alias = "default_write_roles")]
    pub default_write_roles: Vec<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds", alias = "timeout_seconds")]
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

impl Default for PrivxProvider {
    fn default() -> Self {
        Self {
            server: String::new(),
            auth: None,
            default_read_roles: Vec::new(),
            default_write_roles: Vec::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl PrivxProvider {
    /// Check field constraints and that `server` is an http(s) URL.
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.server_url().map(|_| ())
    }

    /// Parsed server address.
    pub fn server_url(&self) -> Result<Url> {
        let url = Url::parse(&self.server).map_err(|e| {
            Error::validation_field(
                format!("Invalid server address '{}': {}", self.server, e),
                "server",
            )
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::validation_field(
                format!("Server address must use http or https, got '{}'", scheme),
                "server",
            )),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Provider block of a store spec; only PrivX is understood here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretStoreProvider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privx: Option<PrivxProvider>,
}

/// Store spec as the control plane hands it over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretStoreSpec {
    #[serde(default)]
    pub provider: SecretStoreProvider,
}

impl SecretStoreSpec {
    pub fn privx(provider: PrivxProvider) -> Self {
        Self {
            provider: SecretStoreProvider {
                privx: Some(provider),
            },
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error or a full EnvFilter string)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Everything needed to stand up a provider instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProviderSettings {
    /// Namespace the provider acts on behalf of
    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub store: SecretStoreSpec,
}

impl ProviderSettings {
    /// Load settings from `path` (if given and present) overlaid with
    /// `PRIVX__SECTION__FIELD` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("PRIVX")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("store.provider.privx.default_read_roles")
                .with_list_parse_key("store.provider.privx.default_write_roles")
                .try_parsing(true),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the logging block and, when present, the PrivX store.
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        if let Some(privx) = &self.store.provider.privx {
            privx.validate()?;
        }
        Ok(())
    }
}
