//! Request and value types exchanged with the control plane.
//!
//! Field names follow the control plane's camelCase wire form so the
//! references can be deserialized straight from a store's resource spec.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A credential string that never shows up in logs or serialized output.
///
/// Debug and Display print `[REDACTED]`, serialization writes `"[REDACTED]"`,
/// and the buffer is zeroed on drop. Deserialization accepts the real value.
/// Use [`SecretString::expose_secret`] where the raw text is really needed.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap a credential value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the raw credential. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns true if the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecretString)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Reference to a single remote secret, optionally narrowed to one property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRef {
    /// Name of the secret in PrivX
    pub key: String,

    /// Top-level field to project out of the secret's JSON document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,

    /// Decoding tag: `none`, `base64`, `base64url` or `auto`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoding_strategy: Option<String>,
}

impl RemoteRef {
    /// Reference the whole document stored under `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Narrow the reference to one property.
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Set the decoding tag applied to the resolved value.
    pub fn with_decoding_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.decoding_strategy = Some(strategy.into());
        self
    }

    /// The property selector, with an empty string treated as absent.
    pub fn selector(&self) -> Option<&str> {
        self.property.as_deref().filter(|p| !p.is_empty())
    }
}

/// Remote location targeted by push, delete and exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSecretRemoteRef {
    #[serde(default)]
    pub remote_key: String,
}

impl PushSecretRemoteRef {
    pub fn new(remote_key: impl Into<String>) -> Self {
        Self {
            remote_key: remote_key.into(),
        }
    }
}

/// What to push: which key of the source secret, and where it goes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSecretData {
    /// Key within the source secret whose value is pushed
    pub secret_key: String,

    /// Destination name override; the source secret's name is used when empty
    #[serde(default)]
    pub remote_key: String,
}

/// A control-plane secret used as the source of a push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSecret {
    pub name: String,
    pub data: BTreeMap<String, Vec<u8>>,
}

impl SourceSecret {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: BTreeMap::new(),
        }
    }

    /// Add one key/value pair.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// How fetched values should be converted before they reach the control plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionStrategy {
    #[default]
    Default,
    Unicode,
}

/// Name filter for a bulk search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindName {
    /// Regular expression matched (unanchored) against secret names
    pub regexp: String,
}

/// Parameters of a bulk search over every secret in the vault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<FindName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub conversion_strategy: ConversionStrategy,
}

impl FindRef {
    /// Search for names matching `regexp`.
    pub fn by_name(regexp: impl Into<String>) -> Self {
        Self {
            name: Some(FindName {
                regexp: regexp.into(),
            }),
            ..Self::default()
        }
    }
}

/// Access-control handle attached to a secret when it is created.
///
/// PrivX ignores the name on creation, so handles built from role IDs carry
/// an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHandle {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Build role handles from bare role IDs.
pub fn pack_roles(role_ids: &[String]) -> Vec<RoleHandle> {
    role_ids
        .iter()
        .map(|id| RoleHandle {
            id: id.clone(),
            name: String::new(),
        })
        .collect()
}
