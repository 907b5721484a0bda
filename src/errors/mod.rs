//! # Error Handling
//!
//! Error types for the PrivX secrets provider, built with `thiserror`.
//!
//! PrivX does not hand back a structured "not found" status through its
//! transport, so absence is not a variant here. It is a classification over
//! the vault's error text, see [`is_not_found`].

/// Custom result type for provider operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PrivX secrets provider
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Failure reported by the vault or the network path to it.
    ///
    /// The message carries the vault's own wording verbatim.
    #[error("PrivX request failed: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The selected property is absent from the document or is null
    #[error("property not found in secret: {key}/{property}")]
    PropertyNotFound { key: String, property: String },

    /// The vault returned a document without any data payload
    #[error("secret data missing: {key}")]
    SecretDataMissing { key: String },

    /// The value could not be decoded with the requested strategy
    #[error("failed to decode value as {strategy}: {source}")]
    Decode {
        strategy: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// The caller asked for a decoding strategy this provider does not know
    #[error("unsupported decoding strategy: {value}")]
    UnsupportedStrategy { value: String },

    /// The name filter is not a valid regular expression
    #[error("invalid regex {pattern:?}: {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A search parameter PrivX cannot honour
    #[error("parameter {parameter:?}: not implemented")]
    NotImplemented { parameter: &'static str },

    /// Neither a remote key nor a source secret name was given for a push
    #[error("no name provided for secret")]
    NoName,

    /// A referenced credential key or field is absent
    #[error("credential key {key:?} missing from {namespace}/{name}")]
    CredentialNotFound {
        namespace: String,
        name: String,
        key: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },
}

impl Error {
    /// Create a transport error from vault-supplied text
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transport error with source
    pub fn transport_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a property-not-found error
    pub fn property_not_found<K: Into<String>, P: Into<String>>(key: K, property: P) -> Self {
        Self::PropertyNotFound {
            key: key.into(),
            property: property.into(),
        }
    }

    /// Create a secret-data-missing error
    pub fn data_missing<K: Into<String>>(key: K) -> Self {
        Self::SecretDataMissing { key: key.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error means the caller got the request wrong.
    ///
    /// These are never worth retrying.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. }
                | Self::UnsupportedStrategy { .. }
                | Self::InvalidFilter { .. }
                | Self::NotImplemented { .. }
                | Self::NoName
        )
    }
}

/// Phrase PrivX uses when a named secret does not exist.
const NOT_FOUND_PHRASE: &str = "secret not found";

/// Whether `err` means "the secret does not exist".
///
/// PrivX loses the HTTP status on its error path, so the only signal is the
/// message text: a [`Error::Transport`] message that, lowercased, contains
/// `"secret not found"`. Errors this crate raises itself never match. This
/// is the only place vault wording is interpreted; if PrivX rewords its
/// errors, change it here.
pub fn is_not_found(err: &Error) -> bool {
    match err {
        Error::Transport { message, .. } => message.to_lowercase().contains(NOT_FOUND_PHRASE),
        _ => false,
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            source: error,
            context: "JSON serialization failed".to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::transport_with_source(error.to_string(), Box::new(error))
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}
