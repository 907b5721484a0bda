//! Byte-level decoding applied to resolved scalar values.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

/// Decoding applied to a value before it is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodingStrategy {
    #[default]
    None,
    /// Standard alphabet, padded
    Base64,
    /// URL-safe alphabet, padded
    Base64Url,
    /// Standard, then URL-safe, then the value unchanged
    Auto,
}

impl DecodingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Base64 => "Base64",
            Self::Base64Url => "Base64URL",
            Self::Auto => "Auto",
        }
    }

    /// Parse an optional caller tag; a missing tag means [`DecodingStrategy::None`].
    pub fn from_tag(tag: Option<&str>) -> Result<Self> {
        tag.map_or(Ok(Self::None), str::parse)
    }

    /// Apply the strategy to `value`.
    pub fn decode(&self, value: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::None => Ok(value.to_vec()),
            Self::Base64 => STANDARD
                .decode(value)
                .map_err(|source| Error::Decode {
                    strategy: self.as_str(),
                    source,
                }),
            Self::Base64Url => URL_SAFE
                .decode(value)
                .map_err(|source| Error::Decode {
                    strategy: self.as_str(),
                    source,
                }),
            Self::Auto => Ok(Self::Base64
                .decode(value)
                .or_else(|_| Self::Base64Url.decode(value))
                .unwrap_or_else(|_| value.to_vec())),
        }
    }
}

impl FromStr for DecodingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            "auto" => Ok(Self::Auto),
            _ => Err(Error::UnsupportedStrategy {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DecodingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decode `value` according to the caller's strategy tag.
pub fn decode(value: &[u8], tag: Option<&str>) -> Result<Vec<u8>> {
    DecodingStrategy::from_tag(tag)?.decode(value)
}
