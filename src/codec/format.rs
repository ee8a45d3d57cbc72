//! Blob format identifiers and version prefixes.
//!
//! Every blob starts with a fixed literal prefix naming the algorithm that
//! produced it:
//!
//! ```text
//! v1m:<salt_hex>.<hmac_hex>.<iv_hex><ciphertext_hex>   Matrix (PBKDF2 + AES-CBC + HMAC)
//! v1a:<base64 "Salted__" salt ciphertext>              AES (OpenSSL/CryptoJS passphrase)
//! v2s:<base64 salt nonce ciphertext+tag>               Sealed (Argon2id + AES-GCM)
//! v0m:<float>,<float>,...                              Legacy matrix (decode only)
//! ```
//!
//! A prefix is never reused for another layout, and no prefix is a prefix
//! of another, so detection is a plain `starts_with` over a closed set.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CodecError, Result};

/// The closed set of blob formats this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Small payloads: PBKDF2 key split, AES-256-CBC, HMAC-SHA256.
    Matrix,
    /// Large payloads: OpenSSL-compatible passphrase encryption.
    Aes,
    /// Opt-in large payload format: Argon2id + AES-256-GCM.
    Sealed,
    /// Deprecated floating-point matrix cipher. Never encoded.
    LegacyMatrix,
}

impl Format {
    /// Every known format, in detection order.
    pub const ALL: [Format; 4] = [
        Format::Matrix,
        Format::Aes,
        Format::Sealed,
        Format::LegacyMatrix,
    ];

    /// The literal version prefix for this format.
    pub const fn prefix(self) -> &'static str {
        match self {
            Format::Matrix => "v1m:",
            Format::Aes => "v1a:",
            Format::Sealed => "v2s:",
            Format::LegacyMatrix => "v0m:",
        }
    }

    /// Short human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Format::Matrix => "matrix",
            Format::Aes => "aes",
            Format::Sealed => "sealed",
            Format::LegacyMatrix => "legacy-matrix",
        }
    }

    pub const fn is_decode_only(self) -> bool {
        matches!(self, Format::LegacyMatrix)
    }

    /// Identify a blob's format by exact prefix match.
    ///
    /// Runs before any cryptographic work, so an unrecognized blob costs
    /// nothing but a few string comparisons.
    pub fn detect(blob: &str) -> Result<Format> {
        Format::ALL
            .into_iter()
            .find(|format| blob.starts_with(format.prefix()))
            .ok_or_else(|| {
                CodecError::UnknownFormat(format!(
                    "unrecognized prefix '{}'",
                    leading_tag(blob)
                ))
            })
    }

    /// Return the payload after this format's prefix.
    pub fn strip(self, blob: &str) -> Result<&str> {
        blob.strip_prefix(self.prefix()).ok_or_else(|| {
            CodecError::MalformedBlob(format!("expected '{}' prefix", self.prefix()))
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The format used for payloads at or above the size threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkFormat {
    #[default]
    Aes,
    Sealed,
}

impl From<BulkFormat> for Format {
    fn from(value: BulkFormat) -> Self {
        match value {
            BulkFormat::Aes => Format::Aes,
            BulkFormat::Sealed => Format::Sealed,
        }
    }
}

/// The leading tag of an unrecognized blob, safe to show in diagnostics.
///
/// At most eight characters up to and including the first `:`, with
/// anything other than ASCII alphanumerics replaced by `?`.
fn leading_tag(blob: &str) -> String {
    blob.chars()
        .take(8)
        .scan(false, |done, c| {
            if *done {
                return None;
            }
            *done = c == ':';
            Some(c)
        })
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == ':' {
                c
            } else {
                '?'
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Structural inspection
// ---------------------------------------------------------------------------

/// Unit of a field's reported length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUnit {
    HexChars,
    Bytes,
    Values,
}

impl fmt::Display for FieldUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldUnit::HexChars => "hex chars",
            FieldUnit::Bytes => "bytes",
            FieldUnit::Values => "values",
        })
    }
}

/// One structural field of a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub len: usize,
    pub unit: FieldUnit,
    /// Whether the field satisfies its length and encoding invariant.
    pub valid: bool,
}

impl FieldInfo {
    pub(crate) fn new(name: &'static str, len: usize, unit: FieldUnit, valid: bool) -> Self {
        Self {
            name,
            len,
            unit,
            valid,
        }
    }
}

/// Password-free description of a blob's layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    pub format: Format,
    pub total_len: usize,
    pub fields: Vec<FieldInfo>,
}

impl BlobInfo {
    /// True when every field satisfies its invariant.
    pub fn is_well_formed(&self) -> bool {
        self.fields.iter().all(|f| f.valid)
    }
}
