//! The encrypted blob codec.
//!
//! `Codec` is the single entry point callers use:
//! - `encode` picks a format by payload size and produces a prefixed blob.
//! - `decode` reads the prefix, dispatches to exactly one format decoder,
//!   and returns the plaintext or a typed `CodecError`.
//!
//! The per-format codecs live in submodules (`matrix`, `aes`, `sealed`,
//! `legacy`). Prefix handling and the `Format` enum live in `format`.

pub mod aes;
pub mod format;
pub mod legacy;
pub mod matrix;
pub mod sealed;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::crypto::kdf::{Argon2Params, DEFAULT_PBKDF2_ITERATIONS, MIN_PBKDF2_ITERATIONS};
use crate::errors::{CodecError, Result};
use crate::password::Password;

pub use aes::AesCodec;
pub use format::{BlobInfo, BulkFormat, FieldInfo, FieldUnit, Format};
pub use legacy::LegacyMatrixCodec;
pub use matrix::MatrixCodec;
pub use sealed::SealedCodec;

/// Default size threshold between Matrix and bulk encoding (512 KiB).
pub const DEFAULT_MATRIX_THRESHOLD_BYTES: usize = 512 * 1024;

/// Tunables for a `Codec`.
///
/// Only `matrix_threshold_bytes` and `bulk_format` affect which format is
/// chosen. The KDF parameters must match between encode and decode, since
/// blobs do not record them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Plaintexts strictly smaller than this (in UTF-8 bytes) use Matrix mode.
    pub matrix_threshold_bytes: usize,
    /// PBKDF2 iteration count for Matrix mode.
    pub pbkdf2_iterations: u32,
    /// Format used at or above the threshold.
    pub bulk_format: BulkFormat,
    /// Argon2id parameters for the sealed format.
    pub argon2: Argon2Params,
    /// Whether `v0m:` blobs may be decoded.
    pub legacy_decode: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            matrix_threshold_bytes: DEFAULT_MATRIX_THRESHOLD_BYTES,
            pbkdf2_iterations: DEFAULT_PBKDF2_ITERATIONS,
            bulk_format: BulkFormat::default(),
            argon2: Argon2Params::default(),
            legacy_decode: false,
        }
    }
}

/// Format dispatcher over all supported blob formats.
///
/// Immutable after construction and safe to share across threads. Key
/// material only ever exists inside a single `encode`/`decode` call.
#[derive(Debug, Clone)]
pub struct Codec {
    options: CodecOptions,
    matrix: MatrixCodec,
    aes: AesCodec,
    sealed: SealedCodec,
    legacy: LegacyMatrixCodec,
}

impl Default for Codec {
    fn default() -> Self {
        Self::build(CodecOptions::default())
    }
}

impl Codec {
    /// Build a codec, rejecting options that could never work.
    pub fn new(options: CodecOptions) -> Result<Self> {
        if options.matrix_threshold_bytes == 0 {
            return Err(CodecError::ConfigError(
                "matrix_threshold_bytes must be greater than 0".into(),
            ));
        }
        if options.pbkdf2_iterations < MIN_PBKDF2_ITERATIONS {
            return Err(CodecError::ConfigError(format!(
                "pbkdf2_iterations must be at least {MIN_PBKDF2_ITERATIONS} (got {})",
                options.pbkdf2_iterations
            )));
        }
        Ok(Self::build(options))
    }

    fn build(options: CodecOptions) -> Self {
        Self {
            options,
            matrix: MatrixCodec::new(options.pbkdf2_iterations),
            aes: AesCodec,
            sealed: SealedCodec::new(options.argon2),
            legacy: LegacyMatrixCodec,
        }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Choose the encoding format from the plaintext's UTF-8 byte length.
    pub fn select_algorithm(&self, plaintext: &str) -> Format {
        if plaintext.len() < self.options.matrix_threshold_bytes {
            Format::Matrix
        } else {
            self.options.bulk_format.into()
        }
    }

    /// Encode `plaintext` in the format `select_algorithm` picks.
    pub fn encode(&self, plaintext: &str, password: &Password) -> Result<String> {
        self.encode_as(self.select_algorithm(plaintext), plaintext, password)
    }

    /// Encode `plaintext` in an explicitly chosen format.
    ///
    /// Empty plaintexts are refused: an empty decode result is treated as
    /// a failed decryption, so such a blob could never be read back.
    pub fn encode_as(&self, format: Format, plaintext: &str, password: &Password) -> Result<String> {
        if plaintext.is_empty() {
            return Err(CodecError::EncryptionFailed(
                "refusing to encode an empty plaintext".into(),
            ));
        }

        debug!(format = %format, bytes = plaintext.len(), "encoding plaintext");

        match format {
            Format::Matrix => self.matrix.encode(plaintext, password),
            Format::Aes => self.aes.encode(plaintext, password),
            Format::Sealed => self.sealed.encode(plaintext, password),
            Format::LegacyMatrix => Err(CodecError::EncryptionFailed(
                "the legacy matrix format is decode-only".into(),
            )),
        }
    }

    /// Decode a blob produced by any supported format.
    pub fn decode(&self, blob: &str, password: &Password) -> Result<String> {
        let format = Format::detect(blob)?;
        debug!(format = %format, bytes = blob.len(), "decoding blob");

        let result = match format {
            Format::Matrix => self.matrix.decode(blob, password),
            Format::Aes => self.aes.decode(blob, password),
            Format::Sealed => self.sealed.decode(blob, password),
            Format::LegacyMatrix if self.options.legacy_decode => {
                self.legacy.decode(blob, password)
            }
            Format::LegacyMatrix => Err(CodecError::UnknownFormat(format!(
                "legacy matrix blobs ('{}') are not enabled; set legacy_decode = true to read them",
                format.prefix()
            ))),
        };

        if let Err(e) = &result {
            debug!(format = %format, error = %e, "decode failed");
        }
        result
    }

    /// Serialize `record` to JSON and encode it.
    pub fn encode_record<T: Serialize>(&self, record: &T, password: &Password) -> Result<String> {
        let json = serde_json::to_string(record)
            .map_err(|e| CodecError::SerializationError(format!("record: {e}")))?;
        self.encode(&json, password)
    }

    /// Decode a blob and deserialize its JSON plaintext.
    ///
    /// Parse errors report only a position, never the offending text.
    pub fn decode_record<T: DeserializeOwned>(&self, blob: &str, password: &Password) -> Result<T> {
        let json = self.decode(blob, password)?;
        serde_json::from_str(&json).map_err(|e| {
            CodecError::SerializationError(format!(
                "plaintext is not a valid record (line {}, column {})",
                e.line(),
                e.column()
            ))
        })
    }
}

/// Describe a blob's structure without a password.
///
/// Performs no cryptographic work.
pub fn inspect(blob: &str) -> Result<BlobInfo> {
    let format = Format::detect(blob)?;
    let payload = format.strip(blob)?;

    let fields = match format {
        Format::Matrix => matrix::inspect(payload)?,
        Format::Aes => aes::inspect(payload)?,
        Format::Sealed => sealed::inspect(payload)?,
        Format::LegacyMatrix => legacy::inspect(payload)?,
    };

    Ok(BlobInfo {
        format,
        total_len: blob.len(),
        fields,
    })
}

/// Turn decrypted bytes into text, treating empty output as a failure.
pub(crate) fn into_text(bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes).map_err(|_| CodecError::DecryptionFailure)?;
    if text.is_empty() {
        return Err(CodecError::DecryptionFailure);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_text_rejects_empty_and_invalid_utf8() {
        assert!(matches!(
            into_text(Vec::new()),
            Err(CodecError::DecryptionFailure)
        ));
        assert!(matches!(
            into_text(vec![0xff, 0xfe]),
            Err(CodecError::DecryptionFailure)
        ));
        assert_eq!(into_text(b"ok".to_vec()).unwrap(), "ok");
    }

    #[test]
    fn new_validates_options() {
        let zero_threshold = CodecOptions {
            matrix_threshold_bytes: 0,
            ..CodecOptions::default()
        };
        assert!(matches!(
            Codec::new(zero_threshold),
            Err(CodecError::ConfigError(_))
        ));

        let weak_kdf = CodecOptions {
            pbkdf2_iterations: 10,
            ..CodecOptions::default()
        };
        assert!(matches!(Codec::new(weak_kdf), Err(CodecError::ConfigError(_))));
    }

    #[test]
    fn selection_uses_configured_bulk_format() {
        let codec = Codec::new(CodecOptions {
            matrix_threshold_bytes: 4,
            bulk_format: BulkFormat::Sealed,
            ..CodecOptions::default()
        })
        .unwrap();
        assert_eq!(codec.select_algorithm("abc"), Format::Matrix);
        assert_eq!(codec.select_algorithm("abcd"), Format::Sealed);
    }

    #[test]
    fn threshold_counts_utf8_bytes_not_chars() {
        let codec = Codec::new(CodecOptions {
            matrix_threshold_bytes: 4,
            ..CodecOptions::default()
        })
        .unwrap();
        // Two chars, six bytes.
        assert_eq!(codec.select_algorithm("€€"), Format::Aes);
    }

    #[test]
    fn codec_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Codec>();
    }

    #[test]
    fn legacy_decode_logs_one_warning() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        let codec = Codec::new(CodecOptions {
            legacy_decode: true,
            ..CodecOptions::default()
        })
        .unwrap();
        let blob = "v0m:13657,30270,23596,27915,25839,31984,12572,10846,11677,13816,25553,17511";
        let plaintext = tracing::subscriber::with_default(subscriber, || {
            codec.decode(blob, &Password::new("correct horse"))
        })
        .unwrap();
        assert_eq!(plaintext, r#"{"cash":100}"#);

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert_eq!(logs.matches("WARN").count(), 1, "{logs}");
    }
}
