use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::{BulkFormat, CodecOptions, DEFAULT_MATRIX_THRESHOLD_BYTES};
use crate::crypto::kdf::{Argon2Params, DEFAULT_PBKDF2_ITERATIONS, MIN_PBKDF2_ITERATIONS};
use crate::errors::{CodecError, Result};

/// Codec configuration, loaded from `.finvault.toml`.
///
/// Every field has a default matching the historical blob formats, so
/// finvault works out-of-the-box without any config file at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Plaintexts below this many UTF-8 bytes use Matrix mode (default: 512 KiB).
    #[serde(default = "default_matrix_threshold_bytes")]
    pub matrix_threshold_bytes: usize,

    /// PBKDF2 iteration count for Matrix mode (default: 1000).
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Format for large payloads: "aes" (default) or "sealed".
    #[serde(default)]
    pub bulk_format: BulkFormat,

    /// Argon2 memory cost in KiB for the sealed format (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Allow decoding deprecated `v0m:` blobs (default: false).
    #[serde(default)]
    pub legacy_decode: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_matrix_threshold_bytes() -> usize {
    DEFAULT_MATRIX_THRESHOLD_BYTES
}

fn default_pbkdf2_iterations() -> u32 {
    DEFAULT_PBKDF2_ITERATIONS
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            matrix_threshold_bytes: default_matrix_threshold_bytes(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            bulk_format: BulkFormat::default(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            legacy_decode: false,
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    pub const FILE_NAME: &'static str = ".finvault.toml";

    /// Load settings from `<dir>/.finvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed or holds unusable values,
    /// an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CodecError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values no codec can work with.
    pub fn validate(&self) -> Result<()> {
        if self.matrix_threshold_bytes == 0 {
            return Err(CodecError::ConfigError(
                "matrix_threshold_bytes must be greater than 0".into(),
            ));
        }
        if self.pbkdf2_iterations < MIN_PBKDF2_ITERATIONS {
            return Err(CodecError::ConfigError(format!(
                "pbkdf2_iterations must be at least {MIN_PBKDF2_ITERATIONS} (got {})",
                self.pbkdf2_iterations
            )));
        }
        Ok(())
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Convert into the codec layer's options.
    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            matrix_threshold_bytes: self.matrix_threshold_bytes,
            pbkdf2_iterations: self.pbkdf2_iterations,
            bulk_format: self.bulk_format,
            argon2: self.argon2_params(),
            legacy_decode: self.legacy_decode,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
