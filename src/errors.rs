use thiserror::Error;

/// All errors that can occur while encoding or decoding a blob.
///
/// None of the messages carry key material, plaintext, or the password.
#[derive(Debug, Error)]
pub enum CodecError {
    // --- Blob errors ---
    #[error("Malformed blob: {0}")]
    MalformedBlob(String),

    #[error("Integrity check failed — blob was tampered with or the password is wrong")]
    IntegrityFailure,

    #[error("Decryption failed — wrong password or corrupted data")]
    DecryptionFailure,

    #[error("Unknown blob format: {0}")]
    UnknownFormat(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for codec results.
pub type Result<T> = std::result::Result<T, CodecError>;
