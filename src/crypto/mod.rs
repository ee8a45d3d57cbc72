//! Cryptographic primitives for finvault.
//!
//! This module provides:
//! - Password-based key derivation: PBKDF2, `EVP_BytesToKey`, Argon2id (`kdf`)
//! - Zeroizing key types and the 64-byte key split (`keys`)
//! - AES-256-CBC with PKCS#7 padding (`cbc`)
//! - HMAC-SHA256 tagging with constant-time verification (`mac`)

pub mod cbc;
pub mod kdf;
pub mod keys;
pub mod mac;

pub use kdf::{derive_matrix_keys, derive_sealed_key, generate_iv, generate_salt, Argon2Params};
pub use keys::{DataKey, MacKey, MatrixKeys};
