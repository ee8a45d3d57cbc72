//! Sealed mode: Argon2id + AES-256-GCM.
//!
//! ```text
//! v2s:base64( salt:16 | nonce:12 | ciphertext | tag:16 )
//! ```
//!
//! The `v2s:` prefix is bound into the GCM tag as associated data, so a
//! payload cannot be replayed under a different prefix. The Argon2id
//! parameters are not stored in the blob. Decoding uses the configured
//! parameters, so they must match those used to encode.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;

use super::format::{FieldInfo, FieldUnit, Format};
use super::into_text;
use crate::crypto::kdf::{self, Argon2Params, SALT_LEN};
use crate::crypto::keys::SealedKey;
use crate::errors::{CodecError, Result};
use crate::password::Password;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const MIN_RAW_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Encoder/decoder for sealed blobs.
#[derive(Debug, Clone, Copy)]
pub struct SealedCodec {
    params: Argon2Params,
}

impl SealedCodec {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    pub fn encode(&self, plaintext: &str, password: &Password) -> Result<String> {
        let salt = kdf::generate_salt();
        let key = kdf::derive_sealed_key(password.as_bytes(), &salt, &self.params)?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);
        let ciphertext = seal(&key, &nonce, plaintext.as_bytes())?;

        let mut raw = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
        raw.extend_from_slice(&salt);
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);

        Ok(format!("{}{}", Format::Sealed.prefix(), BASE64.encode(raw)))
    }

    pub fn decode(&self, blob: &str, password: &Password) -> Result<String> {
        let raw = decode_payload(Format::Sealed.strip(blob)?)?;
        if raw.len() < MIN_RAW_LEN {
            return Err(CodecError::MalformedBlob(format!(
                "sealed payload must be at least {MIN_RAW_LEN} bytes, got {}",
                raw.len()
            )));
        }

        let (salt, rest) = raw.split_at(SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        let key = kdf::derive_sealed_key(password.as_bytes(), salt, &self.params)?;
        into_text(open(&key, nonce, ciphertext)?)
    }
}

fn cipher(key: &SealedKey) -> Aes256Gcm {
    Aes256Gcm::new(key.as_bytes().into())
}

/// AES-256-GCM encrypt with the format prefix as associated data.
fn seal(key: &SealedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let payload = Payload {
        msg: plaintext,
        aad: Format::Sealed.prefix().as_bytes(),
    };
    cipher(key)
        .encrypt(Nonce::from_slice(nonce), payload)
        .map_err(|e| CodecError::EncryptionFailed(format!("AES-GCM: {e}")))
}

/// Any authentication failure, wrong key or altered byte included, is a
/// `DecryptionFailure`.
fn open(key: &SealedKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let payload = Payload {
        msg: ciphertext,
        aad: Format::Sealed.prefix().as_bytes(),
    };
    cipher(key)
        .decrypt(Nonce::from_slice(nonce), payload)
        .map_err(|_| CodecError::DecryptionFailure)
}

fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(payload)
        .map_err(|e| CodecError::MalformedBlob(format!("sealed payload is not valid base64: {e}")))
}

/// Describe the fields of a sealed payload without a password.
pub(crate) fn inspect(payload: &str) -> Result<Vec<FieldInfo>> {
    let raw = decode_payload(payload)?;
    let complete = raw.len() >= MIN_RAW_LEN;
    let body_len = raw.len().saturating_sub(SALT_LEN + NONCE_LEN);

    Ok(vec![
        FieldInfo::new("salt", raw.len().min(SALT_LEN), FieldUnit::Bytes, complete),
        FieldInfo::new(
            "nonce",
            raw.len().saturating_sub(SALT_LEN).min(NONCE_LEN),
            FieldUnit::Bytes,
            complete,
        ),
        FieldInfo::new("ciphertext+tag", body_len, FieldUnit::Bytes, complete),
    ])
}
