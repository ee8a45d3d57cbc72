//! AES mode: OpenSSL/CryptoJS passphrase encryption for large payloads.
//!
//! The payload after `v1a:` is the standard base64 string that
//! `openssl enc -aes-256-cbc -md md5 -a` and CryptoJS
//! `AES.encrypt(text, passphrase)` both produce:
//!
//! ```text
//! base64( "Salted__" | salt:8 | AES-256-CBC-PKCS7(plaintext) )
//! ```
//!
//! Key and IV come from `EVP_BytesToKey(MD5, 1 round)`. There is no
//! integrity tag, so a wrong password shows up as a padding or text
//! decoding failure.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroize;

use super::format::{FieldInfo, FieldUnit, Format};
use super::into_text;
use crate::crypto::cbc::{self, BLOCK_LEN};
use crate::crypto::kdf::{self, OPENSSL_SALT_LEN};
use crate::errors::{CodecError, Result};
use crate::password::Password;

/// OpenSSL's salted-ciphertext marker.
const SALTED_MAGIC: &[u8; 8] = b"Salted__";

const HEADER_LEN: usize = SALTED_MAGIC.len() + OPENSSL_SALT_LEN;

/// Encoder/decoder for AES-mode blobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesCodec;

impl AesCodec {
    pub fn encode(&self, plaintext: &str, password: &Password) -> Result<String> {
        self.encode_with(plaintext, password, &kdf::generate_openssl_salt())
    }

    /// Encode with a caller-chosen 8-byte salt. Deterministic.
    pub fn encode_with(
        &self,
        plaintext: &str,
        password: &Password,
        salt: &[u8; OPENSSL_SALT_LEN],
    ) -> Result<String> {
        let (mut key, mut iv) = kdf::evp_bytes_to_key(password.as_bytes(), salt);
        let encrypted = cbc::encrypt(&key, &iv, plaintext.as_bytes());
        key.zeroize();
        iv.zeroize();
        let ciphertext = encrypted?;

        let mut raw = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        raw.extend_from_slice(SALTED_MAGIC);
        raw.extend_from_slice(salt);
        raw.extend_from_slice(&ciphertext);

        Ok(format!("{}{}", Format::Aes.prefix(), BASE64.encode(raw)))
    }

    pub fn decode(&self, blob: &str, password: &Password) -> Result<String> {
        let raw = decode_payload(Format::Aes.strip(blob)?)?;
        let (salt, ciphertext) = split_salted(&raw)?;

        let (mut key, mut iv) = kdf::evp_bytes_to_key(password.as_bytes(), &salt);
        let decrypted = cbc::decrypt(&key, &iv, ciphertext);
        key.zeroize();
        iv.zeroize();

        into_text(decrypted?)
    }
}

fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(payload)
        .map_err(|e| CodecError::MalformedBlob(format!("AES payload is not valid base64: {e}")))
}

/// Split `Salted__ | salt | ciphertext`, checking the block alignment.
fn split_salted(raw: &[u8]) -> Result<([u8; OPENSSL_SALT_LEN], &[u8])> {
    if raw.len() < HEADER_LEN || &raw[..SALTED_MAGIC.len()] != SALTED_MAGIC {
        return Err(CodecError::MalformedBlob(
            "AES payload is missing the 'Salted__' header".into(),
        ));
    }

    let mut salt = [0u8; OPENSSL_SALT_LEN];
    salt.copy_from_slice(&raw[SALTED_MAGIC.len()..HEADER_LEN]);

    let ciphertext = &raw[HEADER_LEN..];
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CodecError::MalformedBlob(format!(
            "AES ciphertext must be a non-empty multiple of {BLOCK_LEN} bytes, got {}",
            ciphertext.len()
        )));
    }

    Ok((salt, ciphertext))
}

/// Describe the fields of an AES payload without a password.
pub(crate) fn inspect(payload: &str) -> Result<Vec<FieldInfo>> {
    let raw = decode_payload(payload)?;
    let has_header = raw.len() >= HEADER_LEN && &raw[..SALTED_MAGIC.len()] == SALTED_MAGIC;
    let ciphertext_len = raw.len().saturating_sub(HEADER_LEN);

    Ok(vec![
        FieldInfo::new(
            "salt",
            if has_header { OPENSSL_SALT_LEN } else { 0 },
            FieldUnit::Bytes,
            has_header,
        ),
        FieldInfo::new(
            "ciphertext",
            ciphertext_len,
            FieldUnit::Bytes,
            has_header && ciphertext_len > 0 && ciphertext_len % BLOCK_LEN == 0,
        ),
    ])
}
