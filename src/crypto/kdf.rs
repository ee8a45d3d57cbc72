//! Password-based key derivation.
//!
//! Three derivations live here, one per blob format:
//! - PBKDF2-HMAC-SHA256 stretched to 64 bytes and split into a data key
//!   and a MAC key (Matrix mode).
//! - OpenSSL `EVP_BytesToKey` with MD5 and one round (AES mode, for
//!   compatibility with CryptoJS passphrase ciphertexts).
//! - Argon2id (sealed mode).

use argon2::{Algorithm, Argon2, Params, Version};
use md5::{Digest, Md5};
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use super::keys::{MatrixKeys, SealedKey, KEY_LEN, MASTER_KEY_LEN};
use crate::errors::{CodecError, Result};

/// Length of the Matrix salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the AES-CBC initialization vector in bytes.
pub const IV_LEN: usize = 16;

/// Lowest accepted PBKDF2 iteration count.
pub const MIN_PBKDF2_ITERATIONS: u32 = 1_000;

/// Default PBKDF2 iteration count. Matrix blobs do not record their
/// iteration count, so this must match whatever encoded the blob.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 1_000;

/// Derive the Matrix data key and MAC key from a password and a hex salt.
///
/// The same password, salt and iteration count always produce the same
/// pair of keys. An empty password is accepted.
pub fn derive_matrix_keys(password: &[u8], salt_hex: &str, iterations: u32) -> Result<MatrixKeys> {
    if iterations < MIN_PBKDF2_ITERATIONS {
        return Err(CodecError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be at least {MIN_PBKDF2_ITERATIONS} (got {iterations})"
        )));
    }

    let salt = decode_salt(salt_hex)?;

    let mut master = [0u8; MASTER_KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, &salt, iterations, &mut master);

    let keys = MatrixKeys::split(&master);
    master.zeroize();
    Ok(keys)
}

fn decode_salt(salt_hex: &str) -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    hex::decode_to_slice(salt_hex, &mut salt).map_err(|e| {
        CodecError::MalformedBlob(format!(
            "salt must be {} hex characters: {e}",
            SALT_LEN * 2
        ))
    })?;
    Ok(salt)
}

/// Length of the OpenSSL passphrase salt in bytes.
pub const OPENSSL_SALT_LEN: usize = 8;

/// OpenSSL `EVP_BytesToKey(MD5, count = 1)` producing a 32-byte key and
/// a 16-byte IV.
///
/// `D_1 = MD5(password || salt)`, `D_i = MD5(D_{i-1} || password || salt)`,
/// concatenated until 48 bytes are available.
pub fn evp_bytes_to_key(
    password: &[u8],
    salt: &[u8; OPENSSL_SALT_LEN],
) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
    let mut material = [0u8; KEY_LEN + IV_LEN];
    let mut filled = 0;
    let mut previous: Option<[u8; 16]> = None;

    while filled < material.len() {
        let mut hasher = Md5::new();
        if let Some(prev) = previous.as_ref() {
            hasher.update(prev);
        }
        hasher.update(password);
        hasher.update(salt);
        let block: [u8; 16] = hasher.finalize().into();

        let take = (material.len() - filled).min(block.len());
        material[filled..filled + take].copy_from_slice(&block[..take]);
        filled += take;

        if let Some(mut prev) = previous.replace(block) {
            prev.zeroize();
        }
    }
    if let Some(mut prev) = previous {
        prev.zeroize();
    }

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&material[..KEY_LEN]);
    iv.copy_from_slice(&material[KEY_LEN..]);
    material.zeroize();
    (key, iv)
}

/// Configurable Argon2id parameters for the sealed format.
///
/// These map 1:1 to the fields in `Settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Derive the 32-byte sealed-format key with Argon2id.
///
/// Enforces minimum parameters so a config typo cannot silently produce
/// a weak key.
pub fn derive_sealed_key(
    password: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
) -> Result<SealedKey> {
    if argon2_params.memory_kib < MIN_MEMORY_KIB {
        return Err(CodecError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            argon2_params.memory_kib
        )));
    }
    if argon2_params.iterations < 1 {
        return Err(CodecError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if argon2_params.parallelism < 1 {
        return Err(CodecError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CodecError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| CodecError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    let sealed = SealedKey::new(key);
    key.zeroize();
    Ok(sealed)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Generate a cryptographically random 16-byte CBC initialization vector.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);
    iv
}

/// Generate the 8-byte salt used by the OpenSSL passphrase format.
pub fn generate_openssl_salt() -> [u8; OPENSSL_SALT_LEN] {
    let mut salt = [0u8; OPENSSL_SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: &str = "00112233445566778899aabbccddeeff";

    #[test]
    fn matrix_keys_are_deterministic() {
        let a = derive_matrix_keys(b"correct horse", SALT, 1_000).unwrap();
        let b = derive_matrix_keys(b"correct horse", SALT, 1_000).unwrap();
        assert_eq!(a.data_key.as_bytes(), b.data_key.as_bytes());
        assert_eq!(a.mac_key.as_bytes(), b.mac_key.as_bytes());
    }

    #[test]
    fn data_and_mac_keys_differ() {
        let keys = derive_matrix_keys(b"correct horse", SALT, 1_000).unwrap();
        assert_ne!(keys.data_key.as_bytes(), keys.mac_key.as_bytes());
    }

    #[test]
    fn iteration_count_changes_keys() {
        let a = derive_matrix_keys(b"pw", SALT, 1_000).unwrap();
        let b = derive_matrix_keys(b"pw", SALT, 2_000).unwrap();
        assert_ne!(a.data_key.as_bytes(), b.data_key.as_bytes());
    }

    #[test]
    fn rejects_too_few_iterations() {
        assert!(matches!(
            derive_matrix_keys(b"pw", SALT, 999),
            Err(CodecError::KeyDerivationFailed(_))
        ));
    }

    #[test]
    fn rejects_bad_salt_hex() {
        assert!(matches!(
            derive_matrix_keys(b"pw", "not-hex", 1_000),
            Err(CodecError::MalformedBlob(_))
        ));
        // Valid hex but only 8 bytes.
        assert!(matches!(
            derive_matrix_keys(b"pw", "0011223344556677", 1_000),
            Err(CodecError::MalformedBlob(_))
        ));
    }

    #[test]
    fn empty_password_is_accepted() {
        assert!(derive_matrix_keys(b"", SALT, 1_000).is_ok());
    }

    #[test]
    fn evp_bytes_to_key_known_vector() {
        let salt = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let (key, iv) = evp_bytes_to_key(b"password", &salt);

        // First block is MD5(password || salt).
        let mut hasher = Md5::new();
        hasher.update(b"password");
        hasher.update(salt);
        let d1: [u8; 16] = hasher.finalize().into();
        assert_eq!(&key[..16], &d1);

        // Second block chains the first.
        let mut hasher = Md5::new();
        hasher.update(d1);
        hasher.update(b"password");
        hasher.update(salt);
        let d2: [u8; 16] = hasher.finalize().into();
        assert_eq!(&key[16..], &d2);

        let mut hasher = Md5::new();
        hasher.update(d2);
        hasher.update(b"password");
        hasher.update(salt);
        let d3: [u8; 16] = hasher.finalize().into();
        assert_eq!(iv, d3);
    }

    #[test]
    fn sealed_key_rejects_weak_params() {
        let weak = Argon2Params {
            memory_kib: 1_024,
            ..Argon2Params::default()
        };
        assert!(derive_sealed_key(b"pw", &[0u8; 16], &weak).is_err());
    }

    #[test]
    fn random_values_differ() {
        assert_ne!(generate_salt(), generate_salt());
        assert_ne!(generate_iv(), generate_iv());
    }
}
