//! AES-256-CBC with PKCS#7 padding.
//!
//! CBC provides confidentiality only. Callers must authenticate the
//! ciphertext separately (the Matrix codec HMACs it before decrypting).

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::errors::{CodecError, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Encrypt `plaintext` under a 32-byte `key` and 16-byte `iv`.
///
/// The output is always a non-empty multiple of `BLOCK_LEN`.
pub fn encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| CodecError::EncryptionFailed(format!("invalid key or IV length: {e}")))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt and unpad a ciphertext produced by `encrypt`.
///
/// Any padding error is reported as `DecryptionFailure` with no further
/// detail.
pub fn decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CodecError::DecryptionFailure);
    }

    let cipher =
        Aes256CbcDec::new_from_slices(key, iv).map_err(|_| CodecError::DecryptionFailure)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CodecError::DecryptionFailure)
}
