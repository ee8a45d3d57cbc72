//! HMAC-SHA256 tags over the hex body of a Matrix blob.
//!
//! Tags travel as lowercase hex text, so verification compares the
//! stored tag string with the recomputed one in constant time instead of
//! decoding the stored tag first. A stored tag with a stray non-hex
//! character is just another mismatch.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::keys::MacKey;
use crate::errors::{CodecError, Result};

/// Length of an HMAC-SHA256 tag in bytes.
pub const TAG_LEN: usize = 32;

/// Compute `hex(HMAC-SHA256(mac_key, message))`.
pub fn compute_tag(mac_key: &MacKey, message: &[u8]) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(mac_key.as_bytes())
        .map_err(|e| CodecError::EncryptionFailed(format!("invalid HMAC key: {e}")))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a stored hex tag against `message`.
///
/// Returns `IntegrityFailure` on any mismatch, including a length
/// mismatch.
pub fn verify_tag(mac_key: &MacKey, message: &[u8], stored_tag: &str) -> Result<()> {
    let expected = compute_tag(mac_key, message)?;

    if expected.as_bytes().ct_eq(stored_tag.as_bytes()).into() {
        Ok(())
    } else {
        Err(CodecError::IntegrityFailure)
    }
}
