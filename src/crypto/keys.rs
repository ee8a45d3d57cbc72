//! Key material types.
//!
//! The 64-byte PBKDF2 output is split into two independent halves:
//! - a **data key** used only for AES-256-CBC encryption, and
//! - a **MAC key** used only for HMAC-SHA256 over the blob body.
//!
//! Every type here zeroes its memory when dropped, so key bytes never
//! outlive the encode or decode call that created them.

use zeroize::Zeroize;

/// Length of each derived sub-key (256 bits).
pub const KEY_LEN: usize = 32;

/// Length of the full PBKDF2 output before splitting (512 bits).
pub const MASTER_KEY_LEN: usize = 2 * KEY_LEN;

/// The 32-byte AES-256 key for the Matrix codec.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct DataKey {
    bytes: [u8; KEY_LEN],
}

impl DataKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

/// The 32-byte HMAC-SHA256 key for the Matrix codec.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MacKey {
    bytes: [u8; KEY_LEN],
}

impl MacKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

/// Both Matrix sub-keys, produced together by one derivation.
pub struct MatrixKeys {
    pub data_key: DataKey,
    pub mac_key: MacKey,
}

impl MatrixKeys {
    /// Split a 64-byte master key into `(data_key, mac_key)`.
    ///
    /// The first 32 bytes become the data key, the next 32 the MAC key.
    /// The caller still owns `master` and is expected to zeroize it.
    pub fn split(master: &[u8; MASTER_KEY_LEN]) -> Self {
        let mut data = [0u8; KEY_LEN];
        let mut mac = [0u8; KEY_LEN];
        data.copy_from_slice(&master[..KEY_LEN]);
        mac.copy_from_slice(&master[KEY_LEN..]);

        let keys = Self {
            data_key: DataKey::new(data),
            mac_key: MacKey::new(mac),
        };
        data.zeroize();
        mac.zeroize();
        keys
    }
}

/// A single 32-byte key for the sealed (AES-256-GCM) codec.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SealedKey {
    bytes: [u8; KEY_LEN],
}

impl SealedKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}
