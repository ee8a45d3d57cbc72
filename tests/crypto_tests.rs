//! Integration tests for the finvault crypto module.

use finvault::crypto::kdf::{evp_bytes_to_key, OPENSSL_SALT_LEN};
use finvault::crypto::keys::MatrixKeys;
use finvault::crypto::{cbc, mac};
use finvault::crypto::{derive_matrix_keys, derive_sealed_key, generate_iv, generate_salt, Argon2Params};
use finvault::CodecError;

const SALT_HEX: &str = "00112233445566778899aabbccddeeff";

fn fast_argon2() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// AES-256-CBC
// ---------------------------------------------------------------------------

#[test]
fn cbc_roundtrip() {
    let key = [0xABu8; 32];
    let iv = [0x01u8; 16];
    let plaintext = br#"{"assets":"2500","liabilities":"300"}"#;

    let ciphertext = cbc::encrypt(&key, &iv, plaintext).expect("encrypt should succeed");
    assert_eq!(ciphertext.len() % cbc::BLOCK_LEN, 0);
    assert!(ciphertext.len() > plaintext.len());

    let recovered = cbc::decrypt(&key, &iv, &ciphertext).expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn cbc_full_block_input_gets_a_padding_block() {
    let key = [0x11u8; 32];
    let iv = [0x22u8; 16];
    let ciphertext = cbc::encrypt(&key, &iv, &[7u8; 32]).unwrap();
    assert_eq!(ciphertext.len(), 48);
}

#[test]
fn cbc_rejects_unaligned_ciphertext() {
    let key = [0x11u8; 32];
    let iv = [0x22u8; 16];
    assert!(matches!(
        cbc::decrypt(&key, &iv, &[0u8; 17]),
        Err(CodecError::DecryptionFailure)
    ));
    assert!(matches!(
        cbc::decrypt(&key, &iv, &[]),
        Err(CodecError::DecryptionFailure)
    ));
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn matrix_keys_are_deterministic() {
    let a = derive_matrix_keys(b"correct horse", SALT_HEX, 1_000).unwrap();
    let b = derive_matrix_keys(b"correct horse", SALT_HEX, 1_000).unwrap();
    assert_eq!(a.data_key.as_bytes(), b.data_key.as_bytes());
    assert_eq!(a.mac_key.as_bytes(), b.mac_key.as_bytes());
}

#[test]
fn matrix_keys_depend_on_password_salt_and_iterations() {
    let base = derive_matrix_keys(b"correct horse", SALT_HEX, 1_000).unwrap();
    let other_pw = derive_matrix_keys(b"battery staple", SALT_HEX, 1_000).unwrap();
    let other_salt =
        derive_matrix_keys(b"correct horse", "ffeeddccbbaa99887766554433221100", 1_000).unwrap();
    let more_iters = derive_matrix_keys(b"correct horse", SALT_HEX, 2_000).unwrap();

    for other in [&other_pw, &other_salt, &more_iters] {
        assert_ne!(base.data_key.as_bytes(), other.data_key.as_bytes());
        assert_ne!(base.mac_key.as_bytes(), other.mac_key.as_bytes());
    }
}

#[test]
fn data_and_mac_keys_differ() {
    let keys = derive_matrix_keys(b"pw", SALT_HEX, 1_000).unwrap();
    assert_ne!(keys.data_key.as_bytes(), keys.mac_key.as_bytes());
}

#[test]
fn split_takes_first_and_last_32_bytes() {
    let mut master = [0u8; 64];
    for (i, byte) in master.iter_mut().enumerate() {
        *byte = i as u8;
    }
    let keys = MatrixKeys::split(&master);
    assert_eq!(keys.data_key.as_bytes()[..], master[..32]);
    assert_eq!(keys.mac_key.as_bytes()[..], master[32..]);
}

#[test]
fn matrix_kdf_rejects_bad_inputs() {
    assert!(matches!(
        derive_matrix_keys(b"pw", SALT_HEX, 999),
        Err(CodecError::KeyDerivationFailed(_))
    ));
    assert!(matches!(
        derive_matrix_keys(b"pw", "not-hex", 1_000),
        Err(CodecError::MalformedBlob(_))
    ));
    assert!(matches!(
        derive_matrix_keys(b"pw", "0011", 1_000),
        Err(CodecError::MalformedBlob(_))
    ));
}

#[test]
fn evp_bytes_to_key_is_deterministic_and_salted() {
    let salt = [1u8; OPENSSL_SALT_LEN];
    let (key_a, iv_a) = evp_bytes_to_key(b"hunter2", &salt);
    let (key_b, iv_b) = evp_bytes_to_key(b"hunter2", &salt);
    assert_eq!(key_a, key_b);
    assert_eq!(iv_a, iv_b);

    let (key_c, _) = evp_bytes_to_key(b"hunter2", &[2u8; OPENSSL_SALT_LEN]);
    assert_ne!(key_a, key_c);
}

#[test]
fn sealed_key_is_deterministic() {
    let salt = [9u8; 16];
    let a = derive_sealed_key(b"pw", &salt, &fast_argon2()).unwrap();
    let b = derive_sealed_key(b"pw", &salt, &fast_argon2()).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());

    let c = derive_sealed_key(b"other", &salt, &fast_argon2()).unwrap();
    assert_ne!(a.as_bytes(), c.as_bytes());
}

#[test]
fn sealed_kdf_rejects_weak_params() {
    let weak = Argon2Params {
        memory_kib: 1_024,
        ..fast_argon2()
    };
    assert!(matches!(
        derive_sealed_key(b"pw", &[0u8; 16], &weak),
        Err(CodecError::KeyDerivationFailed(_))
    ));
}

#[test]
fn random_salts_and_ivs_differ() {
    assert_ne!(generate_salt(), generate_salt());
    assert_ne!(generate_iv(), generate_iv());
}

// ---------------------------------------------------------------------------
// HMAC
// ---------------------------------------------------------------------------

#[test]
fn tag_verifies_and_detects_changes() {
    let keys = derive_matrix_keys(b"pw", SALT_HEX, 1_000).unwrap();
    let tag = mac::compute_tag(&keys.mac_key, b"00ff").unwrap();
    assert_eq!(tag.len(), mac::TAG_LEN * 2);
    assert!(tag.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    mac::verify_tag(&keys.mac_key, b"00ff", &tag).unwrap();
    assert!(matches!(
        mac::verify_tag(&keys.mac_key, b"00fe", &tag),
        Err(CodecError::IntegrityFailure)
    ));
    assert!(matches!(
        mac::verify_tag(&keys.mac_key, b"00ff", &tag[..10]),
        Err(CodecError::IntegrityFailure)
    ));
}
