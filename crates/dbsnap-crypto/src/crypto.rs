// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.

use dbsnap_core::SnapshotError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};

/// Key size required by AES-256-GCM.
pub const KEY_LEN: usize = 32;

/// Nonce size used by AES-256-GCM.
pub const NONCE_LEN: usize = 12;

/// Authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

fn aead_key(key: &[u8]) -> Result<LessSafeKey, SnapshotError> {
    if key.len() != KEY_LEN {
        return Err(SnapshotError::Crypto(format!(
            "invalid key length: AES-256-GCM requires {KEY_LEN} bytes, got {}",
            key.len()
        )));
    }
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| SnapshotError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM using a random 96-bit nonce.
///
/// Returns `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN]), SnapshotError> {
    let key = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| SnapshotError::Crypto("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| SnapshotError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt ciphertext with AES-256-GCM.
///
/// `ciphertext` must include the 16-byte authentication tag appended by [`seal`].
/// A wrong key or tampered data fails the tag check; no plaintext is returned.
pub fn open(
    key: &[u8],
    nonce_bytes: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, SnapshotError> {
    let key = aead_key(key)?;

    if ciphertext.len() < TAG_LEN {
        return Err(SnapshotError::Crypto(
            "ciphertext shorter than the authentication tag".to_string(),
        ));
    }

    let mut in_out = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(Nonce::assume_unique_for_key(*nonce_bytes), Aad::empty(), &mut in_out)
        .map_err(|_| {
            SnapshotError::Crypto(
                "AES-256-GCM decryption failed -- wrong key or corrupted data".to_string(),
            )
        })?;

    Ok(plaintext.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbsnap_core::ErrorKind;

    const KEY: [u8; KEY_LEN] = [7u8; KEY_LEN];

    #[test]
    fn seal_open_roundtrip() {
        let (ciphertext, nonce) = seal(&KEY, b"DBDATA").unwrap();
        assert_eq!(open(&KEY, &nonce, &ciphertext).unwrap(), b"DBDATA");
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let (ciphertext, nonce) = seal(&KEY, b"").unwrap();
        assert_eq!(ciphertext.len(), TAG_LEN);
        assert!(open(&KEY, &nonce, &ciphertext).unwrap().is_empty());
    }

    #[test]
    fn short_key_rejected_on_both_paths() {
        let err = seal(&[1u8; 16], b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
        assert!(err.to_string().contains("invalid key length"));

        let err = open(&[1u8; 31], &[0u8; NONCE_LEN], &[0u8; 32]).unwrap_err();
        assert!(err.to_string().contains("got 31"));
    }

    #[test]
    fn wrong_key_fails() {
        let (ciphertext, nonce) = seal(&KEY, b"secret data").unwrap();
        let err = open(&[8u8; KEY_LEN], &nonce, &ciphertext).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let (mut ciphertext, nonce) = seal(&KEY, b"do not tamper").unwrap();
        ciphertext[0] ^= 0x01;
        assert!(open(&KEY, &nonce, &ciphertext).is_err());
    }

    #[test]
    fn fresh_nonce_per_seal() {
        let (ct1, n1) = seal(&KEY, b"same").unwrap();
        let (ct2, n2) = seal(&KEY, b"same").unwrap();
        assert_ne!(n1, n2);
        assert_ne!(ct1, ct2);
    }
}
