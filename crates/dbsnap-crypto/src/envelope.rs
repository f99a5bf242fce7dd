// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-describing encrypted snapshot format.
//!
//! ```text
//! "DBSNAP" | version u8 | m_cost u32be | t_cost u32be | p_cost u32be
//!          | salt[16] | nonce[12] | ciphertext || tag[16]
//! ```
//!
//! The KDF parameters and salt travel with the snapshot, so a restore only
//! needs the passphrase. Header parameters are bounds-checked before any
//! key derivation runs.

use std::fmt;

use dbsnap_core::SnapshotError;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::crypto::{self, NONCE_LEN, TAG_LEN};
use crate::kdf::{self, KdfParams, SALT_LEN};

const MAGIC: &[u8; 6] = b"DBSNAP";
const VERSION: u8 = 1;
const HEADER_LEN: usize = MAGIC.len() + 1 + 12 + SALT_LEN + NONCE_LEN;

/// Encrypts and decrypts whole snapshots with a configured passphrase.
#[derive(Clone)]
pub struct SnapshotCodec {
    passphrase: SecretString,
    params: KdfParams,
}

impl fmt::Debug for SnapshotCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotCodec")
            .field("passphrase", &"[redacted]")
            .field("params", &self.params)
            .finish()
    }
}

impl SnapshotCodec {
    /// Build a codec. An empty passphrase is refused: callers wanting
    /// plaintext mode should not construct a codec at all.
    pub fn new(passphrase: SecretString, params: KdfParams) -> Result<Self, SnapshotError> {
        if passphrase.expose_secret().is_empty() {
            return Err(SnapshotError::Crypto(
                "invalid key length: backup key must not be empty".to_string(),
            ));
        }
        params.check_bounds()?;
        Ok(Self { passphrase, params })
    }

    /// Encrypt a snapshot into the envelope format.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, SnapshotError> {
        let salt = kdf::generate_salt()?;
        let key = kdf::derive_key(self.passphrase.expose_secret().as_bytes(), &salt, &self.params)?;
        let (ciphertext, nonce) = crypto::seal(&key[..], plaintext)?;

        let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        out.extend_from_slice(&self.params.memory_cost.to_be_bytes());
        out.extend_from_slice(&self.params.iterations.to_be_bytes());
        out.extend_from_slice(&self.params.parallelism.to_be_bytes());
        out.extend_from_slice(&salt);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);

        debug!(plain_len = plaintext.len(), sealed_len = out.len(), "snapshot encrypted");
        Ok(out)
    }

    /// Decrypt an envelope produced by [`SnapshotCodec::encrypt`].
    ///
    /// Fails with a crypto error on a foreign or truncated envelope, on
    /// out-of-bounds KDF parameters, and on a wrong passphrase.
    pub fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>, SnapshotError> {
        let header = Header::parse(envelope)?;
        let key = kdf::derive_key(
            self.passphrase.expose_secret().as_bytes(),
            &header.salt,
            &header.params,
        )?;
        let plaintext = crypto::open(&key[..], &header.nonce, &envelope[HEADER_LEN..])?;

        debug!(sealed_len = envelope.len(), plain_len = plaintext.len(), "snapshot decrypted");
        Ok(plaintext)
    }
}

struct Header {
    params: KdfParams,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
}

impl Header {
    fn parse(data: &[u8]) -> Result<Self, SnapshotError> {
        if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
            return Err(SnapshotError::Crypto(
                "not an encrypted snapshot (bad magic) -- was it uploaded without a key?"
                    .to_string(),
            ));
        }
        if data.len() < HEADER_LEN + TAG_LEN {
            return Err(SnapshotError::Crypto(format!(
                "encrypted snapshot truncated: {} bytes",
                data.len()
            )));
        }
        let version = data[MAGIC.len()];
        if version != VERSION {
            return Err(SnapshotError::Crypto(format!(
                "unsupported snapshot envelope version {version}"
            )));
        }

        let word = |at: usize| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&data[at..at + 4]);
            u32::from_be_bytes(buf)
        };
        let base = MAGIC.len() + 1;
        let params = KdfParams {
            memory_cost: word(base),
            iterations: word(base + 4),
            parallelism: word(base + 8),
        };
        params.check_bounds()?;

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&data[base + 12..base + 12 + SALT_LEN]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&data[base + 12 + SALT_LEN..HEADER_LEN]);

        Ok(Self { params, salt, nonce })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbsnap_core::ErrorKind;
    use proptest::prelude::*;

    const FAST: KdfParams = KdfParams {
        memory_cost: 64,
        iterations: 1,
        parallelism: 1,
    };

    fn codec(key: &str) -> SnapshotCodec {
        SnapshotCodec::new(SecretString::from(key.to_string()), FAST).unwrap()
    }

    #[test]
    fn roundtrip_with_non_32_byte_passphrase() {
        let c = codec("s3cr3t-key-32-bytes-long!!");
        let sealed = c.encrypt(b"DBDATA").unwrap();
        assert_ne!(&sealed[HEADER_LEN..], b"DBDATA");
        assert_eq!(c.decrypt(&sealed).unwrap(), b"DBDATA");
    }

    #[test]
    fn empty_snapshot_roundtrips() {
        let c = codec("k");
        let sealed = c.encrypt(b"").unwrap();
        assert_eq!(sealed.len(), HEADER_LEN + TAG_LEN);
        assert!(c.decrypt(&sealed).unwrap().is_empty());
    }

    #[test]
    fn wrong_passphrase_is_crypto_error() {
        let sealed = codec("k1").encrypt(b"DBDATA").unwrap();
        let err = codec("k2").decrypt(&sealed).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn plaintext_input_rejected_by_magic_check() {
        let err = codec("k").decrypt(b"SQLite format 3\0....").unwrap_err();
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn truncated_envelope_rejected() {
        let sealed = codec("k").encrypt(b"DBDATA").unwrap();
        for cut in [MAGIC.len(), HEADER_LEN, HEADER_LEN + TAG_LEN - 1] {
            let err = codec("k").decrypt(&sealed[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Crypto, "cut at {cut}");
        }
        // Losing trailing bytes keeps the header intact but breaks the tag.
        let err = codec("k").decrypt(&sealed[..sealed.len() - 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn hostile_header_params_rejected() {
        let mut sealed = codec("k").encrypt(b"DBDATA").unwrap();
        let m = MAGIC.len() + 1;
        sealed[m..m + 4].copy_from_slice(&u32::MAX.to_be_bytes());
        let err = codec("k").decrypt(&sealed).unwrap_err();
        assert!(err.to_string().contains("out of bounds"));
    }

    #[test]
    fn empty_passphrase_refused() {
        let err = SnapshotCodec::new(SecretString::from(String::new()), FAST).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn debug_output_hides_passphrase() {
        let rendered = format!("{:?}", codec("very-secret"));
        assert!(!rendered.contains("very-secret"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn decrypt_inverts_encrypt(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let c = codec("prop-key");
            let sealed = c.encrypt(&data).unwrap();
            prop_assert_eq!(c.decrypt(&sealed).unwrap(), data);
        }
    }
}
