// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from the configured backup passphrase.

use dbsnap_core::SnapshotError;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::crypto::KEY_LEN;

/// Salt size stored alongside every encrypted snapshot.
pub const SALT_LEN: usize = 16;

/// Largest memory cost accepted from an envelope header (1 GiB in KiB).
const MAX_MEMORY_COST: u32 = 1024 * 1024;
/// Largest iteration count accepted from an envelope header.
const MAX_ITERATIONS: u32 = 64;
/// Largest lane count accepted from an envelope header.
const MAX_PARALLELISM: u32 = 64;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Reject parameters a hostile snapshot header could use to exhaust memory or CPU.
    pub fn check_bounds(&self) -> Result<(), SnapshotError> {
        if self.memory_cost > MAX_MEMORY_COST
            || self.iterations == 0
            || self.iterations > MAX_ITERATIONS
            || self.parallelism == 0
            || self.parallelism > MAX_PARALLELISM
        {
            return Err(SnapshotError::Crypto(format!(
                "key derivation parameters out of bounds (m={}, t={}, p={})",
                self.memory_cost, self.iterations, self.parallelism
            )));
        }
        Ok(())
    }
}

/// Derive a 32-byte key from the passphrase using Argon2id.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, SnapshotError> {
    params.check_bounds()?;

    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| SnapshotError::Crypto(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 =
        argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, argon_params);

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(passphrase, salt, output.as_mut())
        .map_err(|e| SnapshotError::Crypto(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random salt for one snapshot.
pub fn generate_salt() -> Result<[u8; SALT_LEN], SnapshotError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| SnapshotError::Crypto("failed to generate random salt".to_string()))?;
    Ok(salt)
}
