//! Key schedule and keyed hashing.
//!
//! One password, one file, three keys: Argon2id stretches the password and
//! per-file salt into the master key, and keyed BLAKE2b-256 splits the master
//! key into the filename/metadata key and the chunk-data key under distinct
//! suite-specific labels. The container's on-disk name is a salted keyed hash
//! of the filename ciphertext under the same master key.

use argon2::Algorithm::Argon2id;
use argon2::Version::V0x13;
use argon2::{Argon2, Params};
use blake2::Blake2bMac;
use blake2::digest::consts::U32;
use blake2::digest::{KeyInit, Mac};
use rand::rand_core::TryRng;
use rand::rngs::SysRng;
use zeroize::Zeroizing;

use crate::config::{DATA_LABEL_PREFIX, DEFAULT_KDF_LANES, DEFAULT_KDF_MEMORY, DEFAULT_KDF_TIME, FILE_EXTENSION, KEY_SIZE, META_LABEL_PREFIX, NAME_SALT_SIZE};
use crate::crypto::suite::CipherSuite;
use crate::error::{Error, Result};

/// Keyed BLAKE2b with a 256-bit output.
type KeyedHash = Blake2bMac<U32>;

/// Argon2id cost parameters, persisted in the container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Time cost (passes).
    pub time: u32,
    /// Parallelism (lanes).
    pub lanes: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self { memory_kib: DEFAULT_KDF_MEMORY, time: DEFAULT_KDF_TIME, lanes: DEFAULT_KDF_LANES }
    }
}

/// Derives the 32-byte master key from the password and per-file salt.
///
/// Deterministic over (password, salt, params); no hidden context is mixed
/// in, so any conforming implementation reproduces the same key.
pub fn derive_master(password: &[u8], salt: &[u8], params: KdfParams) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let argon_params = Params::new(params.memory_kib, params.time, params.lanes, Some(KEY_SIZE)).map_err(|e| Error::Kdf(e.to_string()))?;
    let argon2 = Argon2::new(Argon2id, V0x13, argon_params);

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    argon2.hash_password_into(password, salt, key.as_mut()).map_err(|e| Error::Kdf(e.to_string()))?;

    Ok(key)
}

/// Derives a labeled 32-byte subkey from the master key.
fn derive_subkey(master: &[u8; KEY_SIZE], label: &str) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let mut mac = <KeyedHash as KeyInit>::new_from_slice(master).map_err(|e| Error::Kdf(e.to_string()))?;
    mac.update(label.as_bytes());
    Ok(Zeroizing::new(mac.finalize().into_bytes().into()))
}

/// Derives the key that seals the filename and metadata blob.
pub fn derive_meta_key(master: &[u8; KEY_SIZE], suite: CipherSuite) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    derive_subkey(master, &format!("{META_LABEL_PREFIX}{}", suite.label_name()))
}

/// Derives the key that seals every data chunk.
pub fn derive_data_key(master: &[u8; KEY_SIZE], suite: CipherSuite) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    derive_subkey(master, &format!("{DATA_LABEL_PREFIX}{}", suite.label_name()))
}

/// Computes the container's on-disk filename.
///
/// Keyed BLAKE2b-256 of the filename ciphertext, keyed by the master key and
/// salted with the first eight nonce-base bytes, rendered as 64 lowercase hex
/// characters plus the `.crypt` extension. Reproducible given the password
/// and the file; reveals nothing about the plaintext name.
pub fn container_name(master: &[u8; KEY_SIZE], name_salt: &[u8; NAME_SALT_SIZE], filename_ct: &[u8]) -> Result<String> {
    let mut mac = KeyedHash::new_with_salt_and_personal(master, name_salt, &[]).map_err(|e| Error::Kdf(e.to_string()))?;
    mac.update(filename_ct);
    let digest = mac.finalize().into_bytes();
    Ok(format!("{}{FILE_EXTENSION}", hex::encode(digest)))
}

/// Fills an array with bytes from the operating system CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    SysRng.try_fill_bytes(&mut bytes).map_err(|e| Error::Random(e.to_string()))?;
    Ok(bytes)
}
