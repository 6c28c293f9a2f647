//! Per-unit nonce derivation.
//!
//! Every authenticated unit in a container (filename, metadata blob, each
//! data chunk) gets its nonce from the per-file 24-byte nonce base mixed with
//! the unit's 64-bit index. The mixing rule is fixed per nonce shape and must
//! not change: containers written by one build must open in another.
//!
//! Index assignment: 0 is the filename, `u64::MAX` is the metadata blob, and
//! data chunks count 1, 2, 3, … so the three namespaces never collide.

use crate::config::NONCE_BASE_SIZE;
use crate::crypto::suite::CipherSuite;

/// A derived nonce, sized for the suite that produced it.
#[derive(Clone, Copy)]
pub struct Nonce {
    bytes: [u8; NONCE_BASE_SIZE],
    len: usize,
}

impl Nonce {
    /// The nonce bytes, exactly `suite.nonce_len()` long.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Derives the nonce for one unit.
pub fn derive(suite: CipherSuite, base: &[u8; NONCE_BASE_SIZE], index: u64) -> Nonce {
    match suite.nonce_len() {
        24 => Nonce { bytes: nonce24(base, index), len: 24 },
        12 => {
            let mut bytes = [0u8; NONCE_BASE_SIZE];
            bytes[..12].copy_from_slice(&nonce12(base, index));
            Nonce { bytes, len: 12 }
        }
        _ => {
            let mut bytes = [0u8; NONCE_BASE_SIZE];
            bytes[..16].copy_from_slice(&nonce16(base, index));
            Nonce { bytes, len: 16 }
        }
    }
}

/// 24-byte shape (XChaCha20-Poly1305): the base with its trailing eight
/// bytes replaced by the index in little-endian.
fn nonce24(base: &[u8; NONCE_BASE_SIZE], index: u64) -> [u8; 24] {
    let mut nonce = *base;
    nonce[16..24].copy_from_slice(&index.to_le_bytes());
    nonce
}

/// 12-byte shape (GCM-SIV family): the first six base bytes verbatim, the
/// last six XORed with the low 48 bits of the index.
fn nonce12(base: &[u8; NONCE_BASE_SIZE], index: u64) -> [u8; 12] {
    let mut nonce = [0u8; 12];
    nonce.copy_from_slice(&base[..12]);
    let idx = index.to_le_bytes();
    for k in 0..6 {
        nonce[6 + k] ^= idx[k];
    }
    nonce
}

/// 16-byte shape (Aurora): the first eight base bytes verbatim, the last
/// eight XORed with the full index.
fn nonce16(base: &[u8; NONCE_BASE_SIZE], index: u64) -> [u8; 16] {
    let mut nonce = [0u8; 16];
    nonce.copy_from_slice(&base[..16]);
    let idx = index.to_le_bytes();
    for k in 0..8 {
        nonce[8 + k] ^= idx[k];
    }
    nonce
}
