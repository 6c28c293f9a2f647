//! Aurora-SIV, the experimental suite (wire tag 50).
//!
//! A deterministic SIV construction: the tag is a 16-byte keyed BLAKE2b MAC
//! over the associated data, the 16-byte nonce, and the plaintext (with
//! length framing), and the ciphertext is the plaintext XORed with a ChaCha20
//! keystream whose IV is taken from the tag. Decryption rebuilds the
//! keystream from the transmitted tag, then recomputes and compares the MAC
//! in constant time.
//!
//! The MAC and keystream keys are split from the 32-byte suite key under
//! fixed internal labels, so the construction round-trips with itself across
//! implementations of this crate.

use aead::Error as AeadError;
use blake2::Blake2bMac;
use blake2::digest::consts::{U16, U32};
use blake2::digest::{KeyInit, Mac};
use chacha20::ChaCha20;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::config::{KEY_SIZE, TAG_SIZE};

/// Nonce length for this suite.
const NONCE_LEN: usize = 16;

const MAC_KEY_LABEL: &[u8] = b"aurora-siv:mac";
const ENC_KEY_LABEL: &[u8] = b"aurora-siv:enc";

/// Aurora-SIV AEAD state.
pub struct AuroraSiv {
    mac_key: Zeroizing<[u8; KEY_SIZE]>,
    enc_key: Zeroizing<[u8; KEY_SIZE]>,
}

impl AuroraSiv {
    /// Splits the suite key into the MAC and keystream keys.
    pub fn new(key: &[u8; KEY_SIZE]) -> Result<Self, AeadError> {
        Ok(Self { mac_key: split_key(key, MAC_KEY_LABEL)?, enc_key: split_key(key, ENC_KEY_LABEL)? })
    }

    /// Encrypts `plaintext`, returning the ciphertext and detached tag.
    pub fn seal(&self, nonce: &[u8], ad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; TAG_SIZE]), AeadError> {
        if nonce.len() != NONCE_LEN {
            return Err(AeadError);
        }

        let tag = self.compute_tag(nonce, ad, plaintext)?;
        let mut buffer = plaintext.to_vec();
        self.apply_keystream(&tag, &mut buffer);
        Ok((buffer, tag))
    }

    /// Decrypts `ciphertext` and verifies the detached tag.
    pub fn open(&self, nonce: &[u8], ad: &[u8], ciphertext: &[u8], tag: &[u8; TAG_SIZE]) -> Result<Vec<u8>, AeadError> {
        if nonce.len() != NONCE_LEN {
            return Err(AeadError);
        }

        let mut buffer = ciphertext.to_vec();
        self.apply_keystream(tag, &mut buffer);

        let expected = self.compute_tag(nonce, ad, &buffer)?;
        if bool::from(expected.ct_eq(tag)) {
            Ok(buffer)
        } else {
            buffer.zeroize();
            Err(AeadError)
        }
    }

    /// Keyed MAC over `LE64(|ad|) ‖ ad ‖ nonce ‖ LE64(|msg|) ‖ msg`.
    fn compute_tag(&self, nonce: &[u8], ad: &[u8], message: &[u8]) -> Result<[u8; TAG_SIZE], AeadError> {
        let mut mac = <Blake2bMac<U16> as KeyInit>::new_from_slice(self.mac_key.as_slice()).map_err(|_| AeadError)?;
        mac.update(&(ad.len() as u64).to_le_bytes());
        mac.update(ad);
        mac.update(nonce);
        mac.update(&(message.len() as u64).to_le_bytes());
        mac.update(message);
        Ok(mac.finalize().into_bytes().into())
    }

    /// ChaCha20 keystream with its IV drawn from the synthetic tag.
    fn apply_keystream(&self, tag: &[u8; TAG_SIZE], buffer: &mut [u8]) {
        let mut iv = [0u8; 12];
        iv.copy_from_slice(&tag[..12]);
        let mut cipher = ChaCha20::new((&*self.enc_key).into(), (&iv).into());
        cipher.apply_keystream(buffer);
    }
}

fn split_key(key: &[u8; KEY_SIZE], label: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>, AeadError> {
    let mut mac = <Blake2bMac<U32> as KeyInit>::new_from_slice(key).map_err(|_| AeadError)?;
    mac.update(label);
    Ok(Zeroizing::new(mac.finalize().into_bytes().into()))
}
