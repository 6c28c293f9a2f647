//! Suite router.
//!
//! One initialized value per container key, dispatching `seal`/`open` to the
//! construction the suite byte names. Tags are always detached 16-byte
//! values, ciphertext length always equals plaintext length, and the nonce
//! shape is whatever [`crate::crypto::nonce`] derived for the suite.

use aead::generic_array::typenum::Unsigned;
use aead::{Aead, Error as AeadError, KeyInit, Payload};
use aes_gcm_siv::Aes256GcmSiv;
use chacha20poly1305::XChaCha20Poly1305;

use crate::config::{KEY_SIZE, TAG_SIZE};
use crate::crypto::aurora::AuroraSiv;
use crate::crypto::gcm_siv::GcmSiv;
use crate::crypto::nonce::Nonce;
use crate::crypto::suite::CipherSuite;
use crate::error::Error;

/// An AEAD instance bound to one suite and one 32-byte key.
pub enum SuiteAead {
    XChaCha(XChaCha20Poly1305),
    Aes(Aes256GcmSiv),
    Twofish(GcmSiv<twofish::Twofish>),
    Serpent(GcmSiv<serpent::Serpent>),
    Camellia(GcmSiv<camellia::Camellia256>),
    Aurora(AuroraSiv),
}

impl SuiteAead {
    /// Initializes the construction the suite names.
    pub fn new(suite: CipherSuite, key: &[u8; KEY_SIZE]) -> Result<Self, Error> {
        Ok(match suite {
            CipherSuite::XChaCha20Poly1305 => Self::XChaCha(XChaCha20Poly1305::new(key.into())),
            CipherSuite::AesGcmSiv => Self::Aes(Aes256GcmSiv::new(key.into())),
            CipherSuite::TwofishGcmSiv => Self::Twofish(GcmSiv::new(key)),
            CipherSuite::SerpentGcmSiv => Self::Serpent(GcmSiv::new(key)),
            CipherSuite::CamelliaGcmSiv => Self::Camellia(GcmSiv::new(key)),
            CipherSuite::AuroraSiv => Self::Aurora(AuroraSiv::new(key).map_err(|_| Error::Cipher("aurora key split failed"))?),
        })
    }

    /// Encrypts one unit, returning ciphertext and its detached tag.
    pub fn seal(&self, nonce: &Nonce, ad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; TAG_SIZE]), Error> {
        let nonce = nonce.as_slice();
        let sealed = match self {
            Self::XChaCha(aead) => seal_detached(aead, nonce, ad, plaintext),
            Self::Aes(aead) => seal_detached(aead, nonce, ad, plaintext),
            Self::Twofish(aead) => aead.seal(nonce, ad, plaintext),
            Self::Serpent(aead) => aead.seal(nonce, ad, plaintext),
            Self::Camellia(aead) => aead.seal(nonce, ad, plaintext),
            Self::Aurora(aead) => aead.seal(nonce, ad, plaintext),
        };
        sealed.map_err(|_| Error::Cipher("seal rejected"))
    }

    /// Decrypts one unit, verifying its detached tag.
    ///
    /// The caller maps the opaque failure onto the unit being verified.
    pub fn open(&self, nonce: &Nonce, ad: &[u8], ciphertext: &[u8], tag: &[u8; TAG_SIZE]) -> Result<Vec<u8>, AeadError> {
        let nonce = nonce.as_slice();
        match self {
            Self::XChaCha(aead) => open_detached(aead, nonce, ad, ciphertext, tag),
            Self::Aes(aead) => open_detached(aead, nonce, ad, ciphertext, tag),
            Self::Twofish(aead) => aead.open(nonce, ad, ciphertext, tag),
            Self::Serpent(aead) => aead.open(nonce, ad, ciphertext, tag),
            Self::Camellia(aead) => aead.open(nonce, ad, ciphertext, tag),
            Self::Aurora(aead) => aead.open(nonce, ad, ciphertext, tag),
        }
    }
}

/// Seals through an `aead`-crate cipher and splits off the appended tag.
fn seal_detached<A: Aead>(aead: &A, nonce: &[u8], ad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; TAG_SIZE]), AeadError> {
    if nonce.len() != A::NonceSize::USIZE {
        return Err(AeadError);
    }

    let mut ciphertext = aead.encrypt(aead::Nonce::<A>::from_slice(nonce), Payload { msg: plaintext, aad: ad })?;
    if ciphertext.len() != plaintext.len() + TAG_SIZE {
        return Err(AeadError);
    }

    let tag_bytes = ciphertext.split_off(plaintext.len());
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&tag_bytes);
    Ok((ciphertext, tag))
}

/// Rejoins ciphertext and tag and opens through an `aead`-crate cipher.
fn open_detached<A: Aead>(aead: &A, nonce: &[u8], ad: &[u8], ciphertext: &[u8], tag: &[u8; TAG_SIZE]) -> Result<Vec<u8>, AeadError> {
    if nonce.len() != A::NonceSize::USIZE {
        return Err(AeadError);
    }

    let mut joined = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
    joined.extend_from_slice(ciphertext);
    joined.extend_from_slice(tag);
    aead.decrypt(aead::Nonce::<A>::from_slice(nonce), Payload { msg: &joined, aad: ad })
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use crate::config::NONCE_BASE_SIZE;
    use crate::crypto::nonce;

    use super::*;

    const KEY: [u8; KEY_SIZE] = [0x42; KEY_SIZE];
    const BASE: [u8; NONCE_BASE_SIZE] = [0x17; NONCE_BASE_SIZE];

    #[test]
    fn every_suite_round_trips() {
        for suite in CipherSuite::iter() {
            let aead = SuiteAead::new(suite, &KEY).unwrap();
            let nonce = nonce::derive(suite, &BASE, 1);

            let (ct, tag) = aead.seal(&nonce, b"associated", b"payload bytes").unwrap();
            assert_eq!(ct.len(), 13, "{suite}: ciphertext length must equal plaintext length");

            let pt = aead.open(&nonce, b"associated", &ct, &tag).unwrap();
            assert_eq!(pt, b"payload bytes", "{suite}: round trip failed");
        }
    }

    #[test]
    fn open_rejects_wrong_index_and_ad() {
        for suite in CipherSuite::iter() {
            let aead = SuiteAead::new(suite, &KEY).unwrap();
            let nonce = nonce::derive(suite, &BASE, 1);
            let (ct, tag) = aead.seal(&nonce, b"ad", b"payload").unwrap();

            let other_nonce = nonce::derive(suite, &BASE, 2);
            assert!(aead.open(&other_nonce, b"ad", &ct, &tag).is_err(), "{suite}: wrong nonce index accepted");
            assert!(aead.open(&nonce, b"bad", &ct, &tag).is_err(), "{suite}: wrong ad accepted");
        }
    }

    #[test]
    fn open_rejects_wrong_key() {
        for suite in CipherSuite::iter() {
            let aead = SuiteAead::new(suite, &KEY).unwrap();
            let nonce = nonce::derive(suite, &BASE, 1);
            let (ct, tag) = aead.seal(&nonce, b"ad", b"payload").unwrap();

            let other = SuiteAead::new(suite, &[0x43; KEY_SIZE]).unwrap();
            assert!(other.open(&nonce, b"ad", &ct, &tag).is_err(), "{suite}: wrong key accepted");
        }
    }

    #[test]
    fn suites_are_mutually_incompatible() {
        let suites: Vec<_> = CipherSuite::iter().collect();
        for &a in &suites {
            let sealer = SuiteAead::new(a, &KEY).unwrap();
            let nonce_a = nonce::derive(a, &BASE, 1);
            let (ct, tag) = sealer.seal(&nonce_a, b"ad", b"payload").unwrap();

            for &b in &suites {
                if a == b {
                    continue;
                }
                let opener = SuiteAead::new(b, &KEY).unwrap();
                let nonce_b = nonce::derive(b, &BASE, 1);
                assert!(opener.open(&nonce_b, b"ad", &ct, &tag).is_err(), "{a} container opened by {b}");
            }
        }
    }

    #[test]
    fn empty_plaintext_seals_to_tag_only() {
        for suite in CipherSuite::iter() {
            let aead = SuiteAead::new(suite, &KEY).unwrap();
            let nonce = nonce::derive(suite, &BASE, 1);
            let (ct, tag) = aead.seal(&nonce, b"ad", b"").unwrap();
            assert!(ct.is_empty(), "{suite}: empty plaintext expanded");
            assert!(aead.open(&nonce, b"ad", &ct, &tag).is_ok());
        }
    }
}
