//! GCM-SIV (RFC 8452) over non-AES block ciphers.
//!
//! The Twofish, Serpent and Camellia suites have no packaged AEAD crate, so
//! this module instantiates the RFC 8452 construction generically over any
//! 128-bit-block cipher taking a 32-byte key: per-nonce subkeys are derived
//! from the key-generating key in counter mode, POLYVAL authenticates AD and
//! message, and the synthetic tag seeds a 32-bit little-endian CTR keystream.
//!
//! Tags are detached 16-byte values and ciphertext length always equals
//! plaintext length, matching the container's framing.

use core::marker::PhantomData;

use aead::Error as AeadError;
use cipher::consts::U16;
use cipher::generic_array::GenericArray;
use cipher::{BlockCipher, BlockEncrypt, BlockSizeUser, InnerIvInit, KeyInit, StreamCipherCore};
use ctr::CtrCore;
use ctr::flavors::Ctr32LE;
use polyval::Polyval;
use polyval::universal_hash::UniversalHash;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::config::{KEY_SIZE, TAG_SIZE};

/// One 16-byte cipher block.
type Block = GenericArray<u8, U16>;

/// Nonce length fixed by RFC 8452.
const NONCE_LEN: usize = 12;

/// GCM-SIV instantiated over the block cipher `C`.
pub struct GcmSiv<C> {
    key: Zeroizing<[u8; KEY_SIZE]>,
    _cipher: PhantomData<C>,
}

impl<C> GcmSiv<C>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + KeyInit,
{
    /// Creates an instance around a 32-byte key-generating key.
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        Self { key: Zeroizing::new(*key), _cipher: PhantomData }
    }

    /// Encrypts `plaintext`, returning the ciphertext and detached tag.
    pub fn seal(&self, nonce: &[u8], ad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; TAG_SIZE]), AeadError> {
        let (polyval, enc_cipher) = self.derive_keys(nonce)?;
        let tag_block = compute_tag(polyval, &enc_cipher, nonce, ad, plaintext);

        let mut buffer = plaintext.to_vec();
        apply_keystream(&enc_cipher, &tag_block, &mut buffer);

        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&tag_block);
        Ok((buffer, tag))
    }

    /// Decrypts `ciphertext` and verifies the detached tag.
    pub fn open(&self, nonce: &[u8], ad: &[u8], ciphertext: &[u8], tag: &[u8; TAG_SIZE]) -> Result<Vec<u8>, AeadError> {
        let (polyval, enc_cipher) = self.derive_keys(nonce)?;

        let tag_block = Block::clone_from_slice(tag);
        let mut buffer = ciphertext.to_vec();
        apply_keystream(&enc_cipher, &tag_block, &mut buffer);

        let expected = compute_tag(polyval, &enc_cipher, nonce, ad, &buffer);
        if bool::from(expected.as_slice().ct_eq(tag)) {
            Ok(buffer)
        } else {
            buffer.zeroize();
            Err(AeadError)
        }
    }

    /// Derives the per-nonce POLYVAL key and message-encryption cipher.
    ///
    /// RFC 8452 §4: encrypt blocks of (LE32 counter ‖ nonce) under the
    /// key-generating key and keep the first half of each ciphertext block;
    /// counters 0..1 feed the 16-byte MAC key, 2..5 the 32-byte
    /// message-encryption key.
    fn derive_keys(&self, nonce: &[u8]) -> Result<(Polyval, C), AeadError> {
        if nonce.len() != NONCE_LEN {
            return Err(AeadError);
        }

        let kgk = C::new_from_slice(self.key.as_slice()).map_err(|_| AeadError)?;

        let mut mac_key = Zeroizing::new([0u8; 16]);
        let mut enc_key = Zeroizing::new([0u8; KEY_SIZE]);
        let mut counter: u32 = 0;
        let mut block = Block::default();
        for derived in [&mut mac_key[..], &mut enc_key[..]] {
            for chunk in derived.chunks_mut(8) {
                block[..4].copy_from_slice(&counter.to_le_bytes());
                block[4..].copy_from_slice(nonce);
                kgk.encrypt_block(&mut block);
                chunk.copy_from_slice(&block[..8]);
                counter += 1;
            }
        }
        block.as_mut_slice().zeroize();

        let polyval = Polyval::new(GenericArray::from_slice(mac_key.as_slice()));
        let enc_cipher = C::new_from_slice(enc_key.as_slice()).map_err(|_| AeadError)?;
        Ok((polyval, enc_cipher))
    }
}

/// POLYVAL over (AD, message, bit-length block), nonce-mixed and encrypted
/// into the synthetic tag (RFC 8452 §5).
fn compute_tag<C>(mut polyval: Polyval, enc_cipher: &C, nonce: &[u8], ad: &[u8], message: &[u8]) -> Block
where
    C: BlockSizeUser<BlockSize = U16> + BlockEncrypt,
{
    polyval.update_padded(ad);
    polyval.update_padded(message);

    let mut length_block = Block::default();
    length_block[..8].copy_from_slice(&((ad.len() as u64) * 8).to_le_bytes());
    length_block[8..].copy_from_slice(&((message.len() as u64) * 8).to_le_bytes());
    polyval.update(&[length_block]);

    let mut tag = polyval.finalize();
    for (byte, nonce_byte) in tag.iter_mut().zip(nonce) {
        *byte ^= nonce_byte;
    }
    tag[15] &= 0x7f;
    enc_cipher.encrypt_block(&mut tag);
    tag
}

/// CTR-32LE keystream seeded from the tag with the top bit forced on.
fn apply_keystream<C>(enc_cipher: &C, tag: &Block, buffer: &mut [u8])
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt,
{
    let mut counter_block = *tag;
    counter_block[15] |= 0x80;
    let ctr = CtrCore::<&C, Ctr32LE>::inner_iv_init(enc_cipher, &counter_block);
    ctr.apply_keystream_partial(buffer.as_mut().into());
}

#[cfg(test)]
mod tests {
    use camellia::Camellia256;
    use serpent::Serpent;
    use twofish::Twofish;

    use super::*;

    const KEY: [u8; KEY_SIZE] = [0x21; KEY_SIZE];
    const NONCE: [u8; NONCE_LEN] = [0x09; NONCE_LEN];

    fn round_trip<C>(name: &str)
    where
        C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + KeyInit,
    {
        let aead = GcmSiv::<C>::new(&KEY);
        let (ct, tag) = aead.seal(&NONCE, b"context", b"attack at dawn").unwrap();
        assert_eq!(ct.len(), 14, "{name}: ciphertext must not expand");
        assert_ne!(ct.as_slice(), b"attack at dawn".as_slice());

        let pt = aead.open(&NONCE, b"context", &ct, &tag).unwrap();
        assert_eq!(pt, b"attack at dawn", "{name}: round trip failed");
    }

    #[test]
    fn round_trips_all_block_ciphers() {
        round_trip::<Twofish>("twofish");
        round_trip::<Serpent>("serpent");
        round_trip::<Camellia256>("camellia");
    }

    #[test]
    fn empty_plaintext_and_ad_are_valid() {
        let aead = GcmSiv::<Twofish>::new(&KEY);
        let (ct, tag) = aead.seal(&NONCE, b"", b"").unwrap();
        assert!(ct.is_empty());
        assert_eq!(aead.open(&NONCE, b"", &ct, &tag).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn sealing_is_deterministic() {
        let aead = GcmSiv::<Serpent>::new(&KEY);
        let a = aead.seal(&NONCE, b"ad", b"message").unwrap();
        let b = aead.seal(&NONCE, b"ad", b"message").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_tampering() {
        let aead = GcmSiv::<Camellia256>::new(&KEY);
        let (ct, tag) = aead.seal(&NONCE, b"ad", b"message").unwrap();

        let mut bad_ct = ct.clone();
        bad_ct[0] ^= 1;
        assert!(aead.open(&NONCE, b"ad", &bad_ct, &tag).is_err());

        let mut bad_tag = tag;
        bad_tag[15] ^= 1;
        assert!(aead.open(&NONCE, b"ad", &ct, &bad_tag).is_err());

        assert!(aead.open(&NONCE, b"other ad", &ct, &tag).is_err());

        let mut other_nonce = NONCE;
        other_nonce[3] ^= 1;
        assert!(aead.open(&other_nonce, b"ad", &ct, &tag).is_err());
    }

    #[test]
    fn rejects_bad_nonce_length() {
        let aead = GcmSiv::<Twofish>::new(&KEY);
        assert!(aead.seal(&[0u8; 16], b"", b"data").is_err());
    }
}
