//! Fixed container header codec.
//!
//! The header is exactly 81 bytes with a fixed field order; its raw bytes
//! double as the base associated data for the filename and metadata seals, so
//! the reader always works from the bytes as read off disk, never from a
//! re-encoding.
//!
//! Layout (all integers little-endian):
//!
//! | offset | size | field      |
//! |--------|------|------------|
//! | 0      | 4    | magic      |
//! | 4      | 1    | version    |
//! | 5      | 1    | suite      |
//! | 6      | 1    | flags      |
//! | 7      | 4    | m_kib      |
//! | 11     | 4    | t          |
//! | 15     | 4    | p          |
//! | 19     | 32   | salt       |
//! | 51     | 24   | nonce_base |
//! | 75     | 4    | chunk_size |
//! | 79     | 2    | fn_len     |

use crate::config::{FLAG_HAS_META, FLAG_HAS_NAME, FORMAT_VERSION, HEADER_SIZE, MAGIC, NONCE_BASE_SIZE, SALT_SIZE};
use crate::crypto::kdf::KdfParams;
use crate::crypto::suite::CipherSuite;
use crate::error::{Error, Result};

/// Parsed form of the fixed header.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub suite: CipherSuite,
    pub flags: u8,
    pub kdf: KdfParams,
    pub salt: [u8; SALT_SIZE],
    pub nonce_base: [u8; NONCE_BASE_SIZE],
    pub chunk_size: u32,
    pub fn_len: u16,
}

impl Header {
    /// Builds a version-3 header for a new container.
    pub fn new(suite: CipherSuite, kdf: KdfParams, salt: [u8; SALT_SIZE], nonce_base: [u8; NONCE_BASE_SIZE], chunk_size: u32, fn_len: u16, has_meta: bool) -> Self {
        let mut flags = FLAG_HAS_NAME;
        if has_meta {
            flags |= FLAG_HAS_META;
        }
        Self { suite, flags, kdf, salt, nonce_base, chunk_size, fn_len }
    }

    /// Whether the container carries a metadata blob.
    #[inline]
    pub const fn has_meta(&self) -> bool {
        self.flags & FLAG_HAS_META != 0
    }

    /// Serializes the header into its canonical 81 bytes.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4] = FORMAT_VERSION;
        bytes[5] = self.suite.tag();
        bytes[6] = self.flags;
        bytes[7..11].copy_from_slice(&self.kdf.memory_kib.to_le_bytes());
        bytes[11..15].copy_from_slice(&self.kdf.time.to_le_bytes());
        bytes[15..19].copy_from_slice(&self.kdf.lanes.to_le_bytes());
        bytes[19..51].copy_from_slice(&self.salt);
        bytes[51..75].copy_from_slice(&self.nonce_base);
        bytes[75..79].copy_from_slice(&self.chunk_size.to_le_bytes());
        bytes[79..81].copy_from_slice(&self.fn_len.to_le_bytes());
        bytes
    }

    /// Parses and validates 81 header bytes.
    pub fn decode(bytes: &[u8; HEADER_SIZE]) -> Result<Self> {
        if bytes[0..4] != MAGIC {
            return Err(Error::bad_format("magic mismatch"));
        }
        if bytes[4] != FORMAT_VERSION {
            return Err(Error::bad_format(format!("unsupported version {}", bytes[4])));
        }

        let suite = CipherSuite::from_tag(bytes[5])?;
        let flags = bytes[6];
        if flags & FLAG_HAS_NAME == 0 {
            return Err(Error::bad_format("container has no encrypted filename"));
        }

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&bytes[19..51]);
        let mut nonce_base = [0u8; NONCE_BASE_SIZE];
        nonce_base.copy_from_slice(&bytes[51..75]);

        Ok(Self {
            suite,
            flags,
            kdf: KdfParams {
                memory_kib: u32::from_le_bytes([bytes[7], bytes[8], bytes[9], bytes[10]]),
                time: u32::from_le_bytes([bytes[11], bytes[12], bytes[13], bytes[14]]),
                lanes: u32::from_le_bytes([bytes[15], bytes[16], bytes[17], bytes[18]]),
            },
            salt,
            nonce_base,
            chunk_size: u32::from_le_bytes([bytes[75], bytes[76], bytes[77], bytes[78]]),
            fn_len: u16::from_le_bytes([bytes[79], bytes[80]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Header {
        Header::new(
            CipherSuite::AesGcmSiv,
            KdfParams { memory_kib: 8192, time: 2, lanes: 1 },
            [0xaa; SALT_SIZE],
            [0xbb; NONCE_BASE_SIZE],
            1024 * 1024,
            9,
            true,
        )
    }

    #[test]
    fn encode_decode_round_trip() {
        let header = sample();
        let bytes = header.encode();
        let parsed = Header::decode(&bytes).unwrap();

        assert_eq!(parsed.suite, header.suite);
        assert_eq!(parsed.flags, header.flags);
        assert_eq!(parsed.kdf, header.kdf);
        assert_eq!(parsed.salt, header.salt);
        assert_eq!(parsed.nonce_base, header.nonce_base);
        assert_eq!(parsed.chunk_size, header.chunk_size);
        assert_eq!(parsed.fn_len, header.fn_len);
    }

    #[test]
    fn layout_is_pinned() {
        let bytes = sample().encode();

        assert_eq!(&bytes[0..4], b"AEF1");
        assert_eq!(bytes[4], 3);
        assert_eq!(bytes[5], 1);
        assert_eq!(bytes[6], FLAG_HAS_NAME | FLAG_HAS_META);
        assert_eq!(&bytes[7..11], &8192u32.to_le_bytes());
        assert_eq!(&bytes[11..15], &2u32.to_le_bytes());
        assert_eq!(&bytes[15..19], &1u32.to_le_bytes());
        assert_eq!(&bytes[75..79], &(1024u32 * 1024).to_le_bytes());
        assert_eq!(&bytes[79..81], &9u16.to_le_bytes());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = sample().encode();
        bytes[0] = b'X';
        assert!(matches!(Header::decode(&bytes), Err(Error::BadFormat(_))));
    }

    #[test]
    fn rejects_bad_version() {
        let mut bytes = sample().encode();
        bytes[4] = 2;
        assert!(matches!(Header::decode(&bytes), Err(Error::BadFormat(_))));
    }

    #[test]
    fn rejects_unknown_suite() {
        let mut bytes = sample().encode();
        bytes[5] = 0x63;
        assert!(matches!(Header::decode(&bytes), Err(Error::UnknownSuite(0x63))));
    }

    #[test]
    fn rejects_missing_name_flag() {
        let mut bytes = sample().encode();
        bytes[6] = 0;
        assert!(matches!(Header::decode(&bytes), Err(Error::BadFormat(_))));
    }

    #[test]
    fn header_without_metadata() {
        let header = Header::new(CipherSuite::XChaCha20Poly1305, KdfParams::default(), [0; SALT_SIZE], [0; NONCE_BASE_SIZE], 1, 1, false);
        assert!(!header.has_meta());
        assert!(Header::decode(&header.encode()).unwrap().flags & FLAG_HAS_META == 0);
    }
}
