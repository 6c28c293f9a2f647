//! Encryption pipeline.
//!
//! Builds every sealed section of a container in order: fixed header,
//! encrypted filename, optional encrypted metadata, then the data chunks.
//! The associated data grows cumulatively — each chunk is bound to the exact
//! header bytes, the filename ciphertext and tag, the metadata ciphertext and
//! tag, its own 1-based index, and its own length — so truncation, reordering
//! and splicing are all caught by tag verification on the way back in.

use std::io::{Read, Write};

use crate::config::{FILENAME_INDEX, HEADER_SIZE, MAX_FILENAME_LENGTH, METADATA_INDEX, NAME_SALT_SIZE, NONCE_BASE_SIZE, SALT_SIZE, TAG_SIZE};
use crate::container::header::Header;
use crate::container::metadata::FileMetadata;
use crate::crypto::aead::SuiteAead;
use crate::crypto::kdf::{self, KdfParams};
use crate::crypto::nonce;
use crate::crypto::suite::CipherSuite;
use crate::error::{Error, Result};
use crate::password::Password;

/// A fully keyed writer for one container.
///
/// Construction performs the key schedule and seals the filename and
/// metadata; [`ContainerWriter::write`] then streams the chunks.
pub struct ContainerWriter {
    suite: CipherSuite,
    nonce_base: [u8; NONCE_BASE_SIZE],
    chunk_size: u32,
    header_bytes: [u8; HEADER_SIZE],
    filename_ct: Vec<u8>,
    filename_tag: [u8; TAG_SIZE],
    meta_record: Option<(Vec<u8>, [u8; TAG_SIZE])>,
    data_aead: SuiteAead,
    container_name: String,
}

impl ContainerWriter {
    /// Derives keys and seals the filename and metadata sections.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        password: &Password,
        suite: CipherSuite,
        kdf_params: KdfParams,
        chunk_size: u32,
        salt: [u8; SALT_SIZE],
        nonce_base: [u8; NONCE_BASE_SIZE],
        filename: &str,
        metadata: Option<FileMetadata>,
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::bad_format("chunk size must be at least one byte"));
        }
        if filename.len() > MAX_FILENAME_LENGTH {
            return Err(Error::NameTooLong(filename.len()));
        }

        let master = kdf::derive_master(password.expose(), &salt, kdf_params)?;
        let meta_key = kdf::derive_meta_key(&master, suite)?;
        let data_key = kdf::derive_data_key(&master, suite)?;

        let header = Header::new(suite, kdf_params, salt, nonce_base, chunk_size, filename.len() as u16, metadata.is_some());
        let header_bytes = header.encode();

        let meta_aead = SuiteAead::new(suite, &meta_key)?;
        let (filename_ct, filename_tag) = meta_aead.seal(&nonce::derive(suite, &nonce_base, FILENAME_INDEX), &header_bytes, filename.as_bytes())?;

        let meta_record = match metadata {
            Some(meta) => Some(meta_aead.seal(&nonce::derive(suite, &nonce_base, METADATA_INDEX), &header_bytes, &meta.pack())?),
            None => None,
        };

        let mut name_salt = [0u8; NAME_SALT_SIZE];
        name_salt.copy_from_slice(&nonce_base[..NAME_SALT_SIZE]);
        let container_name = kdf::container_name(&master, &name_salt, &filename_ct)?;

        Ok(Self {
            suite,
            nonce_base,
            chunk_size,
            header_bytes,
            filename_ct,
            filename_tag,
            meta_record,
            data_aead: SuiteAead::new(suite, &data_key)?,
            container_name,
        })
    }

    /// The on-disk name for this container: 64 hex characters plus `.crypt`.
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// Streams the plaintext into the container, returning the chunk count.
    ///
    /// The output is flushed before returning; the caller decides when the
    /// source may be unlinked.
    pub fn write<R: Read, W: Write>(&self, mut input: R, mut output: W) -> Result<u64> {
        output.write_all(&self.header_bytes)?;
        output.write_all(&self.filename_ct)?;
        output.write_all(&self.filename_tag)?;

        if let Some((meta_ct, meta_tag)) = &self.meta_record {
            output.write_all(&(meta_ct.len() as u32).to_le_bytes())?;
            output.write_all(meta_ct)?;
            output.write_all(meta_tag)?;
        }

        let mut ad = self.chunk_ad_prefix();
        let prefix_len = ad.len();

        let mut buffer = vec![0u8; self.chunk_size as usize];
        let mut index: u64 = 0;
        loop {
            let len = read_fill(&mut input, &mut buffer)?;
            if len == 0 {
                break;
            }
            index += 1;

            ad.truncate(prefix_len);
            ad.extend_from_slice(&index.to_le_bytes());
            ad.extend_from_slice(&(len as u32).to_le_bytes());

            let (ct, tag) = self.data_aead.seal(&nonce::derive(self.suite, &self.nonce_base, index), &ad, &buffer[..len])?;
            output.write_all(&(len as u32).to_le_bytes())?;
            output.write_all(&ct)?;
            output.write_all(&tag)?;
        }

        output.flush()?;
        tracing::debug!(chunks = index, "container written");
        Ok(index)
    }

    /// The cumulative associated data shared by all chunks: header bytes,
    /// filename ciphertext and tag, then metadata ciphertext and tag when
    /// present.
    fn chunk_ad_prefix(&self) -> Vec<u8> {
        let meta_len = self.meta_record.as_ref().map_or(0, |(ct, _)| ct.len() + TAG_SIZE);
        let mut ad = Vec::with_capacity(HEADER_SIZE + self.filename_ct.len() + TAG_SIZE + meta_len + 12);
        ad.extend_from_slice(&self.header_bytes);
        ad.extend_from_slice(&self.filename_ct);
        ad.extend_from_slice(&self.filename_tag);
        if let Some((meta_ct, meta_tag)) = &self.meta_record {
            ad.extend_from_slice(meta_ct);
            ad.extend_from_slice(meta_tag);
        }
        ad
    }
}

/// Reads until the buffer is full or the stream ends; returns the byte
/// count. Short only at end of stream, so chunk boundaries are stable no
/// matter how the underlying reader fragments its reads.
pub(crate) fn read_fill<R: Read>(input: &mut R, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match input.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
