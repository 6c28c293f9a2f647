//! Decryption pipeline.
//!
//! Mirrors the writer: parse the fixed header, re-derive the keys, verify the
//! filename, verify the metadata, then verify chunks strictly in index order.
//! End of stream is legal only on a record boundary — a partial length
//! prefix, ciphertext, or tag is reported as truncation, and every tag
//! mismatch names the unit that failed.

use std::io::{Read, Write};

use crate::config::{FILENAME_INDEX, HEADER_SIZE, METADATA_INDEX, NONCE_BASE_SIZE, TAG_SIZE};
use crate::container::header::Header;
use crate::container::metadata::FileMetadata;
use crate::container::writer::read_fill;
use crate::crypto::aead::SuiteAead;
use crate::crypto::kdf;
use crate::crypto::nonce;
use crate::crypto::suite::CipherSuite;
use crate::error::{AuthContext, Error, Result};
use crate::password::Password;

/// A container whose header, filename and metadata have been verified.
pub struct ContainerReader {
    suite: CipherSuite,
    nonce_base: [u8; NONCE_BASE_SIZE],
    data_aead: SuiteAead,
    chunk_ad_prefix: Vec<u8>,
    filename: String,
    metadata: Option<FileMetadata>,
}

impl ContainerReader {
    /// Parses the header sections and verifies everything up to the first
    /// data chunk.
    ///
    /// A wrong password surfaces here as `Auth(Filename)`: the filename is
    /// the first unit sealed under the derived keys.
    pub fn begin<R: Read>(input: &mut R, password: &Password) -> Result<Self> {
        let mut header_bytes = [0u8; HEADER_SIZE];
        if read_fill(input, &mut header_bytes)? != HEADER_SIZE {
            return Err(Error::bad_format("truncated header"));
        }
        let header = Header::decode(&header_bytes)?;

        let master = kdf::derive_master(password.expose(), &header.salt, header.kdf)?;
        let meta_key = kdf::derive_meta_key(&master, header.suite)?;
        let data_key = kdf::derive_data_key(&master, header.suite)?;
        drop(master);

        let meta_aead = SuiteAead::new(header.suite, &meta_key)?;

        let mut filename_ct = vec![0u8; header.fn_len as usize];
        read_exact(input, &mut filename_ct)?;
        let mut filename_tag = [0u8; TAG_SIZE];
        read_exact(input, &mut filename_tag)?;

        let filename_nonce = nonce::derive(header.suite, &header.nonce_base, FILENAME_INDEX);
        let filename_pt = meta_aead
            .open(&filename_nonce, &header_bytes, &filename_ct, &filename_tag)
            .map_err(|_| Error::Auth(AuthContext::Filename))?;
        let filename = decode_filename(filename_pt)?;

        let mut meta_section = Vec::new();
        let mut metadata = None;
        if header.has_meta() {
            let mut len_bytes = [0u8; 4];
            read_exact(input, &mut len_bytes)?;
            let meta_len = u32::from_le_bytes(len_bytes) as usize;

            let mut meta_ct = vec![0u8; meta_len];
            read_exact(input, &mut meta_ct)?;
            let mut meta_tag = [0u8; TAG_SIZE];
            read_exact(input, &mut meta_tag)?;

            let meta_nonce = nonce::derive(header.suite, &header.nonce_base, METADATA_INDEX);
            let meta_pt = meta_aead
                .open(&meta_nonce, &header_bytes, &meta_ct, &meta_tag)
                .map_err(|_| Error::Auth(AuthContext::Metadata))?;
            metadata = Some(FileMetadata::unpack(&meta_pt)?);

            meta_section.extend_from_slice(&meta_ct);
            meta_section.extend_from_slice(&meta_tag);
        }

        let mut chunk_ad_prefix = Vec::with_capacity(HEADER_SIZE + filename_ct.len() + TAG_SIZE + meta_section.len() + 12);
        chunk_ad_prefix.extend_from_slice(&header_bytes);
        chunk_ad_prefix.extend_from_slice(&filename_ct);
        chunk_ad_prefix.extend_from_slice(&filename_tag);
        chunk_ad_prefix.extend_from_slice(&meta_section);

        Ok(Self {
            suite: header.suite,
            nonce_base: header.nonce_base,
            data_aead: SuiteAead::new(header.suite, &data_key)?,
            chunk_ad_prefix,
            filename,
            metadata,
        })
    }

    /// The verified original basename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The verified metadata blob, when the container carries one.
    pub fn metadata(&self) -> Option<FileMetadata> {
        self.metadata
    }

    /// Verifies and writes out every data chunk, returning the chunk count.
    pub fn read_chunks<R: Read, W: Write>(&self, input: &mut R, output: &mut W) -> Result<u64> {
        let mut ad = self.chunk_ad_prefix.clone();
        let prefix_len = ad.len();

        let mut index: u64 = 0;
        loop {
            let mut len_bytes = [0u8; 4];
            if !read_exact_or_eof(input, &mut len_bytes)? {
                break;
            }
            index += 1;

            let len = u32::from_le_bytes(len_bytes) as usize;
            let mut ciphertext = vec![0u8; len];
            read_exact(input, &mut ciphertext)?;
            let mut tag = [0u8; TAG_SIZE];
            read_exact(input, &mut tag)?;

            ad.truncate(prefix_len);
            ad.extend_from_slice(&index.to_le_bytes());
            ad.extend_from_slice(&len_bytes);

            let plaintext = self
                .data_aead
                .open(&nonce::derive(self.suite, &self.nonce_base, index), &ad, &ciphertext, &tag)
                .map_err(|_| Error::Auth(AuthContext::Chunk(index)))?;
            output.write_all(&plaintext)?;
        }

        output.flush()?;
        tracing::debug!(chunks = index, "container verified");
        Ok(index)
    }
}

/// The decrypted basename must be a plain UTF-8 file name. The writer never
/// produces anything else; anything else here means a malformed container.
fn decode_filename(bytes: Vec<u8>) -> Result<String> {
    let name = String::from_utf8(bytes).map_err(|_| Error::bad_format("filename is not valid utf-8"))?;
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::bad_format("filename is not a plain basename"));
    }
    Ok(name)
}

/// Reads the full buffer or fails with `Truncated` (mid-unit end of stream).
fn read_exact<R: Read>(input: &mut R, buffer: &mut [u8]) -> Result<()> {
    if read_fill(input, buffer)? != buffer.len() {
        return Err(Error::Truncated);
    }
    Ok(())
}

/// Reads the full buffer, accepting a clean end of stream only before the
/// first byte: `Ok(false)` is end of container, a short read is `Truncated`.
fn read_exact_or_eof<R: Read>(input: &mut R, buffer: &mut [u8]) -> Result<bool> {
    match read_fill(input, buffer)? {
        0 => Ok(false),
        n if n == buffer.len() => Ok(true),
        _ => Err(Error::Truncated),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::config::{NONCE_BASE_SIZE, SALT_SIZE};
    use crate::container::writer::ContainerWriter;
    use crate::crypto::kdf::KdfParams;

    use super::*;

    fn test_kdf() -> KdfParams {
        KdfParams { memory_kib: 8, time: 1, lanes: 1 }
    }

    fn build_container(payload: &[u8], chunk_size: u32) -> Vec<u8> {
        let writer = ContainerWriter::new(
            &Password::new("hunter2"),
            CipherSuite::AesGcmSiv,
            test_kdf(),
            chunk_size,
            [3u8; SALT_SIZE],
            [4u8; NONCE_BASE_SIZE],
            "lorem.txt",
            Some(FileMetadata { mtime_secs: 1_600_000_000, permissions: 0b0_0100_1011 }),
        )
        .unwrap();

        let mut out = Vec::new();
        writer.write(Cursor::new(payload.to_vec()), &mut out).unwrap();
        out
    }

    fn decrypt(container: &[u8], password: &str) -> Result<(String, Vec<u8>)> {
        let mut input = Cursor::new(container.to_vec());
        let reader = ContainerReader::begin(&mut input, &Password::new(password))?;
        let mut output = Vec::new();
        reader.read_chunks(&mut input, &mut output)?;
        Ok((reader.filename().to_owned(), output))
    }

    #[test]
    fn round_trip_restores_name_metadata_and_content() {
        let container = build_container(b"hello container", 4);

        let mut input = Cursor::new(container);
        let reader = ContainerReader::begin(&mut input, &Password::new("hunter2")).unwrap();
        assert_eq!(reader.filename(), "lorem.txt");
        let meta = reader.metadata().unwrap();
        assert_eq!(meta.mtime_secs, 1_600_000_000);
        assert_eq!(meta.permissions, 0b0_0100_1011);

        let mut output = Vec::new();
        let chunks = reader.read_chunks(&mut input, &mut output).unwrap();
        assert_eq!(chunks, 4);
        assert_eq!(output, b"hello container");
    }

    #[test]
    fn wrong_password_fails_on_filename() {
        let container = build_container(b"data", 4);
        assert!(matches!(decrypt(&container, "wrong"), Err(Error::Auth(AuthContext::Filename))));
    }

    #[test]
    fn truncated_header_is_bad_format() {
        let container = build_container(b"data", 4);
        let result = decrypt(&container[..40], "hunter2");
        assert!(matches!(result, Err(Error::BadFormat(_))));
    }

    #[test]
    fn mid_chunk_truncation_is_detected() {
        let container = build_container(b"0123456789", 4);

        // Every cut that does not land exactly on a record boundary.
        let last_record = 4 + 2 + TAG_SIZE;
        for cut in (1..=(4 + TAG_SIZE + 3)).filter(|&c| c != last_record) {
            let result = decrypt(&container[..container.len() - cut], "hunter2");
            assert!(
                matches!(result, Err(Error::Truncated | Error::Auth(_))),
                "cut of {cut} bytes was not detected"
            );
        }
    }

    #[test]
    fn removing_whole_last_record_is_silent_only_about_that_record() {
        // Dropping a full trailing record leaves a structurally valid
        // container; the format detects this at a higher layer only when the
        // caller compares lengths, so the reader simply returns fewer chunks.
        let container = build_container(b"0123456789", 4);
        let last_record = 4 + 2 + TAG_SIZE;
        let (_, payload) = decrypt(&container[..container.len() - last_record], "hunter2").unwrap();
        assert_eq!(payload, b"01234567");
    }

    #[test]
    fn chunk_swap_is_detected_at_first_wrong_index() {
        let container = build_container(b"0123456789ab", 4);
        let record = 4 + 4 + TAG_SIZE;
        let body_start = container.len() - 3 * record;

        let mut swapped = container.clone();
        let (first, rest) = swapped[body_start..].split_at_mut(record);
        first.swap_with_slice(&mut rest[..record]);

        let result = decrypt(&swapped, "hunter2");
        assert!(matches!(result, Err(Error::Auth(AuthContext::Chunk(1)))), "got {result:?}");
    }

    #[test]
    fn chunk_corruption_names_the_chunk() {
        let container = build_container(b"0123456789ab", 4);
        let record = 4 + 4 + TAG_SIZE;

        // First ciphertext byte of chunk 2.
        let mut corrupt = container.clone();
        let chunk2_ct = container.len() - 2 * record + 4;
        corrupt[chunk2_ct] ^= 0x01;
        assert!(matches!(decrypt(&corrupt, "hunter2"), Err(Error::Auth(AuthContext::Chunk(2)))));

        // Length prefix of chunk 3.
        let mut corrupt = container.clone();
        let chunk3_len = container.len() - record;
        corrupt[chunk3_len] ^= 0x01;
        assert!(matches!(decrypt(&corrupt, "hunter2"), Err(Error::Truncated | Error::Auth(_))));
    }

    #[test]
    fn filename_or_metadata_corruption_is_localized() {
        let container = build_container(b"payload!", 4);

        // Filename ciphertext sits right after the fixed header.
        let mut corrupt = container.clone();
        corrupt[HEADER_SIZE] ^= 0x01;
        assert!(matches!(decrypt(&corrupt, "hunter2"), Err(Error::Auth(AuthContext::Filename))));

        // Metadata ciphertext sits after the filename record and length.
        let mut corrupt = container.clone();
        let meta_ct = HEADER_SIZE + "lorem.txt".len() + TAG_SIZE + 4;
        corrupt[meta_ct] ^= 0x01;
        assert!(matches!(decrypt(&corrupt, "hunter2"), Err(Error::Auth(AuthContext::Metadata))));
    }

    #[test]
    fn header_bit_flips_fail_before_or_at_filename() {
        let container = build_container(b"payload!", 4);

        // Skip the high bytes of the KDF cost fields (offsets 7..19): a flip
        // there still fails, but only after paying the inflated Argon2 cost.
        let offsets = (0..7).chain([7, 11, 15]).chain(19..HEADER_SIZE);
        for offset in offsets {
            let mut corrupt = container.clone();
            corrupt[offset] ^= 0x01;
            let result = decrypt(&corrupt, "hunter2");
            assert!(
                matches!(result, Err(Error::BadFormat(_) | Error::UnknownSuite(_) | Error::Auth(AuthContext::Filename) | Error::Kdf(_) | Error::Truncated)),
                "header byte {offset} tamper yielded {result:?}"
            );
        }
    }

    #[test]
    fn zero_chunk_container_ends_cleanly_after_metadata() {
        let container = build_container(b"", 1024);
        let (name, payload) = decrypt(&container, "hunter2").unwrap();
        assert_eq!(name, "lorem.txt");
        assert!(payload.is_empty());
    }
}
