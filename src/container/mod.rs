//! Container format: header and metadata codecs, the streaming writer and
//! reader, and the path-level encrypt/decrypt operations.

pub mod header;
pub mod metadata;
pub mod reader;
pub mod writer;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::config::{DEFAULT_CHUNK_SIZE, NONCE_BASE_SIZE, SALT_SIZE};
use crate::crypto::kdf::{self, KdfParams};
use crate::crypto::suite::CipherSuite;
use crate::error::{Error, Result};
use crate::password::Password;

pub use metadata::FileMetadata;
pub use reader::ContainerReader;
pub use writer::ContainerWriter;

/// Tunables for one encryption operation.
#[derive(Debug, Clone, Copy)]
pub struct EncryptOptions {
    /// AEAD suite for every sealed unit in the container.
    pub suite: CipherSuite,
    /// Plaintext bytes per chunk; at least 1.
    pub chunk_size: u32,
    /// Argon2id cost parameters, persisted in the header.
    pub kdf: KdfParams,
    /// Whether to capture and seal mtime and permission bits.
    pub preserve_metadata: bool,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self { suite: CipherSuite::XChaCha20Poly1305, chunk_size: DEFAULT_CHUNK_SIZE, kdf: KdfParams::default(), preserve_metadata: true }
    }
}

/// Encrypts one file in place.
///
/// The plaintext at `path` is replaced by a container in the same directory
/// whose name is the keyed hash of the filename ciphertext. The source is
/// unlinked only after the container is fully written and flushed; on any
/// error the source survives and a partial container may remain.
pub fn encrypt_file(path: &Path, password: &Password, options: &EncryptOptions) -> Result<PathBuf> {
    let salt = kdf::random_bytes::<SALT_SIZE>()?;
    let nonce_base = kdf::random_bytes::<NONCE_BASE_SIZE>()?;
    encrypt_file_with(path, password, options, salt, nonce_base)
}

/// [`encrypt_file`] with caller-chosen salt and nonce base.
///
/// With fixed inputs the output is byte-for-byte reproducible, including the
/// container name. Production callers must pass freshly sampled randomness;
/// this entry point exists for deterministic verification.
pub fn encrypt_file_with(path: &Path, password: &Password, options: &EncryptOptions, salt: [u8; SALT_SIZE], nonce_base: [u8; NONCE_BASE_SIZE]) -> Result<PathBuf> {
    let filename = path
        .file_name()
        .ok_or_else(|| Error::bad_format("path has no basename"))?
        .to_string_lossy()
        .into_owned();

    let metadata = if options.preserve_metadata {
        Some(FileMetadata::capture(&fs::metadata(path)?))
    } else {
        None
    };

    let writer = ContainerWriter::new(password, options.suite, options.kdf, options.chunk_size, salt, nonce_base, &filename, metadata)?;
    let output_path = path.parent().unwrap_or(Path::new("")).join(writer.container_name());

    let mut input = BufReader::new(File::open(path)?);
    let mut output = BufWriter::new(File::create(&output_path)?);
    let chunks = writer.write(&mut input, &mut output)?;
    drop(output);
    drop(input);

    fs::remove_file(path)?;
    tracing::debug!(source = %path.display(), container = %output_path.display(), chunks, "encrypted");
    Ok(output_path)
}

/// Decrypts one container in place.
///
/// The restored file takes its verified original basename, in the
/// container's directory. Metadata is applied best-effort after the content
/// is flushed; the container is unlinked only on full success. On a
/// verification failure after output creation, the partial output is left on
/// disk and the container survives.
pub fn decrypt_file(path: &Path, password: &Password) -> Result<PathBuf> {
    let mut input = BufReader::new(File::open(path)?);
    let reader = ContainerReader::begin(&mut input, password)?;

    let output_path = path.parent().unwrap_or(Path::new("")).join(reader.filename());
    let mut output = BufWriter::new(File::create(&output_path)?);
    let chunks = reader.read_chunks(&mut input, &mut output)?;
    drop(output);
    drop(input);

    if let Some(meta) = reader.metadata() {
        if let Err(e) = meta.apply(&output_path) {
            tracing::warn!(path = %output_path.display(), error = %e, "could not restore file metadata");
        }
    }

    fs::remove_file(path)?;
    tracing::debug!(container = %path.display(), restored = %output_path.display(), chunks, "decrypted");
    Ok(output_path)
}
