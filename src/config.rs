//! Format and application constants.
//!
//! Everything that defines the on-disk container format lives here: magic
//! bytes, format version, field widths, and the default key-derivation and
//! chunking parameters. These constants are the single source of truth for
//! the wire layout.

/// The application name used in user-facing output.
pub const APP_NAME: &str = "aef";

/// Extension appended to encrypted containers.
pub const FILE_EXTENSION: &str = ".crypt";

/// Magic bytes at offset 0 of every container: ASCII `AEF1`.
pub const MAGIC: [u8; 4] = *b"AEF1";

/// Current container format version.
pub const FORMAT_VERSION: u8 = 3;

/// Length of the fixed header in bytes (magic through `fn_len`).
pub const HEADER_SIZE: usize = 81;

/// Header flag bit: the container carries an encrypted filename.
///
/// Must be set in version 3 containers.
pub const FLAG_HAS_NAME: u8 = 0b0000_0001;

/// Header flag bit: the container carries an encrypted metadata blob.
pub const FLAG_HAS_META: u8 = 0b0000_0010;

/// Length of every derived key (master, meta, data) in bytes.
pub const KEY_SIZE: usize = 32;

/// Length of the per-file KDF salt in bytes.
pub const SALT_SIZE: usize = 32;

/// Length of the per-file nonce base in bytes.
pub const NONCE_BASE_SIZE: usize = 24;

/// Length of every authentication tag in bytes, for all suites.
pub const TAG_SIZE: usize = 16;

/// Number of leading nonce-base bytes used to salt the container name hash.
pub const NAME_SALT_SIZE: usize = 8;

/// Maximum encodable basename length in bytes (the header stores a u16).
pub const MAX_FILENAME_LENGTH: usize = u16::MAX as usize;

/// Nonce-derivation index reserved for the encrypted filename.
pub const FILENAME_INDEX: u64 = 0;

/// Nonce-derivation index reserved for the encrypted metadata blob.
///
/// Data chunks count from 1, so the filename and metadata indices can never
/// collide with a chunk index.
pub const METADATA_INDEX: u64 = u64::MAX;

/// Domain-separation label prefix for the filename/metadata key.
pub const META_LABEL_PREFIX: &str = "file-meta:";

/// Domain-separation label prefix for the chunk-data key.
pub const DATA_LABEL_PREFIX: &str = "file-data:";

/// Default chunk size in bytes (1 MiB).
pub const DEFAULT_CHUNK_SIZE: u32 = 1024 * 1024;

/// Default Argon2id memory cost in KiB (64 MiB).
pub const DEFAULT_KDF_MEMORY: u32 = 64 * 1024;

/// Default Argon2id time cost (passes).
pub const DEFAULT_KDF_TIME: u32 = 3;

/// Default Argon2id parallelism (lanes).
pub const DEFAULT_KDF_LANES: u32 = 1;
