//! Error taxonomy for container operations.
//!
//! Every failure a writer or reader can hit maps onto exactly one of these
//! kinds, so callers (and tests) can distinguish a malformed container from a
//! tampered one from a plain I/O problem.

use std::fmt;

use thiserror::Error;

/// Which authenticated unit failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthContext {
    /// The encrypted filename did not verify (also the first unit to reject a
    /// wrong password).
    Filename,
    /// The encrypted metadata blob did not verify.
    Metadata,
    /// The data chunk with this 1-based index did not verify.
    Chunk(u64),
}

impl fmt::Display for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filename => f.write_str("filename"),
            Self::Metadata => f.write_str("metadata"),
            Self::Chunk(i) => write!(f, "chunk {i}"),
        }
    }
}

/// Errors produced by the encryption and decryption pipelines.
#[derive(Debug, Error)]
pub enum Error {
    /// Magic or version mismatch, truncated header, or a structurally
    /// invalid field.
    #[error("bad container format: {0}")]
    BadFormat(String),

    /// The suite byte is outside the closed set of known suites.
    #[error("unknown cipher suite tag {0}")]
    UnknownSuite(u8),

    /// The source basename does not fit in the 16-bit length field.
    #[error("filename too long: {0} bytes (maximum {max})", max = crate::config::MAX_FILENAME_LENGTH)]
    NameTooLong(usize),

    /// An underlying read or write failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The container ends in the middle of a unit.
    #[error("container is truncated")]
    Truncated,

    /// An authentication tag did not verify.
    #[error("authentication failed ({0}): wrong password or tampered data")]
    Auth(AuthContext),

    /// The key-derivation function rejected its parameters or could not
    /// allocate the requested memory.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// An AEAD backend refused to seal (out-of-range lengths; not reachable
    /// with valid chunk sizes).
    #[error("cipher failure: {0}")]
    Cipher(&'static str),

    /// The system CSPRNG failed to produce salt or nonce material.
    #[error("random generator failure: {0}")]
    Random(String),
}

/// Convenience alias used throughout the core.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Shorthand for a `BadFormat` with a formatted reason.
    pub fn bad_format(reason: impl Into<String>) -> Self {
        Self::BadFormat(reason.into())
    }
}
