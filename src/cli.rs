//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_KDF_LANES, DEFAULT_KDF_MEMORY, DEFAULT_KDF_TIME};
use crate::crypto::kdf::KdfParams;
use crate::file::Mode;

/// Upper bound on `--chunk` so the byte count fits in the header's u32.
const MAX_CHUNK_MIB: u32 = 4095;

/// Encrypt or decrypt files in place with password-derived keys.
///
/// Paths ending in `.crypt` decrypt by default; everything else encrypts.
#[derive(Parser)]
#[command(name = crate::config::APP_NAME, about = "Password-based file encryption with authenticated, chunked containers.")]
pub struct Cli {
    /// Files or directories to process.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Force encryption.
    #[arg(short = 'e', long, conflicts_with = "decrypt")]
    pub encrypt: bool,

    /// Force decryption.
    #[arg(short = 'd', long)]
    pub decrypt: bool,

    /// Recurse into directories.
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Suppress informational output.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Print the container format version and exit.
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Chunk size in MiB.
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub chunk: u32,

    /// Argon2id memory cost in KiB.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_KDF_MEMORY)]
    pub m: u32,

    /// Argon2id time cost.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_KDF_TIME)]
    pub t: u32,

    /// Argon2id parallelism.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_KDF_LANES)]
    pub p: u32,

    /// Cipher suite: xchacha20, aes-gcm-siv, twofish-gcm-siv,
    /// serpent-gcm-siv, camellia-gcm-siv, or aurora-siv.
    #[arg(short = 'c', long, value_name = "NAME", default_value = "xchacha20")]
    pub cipher: String,
}

impl Cli {
    /// The explicitly requested mode, if any.
    pub fn mode(&self) -> Option<Mode> {
        if self.encrypt {
            Some(Mode::Encrypt)
        } else if self.decrypt {
            Some(Mode::Decrypt)
        } else {
            None
        }
    }

    /// Chunk size in bytes, clamped to a valid range.
    pub fn chunk_size(&self) -> u32 {
        self.chunk.clamp(1, MAX_CHUNK_MIB) * 1024 * 1024
    }

    /// KDF parameters from the flags.
    pub fn kdf(&self) -> KdfParams {
        KdfParams { memory_kib: self.m, time: self.t, lanes: self.p }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["aef", "file.txt"]);
        assert_eq!(cli.mode(), None);
        assert_eq!(cli.chunk_size(), 1024 * 1024);
        assert_eq!(cli.kdf(), KdfParams { memory_kib: 65536, time: 3, lanes: 1 });
        assert_eq!(cli.cipher, "xchacha20");
        assert!(!cli.recursive);
    }

    #[test]
    fn chunk_is_clamped_to_at_least_one_mib() {
        let cli = Cli::parse_from(["aef", "--chunk", "0", "file.txt"]);
        assert_eq!(cli.chunk_size(), 1024 * 1024);
    }

    #[test]
    fn short_flags() {
        let cli = Cli::parse_from(["aef", "-d", "-r", "-q", "-c", "serpent", "dir"]);
        assert_eq!(cli.mode(), Some(Mode::Decrypt));
        assert!(cli.recursive);
        assert!(cli.quiet);
        assert_eq!(cli.cipher, "serpent");
    }

    #[test]
    fn encrypt_and_decrypt_conflict() {
        assert!(Cli::try_parse_from(["aef", "-e", "-d", "x"]).is_err());
    }

    #[test]
    fn kdf_flags() {
        let cli = Cli::parse_from(["aef", "--m", "8", "--t", "1", "--p", "2", "x"]);
        assert_eq!(cli.kdf(), KdfParams { memory_kib: 8, time: 1, lanes: 2 });
    }
}
