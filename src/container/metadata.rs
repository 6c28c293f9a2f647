//! File metadata blob.
//!
//! Ten bytes when present: the source file's modification time as LE64
//! seconds since the epoch, followed by a LE16 bitfield of the nine
//! UNIX-style permission bits. Bit 0 is user-read through bit 8 others-
//! execute; higher bits are reserved and written as zero.
//!
//! Restoring is best-effort: an mtime of zero means "do not restore", while
//! permission bits are applied whenever the blob is present.

use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

use filetime::FileTime;

use crate::error::{Error, Result};

/// Serialized size of the blob.
pub const META_BLOB_SIZE: usize = 10;

/// Mask of the nine defined permission bits.
const PERMISSION_MASK: u16 = 0x01ff;

/// Captured (and restorable) file metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    /// Modification time in whole seconds since the epoch; zero disables
    /// restore.
    pub mtime_secs: u64,
    /// Permission bitfield, bit 0 = user-read … bit 8 = others-execute.
    pub permissions: u16,
}

impl FileMetadata {
    /// Captures metadata from a filesystem entry.
    ///
    /// Pre-epoch or unavailable mtimes become zero, which disables restore.
    pub fn capture(meta: &Metadata) -> Self {
        let mtime_secs = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs());

        Self { mtime_secs, permissions: capture_permissions(meta) }
    }

    /// Packs the blob into its 10-byte wire form.
    pub fn pack(&self) -> [u8; META_BLOB_SIZE] {
        let mut bytes = [0u8; META_BLOB_SIZE];
        bytes[..8].copy_from_slice(&self.mtime_secs.to_le_bytes());
        bytes[8..].copy_from_slice(&(self.permissions & PERMISSION_MASK).to_le_bytes());
        bytes
    }

    /// Unpacks a decrypted blob; the length must be exactly 10 bytes.
    pub fn unpack(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != META_BLOB_SIZE {
            return Err(Error::bad_format(format!("metadata blob is {} bytes, expected {META_BLOB_SIZE}", bytes.len())));
        }

        let mut mtime = [0u8; 8];
        mtime.copy_from_slice(&bytes[..8]);
        Ok(Self { mtime_secs: u64::from_le_bytes(mtime), permissions: u16::from_le_bytes([bytes[8], bytes[9]]) })
    }

    /// Applies the metadata to a restored file.
    ///
    /// Permissions first, mtime last so the timestamp survives the
    /// permission change.
    pub fn apply(&self, path: &Path) -> std::io::Result<()> {
        apply_permissions(path, self.permissions)?;

        if self.mtime_secs != 0 {
            filetime::set_file_mtime(path, FileTime::from_unix_time(self.mtime_secs as i64, 0))?;
        }

        Ok(())
    }
}

#[cfg(unix)]
fn capture_permissions(meta: &Metadata) -> u16 {
    use std::os::unix::fs::PermissionsExt;

    mode_to_bits(meta.permissions().mode())
}

#[cfg(not(unix))]
fn capture_permissions(_meta: &Metadata) -> u16 {
    0
}

#[cfg(unix)]
fn apply_permissions(path: &Path, bits: u16) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(bits_to_mode(bits)))
}

#[cfg(not(unix))]
fn apply_permissions(_path: &Path, _bits: u16) -> std::io::Result<()> {
    Ok(())
}

/// Maps a UNIX mode word onto the blob's bit order: blob bit `i` mirrors
/// mode bit `8 - i`, so bit 0 is user-read and bit 8 others-execute.
#[cfg(unix)]
fn mode_to_bits(mode: u32) -> u16 {
    let mut bits = 0u16;
    for i in 0..9u32 {
        if mode & (1 << (8 - i)) != 0 {
            bits |= 1 << i;
        }
    }
    bits
}

#[cfg(unix)]
fn bits_to_mode(bits: u16) -> u32 {
    let mut mode = 0u32;
    for i in 0..9u32 {
        if bits & (1 << i) != 0 {
            mode |= 1 << (8 - i);
        }
    }
    mode
}

#[cfg(test)]
mod tests {
    use super::*;

    /// rw-r--r-- expressed in blob bit order.
    const O644_BITS: u16 = 0b0_0100_1011;

    #[test]
    fn pack_unpack_round_trip() {
        let meta = FileMetadata { mtime_secs: 1_700_000_123, permissions: O644_BITS };
        assert_eq!(FileMetadata::unpack(&meta.pack()).unwrap(), meta);
    }

    #[test]
    fn wire_layout_is_little_endian() {
        let meta = FileMetadata { mtime_secs: 0x0102_0304_0506_0708, permissions: 0x01ff };
        let bytes = meta.pack();
        assert_eq!(&bytes[..8], &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[8..], &[0xff, 0x01]);
    }

    #[test]
    fn reserved_permission_bits_are_cleared_on_pack() {
        let meta = FileMetadata { mtime_secs: 1, permissions: 0xffff };
        let bytes = meta.pack();
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), PERMISSION_MASK);
    }

    #[test]
    fn unpack_rejects_wrong_length() {
        assert!(matches!(FileMetadata::unpack(&[0u8; 9]), Err(Error::BadFormat(_))));
        assert!(matches!(FileMetadata::unpack(&[0u8; 11]), Err(Error::BadFormat(_))));
    }

    #[cfg(unix)]
    #[test]
    fn mode_mapping_is_involutive() {
        for mode in [0o000, 0o644, 0o755, 0o600, 0o777, 0o421] {
            assert_eq!(bits_to_mode(mode_to_bits(mode)), mode);
        }
    }

    #[cfg(unix)]
    #[test]
    fn mode_bit_order_is_pinned() {
        // user-read only.
        assert_eq!(mode_to_bits(0o400), 0b0_0000_0001);
        // others-execute only.
        assert_eq!(mode_to_bits(0o001), 0b1_0000_0000);
        // group-write only.
        assert_eq!(mode_to_bits(0o020), 0b0_0001_0000);
    }

    #[cfg(unix)]
    #[test]
    fn apply_restores_mtime_and_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restored.txt");
        std::fs::write(&path, b"data").unwrap();

        let meta = FileMetadata { mtime_secs: 1_500_000_000, permissions: mode_to_bits(0o640) };
        meta.apply(&path).unwrap();

        let on_disk = std::fs::metadata(&path).unwrap();
        assert_eq!(on_disk.permissions().mode() & 0o777, 0o640);
        let mtime = on_disk.modified().unwrap().duration_since(UNIX_EPOCH).unwrap().as_secs();
        assert_eq!(mtime, 1_500_000_000);
    }

    #[test]
    fn zero_mtime_skips_timestamp_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kept.txt");
        std::fs::write(&path, b"data").unwrap();
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();

        let meta = FileMetadata { mtime_secs: 0, permissions: PERMISSION_MASK };
        meta.apply(&path).unwrap();

        let after = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert!(after >= before);
    }
}
