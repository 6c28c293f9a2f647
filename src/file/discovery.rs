//! Recursive file discovery for directory operands.
//!
//! Filtering rules: encryption skips hidden paths and anything already
//! ending in `.crypt`; decryption processes only `.crypt` files. With no
//! explicit mode, hidden paths are skipped and each file is processed by its
//! own inference. Unreadable entries are logged and skipped so one bad
//! directory does not abort the walk.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::file::{Mode, is_container, is_hidden};

/// Walks `root` and returns the files to process, each with its resolved
/// mode, in path order.
pub fn discover(root: &Path, mode: Option<Mode>) -> Vec<(PathBuf, Mode)> {
    let prune_hidden = mode != Some(Mode::Decrypt);

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(move |entry| entry.depth() == 0 || !(prune_hidden && is_hidden(entry.path())));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        let resolved = match mode {
            Some(Mode::Encrypt) if is_container(&path) => continue,
            Some(Mode::Decrypt) if !is_container(&path) => continue,
            Some(mode) => mode,
            None => Mode::infer(&path),
        };
        files.push((path, resolved));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}
