//! Terminal reporting.
//!
//! One line per processed path. Errors always go to stderr with a red tag;
//! informational lines honor `--quiet`.

use std::path::Path;

use console::style;

use crate::file::Mode;

/// Per-invocation output settings.
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Reports one successfully processed path.
    pub fn done(&self, mode: Mode, source: &Path, target: &Path) {
        if self.quiet {
            return;
        }
        println!("{} {} {} -> {}", style("ok").green().bold(), mode.label(), source.display(), target.display());
    }

    /// Reports one failed path. Never suppressed.
    pub fn error(&self, path: &Path, error: &anyhow::Error) {
        eprintln!("{} {}: {error:#}", style("error").red().bold(), path.display());
    }
}
