//! Application orchestration.
//!
//! Resolves flags into per-file operations, prompts for the password, and
//! keeps a directory walk going when individual paths fail: each failure
//! prints one error line and the process exits nonzero at the end.

use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;

use crate::cli::Cli;
use crate::config::FORMAT_VERSION;
use crate::container::{self, EncryptOptions};
use crate::crypto::suite::CipherSuite;
use crate::file::{Mode, discovery};
use crate::password::Password;
use crate::ui::Reporter;

pub struct App {
    cli: Cli,
}

impl App {
    /// Initializes logging and parses the command line.
    pub fn init() -> Result<Self> {
        let subscriber = tracing_subscriber::fmt().with_writer(std::io::stderr).finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(Self { cli: Cli::parse() })
    }

    pub fn execute(self) -> Result<()> {
        if self.cli.version {
            println!("{FORMAT_VERSION}");
            return Ok(());
        }
        ensure!(!self.cli.paths.is_empty(), "no input paths (see --help)");

        let suite = CipherSuite::from_name(&self.cli.cipher)
            .with_context(|| format!("unknown cipher {:?} (expected one of: {})", self.cli.cipher, CipherSuite::names().join(", ")))?;
        let options = EncryptOptions { suite, chunk_size: self.cli.chunk_size(), kdf: self.cli.kdf(), preserve_metadata: true };

        let password = prompt_password()?;
        let reporter = Reporter::new(self.cli.quiet);

        let mut failures = 0usize;
        for path in &self.cli.paths {
            if path.is_dir() {
                if !self.cli.recursive {
                    reporter.error(path, &anyhow::anyhow!("is a directory (use --recursive)"));
                    failures += 1;
                    continue;
                }
                for (file, mode) in discovery::discover(path, self.cli.mode()) {
                    if !process_one(&file, mode, &password, &options, &reporter) {
                        failures += 1;
                    }
                }
            } else {
                let mode = self.cli.mode().unwrap_or_else(|| Mode::infer(path));
                if !process_one(path, mode, &password, &options, &reporter) {
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            bail!("{failures} path(s) failed");
        }
        Ok(())
    }
}

/// Runs one file operation, reporting the outcome. Returns `false` on
/// failure so the caller can keep walking.
fn process_one(path: &Path, mode: Mode, password: &Password, options: &EncryptOptions, reporter: &Reporter) -> bool {
    let result = match mode {
        Mode::Encrypt => container::encrypt_file(path, password, options),
        Mode::Decrypt => container::decrypt_file(path, password),
    };

    match result {
        Ok(output) => {
            reporter.done(mode, path, &output);
            true
        }
        Err(e) => {
            reporter.error(path, &e.into());
            false
        }
    }
}

/// Reads the password twice from the terminal; a mismatch aborts the whole
/// invocation.
fn prompt_password() -> Result<Password> {
    let first = dialoguer::Password::new().with_prompt("Password").interact().context("could not read password")?;
    let second = dialoguer::Password::new().with_prompt("Confirm password").interact().context("could not read password")?;
    ensure!(first == second, "passwords do not match");
    Ok(Password::from(first))
}
