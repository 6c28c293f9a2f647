//! Password holder.
//!
//! Wraps the caller-supplied passphrase so it is zeroized on drop and never
//! shows up in debug output. The raw bytes are exposed only to the key
//! derivation function.

use secrecy::{ExposeSecret, SecretBox};

/// A passphrase held for the duration of one or more file operations.
pub struct Password {
    inner: SecretBox<Vec<u8>>,
}

impl Password {
    /// Wraps a passphrase string.
    pub fn new(password: &str) -> Self {
        Self::from_bytes(password.as_bytes())
    }

    /// Wraps raw passphrase bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self { inner: SecretBox::new(Box::new(bytes.to_vec())) }
    }

    /// Exposes the passphrase bytes for key derivation.
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self::from_bytes(password.as_bytes())
    }
}
