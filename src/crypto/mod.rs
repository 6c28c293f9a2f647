//! Cryptographic layer: key schedule, nonce derivation, and the AEAD suites.

pub mod aead;
pub mod aurora;
pub mod gcm_siv;
pub mod kdf;
pub mod nonce;
pub mod suite;

pub use aead::SuiteAead;
pub use kdf::KdfParams;
pub use suite::CipherSuite;
