//! Shared error taxonomy and the encryption-provider contract used across
//! `prop-enc` crates.

pub mod contract;
pub mod error;

pub use contract::EncryptionProvider;
pub use error::EncryptionError;
