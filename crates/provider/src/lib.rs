//! AES field-encryption provider.
//!
//! This crate is intentionally free of persistence and logging dependencies.
//! It provides key generation, the encrypted-payload framing, and the
//! [`AesProvider`] implementation of the [`common::EncryptionProvider`]
//! contract.
//!
//! # Payload format
//!
//! ```text
//! IV (16 bytes) || ciphertext (N bytes, N a multiple of 16)
//! ```
//!
//! The IV is generated fresh for every encryption and carried as a
//! fixed-length prefix, so decryption needs no externally supplied IV and no
//! shared state between calls. The text form of a payload is its base64
//! encoding, applied by the contract's text operations.

pub mod aes;
pub mod key;
pub mod payload;

pub use self::aes::{AesProvider, CipherMode, PaddingMode};
pub use self::key::{KeyMaterial, KeySize};
pub use self::payload::BLOCK_LEN;
