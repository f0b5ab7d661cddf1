//! The encryption-provider capability contract.
//!
//! Persistence hooks depend on this trait, not on a concrete cipher family.
//! Alternate algorithms are added as new implementations of the same trait.
//!
//! The byte operations are the required surface; the text operations are
//! provided on top of them as a fixed base64 encoding so encrypted values are
//! safely representable in text-oriented storage columns.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::EncryptionError;

/// Capability interface for symmetric field encryption.
///
/// Implementations must be safe to share across threads: every call is
/// expected to be self-contained (own IV, own working buffers) with no
/// mutable state on the provider beyond its fixed key and configuration.
pub trait EncryptionProvider: Send + Sync {
    /// Encrypt `plaintext`, returning a self-describing payload that
    /// [`decrypt`](Self::decrypt) can reverse without any further context.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError>;

    /// Decrypt a payload previously produced by [`encrypt`](Self::encrypt)
    /// under the same key and configuration.
    fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>, EncryptionError>;

    /// Encrypt a text value and return the payload as base64 text.
    fn encrypt_text(&self, plaintext: &str) -> Result<String, EncryptionError> {
        Ok(STANDARD.encode(self.encrypt(plaintext.as_bytes())?))
    }

    /// Decode a base64 payload produced by [`encrypt_text`](Self::encrypt_text)
    /// and decrypt it back to text.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::InvalidCiphertext`] if the input is not
    /// valid base64, and [`EncryptionError::CryptoOperationFailed`] if the
    /// recovered plaintext is not valid UTF-8 (symptomatic of a wrong key or
    /// mismatched configuration).
    fn decrypt_text(&self, encoded: &str) -> Result<String, EncryptionError> {
        let payload = STANDARD
            .decode(encoded)
            .map_err(|_| EncryptionError::InvalidCiphertext("not valid base64".into()))?;
        let plaintext = self.decrypt(&payload)?;
        String::from_utf8(plaintext).map_err(|_| {
            EncryptionError::CryptoOperationFailed("recovered plaintext is not valid UTF-8".into())
        })
    }
}
