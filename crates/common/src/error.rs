//! Common error types shared across crates.

use thiserror::Error;

/// Top-level error type for the encryption subsystem.
///
/// Every failure is surfaced synchronously to the immediate caller; nothing
/// is retried internally (cryptographic failures are not transient) and no
/// operation ever substitutes placeholder or unencrypted data on failure.
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// An unsupported key strength was requested at key generation or
    /// provider construction. Supported strengths are 128, 192 and 256 bits.
    #[error("unsupported key size: {0} bits")]
    UnsupportedKeySize(usize),

    /// A structurally invalid input was passed to an operation that requires
    /// a well-formed value (wrong IV length, non-string encrypted property).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Decrypt input is too short to carry the IV prefix, is not
    /// block-aligned, or its text encoding cannot be decoded.
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// The underlying cipher or padding layer rejected the transform —
    /// mismatched mode/padding configuration between encrypt and decrypt,
    /// or tampering caught by padding validation.
    #[error("crypto operation failed: {0}")]
    CryptoOperationFailed(String),

    /// An entity model declares encrypted properties but no encryption
    /// provider was configured for it.
    #[error("entity model declares encrypted properties but no encryption provider was configured")]
    MissingProvider,
}

impl EncryptionError {
    /// Short machine-readable code for this error, suitable for logs and
    /// host-side error mapping.
    pub fn code(&self) -> &'static str {
        match self {
            EncryptionError::UnsupportedKeySize(_) => "unsupported_key_size",
            EncryptionError::InvalidArgument(_) => "invalid_argument",
            EncryptionError::InvalidCiphertext(_) => "invalid_ciphertext",
            EncryptionError::CryptoOperationFailed(_) => "crypto_operation_failed",
            EncryptionError::MissingProvider => "missing_provider",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            EncryptionError::UnsupportedKeySize(512).code(),
            "unsupported_key_size"
        );
        assert_eq!(
            EncryptionError::InvalidArgument("x".into()).code(),
            "invalid_argument"
        );
        assert_eq!(
            EncryptionError::InvalidCiphertext("x".into()).code(),
            "invalid_ciphertext"
        );
        assert_eq!(
            EncryptionError::CryptoOperationFailed("x".into()).code(),
            "crypto_operation_failed"
        );
        assert_eq!(EncryptionError::MissingProvider.code(), "missing_provider");
    }

    #[test]
    fn display_includes_message() {
        let e = EncryptionError::InvalidCiphertext("payload shorter than IV".into());
        assert!(e.to_string().contains("payload shorter than IV"));
    }

    #[test]
    fn display_includes_requested_bits() {
        let e = EncryptionError::UnsupportedKeySize(512);
        assert!(e.to_string().contains("512"));
    }
}
