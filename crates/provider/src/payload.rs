//! The self-describing encrypted-payload framing: `IV || ciphertext`.

use common::EncryptionError;

/// AES block length in bytes, which is also the IV length. Fixed at 16
/// regardless of key size.
pub const BLOCK_LEN: usize = 16;

/// A parsed encrypted payload.
///
/// The byte representation is the IV followed immediately by the ciphertext.
/// No length delimiter is needed because the IV length is constant, which is
/// what lets decryption run on the payload alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Raw IV bytes, one cipher block.
    pub iv: [u8; BLOCK_LEN],
    /// Raw ciphertext bytes.
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// Serialise to the wire form `IV || ciphertext`.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BLOCK_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split a wire payload back into IV and ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::InvalidCiphertext`] if `bytes` is shorter
    /// than the IV prefix.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncryptionError> {
        if bytes.len() < BLOCK_LEN {
            return Err(EncryptionError::InvalidCiphertext(format!(
                "payload is {} bytes, shorter than the {BLOCK_LEN}-byte IV prefix",
                bytes.len()
            )));
        }
        let mut iv = [0u8; BLOCK_LEN];
        iv.copy_from_slice(&bytes[..BLOCK_LEN]);
        Ok(Self {
            iv,
            ciphertext: bytes[BLOCK_LEN..].to_vec(),
        })
    }
}
