//! Symmetric key material: supported key strengths and the immutable
//! key + IV aggregate produced by key generation.

use std::hash::{Hash, Hasher};

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use common::EncryptionError;

use crate::payload::BLOCK_LEN;

/// Supported AES key strengths.
///
/// The block size is 16 bytes for every strength; only the key length varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeySize {
    /// 128-bit key (16 bytes).
    Bits128,
    /// 192-bit key (24 bytes).
    Bits192,
    /// 256-bit key (32 bytes).
    Bits256,
}

impl KeySize {
    /// Key strength in bits.
    pub fn bits(self) -> usize {
        match self {
            KeySize::Bits128 => 128,
            KeySize::Bits192 => 192,
            KeySize::Bits256 => 256,
        }
    }

    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        self.bits() / 8
    }

    /// Map a key byte length back to its strength.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::UnsupportedKeySize`] for any length other
    /// than 16, 24 or 32 bytes.
    pub fn from_key_len(len: usize) -> Result<Self, EncryptionError> {
        match len {
            16 => Ok(KeySize::Bits128),
            24 => Ok(KeySize::Bits192),
            32 => Ok(KeySize::Bits256),
            _ => Err(EncryptionError::UnsupportedKeySize(len * 8)),
        }
    }
}

/// An immutable symmetric key plus a default IV.
///
/// Produced whole by [`KeyMaterial::generate`] or reconstructed whole by
/// [`KeyMaterial::from_parts`]; there are no setters. The caller owns the
/// material and is responsible for storing it safely — this subsystem never
/// persists it.
///
/// The IV generated here is default material for callers that want one; the
/// [`AesProvider`](crate::AesProvider) never reuses it, generating a fresh IV
/// inside every encryption instead.
///
/// Equality is structural over both byte sequences and runs in constant time
/// for equal-length inputs. `Hash` agrees with equality. `Debug` never prints
/// the key bytes, and the key is zeroed when the value is dropped.
#[derive(Clone)]
pub struct KeyMaterial {
    key: Vec<u8>,
    iv: [u8; BLOCK_LEN],
    size: KeySize,
}

impl KeyMaterial {
    /// Generate fresh key material at the given strength from the OS CSPRNG.
    ///
    /// Successive calls are statistically independent: two generated
    /// instances compare equal only by coincidence of random bytes.
    pub fn generate(size: KeySize) -> Self {
        let mut key = vec![0u8; size.key_len()];
        OsRng.fill_bytes(&mut key);
        let mut iv = [0u8; BLOCK_LEN];
        OsRng.fill_bytes(&mut iv);
        Self { key, iv, size }
    }

    /// Reconstruct key material from previously stored bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::UnsupportedKeySize`] if `key` is not 16, 24
    /// or 32 bytes, and [`EncryptionError::InvalidArgument`] if `iv` is not
    /// exactly one block.
    pub fn from_parts(key: &[u8], iv: &[u8]) -> Result<Self, EncryptionError> {
        let size = KeySize::from_key_len(key.len())?;
        if iv.len() != BLOCK_LEN {
            return Err(EncryptionError::InvalidArgument(format!(
                "IV must be {BLOCK_LEN} bytes, got {}",
                iv.len()
            )));
        }
        let mut iv_buf = [0u8; BLOCK_LEN];
        iv_buf.copy_from_slice(iv);
        Ok(Self {
            key: key.to_vec(),
            iv: iv_buf,
            size,
        })
    }

    /// The key bytes.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The default IV bytes.
    pub fn iv(&self) -> &[u8; BLOCK_LEN] {
        &self.iv
    }

    /// The key strength.
    pub fn size(&self) -> KeySize {
        self.size
    }
}

impl PartialEq for KeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        // ct_eq returns false for mismatched lengths without early exit on
        // content, keeping the comparison time independent of secret bytes.
        bool::from(self.key.ct_eq(&other.key)) & bool::from(self.iv.ct_eq(&other.iv))
    }
}

impl Eq for KeyMaterial {}

impl Hash for KeyMaterial {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.iv.hash(state);
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.debug_struct("KeyMaterial")
            .field("key", &"[REDACTED]")
            .field("size", &self.size)
            .finish()
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(material: &KeyMaterial) -> u64 {
        let mut hasher = DefaultHasher::new();
        material.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn key_len_matches_strength() {
        assert_eq!(KeyMaterial::generate(KeySize::Bits128).key().len(), 16);
        assert_eq!(KeyMaterial::generate(KeySize::Bits192).key().len(), 24);
        assert_eq!(KeyMaterial::generate(KeySize::Bits256).key().len(), 32);
    }

    #[test]
    fn iv_is_one_block_and_non_empty() {
        let material = KeyMaterial::generate(KeySize::Bits256);
        assert_eq!(material.iv().len(), BLOCK_LEN);
    }

    #[test]
    fn successive_generations_are_independent() {
        let a = KeyMaterial::generate(KeySize::Bits256);
        let b = KeyMaterial::generate(KeySize::Bits256);
        assert_ne!(a.key(), b.key());
        assert_ne!(a.iv(), b.iv());
        assert_ne!(a, b);
        assert_ne!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn copy_equals_original() {
        let original = KeyMaterial::generate(KeySize::Bits192);
        let copy = original.clone();
        assert_eq!(original, copy);
        assert_eq!(hash_of(&original), hash_of(&copy));
    }

    #[test]
    fn structural_rebuild_equals_original() {
        let original = KeyMaterial::generate(KeySize::Bits128);
        let rebuilt = KeyMaterial::from_parts(original.key(), original.iv()).unwrap();
        assert_eq!(original, rebuilt);
    }

    #[test]
    fn differing_iv_makes_unequal() {
        let original = KeyMaterial::generate(KeySize::Bits128);
        let mut other_iv = *original.iv();
        other_iv[0] ^= 0x01;
        let other = KeyMaterial::from_parts(original.key(), &other_iv).unwrap();
        assert_ne!(original, other);
    }

    #[test]
    fn from_parts_rejects_bad_key_length() {
        let err = KeyMaterial::from_parts(&[0u8; 15], &[0u8; BLOCK_LEN]).unwrap_err();
        assert!(matches!(err, EncryptionError::UnsupportedKeySize(120)));
    }

    #[test]
    fn from_parts_rejects_bad_iv_length() {
        let err = KeyMaterial::from_parts(&[0u8; 16], &[0u8; 8]).unwrap_err();
        assert!(matches!(err, EncryptionError::InvalidArgument(_)));
    }

    #[test]
    fn from_key_len_maps_all_strengths() {
        assert_eq!(KeySize::from_key_len(16).unwrap(), KeySize::Bits128);
        assert_eq!(KeySize::from_key_len(24).unwrap(), KeySize::Bits192);
        assert_eq!(KeySize::from_key_len(32).unwrap(), KeySize::Bits256);
        assert!(KeySize::from_key_len(0).is_err());
        assert!(KeySize::from_key_len(64).is_err());
    }

    #[test]
    fn debug_redacts_key_bytes() {
        let material = KeyMaterial::generate(KeySize::Bits256);
        let rendered = format!("{material:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("key: ["));
    }
}
