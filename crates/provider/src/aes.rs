//! [`AesProvider`]: AES block-cipher implementation of the
//! [`EncryptionProvider`] contract.
//!
//! **IV discipline:** a fresh random IV is generated inside every `encrypt`
//! call and framed into the payload. The provider never stores an IV and
//! never reuses the default IV from key generation — reusing an IV under the
//! same CBC key leaks plaintext structure. This is the single most important
//! correctness property of this module.
//!
//! Mode and padding are properties of the provider instance, not of the
//! payload: a ciphertext is only readable by a provider configured with the
//! same key, mode and padding that wrote it.

use aes::cipher::{
    block_padding::{Pkcs7, ZeroPadding},
    BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use common::{EncryptionError, EncryptionProvider};

use crate::key::{KeyMaterial, KeySize};
use crate::payload::{EncryptedPayload, BLOCK_LEN};

/// Block chaining mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherMode {
    /// Cipher block chaining. Each block is mixed with the previous
    /// ciphertext block; the IV seeds the chain.
    #[default]
    Cbc,
    /// Electronic codebook. No chaining: identical plaintext blocks produce
    /// identical ciphertext blocks. The IV prefix is still carried for a
    /// uniform payload format but does not influence the transform.
    Ecb,
}

/// Plaintext padding scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaddingMode {
    /// PKCS#7: every plaintext is extended, and the padding is validated and
    /// removed on decrypt.
    #[default]
    Pkcs7,
    /// Zero padding: the final partial block is filled with `0x00` bytes,
    /// which are stripped on decrypt. Only suitable for fixed-width fields
    /// where trailing zero bytes cannot be confused with data.
    Zeros,
}

/// AES implementation of the [`EncryptionProvider`] contract.
///
/// Holds a private copy of the key for its lifetime (zeroed on drop, never
/// exposed through any operation) plus the mode/padding configuration fixed
/// at construction. Stateless between calls: a shared instance may be used
/// from many threads concurrently, since each call builds its own cipher and
/// IV.
pub struct AesProvider {
    key: Vec<u8>,
    size: KeySize,
    mode: CipherMode,
    padding: PaddingMode,
}

impl AesProvider {
    /// Construct a provider with the default configuration (CBC, PKCS#7).
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::UnsupportedKeySize`] if `key` is not 16,
    /// 24 or 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self, EncryptionError> {
        Self::with_modes(key, CipherMode::default(), PaddingMode::default())
    }

    /// Construct a provider with an explicit mode and padding selection.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::UnsupportedKeySize`] if `key` is not 16,
    /// 24 or 32 bytes.
    pub fn with_modes(
        key: &[u8],
        mode: CipherMode,
        padding: PaddingMode,
    ) -> Result<Self, EncryptionError> {
        let size = KeySize::from_key_len(key.len())?;
        Ok(Self {
            key: key.to_vec(),
            size,
            mode,
            padding,
        })
    }

    /// Construct a default-configured provider from generated key material.
    ///
    /// Infallible: the key length inside [`KeyMaterial`] is already
    /// validated. Only the key bytes are taken; the material's default IV is
    /// deliberately ignored in favour of a fresh IV per encryption.
    pub fn from_key_material(material: &KeyMaterial) -> Self {
        Self {
            key: material.key().to_vec(),
            size: material.size(),
            mode: CipherMode::default(),
            padding: PaddingMode::default(),
        }
    }

    /// The configured chaining mode.
    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    /// The configured padding scheme.
    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    /// The key strength this provider was constructed with.
    pub fn key_size(&self) -> KeySize {
        self.size
    }

    fn apply_encrypt(
        &self,
        iv: &[u8; BLOCK_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, EncryptionError> {
        match (self.mode, self.size) {
            (CipherMode::Cbc, KeySize::Bits128) => {
                cbc_encrypt::<aes::Aes128>(&self.key, iv, self.padding, plaintext)
            }
            (CipherMode::Cbc, KeySize::Bits192) => {
                cbc_encrypt::<aes::Aes192>(&self.key, iv, self.padding, plaintext)
            }
            (CipherMode::Cbc, KeySize::Bits256) => {
                cbc_encrypt::<aes::Aes256>(&self.key, iv, self.padding, plaintext)
            }
            (CipherMode::Ecb, KeySize::Bits128) => {
                ecb_encrypt::<aes::Aes128>(&self.key, self.padding, plaintext)
            }
            (CipherMode::Ecb, KeySize::Bits192) => {
                ecb_encrypt::<aes::Aes192>(&self.key, self.padding, plaintext)
            }
            (CipherMode::Ecb, KeySize::Bits256) => {
                ecb_encrypt::<aes::Aes256>(&self.key, self.padding, plaintext)
            }
        }
    }

    fn apply_decrypt(
        &self,
        iv: &[u8; BLOCK_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, EncryptionError> {
        match (self.mode, self.size) {
            (CipherMode::Cbc, KeySize::Bits128) => {
                cbc_decrypt::<aes::Aes128>(&self.key, iv, self.padding, ciphertext)
            }
            (CipherMode::Cbc, KeySize::Bits192) => {
                cbc_decrypt::<aes::Aes192>(&self.key, iv, self.padding, ciphertext)
            }
            (CipherMode::Cbc, KeySize::Bits256) => {
                cbc_decrypt::<aes::Aes256>(&self.key, iv, self.padding, ciphertext)
            }
            (CipherMode::Ecb, KeySize::Bits128) => {
                ecb_decrypt::<aes::Aes128>(&self.key, self.padding, ciphertext)
            }
            (CipherMode::Ecb, KeySize::Bits192) => {
                ecb_decrypt::<aes::Aes192>(&self.key, self.padding, ciphertext)
            }
            (CipherMode::Ecb, KeySize::Bits256) => {
                ecb_decrypt::<aes::Aes256>(&self.key, self.padding, ciphertext)
            }
        }
    }
}

impl EncryptionProvider for AesProvider {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        // Fresh IV per call via the OS CSPRNG. Never reused, never stored.
        let mut iv = [0u8; BLOCK_LEN];
        OsRng.fill_bytes(&mut iv);
        let ciphertext = self.apply_encrypt(&iv, plaintext)?;
        Ok(EncryptedPayload { iv, ciphertext }.into_bytes())
    }

    fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        let parsed = EncryptedPayload::from_bytes(payload)?;
        if parsed.ciphertext.len() % BLOCK_LEN != 0 {
            return Err(EncryptionError::InvalidCiphertext(format!(
                "ciphertext length {} is not a multiple of the {BLOCK_LEN}-byte block size",
                parsed.ciphertext.len()
            )));
        }
        self.apply_decrypt(&parsed.iv, &parsed.ciphertext)
    }
}

impl std::fmt::Debug for AesProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.debug_struct("AesProvider")
            .field("key", &"[REDACTED]")
            .field("size", &self.size)
            .field("mode", &self.mode)
            .field("padding", &self.padding)
            .finish()
    }
}

impl Drop for AesProvider {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Key-length mismatch inside a cipher constructor. Unreachable because the
/// length is validated at provider construction.
fn internal_invariant() -> EncryptionError {
    EncryptionError::CryptoOperationFailed("cipher rejected validated key material".into())
}

fn cbc_encrypt<C>(
    key: &[u8],
    iv: &[u8],
    padding: PaddingMode,
    plaintext: &[u8],
) -> Result<Vec<u8>, EncryptionError>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let enc = cbc::Encryptor::<C>::new_from_slices(key, iv).map_err(|_| internal_invariant())?;
    Ok(match padding {
        PaddingMode::Pkcs7 => enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        PaddingMode::Zeros => enc.encrypt_padded_vec_mut::<ZeroPadding>(plaintext),
    })
}

fn cbc_decrypt<C>(
    key: &[u8],
    iv: &[u8],
    padding: PaddingMode,
    ciphertext: &[u8],
) -> Result<Vec<u8>, EncryptionError>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let dec = cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| internal_invariant())?;
    let out = match padding {
        PaddingMode::Pkcs7 => dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        PaddingMode::Zeros => dec.decrypt_padded_vec_mut::<ZeroPadding>(ciphertext),
    };
    out.map_err(|_| EncryptionError::CryptoOperationFailed("padding validation failed".into()))
}

fn ecb_encrypt<C>(
    key: &[u8],
    padding: PaddingMode,
    plaintext: &[u8],
) -> Result<Vec<u8>, EncryptionError>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let enc = ecb::Encryptor::<C>::new_from_slice(key).map_err(|_| internal_invariant())?;
    Ok(match padding {
        PaddingMode::Pkcs7 => enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        PaddingMode::Zeros => enc.encrypt_padded_vec_mut::<ZeroPadding>(plaintext),
    })
}

fn ecb_decrypt<C>(
    key: &[u8],
    padding: PaddingMode,
    ciphertext: &[u8],
) -> Result<Vec<u8>, EncryptionError>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let dec = ecb::Decryptor::<C>::new_from_slice(key).map_err(|_| internal_invariant())?;
    let out = match padding {
        PaddingMode::Pkcs7 => dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        PaddingMode::Zeros => dec.decrypt_padded_vec_mut::<ZeroPadding>(ciphertext),
    };
    out.map_err(|_| EncryptionError::CryptoOperationFailed("padding validation failed".into()))
}
