//! [`EntityModel`]: which properties of an entity are encrypted, and the
//! save/load hooks that transform them through the configured provider.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use common::{EncryptionError, EncryptionProvider};

use crate::convert;

/// The set of dot-notation property paths marked as encrypted in a model.
pub type EncryptedPaths = HashSet<String>;

/// Builder for an [`EntityModel`].
///
/// The host persistence layer registers the property paths it has decided to
/// encrypt (by attribute, convention, or configuration — that decision is the
/// host's) and attaches exactly one provider per data context.
pub struct ModelBuilder {
    encrypted: EncryptedPaths,
    provider: Option<Arc<dyn EncryptionProvider>>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            encrypted: EncryptedPaths::new(),
            provider: None,
        }
    }

    /// Mark a property path as encrypted.
    pub fn encrypted_property(mut self, path: impl Into<String>) -> Self {
        self.encrypted.insert(path.into());
        self
    }

    /// Attach the provider that will transform the marked properties.
    pub fn provider(mut self, provider: Arc<dyn EncryptionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Finalise the model.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::MissingProvider`] when one or more
    /// properties are marked encrypted but no provider was attached. A model
    /// with no encrypted properties needs no provider.
    pub fn build(self) -> Result<EntityModel, EncryptionError> {
        if !self.encrypted.is_empty() && self.provider.is_none() {
            return Err(EncryptionError::MissingProvider);
        }
        Ok(EntityModel {
            encrypted: self.encrypted,
            provider: self.provider,
        })
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated entity model: encrypted property paths plus the provider that
/// transforms them.
pub struct EntityModel {
    encrypted: EncryptedPaths,
    provider: Option<Arc<dyn EncryptionProvider>>,
}

impl std::fmt::Debug for EntityModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityModel")
            .field("encrypted", &self.encrypted)
            .finish_non_exhaustive()
    }
}

impl EntityModel {
    /// The property paths this model encrypts.
    pub fn encrypted_paths(&self) -> &EncryptedPaths {
        &self.encrypted
    }

    /// Encrypt every marked property of `record` in place. Called by the
    /// host immediately before a write.
    ///
    /// On failure the caller must abort the save rather than persist a
    /// record with mixed encrypted and plaintext properties.
    pub fn apply_on_save(&self, record: &mut serde_json::Value) -> Result<(), EncryptionError> {
        if self.encrypted.is_empty() {
            return Ok(());
        }
        // Build-time validation guarantees a provider whenever encrypted
        // paths exist; a missing one here is a configuration error, never a
        // silent no-op.
        let provider = self
            .provider
            .as_ref()
            .ok_or(EncryptionError::MissingProvider)?;
        let n = convert::transform_record(record, &self.encrypted, &|s| provider.encrypt_text(s))?;
        debug!(properties = n, "encrypted entity properties before save");
        Ok(())
    }

    /// Decrypt every marked property of `record` in place. Called by the
    /// host immediately after a read.
    pub fn apply_on_load(&self, record: &mut serde_json::Value) -> Result<(), EncryptionError> {
        if self.encrypted.is_empty() {
            return Ok(());
        }
        let provider = self
            .provider
            .as_ref()
            .ok_or(EncryptionError::MissingProvider)?;
        let n = convert::transform_record(record, &self.encrypted, &|s| provider.decrypt_text(s))?;
        debug!(properties = n, "decrypted entity properties after load");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use provider::{AesProvider, KeyMaterial, KeySize};
    use serde_json::json;

    mock! {
        Provider {}
        impl EncryptionProvider for Provider {
            fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError>;
            fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>, EncryptionError>;
        }
    }

    #[test]
    fn encrypted_properties_without_provider_fail_at_build() {
        let err = ModelBuilder::new()
            .encrypted_property("ssn")
            .build()
            .unwrap_err();
        assert!(matches!(err, EncryptionError::MissingProvider));
    }

    #[test]
    fn model_without_encrypted_properties_needs_no_provider() {
        let model = ModelBuilder::new().build().unwrap();
        let mut record = json!({"name": "Alice"});
        model.apply_on_save(&mut record).unwrap();
        assert_eq!(record["name"], "Alice");
    }

    #[test]
    fn save_invokes_provider_per_marked_property() {
        let mut mock = MockProvider::new();
        mock.expect_encrypt()
            .times(2)
            .returning(|pt| Ok(pt.to_vec()));
        let model = ModelBuilder::new()
            .encrypted_property("ssn")
            .encrypted_property("email")
            .provider(Arc::new(mock))
            .build()
            .unwrap();
        let mut record = json!({"ssn": "123-45-6789", "email": "a@b.c", "name": "Alice"});
        model.apply_on_save(&mut record).unwrap();
        assert_eq!(record["name"], "Alice");
        assert_ne!(record["ssn"], "123-45-6789");
    }

    #[test]
    fn provider_failure_aborts_save() {
        let mut mock = MockProvider::new();
        mock.expect_encrypt()
            .returning(|_| Err(EncryptionError::CryptoOperationFailed("boom".into())));
        let model = ModelBuilder::new()
            .encrypted_property("ssn")
            .provider(Arc::new(mock))
            .build()
            .unwrap();
        let mut record = json!({"ssn": "123-45-6789"});
        assert!(model.apply_on_save(&mut record).is_err());
    }

    #[test]
    fn save_then_load_round_trips_a_record() {
        let material = KeyMaterial::generate(KeySize::Bits256);
        let aes = Arc::new(AesProvider::from_key_material(&material));
        let model = ModelBuilder::new()
            .encrypted_property("ssn")
            .encrypted_property("cards[].number")
            .provider(aes)
            .build()
            .unwrap();

        let original = json!({
            "name": "Alice",
            "ssn": "123-45-6789",
            "nickname": null,
            "cards": [{"number": "4111111111111111"}]
        });
        let mut record = original.clone();

        model.apply_on_save(&mut record).unwrap();
        assert_ne!(record["ssn"], original["ssn"]);
        assert_ne!(record["cards"][0]["number"], original["cards"][0]["number"]);
        assert_eq!(record["name"], "Alice");
        assert_eq!(record["nickname"], serde_json::Value::Null);

        model.apply_on_load(&mut record).unwrap();
        assert_eq!(record, original);
    }

    #[test]
    fn load_with_wrong_key_does_not_return_plaintext() {
        let writer_key = KeyMaterial::generate(KeySize::Bits256);
        let reader_key = KeyMaterial::generate(KeySize::Bits256);
        let writer_model = ModelBuilder::new()
            .encrypted_property("ssn")
            .provider(Arc::new(AesProvider::from_key_material(&writer_key)))
            .build()
            .unwrap();
        let reader_model = ModelBuilder::new()
            .encrypted_property("ssn")
            .provider(Arc::new(AesProvider::from_key_material(&reader_key)))
            .build()
            .unwrap();

        let mut record = json!({"ssn": "123-45-6789"});
        writer_model.apply_on_save(&mut record).unwrap();

        match reader_model.apply_on_load(&mut record) {
            Err(_) => {}
            Ok(()) => assert_ne!(record["ssn"], "123-45-6789"),
        }
    }
}
