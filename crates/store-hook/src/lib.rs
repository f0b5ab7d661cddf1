//! Persistence-boundary integration for field encryption.
//!
//! The host persistence layer builds one [`EntityModel`] per data context,
//! marking which property paths are encrypted and attaching exactly one
//! [`common::EncryptionProvider`]. Thereafter every write runs
//! [`EntityModel::apply_on_save`] and every read runs
//! [`EntityModel::apply_on_load`]; application code never sees the
//! transformation.
//!
//! Building a model that marks encrypted properties without supplying a
//! provider is a configuration error ([`common::EncryptionError::MissingProvider`]),
//! not a silent no-op.

pub mod convert;
pub mod model;

pub use model::{EncryptedPaths, EntityModel, ModelBuilder};
