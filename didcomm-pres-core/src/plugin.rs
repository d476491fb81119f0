//! Plugin traits for format validation and request signing.
//!
//! Format plugins implement [`FormatValidator`] and are registered against a
//! namespaced format identifier in a [`FormatRegistry`](crate::registry::FormatRegistry).
//! Signing is delegated to a [`Signer`] so that key handling stays outside
//! this crate.
//!
//! # Examples
//!
//! Implementing a format validator:
//!
//! ```rust
//! use didcomm_pres_core::plugin::FormatValidator;
//! use didcomm_pres_core::{FieldError, Stage};
//! use serde_json::Value;
//!
//! struct NonceRequired;
//!
//! impl FormatValidator for NonceRequired {
//!     fn validate_fields(&self, _stage: Stage, content: &Value) -> Result<(), FieldError> {
//!         content
//!             .get("nonce")
//!             .map(|_| ())
//!             .ok_or_else(|| FieldError::Missing("nonce".into()))
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{FieldError, Result};
use crate::types::Stage;

/// Validates the decoded content of attachments declared with one format.
pub trait FormatValidator: Send + Sync {
    /// Checks that `content` carries what `stage` requires for this format.
    ///
    /// # Errors
    ///
    /// Returns the first field that is missing or unusable.
    fn validate_fields(&self, stage: Stage, content: &Value) -> std::result::Result<(), FieldError>;
}

impl<F> FormatValidator for F
where
    F: Fn(Stage, &Value) -> std::result::Result<(), FieldError> + Send + Sync,
{
    fn validate_fields(&self, stage: Stage, content: &Value) -> std::result::Result<(), FieldError> {
        self(stage, content)
    }
}

/// Signs message bytes on behalf of a DID.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Signs data using the key of `key_id`.
    ///
    /// # Arguments
    /// * `data` - The data to sign
    /// * `key_id` - The DID or key ID to sign with
    ///
    /// # Errors
    /// - If the key is not found
    /// - If signing fails
    async fn sign(&self, data: &[u8], key_id: &str) -> Result<Vec<u8>>;
}
