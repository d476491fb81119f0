//! Validation of format-attached messages at the trust boundary.
//!
//! A message is either rejected as a whole or wrapped in [`Validated`]. There
//! is no way back from `Validated` to an unchecked message and no partially
//! validated state.

use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::correlate::CorrelationPolicy;
use crate::error::{Error, FieldError, Result};
use crate::message::AttachedFormats;
use crate::registry::FormatRegistry;
use crate::types::{Attachment, FormatDescriptor};

/// Validation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Treatment of duplicate attachment identifiers
    #[serde(default)]
    pub correlation: CorrelationPolicy,
}

/// Checks structure, then every attachment whose format is registered.
///
/// Unknown formats are skipped. The first failure aborts validation.
///
/// # Errors
///
/// Returns an error if:
/// - The formats and attachments differ in length
/// - A descriptor has no matching attachment
/// - A known format's attachment cannot be decoded or is rejected by its
///   validator
pub fn validate<M: AttachedFormats>(
    message: &M,
    registry: &FormatRegistry,
    config: &ValidationConfig,
) -> Result<()> {
    let correlation = message.correlate(config.correlation)?;

    for (descriptor, attachment) in correlation.iter() {
        let Some(validator) = registry.lookup(&descriptor.format) else {
            debug!(
                format = %descriptor.format,
                attach_id = %descriptor.attach_id,
                "Skipping unknown format"
            );
            continue;
        };

        let content = embedded_content(descriptor, attachment)?;
        validator
            .validate_fields(M::STAGE, &content)
            .map_err(|reason| Error::FormatValidation {
                format: descriptor.format.clone(),
                reason,
            })?;
    }

    debug!(
        message_id = message.id().as_str(),
        formats = correlation.len(),
        "Message validated"
    );
    Ok(())
}

/// Decoded content of `attachment`, attributed to the format it carries.
///
/// Malformed base64, non-JSON bytes and links-only data surface as
/// [`Error::FormatValidation`] on field `data`. A sha256 mismatch keeps its
/// own [`Error::IntegrityMismatch`].
pub(crate) fn embedded_content(
    descriptor: &FormatDescriptor,
    attachment: &Attachment,
) -> Result<Value> {
    let invalid_data = |reason: String| Error::FormatValidation {
        format: descriptor.format.clone(),
        reason: FieldError::Invalid {
            field: "data".into(),
            reason,
        },
    };

    match attachment.content() {
        Ok(Some(content)) => Ok(content),
        Ok(None) => Err(invalid_data("content is not embedded in the attachment".into())),
        Err(e @ Error::IntegrityMismatch { .. }) => Err(e),
        Err(e) => Err(invalid_data(format!(
            "attachment {} cannot be decoded: {e}",
            attachment.id()
        ))),
    }
}

/// A message that passed [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<M> {
    message: M,
}

impl<M: AttachedFormats> Validated<M> {
    /// Validates `message`, consuming it.
    ///
    /// # Errors
    ///
    /// See [`validate`].
    pub fn new(message: M, registry: &FormatRegistry, config: &ValidationConfig) -> Result<Self> {
        if let Err(e) = validate(&message, registry, config) {
            warn!(
                message_id = message.id().as_str(),
                error = %e,
                "Rejected message"
            );
            return Err(e);
        }
        Ok(Self { message })
    }

    /// Returns the inner message.
    #[must_use]
    pub fn into_inner(self) -> M {
        self.message
    }
}

impl<M: AttachedFormats + DeserializeOwned> Validated<M> {
    /// Decodes a wire message and validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not decode as `M` or fails
    /// [`validate`].
    pub fn from_value(value: Value, registry: &FormatRegistry, config: &ValidationConfig) -> Result<Self> {
        let message: M = serde_json::from_value(value)?;
        Self::new(message, registry, config)
    }
}

impl<M> Deref for Validated<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.message
    }
}

impl<M> AsRef<M> for Validated<M> {
    fn as_ref(&self) -> &M {
        &self.message
    }
}
