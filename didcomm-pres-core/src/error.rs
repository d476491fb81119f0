//! Error types for the didcomm-pres-core crate.

use thiserror::Error;

/// Error type for the present-proof core library
#[derive(Debug, Error)]
pub enum Error {
    /// Number of format descriptors differs from the number of attachments
    #[error("Formats/attachments length mismatch: {expected} formats, {actual} attachments")]
    CardinalityMismatch {
        /// Number of format descriptors
        expected: usize,
        /// Number of attachments
        actual: usize,
    },
    /// A format descriptor references an attachment that is not present
    #[error("No attachment for attach_id {0} in formats")]
    MissingAttachment(String),
    /// Two attachments share an identifier (strict correlation only)
    #[error("Duplicate attachment identifier: {0}")]
    DuplicateAttachment(String),
    /// A registered format validator rejected its attachment's content
    #[error("Format {format} rejected attachment: {reason}")]
    FormatValidation {
        /// The format identifier whose validator failed
        format: String,
        /// The validator's reason
        reason: FieldError,
    },
    /// Attachment content did not hash to its declared sha256
    #[error("Integrity check failed for attachment {attach_id}")]
    IntegrityMismatch {
        /// The offending attachment identifier
        attach_id: String,
    },
    /// Invalid format error
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    /// Base64 decode error
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    /// Serialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    /// Signing error
    #[error("Signing error: {0}")]
    Signing(String),
}

impl Error {
    /// Returns the attachment or format identifier that caused the failure,
    /// when the error is tied to one.
    #[must_use]
    pub fn offending_identifier(&self) -> Option<&str> {
        match self {
            Self::MissingAttachment(id) | Self::DuplicateAttachment(id) => Some(id),
            Self::FormatValidation { format, .. } => Some(format),
            Self::IntegrityMismatch { attach_id } => Some(attach_id),
            _ => None,
        }
    }

    /// Whether the error concerns the shape of the envelope rather than the
    /// content of one format.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::CardinalityMismatch { .. }
                | Self::MissingAttachment(_)
                | Self::DuplicateAttachment(_)
        )
    }
}

/// Reason a format validator rejected attachment content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// A field required at this stage is absent
    #[error("missing required field {0}")]
    Missing(String),
    /// A field is present but unusable
    #[error("invalid field {field}: {reason}")]
    Invalid {
        /// The offending field
        field: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type for the present-proof core library
pub type Result<T> = std::result::Result<T, Error>;
