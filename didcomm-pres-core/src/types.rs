//! Core present-proof type definitions.

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Message type URI of a presentation proposal.
pub const PRES_20_PROPOSAL: &str = "https://didcomm.org/present-proof/2.0/propose-presentation";
/// Message type URI of a presentation request.
pub const PRES_20_REQUEST: &str = "https://didcomm.org/present-proof/2.0/request-presentation";
/// Message type URI of a presentation.
pub const PRES_20: &str = "https://didcomm.org/present-proof/2.0/presentation";
/// Message type URI of a problem report.
pub const PRES_20_PROBLEM_REPORT: &str = "https://didcomm.org/present-proof/2.0/problem-report";

/// Represents a DIDComm message ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Create a new message ID
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a new random message ID
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the message ID as a string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::random()
    }
}

/// The protocol message being validated.
///
/// The same format identifier may require different fields depending on
/// whether its attachment travels in a proposal, a request or a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// `propose-presentation`
    Proposal,
    /// `request-presentation`
    Request,
    /// `presentation`
    Presentation,
}

impl Stage {
    /// The DIDComm message type URI for this stage.
    #[must_use]
    pub fn message_type(self) -> &'static str {
        match self {
            Self::Proposal => PRES_20_PROPOSAL,
            Self::Request => PRES_20_REQUEST,
            Self::Presentation => PRES_20,
        }
    }

    /// Looks up the stage carried by a message type URI.
    #[must_use]
    pub fn from_message_type(typ: &str) -> Option<Self> {
        [Self::Proposal, Self::Request, Self::Presentation]
            .into_iter()
            .find(|stage| stage.message_type() == typ)
    }
}

/// Declares which attachment carries which format variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Identifier of the attachment in the same message
    pub attach_id: String,
    /// Namespaced format identifier, e.g. `hlindy/proof-req@v2.0`
    pub format: String,
}

impl FormatDescriptor {
    /// Creates a descriptor binding `attach_id` to `format`.
    #[must_use]
    pub fn new(attach_id: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            attach_id: attach_id.into(),
            format: format.into(),
        }
    }
}

/// Represents a message attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// The attachment ID
    #[serde(rename = "@id")]
    id: String,
    /// The attachment media type
    #[serde(rename = "mime-type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// The attachment filename
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Last modification time, as sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastmod_time: Option<String>,
    /// Content size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_count: Option<u64>,
    /// The attachment description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The attachment data
    pub data: AttachmentData,
}

/// Represents attachment data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentData {
    /// Base64 data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    /// JSON data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    /// Links data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    /// Hex-encoded SHA-256 of the content bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// JWS data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jws: Option<Value>,
}

impl Attachment {
    /// Creates an attachment around already built data.
    #[must_use]
    pub fn new(id: impl Into<String>, data: AttachmentData) -> Self {
        Self {
            id: id.into(),
            mime_type: None,
            filename: None,
            lastmod_time: None,
            byte_count: None,
            description: None,
            data,
        }
    }

    /// Embeds `content` as JSON.
    #[must_use]
    pub fn json(id: impl Into<String>, content: Value) -> Self {
        let mut attachment = Self::new(
            id,
            AttachmentData {
                json: Some(content),
                ..AttachmentData::default()
            },
        );
        attachment.mime_type = Some("application/json".to_string());
        attachment
    }

    /// Serializes `content` and embeds it as standard base64, recording its
    /// size and sha256.
    ///
    /// # Errors
    ///
    /// Returns an error if `content` cannot be serialized.
    pub fn base64_json(id: impl Into<String>, content: &Value) -> Result<Self> {
        let bytes = serde_json::to_vec(content)?;
        let mut attachment = Self::new(
            id,
            AttachmentData {
                base64: Some(STANDARD.encode(&bytes)),
                sha256: Some(hex::encode(Sha256::digest(&bytes))),
                ..AttachmentData::default()
            },
        );
        attachment.mime_type = Some("application/json".to_string());
        attachment.byte_count = Some(bytes.len() as u64);
        Ok(attachment)
    }

    /// References content by links. Linked content is never fetched here.
    #[must_use]
    pub fn links(id: impl Into<String>, links: Vec<String>, sha256: impl Into<String>) -> Self {
        Self::new(
            id,
            AttachmentData {
                links: Some(links),
                sha256: Some(sha256.into()),
                ..AttachmentData::default()
            },
        )
    }

    /// The attachment identifier. Fixed at construction.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Decodes the attachment content.
    ///
    /// Embedded JSON is returned as is; base64 data is decoded and parsed as
    /// JSON. Links-only data yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The base64 payload is malformed
    /// - The decoded bytes do not match the declared sha256
    /// - The decoded bytes are not JSON
    pub fn content(&self) -> Result<Option<Value>> {
        if let Some(encoded) = &self.data.base64 {
            let bytes = decode_base64(encoded)?;
            self.check_integrity(&bytes)?;
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }
        Ok(self.data.json.clone())
    }

    fn check_integrity(&self, bytes: &[u8]) -> Result<()> {
        match &self.data.sha256 {
            Some(expected) if !expected.eq_ignore_ascii_case(&hex::encode(Sha256::digest(bytes))) => {
                Err(Error::IntegrityMismatch {
                    attach_id: self.id.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Decodes base64 in either the standard or the URL-safe alphabet.
pub(crate) fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .or_else(|_| URL_SAFE.decode(encoded))
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
        .map_err(Error::from)
}
