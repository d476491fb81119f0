//! Present-proof messages carrying format-attached content.
//!
//! Every message of the family holds a `formats` list and a parallel list of
//! attachments under a message-specific key. [`AttachedFormats`] exposes both
//! lists so correlation, resolution and validation work on any of them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::correlate::{correlate_with, Correlation, CorrelationPolicy};
use crate::error::Result;
use crate::registry::FormatRegistry;
use crate::resolve;
use crate::types::{
    decode_base64, Attachment, FormatDescriptor, MessageId, Stage, PRES_20, PRES_20_PROPOSAL,
    PRES_20_REQUEST,
};

/// A message whose attachments are described by format descriptors.
pub trait AttachedFormats {
    /// The protocol stage this message belongs to.
    const STAGE: Stage;

    /// The message ID.
    fn id(&self) -> &MessageId;

    /// Declared format descriptors, in sender order.
    fn formats(&self) -> &[FormatDescriptor];

    /// Attachments referenced by the descriptors.
    fn attachments(&self) -> &[Attachment];

    /// Pairs descriptors with attachments.
    ///
    /// # Errors
    ///
    /// See [`correlate_with`].
    fn correlate(&self, policy: CorrelationPolicy) -> Result<Correlation<'_>> {
        correlate_with(self.formats(), self.attachments(), policy)
    }

    /// Decoded content for `format`, or for the first format known to
    /// `registry` when `format` is `None`.
    ///
    /// # Errors
    ///
    /// See [`resolve::resolve`].
    fn attachment(&self, registry: &FormatRegistry, format: Option<&str>) -> Result<Option<Value>>
    where
        Self: Sized,
    {
        resolve::resolve(self, registry, format)
    }
}

/// Optional fields of a presentation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Human-readable comment
    pub comment: Option<String>,
    /// Whether the verifier will send a confirmation ack
    pub will_confirm: bool,
    /// DID on whose behalf the request is issued
    pub verifier_did: Option<String>,
}

fn request_type() -> String {
    PRES_20_REQUEST.to_string()
}

fn proposal_type() -> String {
    PRES_20_PROPOSAL.to_string()
}

fn presentation_type() -> String {
    PRES_20.to_string()
}

/// A presentation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationRequest {
    /// The message ID
    #[serde(rename = "@id", default)]
    id: MessageId,
    /// The message type
    #[serde(rename = "@type", default = "request_type")]
    pub typ: String,
    /// Human-readable comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Whether the verifier will send a confirmation ack
    #[serde(default)]
    pub will_confirm: bool,
    /// DID of the verifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifier_did: Option<String>,
    /// Acceptable attachment formats
    formats: Vec<FormatDescriptor>,
    /// One attachment per acceptable format
    #[serde(rename = "request_presentations~attach")]
    attachments: Vec<Attachment>,
    /// Base64 signature for the verifier DID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
}

impl PresentationRequest {
    /// Create a new request with no formats.
    #[must_use]
    pub fn new(options: RequestOptions) -> Self {
        Self::from_parts(MessageId::random(), options, Vec::new(), Vec::new())
    }

    /// Assemble a request from already built parts.
    #[must_use]
    pub fn from_parts(
        id: MessageId,
        options: RequestOptions,
        formats: Vec<FormatDescriptor>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            id,
            typ: request_type(),
            comment: options.comment,
            will_confirm: options.will_confirm,
            verifier_did: options.verifier_did,
            formats,
            attachments,
            signature: None,
        }
    }

    /// Offer `attachment` under `format`.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>, attachment: Attachment) -> Self {
        self.formats
            .push(FormatDescriptor::new(attachment.id(), format));
        self.attachments.push(attachment);
        self
    }

    /// Stores `raw` as the request signature, base64 encoded.
    ///
    /// No other field is touched.
    pub fn attach_signature(&mut self, raw: &[u8]) {
        self.signature = Some(STANDARD.encode(raw));
    }

    /// The encoded signature, as carried on the wire.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Decodes the stored signature.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value is not base64.
    pub fn signature_bytes(&self) -> Result<Option<Vec<u8>>> {
        self.signature.as_deref().map(decode_base64).transpose()
    }

    /// Bytes a verifier signs: the request serialized without its signature.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn signing_payload(&self) -> Result<Vec<u8>> {
        let unsigned = Self {
            signature: None,
            ..self.clone()
        };
        Ok(serde_json::to_vec(&unsigned)?)
    }
}

impl AttachedFormats for PresentationRequest {
    const STAGE: Stage = Stage::Request;

    fn id(&self) -> &MessageId {
        &self.id
    }

    fn formats(&self) -> &[FormatDescriptor] {
        &self.formats
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

/// A presentation proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationProposal {
    /// The message ID
    #[serde(rename = "@id", default)]
    id: MessageId,
    /// The message type
    #[serde(rename = "@type", default = "proposal_type")]
    pub typ: String,
    /// Human-readable comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Proposed attachment formats
    formats: Vec<FormatDescriptor>,
    /// One attachment per proposed format
    #[serde(rename = "proposals~attach")]
    attachments: Vec<Attachment>,
}

impl PresentationProposal {
    /// Create a new proposal with no formats.
    #[must_use]
    pub fn new(comment: Option<String>) -> Self {
        Self {
            id: MessageId::random(),
            typ: proposal_type(),
            comment,
            formats: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Propose `attachment` under `format`.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>, attachment: Attachment) -> Self {
        self.formats
            .push(FormatDescriptor::new(attachment.id(), format));
        self.attachments.push(attachment);
        self
    }
}

impl AttachedFormats for PresentationProposal {
    const STAGE: Stage = Stage::Proposal;

    fn id(&self) -> &MessageId {
        &self.id
    }

    fn formats(&self) -> &[FormatDescriptor] {
        &self.formats
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

/// A presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    /// The message ID
    #[serde(rename = "@id", default)]
    id: MessageId,
    /// The message type
    #[serde(rename = "@type", default = "presentation_type")]
    pub typ: String,
    /// Human-readable comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Formats of the presented attachments
    formats: Vec<FormatDescriptor>,
    /// One attachment per format
    #[serde(rename = "presentations~attach")]
    attachments: Vec<Attachment>,
}

impl Presentation {
    /// Create a new presentation with no formats.
    #[must_use]
    pub fn new(comment: Option<String>) -> Self {
        Self {
            id: MessageId::random(),
            typ: presentation_type(),
            comment,
            formats: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Present `attachment` under `format`.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>, attachment: Attachment) -> Self {
        self.formats
            .push(FormatDescriptor::new(attachment.id(), format));
        self.attachments.push(attachment);
        self
    }
}

impl AttachedFormats for Presentation {
    const STAGE: Stage = Stage::Presentation;

    fn id(&self) -> &MessageId {
        &self.id
    }

    fn formats(&self) -> &[FormatDescriptor] {
        &self.formats
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_request() -> PresentationRequest {
        PresentationRequest::new(RequestOptions {
            comment: Some("please".into()),
            will_confirm: true,
            verifier_did: Some("did:example:verifier".into()),
        })
        .with_format("known/1.0", Attachment::json("a1", json!({"k": 1})))
    }

    #[test]
    fn test_request_wire_format() {
        let request = sample_request();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["@id"], request.id().as_str());
        assert_eq!(value["@type"], PRES_20_REQUEST);
        assert_eq!(value["comment"], "please");
        assert_eq!(value["will_confirm"], true);
        assert_eq!(value["verifier_did"], "did:example:verifier");
        assert_eq!(value["formats"], json!([{"attach_id": "a1", "format": "known/1.0"}]));
        assert_eq!(value["request_presentations~attach"][0]["@id"], "a1");
        assert!(value.get("signature").is_none());
    }

    #[test]
    fn test_request_defaults_on_decode() {
        let request: PresentationRequest = serde_json::from_value(json!({
            "@id": "req-1",
            "formats": [],
            "request_presentations~attach": [],
            "~thread": {"thid": "ignored"}
        }))
        .unwrap();

        assert_eq!(request.id().as_str(), "req-1");
        assert_eq!(request.typ, PRES_20_REQUEST);
        assert!(!request.will_confirm);
        assert_eq!(request.comment, None);
        assert_eq!(request.signature(), None);
    }

    #[test]
    fn test_formats_are_required_on_decode() {
        let result: std::result::Result<PresentationRequest, _> =
            serde_json::from_value(json!({"@id": "req-1", "request_presentations~attach": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_signature_round_trip() {
        let mut request = sample_request();
        let before = request.clone();
        let raw = [0_u8, 1, 2, 254, 255];

        request.attach_signature(&raw);

        assert_eq!(request.signature_bytes().unwrap(), Some(raw.to_vec()));
        assert_eq!(request.signing_payload().unwrap(), before.signing_payload().unwrap());
        assert_eq!(
            PresentationRequest {
                signature: None,
                ..request
            },
            before
        );
    }

    #[test]
    fn test_proposal_and_presentation_keys() {
        let proposal = PresentationProposal::new(None)
            .with_format("known/1.0", Attachment::json("p1", json!({})));
        let presentation =
            Presentation::new(None).with_format("known/1.0", Attachment::json("x1", json!({})));

        let proposal = serde_json::to_value(&proposal).unwrap();
        let presentation = serde_json::to_value(&presentation).unwrap();

        assert_eq!(proposal["@type"], PRES_20_PROPOSAL);
        assert_eq!(proposal["proposals~attach"][0]["@id"], "p1");
        assert_eq!(presentation["@type"], PRES_20);
        assert_eq!(presentation["presentations~attach"][0]["@id"], "x1");
    }
}
