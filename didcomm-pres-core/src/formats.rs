//! Built-in format validators.
//!
//! Two credential families ship with the crate: Hyperledger Indy
//! (`hlindy/...`) and DIF presentation exchange (`dif/...`). Each validator
//! only checks that the fields a stage needs are present with the right JSON
//! shape; semantic checks belong to the credential subsystems.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::FieldError;
use crate::plugin::FormatValidator;
use crate::registry::FormatRegistry;
use crate::types::Stage;

/// Indy proof request, carried by proposals and requests.
pub const INDY_PROOF_REQUEST: &str = "hlindy/proof-req@v2.0";
/// Indy proof, carried by presentations.
pub const INDY_PROOF: &str = "hlindy/proof@v2.0";
/// DIF presentation definition, carried by proposals and requests.
pub const DIF_PRES_DEFINITIONS: &str = "dif/presentation-exchange/definitions@v1.0";
/// DIF presentation submission, carried by presentations.
pub const DIF_PRES_SUBMISSION: &str = "dif/presentation-exchange/submission@v1.0";

/// Expected JSON shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Any value, including `null`
    Any,
    /// A JSON object
    Object,
    /// A JSON array
    Array,
    /// A JSON string
    String,
}

impl Kind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::String => value.is_string(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Any => "a value",
            Self::Object => "an object",
            Self::Array => "an array",
            Self::String => "a string",
        }
    }
}

/// Validator requiring a set of top-level keys per stage.
///
/// Stages without rules accept any JSON object.
#[derive(Debug, Clone, Default)]
pub struct RequiredKeys {
    rules: HashMap<Stage, Vec<(&'static str, Kind)>>,
}

impl RequiredKeys {
    /// Creates a validator with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `field` of shape `kind` at `stage`.
    #[must_use]
    pub fn require(mut self, stage: Stage, field: &'static str, kind: Kind) -> Self {
        self.rules.entry(stage).or_default().push((field, kind));
        self
    }
}

impl FormatValidator for RequiredKeys {
    fn validate_fields(&self, stage: Stage, content: &Value) -> Result<(), FieldError> {
        let object = content.as_object().ok_or_else(|| FieldError::Invalid {
            field: "$".into(),
            reason: "attachment content must be a JSON object".into(),
        })?;

        for (field, kind) in self.rules.get(&stage).into_iter().flatten() {
            let value = object
                .get(*field)
                .ok_or_else(|| FieldError::Missing((*field).to_string()))?;
            if !kind.accepts(value) {
                return Err(FieldError::Invalid {
                    field: (*field).to_string(),
                    reason: format!("expected {}", kind.describe()),
                });
            }
        }
        Ok(())
    }
}

/// Indy proof request validator: required keys plus a decimal nonce.
#[derive(Debug, Clone)]
pub struct IndyProofRequest {
    keys: RequiredKeys,
}

impl Default for IndyProofRequest {
    fn default() -> Self {
        let keys = [Stage::Proposal, Stage::Request]
            .into_iter()
            .fold(RequiredKeys::new(), |keys, stage| {
                keys.require(stage, "requested_attributes", Kind::Object)
                    .require(stage, "requested_predicates", Kind::Object)
            });
        Self { keys }
    }
}

impl FormatValidator for IndyProofRequest {
    fn validate_fields(&self, stage: Stage, content: &Value) -> Result<(), FieldError> {
        self.keys.validate_fields(stage, content)?;

        match content.get("nonce") {
            None => Ok(()),
            Some(Value::String(nonce))
                if !nonce.is_empty() && nonce.bytes().all(|b| b.is_ascii_digit()) =>
            {
                Ok(())
            }
            Some(_) => Err(FieldError::Invalid {
                field: "nonce".into(),
                reason: "expected a decimal string".into(),
            }),
        }
    }
}

/// Indy proof validator.
#[must_use]
pub fn indy_proof() -> RequiredKeys {
    RequiredKeys::new()
        .require(Stage::Presentation, "proof", Kind::Object)
        .require(Stage::Presentation, "requested_proof", Kind::Object)
        .require(Stage::Presentation, "identifiers", Kind::Array)
}

/// DIF presentation definition validator.
#[must_use]
pub fn dif_definitions() -> RequiredKeys {
    RequiredKeys::new()
        .require(Stage::Proposal, "input_descriptors", Kind::Array)
        .require(Stage::Request, "presentation_definition", Kind::Object)
}

/// DIF presentation submission validator.
#[must_use]
pub fn dif_submission() -> RequiredKeys {
    RequiredKeys::new()
        .require(Stage::Presentation, "@context", Kind::Any)
        .require(Stage::Presentation, "type", Kind::Any)
        .require(Stage::Presentation, "presentation_submission", Kind::Object)
}

/// Registers every built-in validator.
pub fn register_defaults(registry: &mut FormatRegistry) {
    registry.register(INDY_PROOF_REQUEST, IndyProofRequest::default());
    registry.register(INDY_PROOF, indy_proof());
    registry.register(DIF_PRES_DEFINITIONS, dif_definitions());
    registry.register(DIF_PRES_SUBMISSION, dif_submission());
}
