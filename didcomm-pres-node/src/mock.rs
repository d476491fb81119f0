//! Shared fixtures for node tests.

use std::sync::Arc;

use didcomm_pres_core::formats::{DIF_PRES_DEFINITIONS, INDY_PROOF_REQUEST};
use didcomm_pres_core::{
    Attachment, FormatRegistry, PresentationRequest, RequestOptions, SharedFormatRegistry,
};
use serde_json::{json, Value};

/// A registry holding the built-in validators.
pub fn registry() -> Arc<SharedFormatRegistry> {
    Arc::new(SharedFormatRegistry::new(FormatRegistry::with_defaults()))
}

/// An Indy proof request body.
pub fn indy_proof_request() -> Value {
    json!({
        "name": "proof-req",
        "version": "1.0",
        "nonce": "1234567890",
        "requested_attributes": {"0_name_uuid": {"name": "name"}},
        "requested_predicates": {}
    })
}

/// A request offering an Indy proof request.
pub fn indy_request() -> PresentationRequest {
    PresentationRequest::new(RequestOptions {
        comment: Some("Proof of name".into()),
        will_confirm: true,
        verifier_did: Some("did:example:verifier".into()),
    })
    .with_format(
        INDY_PROOF_REQUEST,
        Attachment::base64_json("indy", &indy_proof_request()).unwrap(),
    )
}

/// A request whose DIF attachment lacks its presentation definition.
pub fn invalid_dif_request() -> PresentationRequest {
    PresentationRequest::new(RequestOptions::default()).with_format(
        DIF_PRES_DEFINITIONS,
        Attachment::json("dif", json!({"options": {}})),
    )
}
