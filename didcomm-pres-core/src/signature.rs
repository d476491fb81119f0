//! Signing of presentation requests on behalf of the verifier DID.

use tracing::debug;

use crate::error::{Error, Result};
use crate::message::{AttachedFormats, PresentationRequest};
use crate::plugin::Signer;

/// Signs `request` with the key of its `verifier_did` and attaches the
/// signature.
///
/// The signed bytes are [`PresentationRequest::signing_payload`], so any
/// signature already present is replaced rather than signed over.
///
/// # Errors
///
/// Returns an error if:
/// - The request has no `verifier_did`
/// - The request cannot be serialized
/// - The signer fails
pub async fn sign_request(request: &mut PresentationRequest, signer: &dyn Signer) -> Result<()> {
    let verifier = request
        .verifier_did
        .clone()
        .ok_or(Error::MissingField("verifier_did"))?;

    let payload = request.signing_payload()?;
    let signature = signer
        .sign(&payload, &verifier)
        .await
        .map_err(|e| Error::Signing(e.to_string()))?;

    request.attach_signature(&signature);
    debug!(
        message_id = request.id().as_str(),
        verifier = %verifier,
        "Signed presentation request"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RequestOptions;
    use crate::tests::MockTestSigner;
    use crate::types::Attachment;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request(verifier_did: Option<&str>) -> PresentationRequest {
        PresentationRequest::new(RequestOptions {
            verifier_did: verifier_did.map(str::to_string),
            ..RequestOptions::default()
        })
        .with_format("known/1.0", Attachment::json("a1", json!({"k": 1})))
    }

    #[tokio::test]
    async fn test_sign_request() -> Result<()> {
        let mut request = request(Some("did:example:verifier"));
        let unsigned = request.signing_payload()?;

        sign_request(&mut request, &MockTestSigner).await?;

        let signature = request.signature_bytes()?.unwrap();
        assert_eq!(signature, MockTestSigner::expected(&unsigned, "did:example:verifier"));
        assert_eq!(request.signing_payload()?, unsigned);
        Ok(())
    }

    #[tokio::test]
    async fn test_resigning_replaces_signature() -> Result<()> {
        let mut request = request(Some("did:example:verifier"));

        sign_request(&mut request, &MockTestSigner).await?;
        let first = request.signature().map(str::to_string);
        sign_request(&mut request, &MockTestSigner).await?;

        assert_eq!(request.signature().map(str::to_string), first);
        Ok(())
    }

    #[tokio::test]
    async fn test_verifier_did_required() {
        let mut request = request(None);

        let err = sign_request(&mut request, &MockTestSigner).await.unwrap_err();
        assert!(matches!(err, Error::MissingField("verifier_did")));
        assert_eq!(request.signature(), None);
    }
}
