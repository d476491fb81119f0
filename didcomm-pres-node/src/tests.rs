use didcomm_pres_core::formats::INDY_PROOF_REQUEST;
use didcomm_pres_core::types::{PRES_20, PRES_20_PROBLEM_REPORT, PRES_20_REQUEST};
use didcomm_pres_core::{
    AttachedFormats, Attachment, FieldError, FormatDescriptor, MessageId, Presentation,
    PresentationRequest, ProblemReport, ProblemReportReason, RequestOptions, Stage,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::handler::{HandlerHandle, InboundMessage};
use crate::mock::{indy_request, invalid_dif_request, registry};
use crate::node::{NodeConfig, PresentationNode, Reception};

fn rejected(reception: Reception) -> ProblemReport {
    match reception {
        Reception::Rejected(report) => report,
        Reception::Accepted(message) => panic!("unexpected acceptance of {message:?}"),
    }
}

#[tokio::test]
async fn test_rejection_names_format_and_thread() {
    let node = PresentationNode::new(NodeConfig::default(), registry());
    let request = invalid_dif_request();

    let report = rejected(node.receive(&serde_json::to_vec(&request).unwrap()).await.unwrap());

    assert_eq!(report.code(), Some(ProblemReportReason::AttachmentValidationFailed.code()));
    assert!(report.description["en"].contains("dif/presentation-exchange/definitions@v1.0"));
    assert_eq!(report.thread.unwrap().thid, request.id().as_str());
}

#[tokio::test]
async fn test_cardinality_mismatch_is_rejected() {
    let node = PresentationNode::new(NodeConfig::default(), registry());
    let wire = json!({
        "@id": "req-1",
        "@type": PRES_20_REQUEST,
        "formats": [
            {"attach_id": "a1", "format": "unknown/1.0"},
            {"attach_id": "a2", "format": "unknown/1.0"}
        ],
        "request_presentations~attach": [
            {"@id": "a1", "data": {"json": {}}}
        ]
    });

    let report = rejected(node.decode(wire.to_string().as_bytes()).unwrap());
    assert_eq!(report.code(), Some("formats_attachments_mismatch"));
}

#[tokio::test]
async fn test_unknown_formats_are_accepted() {
    let node = PresentationNode::new(NodeConfig::default(), registry());
    let presentation = Presentation::new(None)
        .with_format("vendor/proof@v9", Attachment::json("p1", json!("opaque")));

    let reception = node.decode(&serde_json::to_vec(&presentation).unwrap()).unwrap();

    let Reception::Accepted(InboundMessage::Presentation(accepted)) = reception else {
        panic!("expected an accepted presentation");
    };
    assert_eq!(accepted.typ, PRES_20);
}

#[tokio::test]
async fn test_plugin_registered_while_running() {
    let node = PresentationNode::new(NodeConfig::default(), registry());
    let request = PresentationRequest::new(RequestOptions::default())
        .with_format("vendor/req@v1", Attachment::json("v1", json!({"wanted": false})));
    let packed = serde_json::to_vec(&request).unwrap();

    assert!(matches!(node.decode(&packed).unwrap(), Reception::Accepted(_)));

    node.registry().register("vendor/req@v1", |stage: Stage, content: &Value| {
        if stage == Stage::Request && content["wanted"] != json!(true) {
            return Err(FieldError::Invalid {
                field: "wanted".into(),
                reason: "must be true".into(),
            });
        }
        Ok(())
    });

    let report = rejected(node.decode(&packed).unwrap());
    assert!(report.description["en"].contains("vendor/req@v1"));
}

#[tokio::test]
async fn test_unsupported_and_malformed_input() {
    let node = PresentationNode::new(NodeConfig::default(), registry());

    let report = rejected(node.decode(b"not json").unwrap());
    assert_eq!(report.code(), Some("message_parse_failure"));
    assert_eq!(report.thread, None);

    let wire = json!({"@id": "x-1", "@type": "https://didcomm.org/basicmessage/2.0/message"});
    let report = rejected(node.decode(wire.to_string().as_bytes()).unwrap());
    assert_eq!(report.code(), Some("message_parse_failure"));
    assert_eq!(report.thread.unwrap().thid, "x-1");
}

#[tokio::test]
async fn test_problem_reports_are_routed() {
    let mut node = PresentationNode::new(NodeConfig::default(), registry());
    let mut reports = node.subscribe(PRES_20_PROBLEM_REPORT);
    let report = ProblemReport::new(ProblemReportReason::Abandoned, "no longer needed")
        .in_thread(Some(&MessageId::new("req-1")));

    let reception = node.receive(&serde_json::to_vec(&report).unwrap()).await.unwrap();
    assert!(matches!(reception, Reception::Accepted(InboundMessage::ProblemReport(_))));

    assert_eq!(reports.recv().await.unwrap(), InboundMessage::ProblemReport(report));
}

#[tokio::test]
async fn test_every_handler_receives_a_copy() {
    let mut node = PresentationNode::new(NodeConfig::default(), registry());
    let (first, mut first_rx) = HandlerHandle::channel(1);
    let (closed, closed_rx) = HandlerHandle::channel(1);
    let (last, mut last_rx) = HandlerHandle::channel(1);
    drop(closed_rx);
    node.register_handler(PRES_20_REQUEST, first);
    node.register_handler(PRES_20_REQUEST, closed);
    node.register_handler(PRES_20_REQUEST, last);

    let request = indy_request();
    node.receive(&serde_json::to_vec(&request).unwrap()).await.unwrap();

    for rx in [&mut first_rx, &mut last_rx] {
        let InboundMessage::Request(received) = rx.recv().await.unwrap() else {
            panic!("expected a request");
        };
        assert_eq!(
            received
                .attachment(&node.registry().snapshot(), Some(INDY_PROOF_REQUEST))
                .unwrap()
                .unwrap()["nonce"],
            "1234567890"
        );
    }
}

#[tokio::test]
async fn test_strict_correlation_from_config() {
    let config = NodeConfig::from_json(r#"{"validation": {"correlation": "strict"}}"#).unwrap();
    let node = PresentationNode::new(config, registry());
    let request = PresentationRequest::from_parts(
        MessageId::new("req-dup"),
        RequestOptions::default(),
        vec![
            FormatDescriptor::new("a1", "unknown/1.0"),
            FormatDescriptor::new("a2", "unknown/1.0"),
        ],
        vec![
            Attachment::json("a1", json!({})),
            Attachment::json("a1", json!({})),
        ],
    );

    let report = rejected(node.decode(&serde_json::to_vec(&request).unwrap()).unwrap());
    assert_eq!(report.code(), Some("formats_attachments_mismatch"));
    assert!(report.description["en"].contains("a1"));
}
