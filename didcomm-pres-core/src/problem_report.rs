//! Problem reports sent back when a present-proof message is rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::types::{MessageId, PRES_20_PROBLEM_REPORT};

/// Supported reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemReportReason {
    /// The exchange was abandoned
    Abandoned,
    /// Formats and attachments did not line up
    FormatsAttachmentsMismatch,
    /// An attachment failed its format's validation
    AttachmentValidationFailed,
    /// The message could not be decoded
    MessageParseFailure,
}

impl ProblemReportReason {
    const ALL: [Self; 4] = [
        Self::Abandoned,
        Self::FormatsAttachmentsMismatch,
        Self::AttachmentValidationFailed,
        Self::MessageParseFailure,
    ];

    /// The wire code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Abandoned => "abandoned",
            Self::FormatsAttachmentsMismatch => "formats_attachments_mismatch",
            Self::AttachmentValidationFailed => "attachment_validation_failed",
            Self::MessageParseFailure => "message_parse_failure",
        }
    }

    /// Looks up a wire code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|reason| reason.code() == code)
    }

    /// The reason matching a rejection error.
    #[must_use]
    pub fn for_error(error: &Error) -> Self {
        match error {
            e if e.is_structural() => Self::FormatsAttachmentsMismatch,
            Error::FormatValidation { .. } | Error::IntegrityMismatch { .. } => {
                Self::AttachmentValidationFailed
            }
            _ => Self::MessageParseFailure,
        }
    }
}

/// Thread decorator linking a reply to the message it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// ID of the thread's first message
    pub thid: String,
}

/// A present-proof problem report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemReport {
    /// The message ID
    #[serde(rename = "@id", default)]
    pub id: MessageId,
    /// The message type
    #[serde(rename = "@type", default = "problem_report_type")]
    pub typ: String,
    /// Reason code under `code`, plus localized text keyed by locale
    #[serde(default)]
    pub description: BTreeMap<String, String>,
    /// Thread of the rejected message
    #[serde(rename = "~thread", default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<Thread>,
}

fn problem_report_type() -> String {
    PRES_20_PROBLEM_REPORT.to_string()
}

impl ProblemReport {
    /// Create a report with a reason code and English text.
    #[must_use]
    pub fn new(reason: ProblemReportReason, text: impl Into<String>) -> Self {
        let description = BTreeMap::from([
            ("code".to_string(), reason.code().to_string()),
            ("en".to_string(), text.into()),
        ]);
        Self {
            id: MessageId::random(),
            typ: problem_report_type(),
            description,
            thread: None,
        }
    }

    /// Reports `error` as the reason `rejected` was not accepted.
    ///
    /// The text names the offending attachment or format when there is one.
    #[must_use]
    pub fn from_error(error: &Error, rejected: Option<&MessageId>) -> Self {
        let text = match error.offending_identifier() {
            Some(id) => format!("{error} (identifier: {id})"),
            None => error.to_string(),
        };
        Self::new(ProblemReportReason::for_error(error), text).in_thread(rejected)
    }

    /// Attach the thread of `message`.
    #[must_use]
    pub fn in_thread(mut self, message: Option<&MessageId>) -> Self {
        self.thread = message.map(|id| Thread {
            thid: id.as_str().to_string(),
        });
        self
    }

    /// The reason code, if present.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.description.get("code").map(String::as_str)
    }

    /// Checks a received report.
    ///
    /// A code outside [`ProblemReportReason`] is accepted but logged.
    ///
    /// # Errors
    ///
    /// Returns an error if `description.code` is absent or empty.
    pub fn validate(&self) -> Result<()> {
        let code = self
            .code()
            .filter(|code| !code.is_empty())
            .ok_or(Error::MissingField("description.code"))?;

        if ProblemReportReason::from_code(code).is_none() {
            let text = self
                .description
                .iter()
                .find(|(locale, _)| locale.as_str() != "code")
                .map_or("", |(_, text)| text.as_str());
            warn!(code, description = text, "Unexpected problem report code received");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_report_from_missing_attachment() {
        let rejected = MessageId::new("req-1");
        let report = ProblemReport::from_error(&Error::MissingAttachment("a1".into()), Some(&rejected));

        assert_eq!(report.code(), Some("formats_attachments_mismatch"));
        assert!(report.description["en"].contains("a1"));
        assert_eq!(report.thread.as_ref().unwrap().thid, "req-1");
    }

    #[test]
    fn test_report_from_format_failure() {
        let error = Error::FormatValidation {
            format: "known/1.0".into(),
            reason: FieldError::Missing("nonce".into()),
        };
        let report = ProblemReport::from_error(&error, None);

        assert_eq!(report.code(), Some("attachment_validation_failed"));
        assert!(report.description["en"].contains("known/1.0"));
        assert_eq!(report.thread, None);
    }

    #[test]
    fn test_wire_format() {
        let report = ProblemReport::new(ProblemReportReason::Abandoned, "gave up")
            .in_thread(Some(&MessageId::new("req-1")));
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["@type"], PRES_20_PROBLEM_REPORT);
        assert_eq!(value["description"], json!({"code": "abandoned", "en": "gave up"}));
        assert_eq!(value["~thread"]["thid"], "req-1");
    }

    #[test]
    fn test_validate_requires_code() {
        let report: ProblemReport =
            serde_json::from_value(json!({"@id": "pr-1", "description": {"en": "no code"}})).unwrap();
        assert!(matches!(
            report.validate(),
            Err(Error::MissingField("description.code"))
        ));
    }

    #[test]
    fn test_validate_accepts_unknown_code() {
        let report: ProblemReport = serde_json::from_value(json!({
            "@id": "pr-1",
            "description": {"code": "something_else", "en": "?"}
        }))
        .unwrap();
        assert!(report.validate().is_ok());
    }

    #[test]
    fn test_reason_codes_round_trip() {
        for reason in ProblemReportReason::ALL {
            assert_eq!(ProblemReportReason::from_code(reason.code()), Some(reason));
            assert_eq!(serde_json::to_value(reason).unwrap(), reason.code());
        }
    }
}
