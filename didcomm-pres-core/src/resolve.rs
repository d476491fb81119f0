//! Content resolution: which attachment a caller gets for a format.

use serde_json::Value;
use tracing::debug;

use crate::correlate::CorrelationPolicy;
use crate::error::Result;
use crate::message::AttachedFormats;
use crate::registry::FormatRegistry;
use crate::types::FormatDescriptor;
use crate::validation::embedded_content;

/// Returns the decoded content bound to `target`, or to the first declared
/// format known to `registry` when `target` is `None`.
///
/// Sender order acts as a preference list: with no target, the earliest
/// descriptor whose format has a validator wins. An absent format is a
/// normal negotiation outcome and yields `Ok(None)`. A format that is offered
/// but whose attachment carries no embedded content (links only) is an
/// error, not `None`.
///
/// # Errors
///
/// Returns an error if:
/// - The descriptors do not correlate with the attachments
/// - The selected attachment cannot be decoded or is links-only
pub fn resolve<M: AttachedFormats>(
    message: &M,
    registry: &FormatRegistry,
    target: Option<&str>,
) -> Result<Option<Value>> {
    let correlation = message.correlate(CorrelationPolicy::default())?;

    let selected = match target {
        Some(format) => select_format(message.formats(), format),
        None => select_known(message.formats(), registry),
    };
    let Some(descriptor) = selected else {
        debug!(
            message_id = message.id().as_str(),
            requested = ?target,
            "No attachment resolved"
        );
        return Ok(None);
    };

    debug!(
        message_id = message.id().as_str(),
        format = %descriptor.format,
        attach_id = %descriptor.attach_id,
        "Resolved attachment"
    );
    match correlation.get(&descriptor.attach_id) {
        Some(attachment) => embedded_content(descriptor, attachment).map(Some),
        None => Ok(None),
    }
}

/// First descriptor declaring exactly `format`.
#[must_use]
pub fn select_format<'a>(formats: &'a [FormatDescriptor], format: &str) -> Option<&'a FormatDescriptor> {
    formats.iter().find(|descriptor| descriptor.format == format)
}

/// First descriptor, in sender order, whose format `registry` knows.
#[must_use]
pub fn select_known<'a>(
    formats: &'a [FormatDescriptor],
    registry: &FormatRegistry,
) -> Option<&'a FormatDescriptor> {
    formats
        .iter()
        .find(|descriptor| registry.is_known(&descriptor.format))
}
