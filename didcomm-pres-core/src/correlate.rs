//! Correlation of format descriptors with attachments.
//!
//! Descriptors and attachments travel as two parallel lists whose order need
//! not match. Correlation pairs them by `attach_id` and is the structural
//! check every inbound message passes before any format is looked at.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{Attachment, FormatDescriptor};

/// How duplicate attachment identifiers are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationPolicy {
    /// The first attachment with a given identifier wins; later ones are
    /// ignored.
    #[default]
    FirstMatch,
    /// Duplicate identifiers reject the message.
    Strict,
}

/// Descriptors paired with the attachments they reference, in descriptor
/// order.
#[derive(Debug, Clone)]
pub struct Correlation<'a> {
    pairs: Vec<(&'a FormatDescriptor, &'a Attachment)>,
}

impl<'a> Correlation<'a> {
    /// Number of correlated descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the message declared no formats.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The attachment bound to `attach_id`.
    #[must_use]
    pub fn get(&self, attach_id: &str) -> Option<&'a Attachment> {
        self.pairs
            .iter()
            .find(|(descriptor, _)| descriptor.attach_id == attach_id)
            .map(|(_, attachment)| *attachment)
    }

    /// The attachment bound to the first descriptor declaring `format`.
    #[must_use]
    pub fn for_format(&self, format: &str) -> Option<&'a Attachment> {
        self.pairs
            .iter()
            .find(|(descriptor, _)| descriptor.format == format)
            .map(|(_, attachment)| *attachment)
    }

    /// Iterates over `(descriptor, attachment)` pairs in descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a FormatDescriptor, &'a Attachment)> + '_ {
        self.pairs.iter().copied()
    }
}

/// Pairs each descriptor with its attachment using the default policy.
///
/// # Errors
///
/// Returns an error if:
/// - The two lists differ in length
/// - A descriptor references an absent attachment
pub fn correlate<'a>(
    formats: &'a [FormatDescriptor],
    attachments: &'a [Attachment],
) -> Result<Correlation<'a>> {
    correlate_with(formats, attachments, CorrelationPolicy::default())
}

/// Pairs each descriptor with its attachment.
///
/// # Errors
///
/// Returns an error if:
/// - The two lists differ in length (checked before anything else)
/// - `policy` is [`CorrelationPolicy::Strict`] and two attachments share an
///   identifier
/// - A descriptor references an absent attachment
pub fn correlate_with<'a>(
    formats: &'a [FormatDescriptor],
    attachments: &'a [Attachment],
    policy: CorrelationPolicy,
) -> Result<Correlation<'a>> {
    if formats.len() != attachments.len() {
        return Err(Error::CardinalityMismatch {
            expected: formats.len(),
            actual: attachments.len(),
        });
    }

    let mut by_id: HashMap<&str, &Attachment> = HashMap::with_capacity(attachments.len());
    for attachment in attachments {
        match by_id.entry(attachment.id()) {
            Entry::Vacant(slot) => {
                slot.insert(attachment);
            }
            Entry::Occupied(_) if policy == CorrelationPolicy::Strict => {
                return Err(Error::DuplicateAttachment(attachment.id().to_string()));
            }
            Entry::Occupied(_) => {
                warn!("Ignoring duplicate attachment identifier: {}", attachment.id());
            }
        }
    }

    let pairs = formats
        .iter()
        .map(|descriptor| {
            by_id
                .get(descriptor.attach_id.as_str())
                .map(|attachment| (descriptor, *attachment))
                .ok_or_else(|| Error::MissingAttachment(descriptor.attach_id.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Correlated {} format descriptors", pairs.len());
    Ok(Correlation { pairs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn attachment(id: &str, marker: u32) -> Attachment {
        Attachment::json(id, json!({ "marker": marker }))
    }

    #[test]
    fn test_cardinality_mismatch_comes_first() {
        // a1 is also missing, but the length check must win.
        let formats = vec![
            FormatDescriptor::new("a1", "known/1.0"),
            FormatDescriptor::new("a2", "known/1.0"),
        ];
        let attachments = vec![attachment("zz", 0)];

        let err = correlate(&formats, &attachments).unwrap_err();
        assert!(matches!(
            err,
            Error::CardinalityMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_correlates_by_identifier_not_position() {
        let formats = vec![
            FormatDescriptor::new("a1", "f/1"),
            FormatDescriptor::new("a2", "f/2"),
        ];
        let attachments = vec![attachment("a2", 2), attachment("a1", 1)];

        let correlation = correlate(&formats, &attachments).unwrap();

        assert_eq!(correlation.len(), formats.len());
        assert_eq!(correlation.get("a1").unwrap().id(), "a1");
        assert_eq!(correlation.for_format("f/2").unwrap().id(), "a2");
        let order: Vec<_> = correlation.iter().map(|(d, _)| d.attach_id.as_str()).collect();
        assert_eq!(order, vec!["a1", "a2"]);
    }

    #[test]
    fn test_missing_attachment() {
        let formats = vec![FormatDescriptor::new("a1", "known/1.0")];
        let attachments = vec![attachment("a2", 0)];

        let err = correlate(&formats, &attachments).unwrap_err();
        assert!(matches!(err, Error::MissingAttachment(id) if id == "a1"));
    }

    #[test]
    fn test_duplicate_first_match_wins() {
        let formats = vec![
            FormatDescriptor::new("a1", "f/1"),
            FormatDescriptor::new("a1", "f/2"),
        ];
        let attachments = vec![attachment("a1", 1), attachment("a1", 2)];

        let correlation = correlate(&formats, &attachments).unwrap();
        let content = correlation.get("a1").unwrap().content().unwrap().unwrap();
        assert_eq!(content["marker"], 1);
    }

    #[test]
    fn test_duplicate_rejected_when_strict() {
        let formats = vec![
            FormatDescriptor::new("a1", "f/1"),
            FormatDescriptor::new("a2", "f/2"),
        ];
        let attachments = vec![attachment("a1", 1), attachment("a1", 2)];

        let err = correlate_with(&formats, &attachments, CorrelationPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::DuplicateAttachment(id) if id == "a1"));
    }

    #[test]
    fn test_empty_lists_correlate() {
        let correlation = correlate(&[], &[]).unwrap();
        assert!(correlation.is_empty());
    }
}
