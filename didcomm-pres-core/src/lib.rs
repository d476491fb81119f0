//! Format/attachment correlation and validation for present-proof messages.
//!
//! A present-proof message offers the same request in several credential
//! formats. It carries a `formats` list of descriptors, each naming an
//! attachment and the format its content follows, and a parallel list of
//! attachments. This crate checks that the two lists line up, validates each
//! attachment against the validator registered for its format, and hands the
//! decoded content of a chosen format to protocol logic.
//!
//! # Features
//!
//! - Correlation of descriptors and attachments by identifier, never by
//!   position
//! - A registry of per-format validators, with built-in Indy and DIF
//!   validators and snapshot-swap registration for plugins loaded late
//! - "First known format wins" content resolution following sender order
//! - All-or-nothing validation producing a [`Validated`] message
//! - Request signing through a pluggable [`Signer`]
//! - Problem reports naming the attachment or format that failed
//!
//! # Architecture
//!
//! The crate is organized into these main modules:
//! - `types`: Attachments, format descriptors, stages
//! - `registry`: Format identifier to validator mapping
//! - `correlate`: Structural pairing of descriptors and attachments
//! - `resolve`: Content lookup by format
//! - `validation`: The trust-boundary check
//! - `message`: Proposal, request and presentation messages
//! - `signature`: Request signing
//! - `problem_report`: Rejection reports
//!
//! # Examples
//!
//! ```rust
//! use didcomm_pres_core::formats::INDY_PROOF_REQUEST;
//! use didcomm_pres_core::{
//!     AttachedFormats, Attachment, FormatRegistry, PresentationRequest, RequestOptions,
//!     Validated, ValidationConfig,
//! };
//! use serde_json::json;
//!
//! fn example() -> didcomm_pres_core::Result<()> {
//!     let registry = FormatRegistry::with_defaults();
//!     let request = PresentationRequest::new(RequestOptions::default()).with_format(
//!         INDY_PROOF_REQUEST,
//!         Attachment::json(
//!             "indy",
//!             json!({"requested_attributes": {}, "requested_predicates": {}}),
//!         ),
//!     );
//!
//!     let validated = Validated::new(request, &registry, &ValidationConfig::default())?;
//!     let content = validated.attachment(&registry, None)?;
//!     assert!(content.is_some());
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod correlate;
pub mod error;
pub mod formats;
pub mod message;
pub mod plugin;
pub mod prelude;
pub mod problem_report;
pub mod registry;
pub mod resolve;
pub mod signature;
pub mod types;
pub mod validation;


pub use correlate::{correlate, correlate_with, Correlation, CorrelationPolicy};
pub use error::{Error, FieldError, Result};
pub use message::{
    AttachedFormats, Presentation, PresentationProposal, PresentationRequest, RequestOptions,
};
pub use plugin::{FormatValidator, Signer};
pub use problem_report::{ProblemReport, ProblemReportReason};
pub use registry::{FormatRegistry, SharedFormatRegistry};
pub use resolve::resolve;
pub use signature::sign_request;
pub use types::{Attachment, AttachmentData, FormatDescriptor, MessageId, Stage};
pub use validation::{validate, Validated, ValidationConfig};
