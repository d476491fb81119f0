//! Prelude module for commonly used types and traits.
//!
//! Import everything from this module with
//! `use didcomm_pres_core::prelude::*`.
//!
//! # Example
//!
//! ```rust
//! use didcomm_pres_core::prelude::*;
//!
//! fn example(registry: &FormatRegistry, wire: serde_json::Value) -> Result<()> {
//!     let request: Validated<PresentationRequest> =
//!         Validated::from_value(wire, registry, &ValidationConfig::default())?;
//!     let _content = request.attachment(registry, None)?;
//!     Ok(())
//! }
//! ```

// Re-export error types
pub use crate::error::{Error, FieldError, Result};

// Re-export core traits
pub use crate::message::AttachedFormats;
pub use crate::plugin::{FormatValidator, Signer};

// Re-export message types
pub use crate::message::{Presentation, PresentationProposal, PresentationRequest, RequestOptions};
pub use crate::problem_report::{ProblemReport, ProblemReportReason};
pub use crate::types::{Attachment, AttachmentData, FormatDescriptor, MessageId, Stage};

// Re-export engine entry points
pub use crate::correlate::{correlate, CorrelationPolicy};
pub use crate::registry::{FormatRegistry, SharedFormatRegistry};
pub use crate::signature::sign_request;
pub use crate::validation::{validate, Validated, ValidationConfig};
