//! Inbound present-proof node.
//!
//! This crate wraps the validation in `didcomm-pres-core` into a node that:
//! - Receives raw present-proof messages
//! - Validates formats and attachments before anything else sees them
//! - Routes accepted messages to tokio handler channels
//! - Answers rejected messages with problem reports
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//! - `node`: The receiving node and its configuration
//! - `handler`: Handler channels and the accepted message type
//! - `error`: Error types and handling
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use didcomm_pres_core::{FormatRegistry, SharedFormatRegistry};
//! use didcomm_pres_node::{NodeConfig, PresentationNode};
//!
//! # async fn example(packed: &[u8]) -> didcomm_pres_node::Result<()> {
//! let registry = Arc::new(SharedFormatRegistry::new(FormatRegistry::with_defaults()));
//! let node = PresentationNode::new(NodeConfig::default(), registry);
//!
//! let reception = node.receive(packed).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handler;
pub mod node;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use handler::{HandlerHandle, InboundMessage};
pub use node::{NodeConfig, PresentationNode, Reception};
