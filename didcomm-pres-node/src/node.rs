//! Inbound present-proof node.
//!
//! The node is the trust boundary for present-proof traffic. It:
//! - Rejects oversized input before parsing
//! - Decodes the message and selects its kind from `@type`
//! - Validates formats and attachments against the current registry snapshot
//! - Routes accepted messages to the handlers registered for their type
//! - Turns every rejection into a problem report threaded to the rejected
//!   message
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use didcomm_pres_core::{FormatRegistry, SharedFormatRegistry};
//! use didcomm_pres_core::types::PRES_20_REQUEST;
//! use didcomm_pres_node::{NodeConfig, PresentationNode, Reception};
//!
//! async fn example(packed: &[u8]) -> didcomm_pres_node::Result<()> {
//!     let registry = Arc::new(SharedFormatRegistry::new(FormatRegistry::with_defaults()));
//!     let mut node = PresentationNode::new(NodeConfig::default(), registry);
//!     let mut requests = node.subscribe(PRES_20_REQUEST);
//!
//!     if let Reception::Rejected(report) = node.receive(packed).await? {
//!         println!("{}", serde_json::to_string(&report)?);
//!     }
//!     let _request = requests.recv().await;
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use didcomm_pres_core::types::PRES_20_PROBLEM_REPORT;
use didcomm_pres_core::{
    FormatRegistry, MessageId, ProblemReport, ProblemReportReason, SharedFormatRegistry, Stage,
    Validated, ValidationConfig,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::handler::{HandlerHandle, InboundMessage};

/// Configuration for a present-proof node.
///
/// # Examples
///
/// ```rust
/// use didcomm_pres_node::NodeConfig;
///
/// let config = NodeConfig {
///     max_message_size: 64 * 1024,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// The maximum size of incoming messages in bytes
    pub max_message_size: usize,

    /// Capacity of channels created by [`PresentationNode::subscribe`]
    pub handler_capacity: usize,

    /// Validation settings applied to every inbound message
    pub validation: ValidationConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            max_message_size: 1024 * 1024, // 1MB
            handler_capacity: 32,
            validation: ValidationConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Parses a JSON configuration; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// Outcome of receiving a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reception {
    /// The message was validated and handed to its handlers
    Accepted(InboundMessage),
    /// The message was rejected; the report explains why
    Rejected(ProblemReport),
}

/// A node validating and routing inbound present-proof messages.
pub struct PresentationNode {
    /// The node's configuration
    config: NodeConfig,

    /// Registry of format validators
    registry: Arc<SharedFormatRegistry>,

    /// Registry of message handlers
    handlers: HashMap<String, Vec<HandlerHandle>>,
}

impl PresentationNode {
    /// Create a new node.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration for the node
    /// * `registry` - Format validators, possibly extended while running
    #[must_use]
    pub fn new(config: NodeConfig, registry: Arc<SharedFormatRegistry>) -> Self {
        info!(
            formats = registry.snapshot().len(),
            "Created present-proof node"
        );
        Self {
            config,
            registry,
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a specific message type.
    ///
    /// # Arguments
    ///
    /// * `msg_type` - The type of message to handle
    /// * `handler` - The handler that will process messages of this type
    pub fn register_handler(&mut self, msg_type: impl Into<String>, handler: HandlerHandle) {
        let msg_type = msg_type.into();
        info!("Registered handler for message type: {msg_type}");
        self.handlers.entry(msg_type).or_default().push(handler);
    }

    /// Registers a new channel for `msg_type` and returns its receiver.
    #[must_use]
    pub fn subscribe(&mut self, msg_type: impl Into<String>) -> mpsc::Receiver<InboundMessage> {
        let (handle, rx) = HandlerHandle::channel(self.config.handler_capacity);
        self.register_handler(msg_type, handle);
        rx
    }

    /// Decodes and validates a message without routing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the message exceeds the configured size limit.
    /// Every other problem is reported as [`Reception::Rejected`].
    pub fn decode(&self, bytes: &[u8]) -> Result<Reception> {
        if bytes.len() > self.config.max_message_size {
            return Err(Error::MessageTooLarge {
                size: bytes.len(),
                limit: self.config.max_message_size,
            });
        }

        let value: Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!("Rejected undecodable message: {e}");
                return Ok(Reception::Rejected(ProblemReport::new(
                    ProblemReportReason::MessageParseFailure,
                    format!("Invalid JSON: {e}"),
                )));
            }
        };

        let id = value
            .get("@id")
            .and_then(Value::as_str)
            .map(MessageId::new);
        let typ = value
            .get("@type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        debug!(message_type = %typ, message_id = ?id, "Decoding message");

        let registry = self.registry.snapshot();
        match self.classify(&typ, value, &registry) {
            Ok(message) => Ok(Reception::Accepted(message)),
            Err(e) => {
                warn!(message_type = %typ, error = %e, "Rejected message");
                let report = match e {
                    Error::Core(core) => ProblemReport::from_error(&core, id.as_ref()),
                    other => ProblemReport::new(
                        ProblemReportReason::MessageParseFailure,
                        other.to_string(),
                    )
                    .in_thread(id.as_ref()),
                };
                Ok(Reception::Rejected(report))
            }
        }
    }

    fn classify(&self, typ: &str, value: Value, registry: &FormatRegistry) -> Result<InboundMessage> {
        let config = &self.config.validation;
        if typ == PRES_20_PROBLEM_REPORT {
            let report: ProblemReport = serde_json::from_value(value)?;
            report.validate()?;
            return Ok(InboundMessage::ProblemReport(report));
        }

        let message = match Stage::from_message_type(typ) {
            Some(Stage::Proposal) => {
                InboundMessage::Proposal(Validated::from_value(value, registry, config)?)
            }
            Some(Stage::Request) => {
                InboundMessage::Request(Validated::from_value(value, registry, config)?)
            }
            Some(Stage::Presentation) => {
                InboundMessage::Presentation(Validated::from_value(value, registry, config)?)
            }
            None => {
                return Err(Error::InvalidFormat(format!(
                    "Unsupported message type: {typ:?}"
                )))
            }
        };
        Ok(message)
    }

    /// Process an incoming message.
    ///
    /// Accepted messages are delivered to every handler registered for their
    /// type. A handler that has gone away is logged and skipped.
    ///
    /// Delivery waits for channel capacity, so a live handler that stops
    /// draining its channel holds up this call and every later one. Size
    /// [`NodeConfig::handler_capacity`] for the slowest handler, or keep
    /// handlers draining and move slow work onto their own tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the message exceeds the configured size limit.
    pub async fn receive(&self, bytes: &[u8]) -> Result<Reception> {
        let reception = self.decode(bytes)?;

        if let Reception::Accepted(message) = &reception {
            info!(
                message_type = message.message_type(),
                message_id = message.id().as_str(),
                "Accepted message"
            );
            if let Some(handlers) = self.handlers.get(message.message_type()) {
                for handler in handlers {
                    if let Err(e) = handler.send(message.clone()).await {
                        error!("Failed to send message to handler: {e}");
                    }
                }
            }
        }

        Ok(reception)
    }

    /// Returns a reference to the node's configuration.
    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Returns the node's format registry.
    #[must_use]
    pub fn registry(&self) -> &SharedFormatRegistry {
        &self.registry
    }
}
