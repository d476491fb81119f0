//! Handler channels for validated present-proof messages.
//!
//! Handlers are plain tokio tasks owning the receiving half of an mpsc
//! channel. The node only ever sends messages that passed validation.

use didcomm_pres_core::{
    AttachedFormats, MessageId, Presentation, PresentationProposal, PresentationRequest,
    ProblemReport, Validated,
};
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// A message accepted by the node.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// A validated presentation proposal
    Proposal(Validated<PresentationProposal>),
    /// A validated presentation request
    Request(Validated<PresentationRequest>),
    /// A validated presentation
    Presentation(Validated<Presentation>),
    /// A problem report from the other party
    ProblemReport(ProblemReport),
}

impl InboundMessage {
    /// The DIDComm message type of the wrapped message.
    #[must_use]
    pub fn message_type(&self) -> &str {
        match self {
            Self::Proposal(m) => &m.typ,
            Self::Request(m) => &m.typ,
            Self::Presentation(m) => &m.typ,
            Self::ProblemReport(m) => &m.typ,
        }
    }

    /// The ID of the wrapped message.
    #[must_use]
    pub fn id(&self) -> &MessageId {
        match self {
            Self::Proposal(m) => m.id(),
            Self::Request(m) => m.id(),
            Self::Presentation(m) => m.id(),
            Self::ProblemReport(m) => &m.id,
        }
    }
}

/// Sending half of a handler's channel.
#[derive(Debug, Clone)]
pub struct HandlerHandle {
    tx: mpsc::Sender<InboundMessage>,
}

impl HandlerHandle {
    /// Wraps an existing sender.
    #[must_use]
    pub fn new(tx: mpsc::Sender<InboundMessage>) -> Self {
        Self { tx }
    }

    /// Creates a handle together with the receiver a handler task consumes.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<InboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Delivers a message, waiting for channel capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the handler's receiver was dropped.
    pub async fn send(&self, message: InboundMessage) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|e| Error::Handler(format!("handler closed: {}", e.0.id().as_str())))
    }

    /// Whether the handler has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
