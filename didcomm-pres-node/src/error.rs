//! Error types for the didcomm-pres-node crate.

use thiserror::Error;

/// The main error type for didcomm-pres-node operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the core crate.
    #[error("Core error: {0}")]
    Core(#[from] didcomm_pres_core::Error),

    /// The inbound message exceeds the configured size limit.
    #[error("Message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge {
        /// Size of the received message
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// The input is not a message this node understands.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A handler could not take a message.
    #[error("Handler error: {0}")]
    Handler(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error occurred while reading configuration or input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for didcomm-pres-node operations.
pub type Result<T> = std::result::Result<T, Error>;
