//! Error types for the client command surface and the message decoder.
//!
//! Two families live here:
//!
//! - [`ClientError`] is returned synchronously by every command issued through
//!   [`Client`](crate::Client) (open, close, register, request, set...).
//! - [`DecodeError`] is produced while decoding inbound blocks. It never escapes the
//!   dispatch loop as an error; the loop records it on the envelope as a
//!   [`DecodeFault`](crate::DecodeFault) and keeps running. The strict accessors
//!   (`MessageKind::try_from`, `SimObjectData::declared_value`) return it directly.
//!
//! Exceptions raised by the simulator itself are not local errors at all. They arrive
//! as decoded [`Payload::Exception`](crate::Payload::Exception) envelopes.
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use simwire::{ClientError, NativeStatus};
//!
//! let error = ClientError::native("request_data_on_sim_object", NativeStatus::E_FAIL);
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::transport::NativeStatus;

/// Result type alias for client operations.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Error returned by [`Client::open`](crate::Client::open).
pub type ConnectError = ClientError;
/// Error returned by [`Client::close`](crate::Client::close).
pub type CloseError = ClientError;
/// Error returned by [`Client::register`](crate::Client::register).
pub type RegisterError = ClientError;
/// Error returned by the request commands.
pub type RequestError = ClientError;
/// Error returned by [`Client::set_value`](crate::Client::set_value).
pub type SetError = ClientError;

/// Main error type for client commands.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClientError {
    #[error("Connection is already open")]
    AlreadyOpen,

    #[error("Connection is not open")]
    NotOpen,

    #[error("Native open failed with status {status}")]
    NativeOpen { status: NativeStatus },

    #[error("Native call {operation} failed with status {status}")]
    Native { operation: &'static str, status: NativeStatus },

    #[error("Definition {definition_id} has not been registered")]
    UnknownDefinition { definition_id: u32 },

    #[error("Value does not fit definition {definition_id}: {details}")]
    ValueMismatch { definition_id: u32, details: String },

    #[error("{operation} requires a running Tokio runtime")]
    NoRuntime { operation: &'static str },

    #[error("Configuration error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Configuration file error: {path}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::NativeOpen { .. } => true,
            ClientError::Native { .. } => true,
            ClientError::NotOpen => true,
            ClientError::AlreadyOpen => false,
            ClientError::UnknownDefinition { .. } => false,
            ClientError::ValueMismatch { .. } => false,
            ClientError::NoRuntime { .. } => false,
            ClientError::Config { .. } => false,
            ClientError::ConfigFile { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ClientError::AlreadyOpen => vec![
                "Close the existing connection before opening again",
                "Reuse the open client instead of opening a second time",
            ],
            ClientError::NotOpen => vec![
                "Call open() before issuing commands",
                "Check that the simulator is running and reachable",
            ],
            ClientError::NativeOpen { .. } => vec![
                "Ensure the simulator is running",
                "Verify the native library is installed and loadable",
                "Retry after the simulator finishes loading",
            ],
            ClientError::Native { .. } => vec![
                "Check that the connection is still alive",
                "Verify the IDs passed to the command",
                "Retry the command",
            ],
            ClientError::UnknownDefinition { .. } => vec![
                "Register the definition before using it",
                "Check the definition ID for typos",
            ],
            ClientError::ValueMismatch { .. } => vec![
                "Pass a value matching the registered data type",
                "Re-register the definition with the intended data type",
            ],
            ClientError::NoRuntime { .. } => vec![
                "Call this from within a Tokio runtime",
                "Use #[tokio::main] or Runtime::block_on",
            ],
            ClientError::Config { .. } => vec![
                "Check the configuration values against the documented ranges",
                "Remove the field to fall back to its default",
            ],
            ClientError::ConfigFile { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
        }
    }

    /// Helper constructor for native call failures.
    pub fn native(operation: &'static str, status: NativeStatus) -> Self {
        ClientError::Native { operation, status }
    }

    /// Helper constructor for configuration errors.
    pub fn config(context: impl Into<String>, details: impl Into<String>) -> Self {
        ClientError::Config { context: context.into(), details: details.into() }
    }

    /// Helper constructor for value/definition mismatches.
    pub fn value_mismatch(definition_id: u32, details: impl Into<String>) -> Self {
        ClientError::ValueMismatch { definition_id, details: details.into() }
    }

    /// Native status carried by this error, if any.
    pub fn native_status(&self) -> Option<NativeStatus> {
        match self {
            ClientError::NativeOpen { status } | ClientError::Native { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Failures raised while decoding an inbound block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("Insufficient data: need {needed} bytes, have {available}")]
    InsufficientData { needed: usize, available: usize },

    /// A record decoded through the float32 fallback; see `SimObjectData::declared_value`
    #[error("Definition {definition_id} is not registered")]
    UnknownDefinition { definition_id: u32 },

    /// The registered type cannot drive decoding; see `SimObjectData::declared_value`
    #[error("Data type tag {tag} is not valid")]
    InvalidDataType { tag: u32 },

    /// Strict `MessageKind::try_from` on a tag outside the known table
    #[error("Message kind {id} is not recognized")]
    UnknownMessageKind { id: u32 },
}

impl DecodeError {
    /// Helper constructor for short windows.
    pub fn insufficient(needed: usize, available: usize) -> Self {
        DecodeError::InsufficientData { needed, available }
    }
}
