//! Type-safe decoding and dispatch runtime for the SimConnect message protocol.
//!
//! simwire sits between a simulator's native call interface and the code that
//! consumes simulation data. Requests go out as discrete native calls; replies
//! arrive as variable-shaped binary blocks that simwire polls, classifies and
//! decodes into owned [`Envelope`]s delivered over a bounded channel.
//!
//! # Features
//!
//! - **Bounds-checked decoding**: every record shape is read through length-checked
//!   slices; short blocks produce a recorded fault instead of garbage
//! - **Declared-type values**: sim object data decodes against the [`DataType`]
//!   registered for its definition ID
//! - **Idempotent lifecycle**: `listen()` starts exactly one dispatch loop and
//!   `close()` waits for it to stop, however many times either is called
//! - **Injectable transport**: the native interface is a [`Transport`] trait object;
//!   [`ScriptedTransport`] replays synthetic blocks for tests
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use simwire::{Client, ClientConfig, DataType, Payload, Period, Transport};
//!
//! # async fn example(transport: Arc<dyn Transport>) -> simwire::Result<()> {
//! let client = Client::new(transport, ClientConfig::named("altitude-monitor"))?;
//! client.connect()?;
//! client.register(1, "PLANE ALTITUDE", "feet", DataType::Float64)?;
//! client.request_periodic(1, 100, Period::Second)?;
//!
//! let envelopes = client.listen()?;
//! while let Some(envelope) = envelopes.recv().await {
//!     if let Some(Payload::SimObjectData(data)) = envelope.payload {
//!         println!("altitude: {:?}", data.value.value.as_f64());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Core types and error handling
mod error;
pub mod types;

// Wire format
pub mod protocol;
pub mod registry;

// Runtime
pub mod config;
pub mod connection;
pub mod driver;
pub mod handler;
pub mod transport;

// Core exports
pub use error::*;
pub use types::*;

pub use protocol::{DecodeFault, Envelope, Payload};
pub use registry::{Definition, DefinitionRegistry};

// Runtime exports
pub use config::ClientConfig;
pub use connection::{Client, EnvelopeReceiver};
pub use driver::DispatchState;
pub use handler::EnvelopeHandler;
pub use transport::{
    NativeCall, NativeHandle, NativeResult, NativeStatus, PollOutcome, RawBlock, ScriptedTransport,
    Transport, USER_OBJECT_ID,
};
