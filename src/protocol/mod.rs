//! Binary protocol: header, record shapes, value decoding and classification.
//!
//! Every inbound block starts with a 12-byte common header naming its message kind.
//! The [`Classifier`] maps that tag to a per-kind decoder that overlays the fixed
//! record shape with length-checked reads and produces an owned [`Envelope`].
//!
//! ```rust
//! use simwire::protocol::{BlockBuilder, Classifier, Payload};
//! use simwire::{DataType, Definition, DefinitionRegistry, SimValue};
//!
//! let registry = DefinitionRegistry::new();
//! registry.register(1, Definition {
//!     data_type: DataType::Float32,
//!     variable_name: "PLANE ALTITUDE".into(),
//!     units: "feet".into(),
//! });
//!
//! let block = BlockBuilder::sim_object_data(10, 1).f32(1500.0).build();
//! let envelope = Classifier::default().classify(&block, &registry);
//!
//! match envelope.payload {
//!     Some(Payload::SimObjectData(data)) => assert_eq!(data.value.value, SimValue::Float32(1500.0)),
//!     other => panic!("unexpected payload {other:?}"),
//! }
//! ```

mod block;
mod classifier;
mod decoder;
mod envelope;
mod header;
mod reader;
mod records;

pub use block::{BlockBuilder, DEFAULT_VERSION};
pub use classifier::{Classifier, DEFAULT_PREVIEW_BYTES, DecodeContext};
pub use decoder::{decode_declared, decode_tagged, decode_value, encode_value, preview};
pub use envelope::*;
pub use header::{HEADER_SIZE, RecvHeader};
pub use reader::{ByteReader, nul_terminated};
pub use records::{DecodeFn, sizes};
