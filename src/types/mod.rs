//! Core value-level types of the protocol.
//!
//! This module provides the vocabulary shared by the decoder, the registry, and the
//! client command surface:
//!
//! - [`DataType`] maps to the protocol's declared data-type tags, with size information
//! - [`SimValue`] is the decoded value of a simulation variable (numbers, strings,
//!   geometry records)
//! - [`MessageKind`] maps to the message-kind tag of the common header
//! - [`Severity`] and [`describe_exception`] classify exceptions raised by the simulator
//! - [`Period`] and [`FacilityListKind`] parameterise outbound requests
//!
//! ## Usage Example
//!
//! ```rust
//! use simwire::types::{DataType, MessageKind, Severity, classify_exception};
//!
//! assert_eq!(DataType::from_tag(3), Some(DataType::Float32));
//! assert_eq!(DataType::InitPosition.required_size(), 56);
//! assert_eq!(MessageKind::from_id(8), MessageKind::SimObjectData);
//! assert_eq!(classify_exception(4), Severity::Critical);
//! ```

mod data_type;
mod exception;
mod message_kind;
mod period;
mod value;

pub use data_type::DataType;
pub use exception::{ExceptionInfo, Severity, classify_exception, codes, describe_exception};
pub use message_kind::MessageKind;
pub use period::{FacilityListKind, Period};
pub use value::{
    DecodedValue, Fidelity, InitPosition, LatLonAlt, MarkerState, SimValue, Waypoint, Xyz,
};
