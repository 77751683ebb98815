//! Decoded simulation variable values

use serde::{Deserialize, Serialize};

use super::DataType;

/// Runtime value of a simulation variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum SimValue {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    /// Fixed-width string, truncated at the first NUL
    FixedString { width: usize, value: String },
    /// Variable-length string
    String(String),
    InitPosition(InitPosition),
    MarkerState(MarkerState),
    Waypoint(Waypoint),
    LatLonAlt(LatLonAlt),
    Xyz(Xyz),
}

impl SimValue {
    /// Numeric view of the value, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            SimValue::Int32(v) => Some(v as f64),
            SimValue::Int64(v) => Some(v as f64),
            SimValue::Float32(v) => Some(v as f64),
            SimValue::Float64(v) => Some(v),
            _ => None,
        }
    }

    /// String view of the value, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SimValue::FixedString { value, .. } | SimValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Short description of the value's shape, used in mismatch errors.
    pub fn shape(&self) -> &'static str {
        match self {
            SimValue::Int32(_) => "int32",
            SimValue::Int64(_) => "int64",
            SimValue::Float32(_) => "float32",
            SimValue::Float64(_) => "float64",
            SimValue::FixedString { .. } => "fixed string",
            SimValue::String(_) => "string",
            SimValue::InitPosition(_) => "init position",
            SimValue::MarkerState(_) => "marker state",
            SimValue::Waypoint(_) => "waypoint",
            SimValue::LatLonAlt(_) => "lat/lon/alt",
            SimValue::Xyz(_) => "xyz",
        }
    }
}

/// Initial position of a sim object.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct InitPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub pitch: f64,
    pub bank: f64,
    pub heading: f64,
    pub on_ground: u32,
    pub airspeed: u32,
}

/// State of a named marker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct MarkerState {
    pub marker_name: String,
    pub marker_state: u32,
}

/// A waypoint on an AI route.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub flags: u32,
    pub speed_knots: f64,
    pub throttle_percent: f64,
}

/// Geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LatLonAlt {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Cartesian vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// How faithfully a value was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Fidelity {
    /// Decoded with the type declared at registration.
    Declared,
    /// The definition ID was not registered; float32 fallback.
    UnknownDefinition,
    /// The declared type was invalid; float32 fallback.
    InvalidDataType,
}

/// A decoded value plus the type that drove its decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DecodedValue {
    /// Type found in the registry, `None` when the definition was unknown
    pub data_type: Option<DataType>,
    pub value: SimValue,
    pub fidelity: Fidelity,
}

impl DecodedValue {
    /// Whether the value went through a fallback path.
    pub fn is_fallback(&self) -> bool {
        self.fidelity != Fidelity::Declared
    }
}
