//! Declared wire-level data types for registered variables

use serde::{Deserialize, Serialize};

/// Data type declared when a variable is added to a definition.
/// Maps to the protocol's `SIMCONNECT_DATATYPE` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum DataType {
    /// Placeholder type; decodes with the float32 fallback
    Invalid,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Fixed 8-byte string
    String8,
    /// Fixed 32-byte string
    String32,
    /// Fixed 64-byte string
    String64,
    /// Fixed 128-byte string
    String128,
    /// Fixed 256-byte string
    String256,
    /// Fixed 260-byte string
    String260,
    /// Variable-length NUL-terminated string
    StringV,
    /// Initial position record
    InitPosition,
    /// Marker state record
    MarkerState,
    /// Waypoint record
    Waypoint,
    /// Latitude/longitude/altitude record
    LatLonAlt,
    /// Cartesian XYZ record
    Xyz,
}

impl DataType {
    /// Every declared type, in wire-tag order.
    pub const ALL: [DataType; 17] = [
        DataType::Invalid,
        DataType::Int32,
        DataType::Int64,
        DataType::Float32,
        DataType::Float64,
        DataType::String8,
        DataType::String32,
        DataType::String64,
        DataType::String128,
        DataType::String256,
        DataType::String260,
        DataType::StringV,
        DataType::InitPosition,
        DataType::MarkerState,
        DataType::Waypoint,
        DataType::LatLonAlt,
        DataType::Xyz,
    ];

    /// Wire tag value.
    pub const fn tag(self) -> u32 {
        self as u32
    }

    /// Look up a type by wire tag.
    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Minimum number of bytes the data region must hold to decode this type.
    ///
    /// Variable-length strings need no bytes at all (an empty region is an empty
    /// string). The invalid placeholder needs the 4-byte inline slot for its fallback.
    pub const fn required_size(self) -> usize {
        match self {
            DataType::Invalid | DataType::Int32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::Float64 => 8,
            DataType::String8 => 8,
            DataType::String32 => 32,
            DataType::String64 => 64,
            DataType::String128 => 128,
            DataType::String256 => 256,
            DataType::String260 => 260,
            DataType::StringV => 0,
            DataType::InitPosition => 56,
            DataType::MarkerState => 68,
            DataType::Waypoint => 44,
            DataType::LatLonAlt | DataType::Xyz => 24,
        }
    }

    /// Width of a fixed-length string type.
    pub const fn string_width(self) -> Option<usize> {
        match self {
            DataType::String8
            | DataType::String32
            | DataType::String64
            | DataType::String128
            | DataType::String256
            | DataType::String260 => Some(self.required_size()),
            _ => None,
        }
    }

    /// Whether the value is read from the 4-byte inline slot.
    pub const fn is_inline(self) -> bool {
        matches!(self, DataType::Invalid | DataType::Int32 | DataType::Float32)
    }

    /// Protocol name of the type.
    pub const fn name(self) -> &'static str {
        match self {
            DataType::Invalid => "INVALID",
            DataType::Int32 => "INT32",
            DataType::Int64 => "INT64",
            DataType::Float32 => "FLOAT32",
            DataType::Float64 => "FLOAT64",
            DataType::String8 => "STRING8",
            DataType::String32 => "STRING32",
            DataType::String64 => "STRING64",
            DataType::String128 => "STRING128",
            DataType::String256 => "STRING256",
            DataType::String260 => "STRING260",
            DataType::StringV => "STRINGV",
            DataType::InitPosition => "INITPOSITION",
            DataType::MarkerState => "MARKERSTATE",
            DataType::Waypoint => "WAYPOINT",
            DataType::LatLonAlt => "LATLONALT",
            DataType::Xyz => "XYZ",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
