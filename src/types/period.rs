//! Request periods for sim object data

use serde::{Deserialize, Serialize};

/// How often the simulator should send data for a request.
/// Maps to the protocol's `SIMCONNECT_PERIOD` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Period {
    /// Stop sending
    Never,
    /// Send a single reply
    Once,
    /// Every visual (rendered) frame
    VisualFrame,
    /// Every simulated frame
    SimFrame,
    /// Once per second
    Second,
}

impl Period {
    /// Wire value.
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Whether the request keeps producing data after the first reply.
    pub fn is_recurring(self) -> bool {
        matches!(self, Period::VisualFrame | Period::SimFrame | Period::Second)
    }
}

/// Facility list a request asks for.
/// Maps to the protocol's `SIMCONNECT_FACILITY_LIST_TYPE` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum FacilityListKind {
    Airport,
    Waypoint,
    Ndb,
    Vor,
}

impl FacilityListKind {
    /// Wire value.
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Size in bytes of one list entry.
    pub const fn entry_size(self) -> usize {
        match self {
            FacilityListKind::Airport => 33,
            FacilityListKind::Waypoint => 37,
            FacilityListKind::Ndb => 41,
            FacilityListKind::Vor => 77,
        }
    }
}
