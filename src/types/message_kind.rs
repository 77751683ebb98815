//! Message-kind tags carried in the common header

use serde::{Deserialize, Serialize};

use crate::DecodeError;

/// Kind of an inbound message, from the `id` field of the common header.
/// Maps to the protocol's `SIMCONNECT_RECV_ID` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum MessageKind {
    Null,
    Exception,
    Open,
    Quit,
    Event,
    EventObjectAddRemove,
    EventFilename,
    EventFrame,
    SimObjectData,
    SimObjectDataByType,
    WeatherObservation,
    CloudState,
    AssignedObjectId,
    ReservedKey,
    CustomAction,
    SystemState,
    ClientData,
    EventWeatherMode,
    AirportList,
    VorList,
    NdbList,
    WaypointList,
    EventMultiplayerServerStarted,
    EventMultiplayerClientStarted,
    EventMultiplayerSessionEnded,
    EventRaceEnd,
    EventRaceLap,
    EventEx1,
    FacilityData,
    FacilityDataEnd,
    FacilityMinimalList,
    JetwayData,
    ControllersList,
    ActionCallback,
    EnumerateInputEvents,
    GetInputEvent,
    SubscribeInputEvent,
    EnumerateInputEventParams,
    Pick,
    /// A tag this runtime does not know
    Unrecognized(u32),
}

impl MessageKind {
    /// Every known kind, in tag order.
    pub const KNOWN: [MessageKind; 39] = [
        MessageKind::Null,
        MessageKind::Exception,
        MessageKind::Open,
        MessageKind::Quit,
        MessageKind::Event,
        MessageKind::EventObjectAddRemove,
        MessageKind::EventFilename,
        MessageKind::EventFrame,
        MessageKind::SimObjectData,
        MessageKind::SimObjectDataByType,
        MessageKind::WeatherObservation,
        MessageKind::CloudState,
        MessageKind::AssignedObjectId,
        MessageKind::ReservedKey,
        MessageKind::CustomAction,
        MessageKind::SystemState,
        MessageKind::ClientData,
        MessageKind::EventWeatherMode,
        MessageKind::AirportList,
        MessageKind::VorList,
        MessageKind::NdbList,
        MessageKind::WaypointList,
        MessageKind::EventMultiplayerServerStarted,
        MessageKind::EventMultiplayerClientStarted,
        MessageKind::EventMultiplayerSessionEnded,
        MessageKind::EventRaceEnd,
        MessageKind::EventRaceLap,
        MessageKind::EventEx1,
        MessageKind::FacilityData,
        MessageKind::FacilityDataEnd,
        MessageKind::FacilityMinimalList,
        MessageKind::JetwayData,
        MessageKind::ControllersList,
        MessageKind::ActionCallback,
        MessageKind::EnumerateInputEvents,
        MessageKind::GetInputEvent,
        MessageKind::SubscribeInputEvent,
        MessageKind::EnumerateInputEventParams,
        MessageKind::Pick,
    ];

    /// Resolve a header tag. Unknown tags map to [`MessageKind::Unrecognized`].
    pub fn from_id(id: u32) -> Self {
        Self::KNOWN.get(id as usize).copied().unwrap_or(MessageKind::Unrecognized(id))
    }

    /// Wire tag of this kind.
    pub fn id(self) -> u32 {
        match self {
            MessageKind::Unrecognized(id) => id,
            known => Self::KNOWN.iter().position(|k| *k == known).unwrap_or_default() as u32,
        }
    }

    /// Whether the tag is one this runtime knows.
    pub fn is_known(self) -> bool {
        !matches!(self, MessageKind::Unrecognized(_))
    }

    /// Protocol name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::Null => "NULL",
            MessageKind::Exception => "EXCEPTION",
            MessageKind::Open => "OPEN",
            MessageKind::Quit => "QUIT",
            MessageKind::Event => "EVENT",
            MessageKind::EventObjectAddRemove => "EVENT_OBJECT_ADDREMOVE",
            MessageKind::EventFilename => "EVENT_FILENAME",
            MessageKind::EventFrame => "EVENT_FRAME",
            MessageKind::SimObjectData => "SIMOBJECT_DATA",
            MessageKind::SimObjectDataByType => "SIMOBJECT_DATA_BYTYPE",
            MessageKind::WeatherObservation => "WEATHER_OBSERVATION",
            MessageKind::CloudState => "CLOUD_STATE",
            MessageKind::AssignedObjectId => "ASSIGNED_OBJECT_ID",
            MessageKind::ReservedKey => "RESERVED_KEY",
            MessageKind::CustomAction => "CUSTOM_ACTION",
            MessageKind::SystemState => "SYSTEM_STATE",
            MessageKind::ClientData => "CLIENT_DATA",
            MessageKind::EventWeatherMode => "EVENT_WEATHER_MODE",
            MessageKind::AirportList => "AIRPORT_LIST",
            MessageKind::VorList => "VOR_LIST",
            MessageKind::NdbList => "NDB_LIST",
            MessageKind::WaypointList => "WAYPOINT_LIST",
            MessageKind::EventMultiplayerServerStarted => "EVENT_MULTIPLAYER_SERVER_STARTED",
            MessageKind::EventMultiplayerClientStarted => "EVENT_MULTIPLAYER_CLIENT_STARTED",
            MessageKind::EventMultiplayerSessionEnded => "EVENT_MULTIPLAYER_SESSION_ENDED",
            MessageKind::EventRaceEnd => "EVENT_RACE_END",
            MessageKind::EventRaceLap => "EVENT_RACE_LAP",
            MessageKind::EventEx1 => "EVENT_EX1",
            MessageKind::FacilityData => "FACILITY_DATA",
            MessageKind::FacilityDataEnd => "FACILITY_DATA_END",
            MessageKind::FacilityMinimalList => "FACILITY_MINIMAL_LIST",
            MessageKind::JetwayData => "JETWAY_DATA",
            MessageKind::ControllersList => "CONTROLLERS_LIST",
            MessageKind::ActionCallback => "ACTION_CALLBACK",
            MessageKind::EnumerateInputEvents => "ENUMERATE_INPUT_EVENTS",
            MessageKind::GetInputEvent => "GET_INPUT_EVENT",
            MessageKind::SubscribeInputEvent => "SUBSCRIBE_INPUT_EVENT",
            MessageKind::EnumerateInputEventParams => "ENUMERATE_INPUT_EVENT_PARAMS",
            MessageKind::Pick => "PICK",
            MessageKind::Unrecognized(_) => "UNRECOGNIZED",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::Unrecognized(id) => write!(f, "UNRECOGNIZED({})", id),
            known => f.write_str(known.name()),
        }
    }
}

/// Strict lookup: unknown tags are an error rather than [`MessageKind::Unrecognized`].
impl TryFrom<u32> for MessageKind {
    type Error = DecodeError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        match MessageKind::from_id(id) {
            MessageKind::Unrecognized(id) => Err(DecodeError::UnknownMessageKind { id }),
            known => Ok(known),
        }
    }
}
