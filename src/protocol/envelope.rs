//! The uniform envelope delivered to consumers, and its payload variants

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::header::RecvHeader;
use crate::DecodeError;
use crate::types::{
    DataType, DecodedValue, FacilityListKind, Fidelity, LatLonAlt, MessageKind, Severity, SimValue,
};

/// One decoded inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Envelope {
    /// Size reported by the header
    pub size: u32,
    /// Protocol version reported by the header
    pub version: u32,
    /// Message kind from the header tag
    pub kind: MessageKind,
    /// Protocol name of the kind
    pub name: Cow<'static, str>,
    /// Decoded payload; `None` for header-only kinds or when decoding failed
    pub payload: Option<Payload>,
    /// Why the payload could not be decoded, if it could not
    pub fault: Option<DecodeFault>,
}

impl Envelope {
    /// Envelope carrying a decoded payload.
    pub fn new(header: RecvHeader, payload: Option<Payload>) -> Self {
        let kind = header.kind();
        Self {
            size: header.size,
            version: header.version,
            kind,
            name: Cow::Borrowed(kind.name()),
            payload,
            fault: None,
        }
    }

    /// Envelope whose payload failed to decode.
    pub fn faulted(header: RecvHeader, error: &DecodeError) -> Self {
        Self { fault: Some(DecodeFault::from(error)), ..Self::new(header, None) }
    }

    /// Raw message-kind tag.
    pub fn id(&self) -> u32 {
        self.kind.id()
    }

    /// Whether the payload (if any) is consistent with the kind tag.
    pub fn is_consistent(&self) -> bool {
        self.payload.as_ref().is_none_or(|payload| payload.matches_kind(self.kind))
    }
}

/// Decode failure recorded on an envelope instead of stopping the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DecodeFault {
    pub reason: String,
    /// Bytes the decoder needed, for short blocks
    pub needed: Option<usize>,
    /// Bytes that were available, for short blocks
    pub available: Option<usize>,
}

impl From<&DecodeError> for DecodeFault {
    fn from(error: &DecodeError) -> Self {
        let (needed, available) = match error {
            DecodeError::InsufficientData { needed, available } => {
                (Some(*needed), Some(*available))
            }
            _ => (None, None),
        };
        Self { reason: error.to_string(), needed, available }
    }
}

/// Decoded payload of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    SimObjectData(SimObjectData),
    Exception(ExceptionData),
    Open(OpenData),
    Event(EventData),
    EventEx1(EventEx1Data),
    ObjectAddRemove(ObjectAddRemoveData),
    Filename(FilenameData),
    Frame(FrameData),
    SystemState(SystemStateData),
    ClientData(ClientData),
    CustomAction(CustomActionData),
    AssignedObjectId(AssignedObjectIdData),
    ReservedKey(ReservedKeyData),
    FacilityData(FacilityData),
    FacilityDataEnd(FacilityDataEnd),
    FacilityList(FacilityList),
    Pick(PickData),
    Unhandled(Unhandled),
}

impl Payload {
    /// Whether this payload variant may be carried by an envelope of `kind`.
    pub fn matches_kind(&self, kind: MessageKind) -> bool {
        use MessageKind as K;

        match self {
            Payload::SimObjectData(_) => {
                matches!(kind, K::SimObjectData | K::SimObjectDataByType)
            }
            Payload::Exception(_) => kind == K::Exception,
            Payload::Open(_) => kind == K::Open,
            Payload::Event(_) => matches!(
                kind,
                K::Event
                    | K::EventWeatherMode
                    | K::EventMultiplayerServerStarted
                    | K::EventMultiplayerClientStarted
                    | K::EventMultiplayerSessionEnded
            ),
            Payload::EventEx1(_) => kind == K::EventEx1,
            Payload::ObjectAddRemove(_) => kind == K::EventObjectAddRemove,
            Payload::Filename(_) => kind == K::EventFilename,
            Payload::Frame(_) => kind == K::EventFrame,
            Payload::SystemState(_) => kind == K::SystemState,
            Payload::ClientData(_) => kind == K::ClientData,
            Payload::CustomAction(_) => kind == K::CustomAction,
            Payload::AssignedObjectId(_) => kind == K::AssignedObjectId,
            Payload::ReservedKey(_) => kind == K::ReservedKey,
            Payload::FacilityData(_) => kind == K::FacilityData,
            Payload::FacilityDataEnd(_) => kind == K::FacilityDataEnd,
            Payload::FacilityList(list) => kind == list.kind.message_kind(),
            Payload::Pick(_) => kind == K::Pick,
            Payload::Unhandled(_) => true,
        }
    }
}

/// Metadata shared by every sim-object-shaped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DataRecordInfo {
    pub request_id: u32,
    pub object_id: u32,
    pub define_id: u32,
    pub flags: u32,
    pub entry_number: u32,
    pub out_of: u32,
    pub define_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SimObjectData {
    pub info: DataRecordInfo,
    pub value: DecodedValue,
}

impl SimObjectData {
    /// The value, but only when it was decoded with its registered type.
    ///
    /// Fallback decodes surface as the matching [`DecodeError`] so strict consumers
    /// can reject them instead of reading a float32 guess.
    pub fn declared_value(&self) -> Result<&SimValue, DecodeError> {
        match self.value.fidelity {
            Fidelity::Declared => Ok(&self.value.value),
            Fidelity::UnknownDefinition => {
                Err(DecodeError::UnknownDefinition { definition_id: self.info.define_id })
            }
            Fidelity::InvalidDataType => Err(DecodeError::InvalidDataType {
                tag: self.value.data_type.map_or(DataType::Invalid.tag(), DataType::tag),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ExceptionData {
    pub code: u32,
    pub name: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub severity: Severity,
    /// ID of the outbound packet that caused the exception
    pub send_id: u32,
    /// Index of the offending parameter
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct OpenData {
    pub application_name: String,
    pub application_version: [u32; 4],
    pub protocol_version: [u32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct EventData {
    pub group_id: u32,
    pub event_id: u32,
    pub data: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct EventEx1Data {
    pub group_id: u32,
    pub event_id: u32,
    pub data: [u32; 5],
}

/// What happened to the object in an add/remove event.
///
/// The record does not say; telling add from remove needs the consumer's own
/// mapping of subscribed event IDs, so the decoder always reports `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ObjectAction {
    Added,
    Removed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ObjectAddRemoveData {
    pub event: EventData,
    pub object_type: u32,
    pub action: ObjectAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FilenameData {
    pub event: EventData,
    pub file_name: String,
    pub flags: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FrameData {
    pub event: EventData,
    pub frame_rate: f32,
    pub sim_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SystemStateData {
    pub request_id: u32,
    pub integer: u32,
    pub float: f32,
    pub string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ClientData {
    pub info: DataRecordInfo,
    /// Copy of the data region; client data layouts are private to the client
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct CustomActionData {
    pub event: EventData,
    /// Instance GUID in registry format
    pub instance_id: String,
    pub wait_for_completion: u32,
    pub payload: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct AssignedObjectIdData {
    pub request_id: u32,
    pub object_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ReservedKeyData {
    pub choice_reserved: String,
    pub reserved_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FacilityData {
    pub user_request_id: u32,
    pub unique_request_id: u32,
    pub parent_unique_request_id: u32,
    pub facility_type: u32,
    pub is_list_item: bool,
    pub item_index: u32,
    pub list_size: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FacilityDataEnd {
    pub request_id: u32,
}

/// One entry of a facility list. Fields beyond the airport shape are present only
/// for the list kinds that carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FacilityEntry {
    pub ident: String,
    pub region: String,
    pub position: LatLonAlt,
    pub mag_var: Option<f32>,
    pub frequency: Option<u32>,
    pub vor: Option<VorDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct VorDetails {
    pub flags: u32,
    pub localizer: f32,
    pub glide_slope: LatLonAlt,
    pub glide_slope_angle: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FacilityList {
    pub kind: FacilityListKind,
    pub request_id: u32,
    pub array_size: u32,
    pub entry_number: u32,
    pub out_of: u32,
    pub entries: Vec<FacilityEntry>,
    /// Set when the block held fewer whole entries than `array_size` announced
    pub truncated: bool,
}

impl FacilityListKind {
    /// Message kind that carries lists of this kind.
    pub fn message_kind(self) -> MessageKind {
        match self {
            FacilityListKind::Airport => MessageKind::AirportList,
            FacilityListKind::Waypoint => MessageKind::WaypointList,
            FacilityListKind::Ndb => MessageKind::NdbList,
            FacilityListKind::Vor => MessageKind::VorList,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct PickData {
    pub request_id: u32,
    pub object_id: u32,
    pub position: LatLonAlt,
}

/// Bounded raw preview of a message this runtime does not decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Unhandled {
    /// Header tag as received
    pub id: u32,
    /// Leading bytes of the block, header included
    pub preview: Vec<u8>,
    /// Total bytes in the block window
    pub total_len: usize,
}

impl Unhandled {
    /// Whether the preview omits part of the block.
    pub fn is_truncated(&self) -> bool {
        self.preview.len() < self.total_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(id: u32) -> RecvHeader {
        RecvHeader { size: 24, version: 6, id }
    }

    fn record(define_id: u32, value: DecodedValue) -> SimObjectData {
        let info = DataRecordInfo {
            request_id: 1,
            object_id: 0,
            define_id,
            flags: 0,
            entry_number: 0,
            out_of: 0,
            define_count: 1,
        };
        SimObjectData { info, value }
    }

    #[test]
    fn declared_value_rejects_fallback_decodes() {
        let declared = record(
            4,
            DecodedValue {
                data_type: Some(DataType::Int32),
                value: SimValue::Int32(7),
                fidelity: Fidelity::Declared,
            },
        );
        assert_eq!(declared.declared_value(), Ok(&SimValue::Int32(7)));

        let unknown = record(
            99,
            DecodedValue {
                data_type: None,
                value: SimValue::Float32(1.0),
                fidelity: Fidelity::UnknownDefinition,
            },
        );
        assert_eq!(
            unknown.declared_value(),
            Err(DecodeError::UnknownDefinition { definition_id: 99 })
        );

        let invalid = record(
            5,
            DecodedValue {
                data_type: Some(DataType::Invalid),
                value: SimValue::Float32(1.0),
                fidelity: Fidelity::InvalidDataType,
            },
        );
        assert_eq!(invalid.declared_value(), Err(DecodeError::InvalidDataType { tag: 0 }));
    }

    #[test]
    fn envelope_names_its_kind() {
        let envelope = Envelope::new(header(3), None);
        assert_eq!(envelope.kind, MessageKind::Quit);
        assert_eq!(envelope.name, "QUIT");
        assert_eq!(envelope.id(), 3);
        assert!(envelope.is_consistent());
    }

    #[test]
    fn payload_must_match_kind() {
        let event = Payload::Event(EventData { group_id: 1, event_id: 2, data: 3 });
        assert!(event.matches_kind(MessageKind::Event));
        assert!(event.matches_kind(MessageKind::EventMultiplayerSessionEnded));
        assert!(!event.matches_kind(MessageKind::Exception));

        let mismatched = Envelope::new(header(1), Some(event));
        assert!(!mismatched.is_consistent());

        let preview = Payload::Unhandled(Unhandled { id: 500, preview: vec![], total_len: 12 });
        assert!(preview.matches_kind(MessageKind::Unrecognized(500)));
    }

    #[test]
    fn faults_capture_short_reads() {
        let envelope = Envelope::faulted(header(8), &DecodeError::insufficient(44, 30));
        assert!(envelope.payload.is_none());

        let fault = envelope.fault.expect("fault");
        assert_eq!(fault.needed, Some(44));
        assert_eq!(fault.available, Some(30));
    }
}
