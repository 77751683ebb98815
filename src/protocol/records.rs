//! Fixed record shapes and the per-kind decoders that overlay them.
//!
//! Each decoder receives the block window (header included) and first checks that
//! the window is at least as long as its fixed shape. Offsets below are absolute
//! within the block. All records are packed with 1-byte alignment.

use std::borrow::Cow;

use super::classifier::DecodeContext;
use super::decoder::{decode_declared, preview, read_lat_lon_alt};
use super::envelope::*;
use super::reader::ByteReader;
use crate::DecodeError;
use crate::types::{FacilityListKind, describe_exception};

/// Total sizes of the fixed shapes, header included.
pub mod sizes {
    pub const EXCEPTION: usize = 24;
    pub const OPEN: usize = 308;
    pub const EVENT: usize = 24;
    pub const EVENT_OBJECT_ADDREMOVE: usize = 28;
    pub const EVENT_FILENAME: usize = 288;
    pub const EVENT_FRAME: usize = 32;
    pub const EVENT_EX1: usize = 40;
    /// Sim object data, including the 4-byte inline slot
    pub const SIMOBJECT_DATA: usize = 44;
    /// Offset of the data region (and of the inline slot)
    pub const DATA_REGION: usize = 40;
    pub const SYSTEM_STATE: usize = 284;
    pub const CUSTOM_ACTION: usize = 44;
    pub const ASSIGNED_OBJECT_ID: usize = 20;
    pub const RESERVED_KEY: usize = 92;
    pub const FACILITY_DATA: usize = 44;
    pub const FACILITY_DATA_END: usize = 16;
    pub const FACILITIES_LIST: usize = 28;
    pub const PICK: usize = 44;
}

/// Signature shared by every per-kind decoder.
pub type DecodeFn = fn(&ByteReader<'_>, &DecodeContext<'_>) -> Result<Option<Payload>, DecodeError>;

pub(super) fn header_only(
    _reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    Ok(None)
}

pub(super) fn unhandled(
    reader: &ByteReader<'_>,
    ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    Ok(Some(Payload::Unhandled(Unhandled {
        id: ctx.header.id,
        preview: preview(reader.rest(0), ctx.preview_bytes),
        total_len: reader.len(),
    })))
}

pub(super) fn exception(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::EXCEPTION)?;

    let code = reader.u32(12)?;
    let info = describe_exception(code);

    Ok(Some(Payload::Exception(ExceptionData {
        code,
        name: Cow::Borrowed(info.name),
        description: Cow::Borrowed(info.description),
        severity: info.severity,
        send_id: reader.u32(16)?,
        index: reader.u32(20)?,
    })))
}

pub(super) fn open(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::OPEN)?;

    // szApplicationName[256] at 12, then eight DWORD version fields at 268
    let mut application_version = [0u32; 4];
    let mut protocol_version = [0u32; 4];
    for i in 0..4 {
        application_version[i] = reader.u32(268 + i * 4)?;
        protocol_version[i] = reader.u32(284 + i * 4)?;
    }

    Ok(Some(Payload::Open(OpenData {
        application_name: reader.fixed_str(12, 256)?,
        application_version,
        protocol_version,
    })))
}

fn event_fields(reader: &ByteReader<'_>) -> Result<EventData, DecodeError> {
    Ok(EventData { group_id: reader.u32(12)?, event_id: reader.u32(16)?, data: reader.u32(20)? })
}

pub(super) fn event(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::EVENT)?;
    Ok(Some(Payload::Event(event_fields(reader)?)))
}

pub(super) fn event_ex1(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::EVENT_EX1)?;

    let mut data = [0u32; 5];
    for (i, slot) in data.iter_mut().enumerate() {
        *slot = reader.u32(20 + i * 4)?;
    }

    Ok(Some(Payload::EventEx1(EventEx1Data {
        group_id: reader.u32(12)?,
        event_id: reader.u32(16)?,
        data,
    })))
}

pub(super) fn object_add_remove(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::EVENT_OBJECT_ADDREMOVE)?;

    Ok(Some(Payload::ObjectAddRemove(ObjectAddRemoveData {
        event: event_fields(reader)?,
        object_type: reader.u32(24)?,
        action: ObjectAction::Unknown,
    })))
}

pub(super) fn filename(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::EVENT_FILENAME)?;

    Ok(Some(Payload::Filename(FilenameData {
        event: event_fields(reader)?,
        file_name: reader.fixed_str(24, 260)?,
        flags: reader.u32(284)?,
    })))
}

pub(super) fn frame(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::EVENT_FRAME)?;

    Ok(Some(Payload::Frame(FrameData {
        event: event_fields(reader)?,
        frame_rate: reader.f32(24)?,
        sim_speed: reader.f32(28)?,
    })))
}

fn data_record_info(reader: &ByteReader<'_>) -> Result<DataRecordInfo, DecodeError> {
    Ok(DataRecordInfo {
        request_id: reader.u32(12)?,
        object_id: reader.u32(16)?,
        define_id: reader.u32(20)?,
        flags: reader.u32(24)?,
        entry_number: reader.u32(28)?,
        out_of: reader.u32(32)?,
        define_count: reader.u32(36)?,
    })
}

/// The only decoder with a registry dependency: the definition ID selects the type.
pub(super) fn sim_object_data(
    reader: &ByteReader<'_>,
    ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::SIMOBJECT_DATA)?;

    let info = data_record_info(reader)?;
    let declared = ctx.registry.lookup(info.define_id);
    let value = decode_declared(reader.rest(sizes::DATA_REGION), declared)?;

    Ok(Some(Payload::SimObjectData(SimObjectData { info, value })))
}

pub(super) fn client_data(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::SIMOBJECT_DATA)?;

    Ok(Some(Payload::ClientData(ClientData {
        info: data_record_info(reader)?,
        data: reader.rest(sizes::DATA_REGION).to_vec(),
    })))
}

pub(super) fn system_state(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::SYSTEM_STATE)?;

    Ok(Some(Payload::SystemState(SystemStateData {
        request_id: reader.u32(12)?,
        integer: reader.u32(16)?,
        float: reader.f32(20)?,
        string: reader.fixed_str(24, 260)?,
    })))
}

pub(super) fn custom_action(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::CUSTOM_ACTION)?;

    Ok(Some(Payload::CustomAction(CustomActionData {
        event: event_fields(reader)?,
        instance_id: format_guid(reader.bytes(24, 16)?),
        wait_for_completion: reader.u32(40)?,
        payload: reader.trailing_str(sizes::CUSTOM_ACTION),
    })))
}

pub(super) fn assigned_object_id(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::ASSIGNED_OBJECT_ID)?;

    Ok(Some(Payload::AssignedObjectId(AssignedObjectIdData {
        request_id: reader.u32(12)?,
        object_id: reader.u32(16)?,
    })))
}

pub(super) fn reserved_key(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::RESERVED_KEY)?;

    Ok(Some(Payload::ReservedKey(ReservedKeyData {
        choice_reserved: reader.fixed_str(12, 30)?,
        reserved_key: reader.fixed_str(42, 50)?,
    })))
}

pub(super) fn facility_data(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::FACILITY_DATA)?;

    Ok(Some(Payload::FacilityData(FacilityData {
        user_request_id: reader.u32(12)?,
        unique_request_id: reader.u32(16)?,
        parent_unique_request_id: reader.u32(20)?,
        facility_type: reader.u32(24)?,
        is_list_item: reader.u32(28)? != 0,
        item_index: reader.u32(32)?,
        list_size: reader.u32(36)?,
        data: reader.rest(sizes::DATA_REGION).to_vec(),
    })))
}

pub(super) fn facility_data_end(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::FACILITY_DATA_END)?;

    Ok(Some(Payload::FacilityDataEnd(FacilityDataEnd { request_id: reader.u32(12)? })))
}

fn facility_list(
    reader: &ByteReader<'_>,
    kind: FacilityListKind,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::FACILITIES_LIST)?;

    let array_size = reader.u32(16)?;
    let entry_size = kind.entry_size();
    let available = (reader.len() - sizes::FACILITIES_LIST) / entry_size;
    let count = (array_size as usize).min(available);

    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let base = sizes::FACILITIES_LIST + i * entry_size;
        entries.push(facility_entry(reader, base, kind)?);
    }

    Ok(Some(Payload::FacilityList(FacilityList {
        kind,
        request_id: reader.u32(12)?,
        array_size,
        entry_number: reader.u32(20)?,
        out_of: reader.u32(24)?,
        entries,
        truncated: count < array_size as usize,
    })))
}

fn facility_entry(
    reader: &ByteReader<'_>,
    base: usize,
    kind: FacilityListKind,
) -> Result<FacilityEntry, DecodeError> {
    // Airport: Ident[6] Region[3] lat lon alt; each later kind extends the previous one
    let mut entry = FacilityEntry {
        ident: reader.fixed_str(base, 6)?,
        region: reader.fixed_str(base + 6, 3)?,
        position: read_lat_lon_alt(reader, base + 9)?,
        mag_var: None,
        frequency: None,
        vor: None,
    };

    if kind != FacilityListKind::Airport {
        entry.mag_var = Some(reader.f32(base + 33)?);
    }
    if matches!(kind, FacilityListKind::Ndb | FacilityListKind::Vor) {
        entry.frequency = Some(reader.u32(base + 37)?);
    }
    if kind == FacilityListKind::Vor {
        entry.vor = Some(VorDetails {
            flags: reader.u32(base + 41)?,
            localizer: reader.f32(base + 45)?,
            glide_slope: read_lat_lon_alt(reader, base + 49)?,
            glide_slope_angle: reader.f32(base + 73)?,
        });
    }

    Ok(entry)
}

pub(super) fn airport_list(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    facility_list(reader, FacilityListKind::Airport)
}

pub(super) fn waypoint_list(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    facility_list(reader, FacilityListKind::Waypoint)
}

pub(super) fn ndb_list(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    facility_list(reader, FacilityListKind::Ndb)
}

pub(super) fn vor_list(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    facility_list(reader, FacilityListKind::Vor)
}

pub(super) fn pick(
    reader: &ByteReader<'_>,
    _ctx: &DecodeContext<'_>,
) -> Result<Option<Payload>, DecodeError> {
    reader.require(sizes::PICK)?;

    Ok(Some(Payload::Pick(PickData {
        request_id: reader.u32(12)?,
        object_id: reader.u32(16)?,
        position: read_lat_lon_alt(reader, 20)?,
    })))
}

/// Registry-format GUID text from its 16-byte mixed-endian layout.
fn format_guid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(38);
    let data1 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let data2 = u16::from_le_bytes([bytes[4], bytes[5]]);
    let data3 = u16::from_le_bytes([bytes[6], bytes[7]]);

    out.push_str(&format!("{{{:08X}-{:04X}-{:04X}-", data1, data2, data3));
    for b in &bytes[8..10] {
        out.push_str(&format!("{:02X}", b));
    }
    out.push('-');
    for b in &bytes[10..16] {
        out.push_str(&format!("{:02X}", b));
    }
    out.push('}');
    out
}
