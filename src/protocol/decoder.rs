//! Scalar and structured value decoding.
//!
//! The wire format does not describe its own payload type, so every value is decoded
//! against the [`DataType`] declared when the definition was registered. The data
//! region of a sim object record starts with a 4-byte inline slot: 32-bit numbers are
//! read from that slot, everything wider reads from the start of the region.
//!
//! All reads are length-checked. A region shorter than the declared type yields
//! [`DecodeError::InsufficientData`], never a partially-filled value.

use super::reader::ByteReader;
use crate::DecodeError;
use crate::types::{
    DataType, DecodedValue, Fidelity, InitPosition, LatLonAlt, MarkerState, SimValue, Waypoint,
    Xyz,
};

/// Decode `region` as `data_type`.
///
/// [`DataType::Invalid`] decodes through the float32 fallback; callers that need the
/// fallback flagged should use [`decode_declared`].
pub fn decode_value(region: &[u8], data_type: DataType) -> Result<SimValue, DecodeError> {
    let reader = ByteReader::new(region);
    reader.require(data_type.required_size())?;

    let value = match data_type {
        DataType::Int32 => SimValue::Int32(reader.i32(0)?),
        DataType::Invalid | DataType::Float32 => SimValue::Float32(reader.f32(0)?),
        DataType::Int64 => SimValue::Int64(reader.i64(0)?),
        DataType::Float64 => SimValue::Float64(reader.f64(0)?),
        DataType::String8
        | DataType::String32
        | DataType::String64
        | DataType::String128
        | DataType::String256
        | DataType::String260 => {
            let width = data_type.required_size();
            SimValue::FixedString { width, value: reader.fixed_str(0, width)? }
        }
        DataType::StringV => SimValue::String(reader.trailing_str(0)),
        DataType::InitPosition => SimValue::InitPosition(InitPosition {
            latitude: reader.f64(0)?,
            longitude: reader.f64(8)?,
            altitude: reader.f64(16)?,
            pitch: reader.f64(24)?,
            bank: reader.f64(32)?,
            heading: reader.f64(40)?,
            on_ground: reader.u32(48)?,
            airspeed: reader.u32(52)?,
        }),
        DataType::MarkerState => SimValue::MarkerState(MarkerState {
            marker_name: reader.fixed_str(0, 64)?,
            marker_state: reader.u32(64)?,
        }),
        DataType::Waypoint => SimValue::Waypoint(Waypoint {
            latitude: reader.f64(0)?,
            longitude: reader.f64(8)?,
            altitude: reader.f64(16)?,
            flags: reader.u32(24)?,
            speed_knots: reader.f64(28)?,
            throttle_percent: reader.f64(36)?,
        }),
        DataType::LatLonAlt => SimValue::LatLonAlt(read_lat_lon_alt(&reader, 0)?),
        DataType::Xyz => SimValue::Xyz(Xyz {
            x: reader.f64(0)?,
            y: reader.f64(8)?,
            z: reader.f64(16)?,
        }),
    };

    Ok(value)
}

/// Decode `region` using the type found in the registry, if any.
///
/// An unknown definition (`None`) or an invalid declared type falls back to reading
/// the inline slot as float32 and is flagged through [`Fidelity`].
pub fn decode_declared(
    region: &[u8],
    declared: Option<DataType>,
) -> Result<DecodedValue, DecodeError> {
    let fidelity = match declared {
        Some(DataType::Invalid) => Fidelity::InvalidDataType,
        Some(_) => Fidelity::Declared,
        None => Fidelity::UnknownDefinition,
    };
    let value = decode_value(region, declared.unwrap_or(DataType::Invalid))?;

    Ok(DecodedValue { data_type: declared, value, fidelity })
}

/// Decode `region` from a raw wire tag, falling back to float32 for unknown tags.
pub fn decode_tagged(region: &[u8], tag: u32) -> Result<DecodedValue, DecodeError> {
    match DataType::from_tag(tag) {
        Some(data_type) => decode_declared(region, Some(data_type)),
        None => {
            let value = decode_value(region, DataType::Invalid)?;
            Ok(DecodedValue { data_type: None, value, fidelity: Fidelity::InvalidDataType })
        }
    }
}

pub(crate) fn read_lat_lon_alt(
    reader: &ByteReader<'_>,
    offset: usize,
) -> Result<LatLonAlt, DecodeError> {
    Ok(LatLonAlt {
        latitude: reader.f64(offset)?,
        longitude: reader.f64(offset + 8)?,
        altitude: reader.f64(offset + 16)?,
    })
}

/// Encode `value` into the wire layout of `data_type`.
///
/// Numbers may be widened or converted between float widths; strings must fit the
/// declared width (the terminator included); structures must match exactly. Errors
/// carry a human-readable explanation.
pub fn encode_value(value: &SimValue, data_type: DataType) -> Result<Vec<u8>, String> {
    let mismatch = || format!("cannot write {} value as {}", value.shape(), data_type);

    let bytes = match (data_type, value) {
        (DataType::Int32, SimValue::Int32(v)) => v.to_le_bytes().to_vec(),
        (DataType::Int64, SimValue::Int32(v)) => i64::from(*v).to_le_bytes().to_vec(),
        (DataType::Int64, SimValue::Int64(v)) => v.to_le_bytes().to_vec(),
        (DataType::Float32, SimValue::Float32(v)) => v.to_le_bytes().to_vec(),
        (DataType::Float32, SimValue::Float64(v)) => (*v as f32).to_le_bytes().to_vec(),
        (DataType::Float64, SimValue::Float32(v)) => f64::from(*v).to_le_bytes().to_vec(),
        (DataType::Float64, SimValue::Float64(v)) => v.to_le_bytes().to_vec(),
        (DataType::StringV, SimValue::String(s) | SimValue::FixedString { value: s, .. }) => {
            let mut out = s.as_bytes().to_vec();
            out.push(0);
            out
        }
        (
            fixed @ (DataType::String8
            | DataType::String32
            | DataType::String64
            | DataType::String128
            | DataType::String256
            | DataType::String260),
            SimValue::String(s) | SimValue::FixedString { value: s, .. },
        ) => {
            let width = fixed.required_size();
            if s.len() >= width {
                return Err(format!(
                    "string of {} bytes does not fit {} (max {} bytes)",
                    s.len(),
                    fixed,
                    width - 1
                ));
            }
            let mut out = vec![0u8; width];
            out[..s.len()].copy_from_slice(s.as_bytes());
            out
        }
        (DataType::InitPosition, SimValue::InitPosition(p)) => {
            let mut out = Vec::with_capacity(56);
            for f in [p.latitude, p.longitude, p.altitude, p.pitch, p.bank, p.heading] {
                out.extend_from_slice(&f.to_le_bytes());
            }
            out.extend_from_slice(&p.on_ground.to_le_bytes());
            out.extend_from_slice(&p.airspeed.to_le_bytes());
            out
        }
        (DataType::MarkerState, SimValue::MarkerState(m)) => {
            if m.marker_name.len() >= 64 {
                return Err("marker name does not fit 64 bytes".to_string());
            }
            let mut out = vec![0u8; 68];
            out[..m.marker_name.len()].copy_from_slice(m.marker_name.as_bytes());
            out[64..].copy_from_slice(&m.marker_state.to_le_bytes());
            out
        }
        (DataType::Waypoint, SimValue::Waypoint(w)) => {
            let mut out = Vec::with_capacity(44);
            for f in [w.latitude, w.longitude, w.altitude] {
                out.extend_from_slice(&f.to_le_bytes());
            }
            out.extend_from_slice(&w.flags.to_le_bytes());
            out.extend_from_slice(&w.speed_knots.to_le_bytes());
            out.extend_from_slice(&w.throttle_percent.to_le_bytes());
            out
        }
        (DataType::LatLonAlt, SimValue::LatLonAlt(p)) => {
            [p.latitude, p.longitude, p.altitude].iter().flat_map(|f| f.to_le_bytes()).collect()
        }
        (DataType::Xyz, SimValue::Xyz(v)) => {
            [v.x, v.y, v.z].iter().flat_map(|f| f.to_le_bytes()).collect()
        }
        _ => return Err(mismatch()),
    };

    Ok(bytes)
}

/// Copy of at most `limit` bytes, for previews of undecoded data.
pub fn preview(bytes: &[u8], limit: usize) -> Vec<u8> {
    bytes[..bytes.len().min(limit)].to_vec()
}
