//! Decoding scenarios against the public protocol API
//!
//! Blocks are built byte-exact with `BlockBuilder` and run through the same
//! classifier the dispatch loop uses.

use anyhow::{Context, Result, bail};
use proptest::prelude::*;
use simwire::protocol::{BlockBuilder, Classifier, Envelope, Payload, encode_value, sizes};
use simwire::{
    DataType, Definition, DefinitionRegistry, FacilityListKind, Fidelity, InitPosition, LatLonAlt,
    MarkerState, MessageKind, Severity, SimValue, Waypoint, Xyz,
};

fn registry_with(id: u32, data_type: DataType) -> DefinitionRegistry {
    let registry = DefinitionRegistry::new();
    registry.register(
        id,
        Definition { data_type, variable_name: "ANY VAR".into(), units: String::new() },
    );
    registry
}

fn classify(block: &[u8], registry: &DefinitionRegistry) -> Envelope {
    Classifier::default().classify(block, registry)
}

fn sim_object_value(envelope: Envelope) -> Result<simwire::DecodedValue> {
    match envelope.payload {
        Some(Payload::SimObjectData(data)) => Ok(data.value),
        other => bail!("expected sim object data, got {:?} (fault {:?})", other, envelope.fault),
    }
}

/// A representative value of every declared type, as the decoder returns it.
fn sample(data_type: DataType) -> SimValue {
    let position = LatLonAlt { latitude: 47.45, longitude: -122.31, altitude: 433.0 };
    match data_type {
        DataType::Invalid | DataType::Float32 => SimValue::Float32(1500.0),
        DataType::Int32 => SimValue::Int32(-42),
        DataType::Int64 => SimValue::Int64(1 << 40),
        DataType::Float64 => SimValue::Float64(29.92),
        DataType::StringV => SimValue::String("Boeing 737-800".into()),
        DataType::InitPosition => SimValue::InitPosition(InitPosition {
            latitude: position.latitude,
            longitude: position.longitude,
            altitude: position.altitude,
            pitch: 0.5,
            bank: -1.0,
            heading: 164.0,
            on_ground: 1,
            airspeed: 0,
        }),
        DataType::MarkerState => {
            SimValue::MarkerState(MarkerState { marker_name: "Wingtip".into(), marker_state: 1 })
        }
        DataType::Waypoint => SimValue::Waypoint(Waypoint {
            latitude: position.latitude,
            longitude: position.longitude,
            altitude: position.altitude,
            flags: 0x4,
            speed_knots: 250.0,
            throttle_percent: 80.0,
        }),
        DataType::LatLonAlt => SimValue::LatLonAlt(position),
        DataType::Xyz => SimValue::Xyz(Xyz { x: 1.0, y: 2.0, z: 3.0 }),
        fixed => SimValue::FixedString {
            width: fixed.required_size(),
            value: "N12345".into(),
        },
    }
}

#[test]
fn declared_type_determines_decode_shape() -> Result<()> {
    for data_type in DataType::ALL {
        let expected = sample(data_type);
        let encode_as = if data_type == DataType::Invalid { DataType::Float32 } else { data_type };
        let data = encode_value(&expected, encode_as)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("encoding {}", data_type))?;

        let registry = registry_with(7, data_type);
        let block = BlockBuilder::sim_object_data(1, 7).data(&data).build();
        let decoded = sim_object_value(classify(&block, &registry))
            .with_context(|| format!("decoding {}", data_type))?;

        assert_eq!(decoded.value, expected, "value for {}", data_type);
        if data_type == DataType::Invalid {
            assert_eq!(decoded.fidelity, Fidelity::InvalidDataType);
        } else {
            assert_eq!(decoded.fidelity, Fidelity::Declared, "fidelity for {}", data_type);
            assert_eq!(decoded.data_type, Some(data_type));
        }
    }
    Ok(())
}

#[test]
fn altitude_scenario_reads_inline_float() -> Result<()> {
    let registry = registry_with(1, DataType::Float32);
    let block = BlockBuilder::sim_object_data(100, 1).u32(1500.0f32.to_bits()).build();

    let value = sim_object_value(classify(&block, &registry))?;
    assert_eq!(value.value.as_f64(), Some(1500.0));
    Ok(())
}

#[test]
fn variable_string_scenario_stops_at_nul() -> Result<()> {
    let registry = registry_with(2, DataType::StringV);
    let block = BlockBuilder::sim_object_data(100, 2).data(b"B737\0garbage").build();

    let value = sim_object_value(classify(&block, &registry))?;
    assert_eq!(value.value, SimValue::String("B737".into()));
    Ok(())
}

#[test]
fn short_structures_fail_instead_of_guessing() {
    let registry = registry_with(3, DataType::InitPosition);
    // 40 bytes of metadata plus 20 of the 56 an init position needs
    let block = BlockBuilder::sim_object_data(1, 3).data(&[0u8; 20]).build();

    let envelope = classify(&block, &registry);
    assert!(envelope.payload.is_none());
    let fault = envelope.fault.expect("fault recorded");
    assert_eq!(fault.needed, Some(56));
    assert_eq!(fault.available, Some(20));
}

#[test]
fn unrecognized_tag_scenario_is_previewed() {
    let block = BlockBuilder::new(0xBEEF).data(&[7u8; 500]).build();

    let envelope = classify(&block, &DefinitionRegistry::new());
    assert_eq!(envelope.kind, MessageKind::Unrecognized(0xBEEF));
    assert_eq!(envelope.name, "UNRECOGNIZED");
    match envelope.payload {
        Some(Payload::Unhandled(unhandled)) => {
            assert_eq!(unhandled.preview.len(), simwire::protocol::DEFAULT_PREVIEW_BYTES);
            assert_eq!(&unhandled.preview[8..12], &0xBEEFu32.to_le_bytes());
            assert_eq!(unhandled.total_len, 512);
        }
        other => panic!("expected preview, got {other:?}"),
    }
}

#[test]
fn exception_severity_tiers() {
    let cases = [
        (0, "NONE", Severity::Info),
        (4, "UNOPENED", Severity::Critical),
        (5, "VERSION_MISMATCH", Severity::Critical),
        (6, "TOO_MANY_GROUPS", Severity::Warning),
        (11, "TOO_MANY_OBJECTS", Severity::Warning),
        (12, "TOO_MANY_REQUESTS", Severity::Warning),
        (26, "ALREADY_SUBSCRIBED", Severity::Warning),
        (29, "DUPLICATE_ID", Severity::Warning),
        (32, "ALREADY_CREATED", Severity::Warning),
        (7, "NAME_UNRECOGNIZED", Severity::Error),
        (999, "UNKNOWN", Severity::Error),
    ];

    for (code, name, severity) in cases {
        let envelope = classify(&BlockBuilder::exception(code, 3, 1).build(), &DefinitionRegistry::new());
        match envelope.payload {
            Some(Payload::Exception(exception)) => {
                assert_eq!(exception.name, name, "code {code}");
                assert_eq!(exception.severity, severity, "code {code}");
                assert!(!exception.description.is_empty());
            }
            other => panic!("expected exception for code {code}, got {other:?}"),
        }
    }
}

#[test]
fn open_record_carries_versions() {
    let mut builder = BlockBuilder::new(MessageKind::Open.id()).fixed_str("KittyHawk", 256);
    for v in [11, 0, 62651, 3, 5, 0, 0, 0, 0, 0] {
        builder = builder.u32(v);
    }
    let block = builder.build();
    assert_eq!(block.len(), sizes::OPEN);

    match classify(&block, &DefinitionRegistry::new()).payload {
        Some(Payload::Open(open)) => {
            assert_eq!(open.application_name, "KittyHawk");
            assert_eq!(open.application_version, [11, 0, 62651, 3]);
            assert_eq!(open.protocol_version, [5, 0, 0, 0]);
        }
        other => panic!("expected open, got {other:?}"),
    }
}

fn airport(builder: BlockBuilder, ident: &str) -> BlockBuilder {
    builder.fixed_str(ident, 6).fixed_str("K1", 3).lat_lon_alt(LatLonAlt {
        latitude: 47.0,
        longitude: -122.0,
        altitude: 100.0,
    })
}

#[test]
fn facility_list_keeps_whole_entries_only() {
    // Announces three airports but carries two and a half
    let mut builder = BlockBuilder::new(MessageKind::AirportList.id()).u32(9).u32(3).u32(0).u32(1);
    builder = airport(builder, "KSEA");
    builder = airport(builder, "KBFI");
    let block = builder.data(&[0u8; 16]).build();

    match classify(&block, &DefinitionRegistry::new()).payload {
        Some(Payload::FacilityList(list)) => {
            assert_eq!(list.kind, FacilityListKind::Airport);
            assert_eq!(list.request_id, 9);
            assert_eq!(list.array_size, 3);
            assert_eq!(list.entries.len(), 2);
            assert!(list.truncated);
            assert_eq!(list.entries[1].ident, "KBFI");
            assert_eq!(list.entries[0].mag_var, None);
        }
        other => panic!("expected airport list, got {other:?}"),
    }
}

#[test]
fn vor_entries_carry_every_extension() {
    let glide = LatLonAlt { latitude: 47.1, longitude: -122.1, altitude: 120.0 };
    let builder = BlockBuilder::new(MessageKind::VorList.id()).u32(4).u32(1).u32(0).u32(1);
    let block = airport(builder, "SEA")
        .f32(15.5) // mag var
        .u32(116_800_000) // frequency
        .u32(0x7) // flags
        .f32(163.0) // localizer
        .lat_lon_alt(glide)
        .f32(3.0)
        .build();
    assert_eq!(block.len(), sizes::FACILITIES_LIST + FacilityListKind::Vor.entry_size());

    match classify(&block, &DefinitionRegistry::new()).payload {
        Some(Payload::FacilityList(list)) => {
            assert!(!list.truncated);
            let entry = &list.entries[0];
            assert_eq!(entry.mag_var, Some(15.5));
            assert_eq!(entry.frequency, Some(116_800_000));
            let vor = entry.vor.expect("vor details");
            assert_eq!(vor.glide_slope, glide);
            assert_eq!(vor.glide_slope_angle, 3.0);
        }
        other => panic!("expected vor list, got {other:?}"),
    }
}

#[test]
fn custom_action_formats_guid_and_payload() {
    let guid = [
        0x78, 0x56, 0x34, 0x12, 0xBC, 0x9A, 0xF0, 0xDE, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD,
        0xEF,
    ];
    let block = BlockBuilder::event(MessageKind::CustomAction.id(), 1, 2, 0)
        .data(&guid)
        .u32(1)
        .data(b"{\"gate\":\"A4\"}\0")
        .build();

    match classify(&block, &DefinitionRegistry::new()).payload {
        Some(Payload::CustomAction(action)) => {
            assert_eq!(action.instance_id, "{12345678-9ABC-DEF0-0123-456789ABCDEF}");
            assert_eq!(action.wait_for_completion, 1);
            assert_eq!(action.payload, "{\"gate\":\"A4\"}");
        }
        other => panic!("expected custom action, got {other:?}"),
    }
}

#[test]
fn pick_reports_hit_position() {
    let hit = LatLonAlt { latitude: 51.47, longitude: -0.45, altitude: 25.0 };
    let block = BlockBuilder::new(MessageKind::Pick.id()).u32(5).u32(42).lat_lon_alt(hit).build();
    assert_eq!(block.len(), sizes::PICK);

    match classify(&block, &DefinitionRegistry::new()).payload {
        Some(Payload::Pick(pick)) => {
            assert_eq!(pick.request_id, 5);
            assert_eq!(pick.object_id, 42);
            assert_eq!(pick.position, hit);
        }
        other => panic!("expected pick, got {other:?}"),
    }
}

#[test]
fn system_state_and_frame_records() {
    let block = BlockBuilder::new(MessageKind::SystemState.id())
        .u32(8)
        .u32(1)
        .f32(0.0)
        .fixed_str("C:\\flights\\default.flt", 260)
        .build();
    match classify(&block, &DefinitionRegistry::new()).payload {
        Some(Payload::SystemState(state)) => {
            assert_eq!(state.request_id, 8);
            assert_eq!(state.string, "C:\\flights\\default.flt");
        }
        other => panic!("expected system state, got {other:?}"),
    }

    let block = BlockBuilder::event(MessageKind::EventFrame.id(), 0, 3, 0).f32(59.9).f32(1.0).build();
    match classify(&block, &DefinitionRegistry::new()).payload {
        Some(Payload::Frame(frame)) => {
            assert_eq!(frame.event.event_id, 3);
            assert_eq!(frame.frame_rate, 59.9);
        }
        other => panic!("expected frame, got {other:?}"),
    }
}

#[test]
fn envelopes_serialize_with_tagged_payloads() -> Result<()> {
    let registry = registry_with(1, DataType::Float64);
    let block = BlockBuilder::sim_object_data(2, 1).f64(1013.25).build();

    let json = serde_json::to_value(classify(&block, &registry))?;
    assert_eq!(json["name"], "SIMOBJECT_DATA");
    assert_eq!(json["payload"]["type"], "SimObjectData");
    assert_eq!(json["payload"]["data"]["info"]["request_id"], 2);
    Ok(())
}

proptest! {
    #[test]
    fn windows_shorter_than_the_type_never_decode(
        tag in 1u32..17,
        len in 0usize..64,
    ) {
        let data_type = DataType::from_tag(tag).expect("tag in range");
        let required = data_type.required_size();
        prop_assume!(len < required);

        let registry = registry_with(1, data_type);
        let block = BlockBuilder::sim_object_data(1, 1).data(&vec![0x5Au8; len]).build();
        let envelope = classify(&block, &registry);

        prop_assert!(envelope.payload.is_none());
        prop_assert!(envelope.fault.is_some());
    }

    #[test]
    fn trailing_bytes_beyond_the_header_size_are_ignored(
        data_type in proptest::sample::select(DataType::ALL.to_vec()),
        junk in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let registry = registry_with(1, data_type);
        let data = vec![0x31u8; data_type.required_size().max(4)];
        let clean = BlockBuilder::sim_object_data(1, 1).data(&data).build();

        let mut padded = clean.clone();
        padded.extend_from_slice(&junk);

        prop_assert_eq!(classify(&clean, &registry), classify(&padded, &registry));
    }
}
