//! TypeScript Generation Tests
//!
//! Validates that the envelope and command types can be exported to TypeScript
//! when the tauri feature is enabled.

#[cfg(feature = "tauri")]
#[test]
fn test_core_types_implement_specta_type() {
    use specta::Type;

    // If this compiles, every type a frontend sees is configured for export.
    fn assert_type<T: Type>() {}

    // Envelope and payloads
    assert_type::<simwire::Envelope>();
    assert_type::<simwire::Payload>();
    assert_type::<simwire::DecodeFault>();
    assert_type::<simwire::protocol::SimObjectData>();
    assert_type::<simwire::protocol::RecvHeader>();

    // Values
    assert_type::<simwire::SimValue>();
    assert_type::<simwire::DecodedValue>();
    assert_type::<simwire::Fidelity>();
    assert_type::<simwire::DataType>();
    assert_type::<simwire::MessageKind>();
    assert_type::<simwire::Severity>();

    // Commands and lifecycle
    assert_type::<simwire::Definition>();
    assert_type::<simwire::Period>();
    assert_type::<simwire::FacilityListKind>();
    assert_type::<simwire::NativeStatus>();
    assert_type::<simwire::DispatchState>();
}

#[cfg(not(feature = "tauri"))]
#[test]
fn test_tauri_feature_disabled() {
    // Without the tauri feature the types still build, just without specta::Type
    let _ = simwire::DispatchState::Idle;
    let _ = simwire::Period::Never;
}
