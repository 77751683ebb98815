//! Exception code lookup and severity classification

use serde::{Deserialize, Serialize};

/// Severity tier of an exception reported by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Name, description, and severity resolved for an exception code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub code: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
}

// Exception codes with an explicit severity tier
pub mod codes {
    pub const NONE: u32 = 0;
    pub const UNOPENED: u32 = 4;
    pub const VERSION_MISMATCH: u32 = 5;
    pub const TOO_MANY_GROUPS: u32 = 6;
    pub const TOO_MANY_OBJECTS: u32 = 11;
    pub const TOO_MANY_REQUESTS: u32 = 12;
    pub const ALREADY_SUBSCRIBED: u32 = 26;
    pub const DUPLICATE_ID: u32 = 29;
    pub const ALREADY_CREATED: u32 = 32;
}

const EXCEPTIONS: [(&str, &str); 44] = [
    ("NONE", "No error"),
    ("ERROR", "Unspecified error"),
    ("SIZE_MISMATCH", "Data size does not match the definition"),
    ("UNRECOGNIZED_ID", "Unrecognized ID was sent"),
    ("UNOPENED", "Connection has not been opened"),
    ("VERSION_MISMATCH", "Client and server protocol versions do not match"),
    ("TOO_MANY_GROUPS", "Maximum number of notification groups exceeded"),
    ("NAME_UNRECOGNIZED", "Event or variable name was not recognized"),
    ("TOO_MANY_EVENT_NAMES", "Maximum number of event names exceeded"),
    ("EVENT_ID_DUPLICATE", "Event ID is already in use"),
    ("TOO_MANY_MAPS", "Maximum number of input maps exceeded"),
    ("TOO_MANY_OBJECTS", "Maximum number of objects exceeded"),
    ("TOO_MANY_REQUESTS", "Maximum number of requests exceeded"),
    ("WEATHER_INVALID_PORT", "Invalid port for weather request"),
    ("WEATHER_INVALID_METAR", "Invalid METAR string"),
    ("WEATHER_UNABLE_TO_GET_OBSERVATION", "Unable to get weather observation"),
    ("WEATHER_UNABLE_TO_CREATE_STATION", "Unable to create weather station"),
    ("WEATHER_UNABLE_TO_REMOVE_STATION", "Unable to remove weather station"),
    ("INVALID_DATA_TYPE", "Data type is not valid for the operation"),
    ("INVALID_DATA_SIZE", "Data size is not valid for the operation"),
    ("DATA_ERROR", "Generic data error"),
    ("INVALID_ARRAY", "Invalid array was sent"),
    ("CREATE_OBJECT_FAILED", "Object creation failed"),
    ("LOAD_FLIGHTPLAN_FAILED", "Flight plan could not be loaded"),
    ("OPERATION_INVALID_FOR_OBJECT_TYPE", "Operation is not valid for the object type"),
    ("ILLEGAL_OPERATION", "Operation is not allowed"),
    ("ALREADY_SUBSCRIBED", "Already subscribed to this event"),
    ("INVALID_ENUM", "Enumeration value is not valid"),
    ("DEFINITION_ERROR", "Problem with a data definition"),
    ("DUPLICATE_ID", "ID is already in use"),
    ("DATUM_ID", "Unknown datum ID"),
    ("OUT_OF_BOUNDS", "Value is out of bounds"),
    ("ALREADY_CREATED", "Object or name already exists"),
    ("OBJECT_OUTSIDE_REALITY_BUBBLE", "Object is outside the reality bubble"),
    ("OBJECT_CONTAINER", "Error in the object container"),
    ("OBJECT_AI", "Error in the AI object"),
    ("OBJECT_ATC", "Error in the ATC object"),
    ("OBJECT_SCHEDULE", "Error in the object schedule"),
    ("JETWAY_DATA", "Jetway data request failed"),
    ("ACTION_NOT_FOUND", "Action was not found"),
    ("NOT_AN_ACTION", "Target is not an action"),
    ("INCORRECT_ACTION_PARAMS", "Action parameters are incorrect"),
    ("GET_INPUT_EVENT_FAILED", "Input event could not be read"),
    ("SET_INPUT_EVENT_FAILED", "Input event could not be written"),
];

/// Severity tier for an exception code.
pub fn classify_exception(code: u32) -> Severity {
    use codes::*;

    match code {
        NONE => Severity::Info,
        UNOPENED | VERSION_MISMATCH => Severity::Critical,
        TOO_MANY_GROUPS | TOO_MANY_OBJECTS | TOO_MANY_REQUESTS | ALREADY_SUBSCRIBED
        | DUPLICATE_ID | ALREADY_CREATED => Severity::Warning,
        _ => Severity::Error,
    }
}

/// Resolve name, description, and severity for an exception code.
pub fn describe_exception(code: u32) -> ExceptionInfo {
    let (name, description) =
        EXCEPTIONS.get(code as usize).copied().unwrap_or(("UNKNOWN", "Unknown exception code"));

    ExceptionInfo { code, name, description, severity: classify_exception(code) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn severity_tiers() {
        assert_eq!(classify_exception(0), Severity::Info);
        assert_eq!(classify_exception(4), Severity::Critical);
        assert_eq!(classify_exception(5), Severity::Critical);
        for code in [6, 11, 12, 26, 29, 32] {
            assert_eq!(classify_exception(code), Severity::Warning, "code {}", code);
        }
        for code in [1, 2, 3, 7, 9, 18, 31, 43, 44, 9999] {
            assert_eq!(classify_exception(code), Severity::Error, "code {}", code);
        }
    }

    #[test]
    fn table_names_line_up_with_codes() {
        assert_eq!(describe_exception(codes::UNOPENED).name, "UNOPENED");
        assert_eq!(describe_exception(codes::DUPLICATE_ID).name, "DUPLICATE_ID");
        assert_eq!(describe_exception(codes::ALREADY_CREATED).name, "ALREADY_CREATED");
        assert_eq!(describe_exception(43).name, "SET_INPUT_EVENT_FAILED");

        let unknown = describe_exception(500);
        assert_eq!(unknown.name, "UNKNOWN");
        assert_eq!(unknown.severity, Severity::Error);
    }

    proptest! {
        #[test]
        fn prop_non_zero_unlisted_codes_are_errors(code in 1u32..=u32::MAX) {
            let listed = [4u32, 5, 6, 11, 12, 26, 29, 32];
            prop_assume!(!listed.contains(&code));
            prop_assert_eq!(classify_exception(code), Severity::Error);
            prop_assert!(!describe_exception(code).description.is_empty());
        }
    }
}
