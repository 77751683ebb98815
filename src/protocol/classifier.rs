//! Message classifier: common header, tag lookup, per-kind decode.
//!
//! The classifier owns a table from message-kind tag to decoder function. Tags
//! without an entry (unknown tags, and known kinds this runtime does not decode)
//! produce an envelope with a bounded preview of the raw block. A decoder failure
//! never escapes: the envelope records the fault and carries no payload.

use std::collections::HashMap;

use super::envelope::Envelope;
use super::header::{HEADER_SIZE, RecvHeader};
use super::reader::ByteReader;
use super::records::{self, DecodeFn};
use crate::registry::DefinitionRegistry;
use crate::types::MessageKind;

/// Default number of raw bytes kept in an unhandled preview.
pub const DEFAULT_PREVIEW_BYTES: usize = 64;

/// Inputs available to every per-kind decoder.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    /// Header of the block being decoded
    pub header: RecvHeader,
    /// Declared types for sim object data
    pub registry: &'a DefinitionRegistry,
    /// Cap on unhandled preview length
    pub preview_bytes: usize,
}

/// Tag -> decoder table plus the preview bound.
#[derive(Debug, Clone)]
pub struct Classifier {
    decoders: HashMap<u32, DecodeFn>,
    preview_bytes: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_BYTES)
    }
}

impl Classifier {
    /// Classifier with a decoder for every kind this runtime understands.
    pub fn new(preview_bytes: usize) -> Self {
        use MessageKind as K;

        let table: [(MessageKind, DecodeFn); 27] = [
            (K::Null, records::header_only),
            (K::Exception, records::exception),
            (K::Open, records::open),
            (K::Quit, records::header_only),
            (K::Event, records::event),
            (K::EventObjectAddRemove, records::object_add_remove),
            (K::EventFilename, records::filename),
            (K::EventFrame, records::frame),
            (K::SimObjectData, records::sim_object_data),
            (K::SimObjectDataByType, records::sim_object_data),
            (K::AssignedObjectId, records::assigned_object_id),
            (K::ReservedKey, records::reserved_key),
            (K::CustomAction, records::custom_action),
            (K::SystemState, records::system_state),
            (K::ClientData, records::client_data),
            (K::EventWeatherMode, records::event),
            (K::AirportList, records::airport_list),
            (K::VorList, records::vor_list),
            (K::NdbList, records::ndb_list),
            (K::WaypointList, records::waypoint_list),
            (K::EventMultiplayerServerStarted, records::event),
            (K::EventMultiplayerClientStarted, records::event),
            (K::EventMultiplayerSessionEnded, records::event),
            (K::EventEx1, records::event_ex1),
            (K::FacilityData, records::facility_data),
            (K::FacilityDataEnd, records::facility_data_end),
            (K::Pick, records::pick),
        ];

        let decoders = table.into_iter().map(|(kind, decoder)| (kind.id(), decoder)).collect();

        Self { decoders, preview_bytes }
    }

    /// Install (or replace) the decoder for a raw tag.
    pub fn with_decoder(mut self, id: u32, decoder: DecodeFn) -> Self {
        self.decoders.insert(id, decoder);
        self
    }

    /// Whether a dedicated decoder is installed for `id`.
    pub fn has_decoder(&self, id: u32) -> bool {
        self.decoders.contains_key(&id)
    }

    pub fn preview_bytes(&self) -> usize {
        self.preview_bytes
    }

    /// Decode one raw block into an owned envelope.
    ///
    /// Nothing in the returned envelope borrows from `block`. A block too short to
    /// hold the common header yields a faulted envelope whose header fields are read
    /// from the zero-padded bytes that were present.
    pub fn classify(&self, block: &[u8], registry: &DefinitionRegistry) -> Envelope {
        let header = match RecvHeader::parse(block) {
            Ok(header) => header,
            Err(err) => {
                let mut padded = [0u8; HEADER_SIZE];
                padded[..block.len()].copy_from_slice(block);
                let partial = RecvHeader::parse(&padded).unwrap_or(RecvHeader {
                    size: block.len() as u32,
                    version: 0,
                    id: 0,
                });
                return Envelope::faulted(partial, &err);
            }
        };

        let window = header.window(block);
        let reader = ByteReader::new(window);
        let ctx = DecodeContext { header, registry, preview_bytes: self.preview_bytes };
        let decoder = self.decoders.get(&header.id).copied().unwrap_or(records::unhandled);

        match decoder(&reader, &ctx) {
            Ok(payload) => Envelope::new(header, payload),
            Err(err) => Envelope::faulted(header, &err),
        }
    }
}
