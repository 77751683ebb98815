//! Builder for synthetic raw blocks.
//!
//! Produces byte-exact blocks in the wire layout, for tests, benchmarks and
//! transports that replay recorded traffic. The header size field is filled in by
//! [`BlockBuilder::build`].

use super::header::HEADER_SIZE;
use crate::types::{LatLonAlt, MessageKind};

/// Protocol version written into synthetic headers unless overridden.
pub const DEFAULT_VERSION: u32 = 6;

/// Little-endian block writer.
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    version: u32,
    id: u32,
    body: Vec<u8>,
}

impl BlockBuilder {
    /// Empty block for a raw message-kind tag.
    pub fn new(id: u32) -> Self {
        Self { version: DEFAULT_VERSION, id, body: Vec::new() }
    }

    /// Sim object data record header for the user object, ready for `data`.
    pub fn sim_object_data(request_id: u32, define_id: u32) -> Self {
        Self::data_record(MessageKind::SimObjectData, request_id, define_id)
    }

    /// Any sim-object-shaped record (object data, by-type data, client data).
    pub fn data_record(kind: MessageKind, request_id: u32, define_id: u32) -> Self {
        Self::new(kind.id())
            .u32(request_id)
            .u32(0) // object_id
            .u32(define_id)
            .u32(0) // flags
            .u32(1) // entry_number
            .u32(1) // out_of
            .u32(1) // define_count
    }

    pub fn exception(code: u32, send_id: u32, index: u32) -> Self {
        Self::new(MessageKind::Exception.id()).u32(code).u32(send_id).u32(index)
    }

    /// Event-shaped record prefix.
    pub fn event(id: u32, group_id: u32, event_id: u32, data: u32) -> Self {
        Self::new(id).u32(group_id).u32(event_id).u32(data)
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.body.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn f32(mut self, value: f32) -> Self {
        self.body.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn f64(mut self, value: f64) -> Self {
        self.body.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// NUL-padded fixed-width string field. Longer input is cut to `width`.
    pub fn fixed_str(mut self, value: &str, width: usize) -> Self {
        let bytes = value.as_bytes();
        let len = bytes.len().min(width);
        self.body.extend_from_slice(&bytes[..len]);
        self.body.resize(self.body.len() + (width - len), 0);
        self
    }

    pub fn lat_lon_alt(self, position: LatLonAlt) -> Self {
        self.f64(position.latitude).f64(position.longitude).f64(position.altitude)
    }

    /// Raw bytes appended as-is.
    pub fn data(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Finish the block, writing the total size into the header.
    pub fn build(self) -> Vec<u8> {
        let size = (HEADER_SIZE + self.body.len()) as u32;
        let mut block = Vec::with_capacity(size as usize);
        block.extend_from_slice(&size.to_le_bytes());
        block.extend_from_slice(&self.version.to_le_bytes());
        block.extend_from_slice(&self.id.to_le_bytes());
        block.extend_from_slice(&self.body);
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::header::RecvHeader;

    #[test]
    fn header_records_total_size() {
        let block = BlockBuilder::new(3).data(&[9; 5]).build();
        let header = RecvHeader::parse(&block).expect("header");

        assert_eq!(header.size as usize, block.len());
        assert_eq!(header.version, DEFAULT_VERSION);
        assert_eq!(header.kind(), MessageKind::Quit);
    }

    #[test]
    fn data_record_metadata_is_forty_bytes() {
        let block = BlockBuilder::sim_object_data(1, 2).build();
        assert_eq!(block.len(), 40);
    }

    #[test]
    fn fixed_strings_are_padded() {
        let block = BlockBuilder::new(0).fixed_str("EGLL", 6).fixed_str("TOOLONG", 3).build();
        assert_eq!(&block[12..], b"EGLL\0\0TOO");
    }
}
