//! The 12-byte common header that prefixes every inbound block

use serde::{Deserialize, Serialize};

use super::reader::ByteReader;
use crate::DecodeError;
use crate::types::MessageKind;

/// Size of the common header in bytes.
pub const HEADER_SIZE: usize = 12;

/// Common header fields.
///
/// ```text
/// struct SIMCONNECT_RECV {
///   DWORD dwSize;     // offset 0, total size of the block
///   DWORD dwVersion;  // offset 4, protocol version
///   DWORD dwID;       // offset 8, message-kind tag
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct RecvHeader {
    pub size: u32,
    pub version: u32,
    pub id: u32,
}

impl RecvHeader {
    /// Parse the header from the start of a block.
    pub fn parse(block: &[u8]) -> Result<Self, DecodeError> {
        let reader = ByteReader::new(block);
        reader.require(HEADER_SIZE)?;

        Ok(Self { size: reader.u32(0)?, version: reader.u32(4)?, id: reader.u32(8)? })
    }

    /// Message kind named by the header tag.
    pub fn kind(&self) -> MessageKind {
        MessageKind::from_id(self.id)
    }

    /// The part of `block` this header vouches for.
    ///
    /// A header claiming more than the native side delivered is clamped to the block;
    /// a header claiming less trims trailing bytes. Sizes smaller than the header itself
    /// are ignored.
    pub fn window<'a>(&self, block: &'a [u8]) -> &'a [u8] {
        let claimed = self.size as usize;
        if claimed >= HEADER_SIZE && claimed < block.len() { &block[..claimed] } else { block }
    }
}
