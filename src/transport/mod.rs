//! Native transport capability.
//!
//! The transport is the only seam between the runtime and the simulator's native call
//! interface. A [`Client`](crate::Client) holds exactly one transport, constructed once
//! and shared with the dispatch loop. Every command maps onto one transport call;
//! inbound data is pulled with [`Transport::next_dispatch`].
//!
//! Implementations backed by a real native library live outside this crate. Tests and
//! downstream consumers can use [`ScriptedTransport`] to replay synthetic blocks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

use crate::types::{DataType, FacilityListKind, Period};

mod scripted;

pub use scripted::{NativeCall, ScriptedTransport};

/// HRESULT-style status code returned by native calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct NativeStatus(pub i32);

impl NativeStatus {
    /// Success.
    pub const S_OK: NativeStatus = NativeStatus(0);
    /// Unspecified failure.
    pub const E_FAIL: NativeStatus = NativeStatus(0x8000_4005_u32 as i32);
    /// One or more arguments are invalid.
    pub const E_INVALIDARG: NativeStatus = NativeStatus(0x8007_0057_u32 as i32);

    /// Returns true for non-negative (success) codes.
    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for NativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0 as u32)
    }
}

/// Result of a native call.
pub type NativeResult<T> = std::result::Result<T, NativeStatus>;

/// Opaque handle for an open native connection. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(NonZeroUsize);

impl NativeHandle {
    /// Wrap a raw handle value, returning `None` for the unbound (zero) handle.
    pub fn new(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }

    /// Raw handle value.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// A raw inbound block, valid only for the duration of one poll iteration.
///
/// The borrow ties the block to the [`Transport::next_dispatch`] callback, so no
/// reference into native memory can outlive the iteration that produced it.
#[derive(Debug, Clone, Copy)]
pub struct RawBlock<'a> {
    bytes: &'a [u8],
}

impl<'a> RawBlock<'a> {
    /// Wrap an owned-elsewhere byte slice.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Build a block from a native (pointer, length) pair.
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must point to `len` readable bytes that remain valid and unmodified for
    /// the lifetime `'a`, which the caller must bound to the current poll iteration.
    pub unsafe fn from_raw_parts(ptr: *const u8, len: u32) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }
        // SAFETY: upheld by the caller per the contract above.
        let bytes = unsafe { std::slice::from_raw_parts(ptr, len as usize) };
        Some(Self { bytes })
    }

    /// Bytes of the block.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Length reported by the native side.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the block is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Outcome of one poll of the native transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A block was handed to the visitor.
    Delivered,
    /// Nothing was pending.
    Empty,
}

/// Object ID addressing the user's own aircraft.
pub const USER_OBJECT_ID: u32 = 0;

/// Native call interface of the simulator.
///
/// All methods are synchronous: they map one-to-one onto native calls that return
/// immediately. Implementations must be shareable between the caller's threads and
/// the dispatch loop.
pub trait Transport: Send + Sync + 'static {
    /// Open a connection under the given client name.
    fn open(&self, name: &str) -> NativeResult<NativeHandle>;

    /// Tear down a connection.
    fn close(&self, handle: NativeHandle) -> NativeResult<()>;

    /// Pull the next pending block, if any, and hand it to `visit`.
    ///
    /// The block is only valid inside `visit`.
    fn next_dispatch(
        &self,
        handle: NativeHandle,
        visit: &mut dyn FnMut(RawBlock<'_>),
    ) -> NativeResult<PollOutcome>;

    /// Add a variable to a data definition.
    fn add_to_data_definition(
        &self,
        handle: NativeHandle,
        definition_id: u32,
        variable_name: &str,
        units: &str,
        data_type: DataType,
    ) -> NativeResult<()>;

    /// Clear a data definition.
    fn clear_data_definition(&self, handle: NativeHandle, definition_id: u32) -> NativeResult<()>;

    /// Request data for a definition on a sim object.
    fn request_data_on_sim_object(
        &self,
        handle: NativeHandle,
        request_id: u32,
        definition_id: u32,
        object_id: u32,
        period: Period,
    ) -> NativeResult<()>;

    /// Write encoded data for a definition onto a sim object.
    fn set_data_on_sim_object(
        &self,
        handle: NativeHandle,
        definition_id: u32,
        object_id: u32,
        data: &[u8],
    ) -> NativeResult<()>;

    /// Bind a client event ID to a named sim event.
    fn map_client_event_to_sim_event(
        &self,
        handle: NativeHandle,
        event_id: u32,
        event_name: &str,
    ) -> NativeResult<()>;

    /// Fire a client event.
    fn transmit_client_event(
        &self,
        handle: NativeHandle,
        object_id: u32,
        event_id: u32,
        data: u32,
        group_id: u32,
        flags: u32,
    ) -> NativeResult<()>;

    /// Subscribe to a named system event.
    fn subscribe_to_system_event(
        &self,
        handle: NativeHandle,
        event_id: u32,
        system_event_name: &str,
    ) -> NativeResult<()>;

    /// Request a named system state value.
    fn request_system_state(
        &self,
        handle: NativeHandle,
        request_id: u32,
        state_name: &str,
    ) -> NativeResult<()>;

    /// Request a facility list.
    fn request_facilities_list(
        &self,
        handle: NativeHandle,
        kind: FacilityListKind,
        request_id: u32,
    ) -> NativeResult<()>;
}
