//! Scripted transport that replays queued blocks and records every native call.
//!
//! Used by the crate's own tests and available to downstream consumers that want
//! to exercise a [`Client`](crate::Client) without a simulator.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{NativeHandle, NativeResult, NativeStatus, PollOutcome, RawBlock, Transport};
use crate::types::{DataType, FacilityListKind, Period};

/// One recorded native call (polls are counted, not recorded).
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    Open { name: String },
    Close { handle: usize },
    AddToDataDefinition { definition_id: u32, variable_name: String, units: String, data_type: DataType },
    ClearDataDefinition { definition_id: u32 },
    RequestData { request_id: u32, definition_id: u32, object_id: u32, period: Period },
    SetData { definition_id: u32, object_id: u32, data: Vec<u8> },
    MapClientEvent { event_id: u32, event_name: String },
    TransmitEvent { object_id: u32, event_id: u32, data: u32, group_id: u32, flags: u32 },
    SubscribeSystemEvent { event_id: u32, system_event_name: String },
    RequestSystemState { request_id: u32, state_name: String },
    RequestFacilitiesList { kind: FacilityListKind, request_id: u32 },
}

impl NativeCall {
    /// Name of the transport operation this call went through.
    pub fn operation(&self) -> &'static str {
        match self {
            NativeCall::Open { .. } => "open",
            NativeCall::Close { .. } => "close",
            NativeCall::AddToDataDefinition { .. } => "add_to_data_definition",
            NativeCall::ClearDataDefinition { .. } => "clear_data_definition",
            NativeCall::RequestData { .. } => "request_data_on_sim_object",
            NativeCall::SetData { .. } => "set_data_on_sim_object",
            NativeCall::MapClientEvent { .. } => "map_client_event_to_sim_event",
            NativeCall::TransmitEvent { .. } => "transmit_client_event",
            NativeCall::SubscribeSystemEvent { .. } => "subscribe_to_system_event",
            NativeCall::RequestSystemState { .. } => "request_system_state",
            NativeCall::RequestFacilitiesList { .. } => "request_facilities_list",
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    blocks: VecDeque<Vec<u8>>,
    calls: Vec<NativeCall>,
    /// Persistent failures keyed by operation name
    failures: HashMap<&'static str, NativeStatus>,
    /// One-shot poll failures, consumed before any block
    poll_errors: VecDeque<NativeStatus>,
    /// Polls that report a delivery without handing over a block
    silent_deliveries: usize,
}

/// In-memory [`Transport`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
    next_handle: AtomicUsize,
    polls: AtomicU64,
    active_polls: AtomicUsize,
    max_active_polls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport preloaded with `blocks`, delivered in order.
    pub fn with_blocks<I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let transport = Self::new();
        transport.script().blocks.extend(blocks);
        transport
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a block for a later poll.
    pub fn push_block(&self, block: Vec<u8>) {
        self.script().blocks.push_back(block);
    }

    /// Make every call to `operation` fail with `status` until cleared.
    pub fn fail(&self, operation: &'static str, status: NativeStatus) {
        self.script().failures.insert(operation, status);
    }

    pub fn clear_failure(&self, operation: &str) {
        self.script().failures.remove(operation);
    }

    /// Fail the next poll with `status`. Queued poll failures are consumed in order.
    pub fn push_poll_error(&self, status: NativeStatus) {
        self.script().poll_errors.push_back(status);
    }

    /// Report the next poll as delivered without visiting a block.
    ///
    /// Queued after poll failures and ahead of blocks.
    pub fn push_silent_delivery(&self) {
        self.script().silent_deliveries += 1;
    }

    /// Every recorded call, in order.
    pub fn calls(&self) -> Vec<NativeCall> {
        self.script().calls.clone()
    }

    /// Number of recorded calls to `operation`.
    pub fn call_count(&self, operation: &str) -> usize {
        self.script().calls.iter().filter(|call| call.operation() == operation).count()
    }

    /// Blocks not yet delivered.
    pub fn pending_blocks(&self) -> usize {
        self.script().blocks.len()
    }

    /// Total polls, including empty and failed ones.
    pub fn poll_count(&self) -> u64 {
        self.polls.load(Ordering::Acquire)
    }

    /// Highest number of polls ever in progress at once.
    pub fn max_concurrent_polls(&self) -> usize {
        self.max_active_polls.load(Ordering::Acquire)
    }

    fn record(&self, operation: &'static str, call: NativeCall) -> NativeResult<()> {
        let mut script = self.script();
        script.calls.push(call);
        match script.failures.get(operation) {
            Some(status) => Err(*status),
            None => Ok(()),
        }
    }
}

struct ActivePoll<'a>(&'a AtomicUsize);

impl Drop for ActivePoll<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Transport for ScriptedTransport {
    fn open(&self, name: &str) -> NativeResult<NativeHandle> {
        self.record("open", NativeCall::Open { name: name.to_string() })?;
        let raw = self.next_handle.fetch_add(1, Ordering::AcqRel) + 1;
        NativeHandle::new(raw).ok_or(NativeStatus::E_FAIL)
    }

    fn close(&self, handle: NativeHandle) -> NativeResult<()> {
        self.record("close", NativeCall::Close { handle: handle.get() })
    }

    fn next_dispatch(
        &self,
        _handle: NativeHandle,
        visit: &mut dyn FnMut(RawBlock<'_>),
    ) -> NativeResult<PollOutcome> {
        self.polls.fetch_add(1, Ordering::AcqRel);
        let active = self.active_polls.fetch_add(1, Ordering::AcqRel) + 1;
        let _active = ActivePoll(&self.active_polls);
        self.max_active_polls.fetch_max(active, Ordering::AcqRel);

        let block = {
            let mut script = self.script();
            if let Some(status) = script.poll_errors.pop_front() {
                return Err(status);
            }
            if let Some(status) = script.failures.get("next_dispatch") {
                return Err(*status);
            }
            if script.silent_deliveries > 0 {
                script.silent_deliveries -= 1;
                return Ok(PollOutcome::Delivered);
            }
            script.blocks.pop_front()
        };

        match block {
            Some(bytes) => {
                visit(RawBlock::new(&bytes));
                Ok(PollOutcome::Delivered)
            }
            None => Ok(PollOutcome::Empty),
        }
    }

    fn add_to_data_definition(
        &self,
        _handle: NativeHandle,
        definition_id: u32,
        variable_name: &str,
        units: &str,
        data_type: DataType,
    ) -> NativeResult<()> {
        self.record(
            "add_to_data_definition",
            NativeCall::AddToDataDefinition {
                definition_id,
                variable_name: variable_name.to_string(),
                units: units.to_string(),
                data_type,
            },
        )
    }

    fn clear_data_definition(&self, _handle: NativeHandle, definition_id: u32) -> NativeResult<()> {
        self.record("clear_data_definition", NativeCall::ClearDataDefinition { definition_id })
    }

    fn request_data_on_sim_object(
        &self,
        _handle: NativeHandle,
        request_id: u32,
        definition_id: u32,
        object_id: u32,
        period: Period,
    ) -> NativeResult<()> {
        self.record(
            "request_data_on_sim_object",
            NativeCall::RequestData { request_id, definition_id, object_id, period },
        )
    }

    fn set_data_on_sim_object(
        &self,
        _handle: NativeHandle,
        definition_id: u32,
        object_id: u32,
        data: &[u8],
    ) -> NativeResult<()> {
        self.record(
            "set_data_on_sim_object",
            NativeCall::SetData { definition_id, object_id, data: data.to_vec() },
        )
    }

    fn map_client_event_to_sim_event(
        &self,
        _handle: NativeHandle,
        event_id: u32,
        event_name: &str,
    ) -> NativeResult<()> {
        self.record(
            "map_client_event_to_sim_event",
            NativeCall::MapClientEvent { event_id, event_name: event_name.to_string() },
        )
    }

    fn transmit_client_event(
        &self,
        _handle: NativeHandle,
        object_id: u32,
        event_id: u32,
        data: u32,
        group_id: u32,
        flags: u32,
    ) -> NativeResult<()> {
        self.record(
            "transmit_client_event",
            NativeCall::TransmitEvent { object_id, event_id, data, group_id, flags },
        )
    }

    fn subscribe_to_system_event(
        &self,
        _handle: NativeHandle,
        event_id: u32,
        system_event_name: &str,
    ) -> NativeResult<()> {
        self.record(
            "subscribe_to_system_event",
            NativeCall::SubscribeSystemEvent {
                event_id,
                system_event_name: system_event_name.to_string(),
            },
        )
    }

    fn request_system_state(
        &self,
        _handle: NativeHandle,
        request_id: u32,
        state_name: &str,
    ) -> NativeResult<()> {
        self.record(
            "request_system_state",
            NativeCall::RequestSystemState { request_id, state_name: state_name.to_string() },
        )
    }

    fn request_facilities_list(
        &self,
        _handle: NativeHandle,
        kind: FacilityListKind,
        request_id: u32,
    ) -> NativeResult<()> {
        self.record("request_facilities_list", NativeCall::RequestFacilitiesList { kind, request_id })
    }
}
