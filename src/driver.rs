//! Dispatch loop: polls the transport and feeds decoded envelopes to the channel
//!
//! One loop runs per [`Client`](crate::Client), spawned by the first `listen()`.
//! Each iteration polls the native transport once. A delivered block is classified
//! while the transport still owns its memory, and the owned envelope is then sent
//! on the bounded channel; a full channel suspends the loop until a consumer catches
//! up. Empty polls, polls while disconnected and native failures all wait before
//! the next iteration, failures with a capped exponential backoff.
//!
//! The loop only ends through the cancellation token. Its state is published on a
//! watch channel so `close()` can wait for `Stopped`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::protocol::{Classifier, Envelope};
use crate::registry::DefinitionRegistry;
use crate::transport::{NativeHandle, PollOutcome, Transport};

/// Lifecycle of the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum DispatchState {
    /// Not started yet
    Idle,
    /// Polling the transport
    Running,
    /// Cancellation seen, finishing the current iteration
    Draining,
    /// Loop has returned; nothing more will be sent
    Stopped,
}

impl DispatchState {
    pub fn is_stopped(self) -> bool {
        self == DispatchState::Stopped
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchState::Idle => "idle",
            DispatchState::Running => "running",
            DispatchState::Draining => "draining",
            DispatchState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub polls: u64,
    pub delivered: u64,
    pub faulted: u64,
    pub native_errors: u64,
}

/// Everything the loop task owns.
pub(crate) struct DispatchLoop {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) connection: Arc<RwLock<Option<NativeHandle>>>,
    pub(crate) registry: Arc<DefinitionRegistry>,
    pub(crate) classifier: Classifier,
    pub(crate) envelopes: mpsc::Sender<Envelope>,
    pub(crate) state: Arc<watch::Sender<DispatchState>>,
    pub(crate) cancel: CancellationToken,
    pub(crate) poll_interval: Duration,
    pub(crate) max_backoff: Duration,
}

/// Publishes `Stopped` when dropped, including on unwind.
struct StoppedOnDrop(Arc<watch::Sender<DispatchState>>);

impl Drop for StoppedOnDrop {
    fn drop(&mut self) {
        self.0.send_replace(DispatchState::Stopped);
    }
}

enum Wait {
    Elapsed,
    Cancelled,
}

impl DispatchLoop {
    /// Spawn the loop onto `runtime`; it runs until cancelled.
    ///
    /// The `Stopped` guard exists before the task does, so a task dropped unpolled
    /// (runtime shut down first) still publishes `Stopped`. The envelope sender is
    /// dropped before the guard, so receivers see the channel end by the time the
    /// loop reports `Stopped`.
    pub(crate) fn spawn(self, runtime: &Handle) -> JoinHandle<DispatchStats> {
        let stopped = StoppedOnDrop(Arc::clone(&self.state));
        runtime.spawn(async move {
            let _stopped = stopped;
            self.run().await
        })
    }

    async fn run(self) -> DispatchStats {
        info!(poll_interval_ms = self.poll_interval.as_millis() as u64, "Dispatch loop started");

        let mut stats = DispatchStats::default();
        let mut consecutive_errors = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let Some(handle) = self.current_handle() else {
                // Not connected: nothing to poll yet
                match self.wait(self.poll_interval).await {
                    Wait::Elapsed => continue,
                    Wait::Cancelled => break,
                }
            };

            stats.polls += 1;
            let mut decoded: Option<Envelope> = None;
            let outcome = self.transport.next_dispatch(handle, &mut |block| {
                decoded = Some(self.classifier.classify(block.as_bytes(), &self.registry));
            });

            match outcome {
                Ok(PollOutcome::Delivered) => {
                    consecutive_errors = 0;
                    let Some(envelope) = decoded else {
                        // Reported a delivery but handed over no block: back off like an empty poll
                        debug!("Transport delivered without a block");
                        match self.wait(self.poll_interval).await {
                            Wait::Elapsed => continue,
                            Wait::Cancelled => break,
                        }
                    };

                    if let Some(fault) = &envelope.fault {
                        stats.faulted += 1;
                        warn!(kind = %envelope.kind, reason = %fault.reason, "Envelope decoded with fault");
                    } else {
                        trace!(kind = %envelope.kind, size = envelope.size, "Envelope decoded");
                    }

                    // A full channel parks the loop here; cancellation abandons the envelope
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => break,
                        sent = self.envelopes.send(envelope) => {
                            if sent.is_err() {
                                debug!("Envelope receivers dropped, stopping dispatch");
                                break;
                            }
                            stats.delivered += 1;
                        }
                    }
                }
                Ok(PollOutcome::Empty) => {
                    consecutive_errors = 0;
                    if let Wait::Cancelled = self.wait(self.poll_interval).await {
                        break;
                    }
                }
                Err(status) => {
                    consecutive_errors = consecutive_errors.saturating_add(1);
                    stats.native_errors += 1;

                    let backoff = self.backoff(consecutive_errors);
                    warn!(
                        %status,
                        consecutive_errors,
                        backoff_ms = backoff.as_millis() as u64,
                        "Native poll failed"
                    );

                    if let Wait::Cancelled = self.wait(backoff).await {
                        break;
                    }
                }
            }
        }

        self.state.send_if_modified(|state| {
            if *state == DispatchState::Running {
                *state = DispatchState::Draining;
                true
            } else {
                false
            }
        });

        info!(
            polls = stats.polls,
            delivered = stats.delivered,
            faulted = stats.faulted,
            native_errors = stats.native_errors,
            "Dispatch loop stopped"
        );
        stats
    }

    fn current_handle(&self) -> Option<NativeHandle> {
        *self.connection.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Poll interval doubled per consecutive failure, capped.
    fn backoff(&self, consecutive_errors: u32) -> Duration {
        let factor = 1u32 << consecutive_errors.min(10);
        self.poll_interval.saturating_mul(factor).min(self.max_backoff)
    }

    async fn wait(&self, delay: Duration) -> Wait {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Wait::Cancelled,
            _ = tokio::time::sleep(delay) => Wait::Elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BlockBuilder, Payload};
    use crate::transport::{NativeStatus, ScriptedTransport};
    use crate::types::MessageKind;

    struct Harness {
        transport: Arc<ScriptedTransport>,
        connection: Arc<RwLock<Option<NativeHandle>>>,
        state: Arc<watch::Sender<DispatchState>>,
        cancel: CancellationToken,
    }

    fn harness(
        transport: ScriptedTransport,
        capacity: usize,
    ) -> (Harness, DispatchLoop, mpsc::Receiver<Envelope>) {
        let transport = Arc::new(transport);
        let connection = Arc::new(RwLock::new(NativeHandle::new(1)));
        let (state, _) = watch::channel(DispatchState::Running);
        let state = Arc::new(state);
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(capacity);

        let dispatch = DispatchLoop {
            transport: Arc::clone(&transport) as Arc<dyn Transport>,
            connection: Arc::clone(&connection),
            registry: Arc::new(DefinitionRegistry::new()),
            classifier: Classifier::default(),
            envelopes: tx,
            state: Arc::clone(&state),
            cancel: cancel.clone(),
            poll_interval: Duration::from_millis(1),
            max_backoff: Duration::from_millis(8),
        };

        (Harness { transport, connection, state, cancel }, dispatch, rx)
    }

    #[tokio::test]
    async fn delivers_blocks_in_transport_order() {
        let transport = ScriptedTransport::with_blocks((0..5).map(|i| {
            BlockBuilder::event(MessageKind::Event.id(), 0, i, 0).build()
        }));
        let (harness, dispatch, mut rx) = harness(transport, 16);
        let task = dispatch.spawn(&Handle::current());

        for expected in 0..5 {
            let envelope = rx.recv().await.expect("envelope");
            let Some(Payload::Event(event)) = envelope.payload else {
                panic!("expected event");
            };
            assert_eq!(event.event_id, expected);
        }

        harness.cancel.cancel();
        let stats = task.await.expect("join");
        assert_eq!(stats.delivered, 5);
        assert!(harness.state.borrow().is_stopped());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn native_errors_do_not_stop_the_loop() {
        let transport = ScriptedTransport::with_blocks([BlockBuilder::new(3).build()]);
        transport.push_poll_error(NativeStatus::E_FAIL);
        transport.push_poll_error(NativeStatus::E_FAIL);
        let (harness, dispatch, mut rx) = harness(transport, 4);
        let task = dispatch.spawn(&Handle::current());

        let envelope = rx.recv().await.expect("envelope after errors");
        assert_eq!(envelope.kind, MessageKind::Quit);

        harness.cancel.cancel();
        let stats = task.await.expect("join");
        assert_eq!(stats.native_errors, 2);
    }

    #[tokio::test]
    async fn faulted_blocks_are_still_delivered() {
        let transport =
            ScriptedTransport::with_blocks([BlockBuilder::new(MessageKind::Exception.id()).build()]);
        let (harness, dispatch, mut rx) = harness(transport, 4);
        let task = dispatch.spawn(&Handle::current());

        let envelope = rx.recv().await.expect("envelope");
        assert!(envelope.fault.is_some());

        harness.cancel.cancel();
        assert_eq!(task.await.expect("join").faulted, 1);
    }

    #[tokio::test]
    async fn disconnected_loop_does_not_poll() {
        let (harness, dispatch, _rx) = harness(ScriptedTransport::new(), 4);
        *harness.connection.write().expect("lock") = None;
        let task = dispatch.spawn(&Handle::current());

        tokio::time::sleep(Duration::from_millis(20)).await;
        harness.cancel.cancel();
        task.await.expect("join");

        assert_eq!(harness.transport.poll_count(), 0);
    }

    #[tokio::test]
    async fn cancel_unblocks_a_full_channel() {
        let transport = ScriptedTransport::with_blocks((0..4).map(|_| BlockBuilder::new(3).build()));
        let (harness, dispatch, rx) = harness(transport, 1);
        let task = dispatch.spawn(&Handle::current());

        // Nobody reads: the loop parks on the second send
        while harness.transport.pending_blocks() > 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        harness.cancel.cancel();

        let stats = task.await.expect("join");
        assert_eq!(stats.delivered, 1);
        assert!(harness.state.borrow().is_stopped());
        drop(rx);
    }

    #[tokio::test]
    async fn deliveries_without_a_block_wait_between_polls() {
        let transport = ScriptedTransport::new();
        for _ in 0..1000 {
            transport.push_silent_delivery();
        }
        let (harness, dispatch, mut rx) = harness(transport, 4);
        let task = dispatch.spawn(&Handle::current());

        tokio::time::sleep(Duration::from_millis(20)).await;
        harness.cancel.cancel();
        let stats = task.await.expect("join");

        assert!(harness.transport.poll_count() < 100, "polled {} times", harness.transport.poll_count());
        assert_eq!(stats.delivered, 0);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn backoff_is_capped() {
        let (_harness, dispatch, _rx) = harness(ScriptedTransport::new(), 1);
        assert_eq!(dispatch.backoff(1), Duration::from_millis(2));
        assert_eq!(dispatch.backoff(2), Duration::from_millis(4));
        assert_eq!(dispatch.backoff(30), Duration::from_millis(8));
    }

    #[test]
    fn states_display_lowercase() {
        assert_eq!(DispatchState::Draining.to_string(), "draining");
        assert!(!DispatchState::Running.is_stopped());
    }
}
