//! Client: connection lifecycle and the command surface

use futures::Stream;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::receiver::EnvelopeReceiver;
use crate::config::ClientConfig;
use crate::driver::{DispatchLoop, DispatchState};
use crate::handler::EnvelopeHandler;
use crate::protocol::{Classifier, Envelope, encode_value};
use crate::registry::{Definition, DefinitionRegistry};
use crate::transport::{NativeHandle, NativeResult, Transport, USER_OBJECT_ID};
use crate::types::{DataType, FacilityListKind, Period, SimValue};
use crate::{
    ClientError, CloseError, ConnectError, RegisterError, RequestError, Result, SetError,
};

/// Connection to the simulator.
///
/// Cloning is cheap; clones share the connection, registry and dispatch loop.
/// Commands are synchronous and map onto one native call each. Inbound data flows
/// through the channel returned by [`listen`](Client::listen).
///
/// ```rust
/// use std::sync::Arc;
/// use simwire::{Client, ClientConfig, DataType, ScriptedTransport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> simwire::Result<()> {
/// let transport = Arc::new(ScriptedTransport::new());
/// let client = Client::new(transport, ClientConfig::named("altitude-monitor"))?;
///
/// client.connect()?;
/// client.register(1, "PLANE ALTITUDE", "feet", DataType::Float32)?;
/// client.request_once(1, 100)?;
///
/// let envelopes = client.listen()?;
/// client.close().await?;
/// assert!(envelopes.recv().await.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<Shared>,
}

struct Shared {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    /// Bound handle; `None` while disconnected
    connection: Arc<RwLock<Option<NativeHandle>>>,
    registry: Arc<DefinitionRegistry>,
    state: Arc<watch::Sender<DispatchState>>,
    cancel: CancellationToken,
    receiver: EnvelopeReceiver,
    /// Handed to the dispatch loop by the first `listen()`
    sender: Mutex<Option<mpsc::Sender<Envelope>>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        debug!("Dropping client");
        self.cancel.cancel();

        let handle = self.connection.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if let Err(status) = self.transport.close(handle) {
                warn!(%status, "Failed to close native handle on drop");
            }
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.inner.config.name)
            .field("open", &self.is_open())
            .field("dispatch_state", &self.dispatch_state())
            .field("definitions", &self.inner.registry.len())
            .finish()
    }
}

impl Client {
    /// Create a client over `transport`. Nothing is opened or spawned yet.
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let (sender, receiver) = mpsc::channel(config.channel_capacity);
        let (state, _) = watch::channel(DispatchState::Idle);

        Ok(Self {
            inner: Arc::new(Shared {
                transport,
                config,
                connection: Arc::new(RwLock::new(None)),
                registry: Arc::new(DefinitionRegistry::new()),
                state: Arc::new(state),
                cancel: CancellationToken::new(),
                receiver: EnvelopeReceiver::new(receiver),
                sender: Mutex::new(Some(sender)),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Declared definitions, shared with the decoder.
    pub fn registry(&self) -> &DefinitionRegistry {
        &self.inner.registry
    }

    pub fn is_open(&self) -> bool {
        self.inner.connection.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Open a native connection under `name`.
    pub fn open(&self, name: &str) -> Result<(), ConnectError> {
        let mut connection = self.inner.connection.write().unwrap_or_else(PoisonError::into_inner);
        if connection.is_some() {
            return Err(ClientError::AlreadyOpen);
        }

        let handle =
            self.inner.transport.open(name).map_err(|status| ClientError::NativeOpen { status })?;
        *connection = Some(handle);

        info!(name, handle = handle.get(), "Connection opened");
        Ok(())
    }

    /// Open under the configured client name.
    pub fn connect(&self) -> Result<(), ConnectError> {
        self.open(&self.inner.config.name)
    }

    /// Stop the dispatch loop and release the native connection.
    ///
    /// Safe to call any number of times, concurrently. When any call returns the
    /// loop has stopped and will send nothing more. Only the call that finds the
    /// handle bound performs native teardown; the handle is unbound even if that
    /// teardown fails.
    pub async fn close(&self) -> Result<(), CloseError> {
        self.inner.cancel.cancel();

        let never_started = self.inner.state.send_if_modified(|state| {
            if *state == DispatchState::Idle {
                *state = DispatchState::Stopped;
                true
            } else {
                false
            }
        });

        if never_started {
            // Ends the channel for anyone already holding a receiver
            self.inner.sender.lock().unwrap_or_else(PoisonError::into_inner).take();
        } else {
            let mut state = self.inner.state.subscribe();
            let _ = state.wait_for(|state| state.is_stopped()).await;
        }

        let handle = self.inner.connection.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            info!(handle = handle.get(), "Closing connection");
            self.inner.transport.close(handle).map_err(|status| {
                warn!(%status, "Native close failed; handle released anyway");
                ClientError::native("close", status)
            })?;
        }

        Ok(())
    }

    /// Start the dispatch loop (first call only) and return the envelope channel.
    ///
    /// Every call returns a handle to the same channel. The loop does not need an
    /// open connection: until one is bound it idles at the poll interval.
    pub fn listen(&self) -> Result<EnvelopeReceiver> {
        if *self.inner.state.borrow() == DispatchState::Idle {
            let runtime =
                Handle::try_current().map_err(|_| ClientError::NoRuntime { operation: "listen" })?;

            let started = self.inner.state.send_if_modified(|state| {
                if *state == DispatchState::Idle {
                    *state = DispatchState::Running;
                    true
                } else {
                    false
                }
            });

            if started {
                self.spawn_dispatch(&runtime);
            }
        }

        Ok(self.inner.receiver.clone())
    }

    fn spawn_dispatch(&self, runtime: &Handle) {
        let sender = self.inner.sender.lock().unwrap_or_else(PoisonError::into_inner).take();
        let Some(envelopes) = sender else {
            self.inner.state.send_replace(DispatchState::Stopped);
            return;
        };

        let dispatch = DispatchLoop {
            transport: Arc::clone(&self.inner.transport),
            connection: Arc::clone(&self.inner.connection),
            registry: Arc::clone(&self.inner.registry),
            classifier: Classifier::new(self.inner.config.preview_bytes),
            envelopes,
            state: Arc::clone(&self.inner.state),
            cancel: self.inner.cancel.clone(),
            poll_interval: self.inner.config.poll_interval(),
            max_backoff: self.inner.config.max_poll_backoff(),
        };

        info!(capacity = self.inner.config.channel_capacity, "Listening for envelopes");
        dispatch.spawn(runtime);
    }

    /// Pump envelopes into `handler` until the channel ends.
    ///
    /// Starts the dispatch loop if needed. Returns the number of envelopes handled.
    pub async fn run<H>(&self, mut handler: H) -> Result<u64>
    where
        H: EnvelopeHandler,
    {
        let envelopes = self.listen()?;
        let mut handled = 0u64;

        while let Some(envelope) = envelopes.recv().await {
            handler.on_envelope(envelope).await;
            handled += 1;
        }

        handler.on_end().await;
        debug!(handled, "Envelope channel ended");
        Ok(handled)
    }

    pub fn dispatch_state(&self) -> DispatchState {
        *self.inner.state.borrow()
    }

    /// Current dispatch state followed by every change.
    pub fn state_updates(&self) -> impl Stream<Item = DispatchState> + Send + 'static {
        WatchStream::new(self.inner.state.subscribe())
    }

    /// Run `call` with the bound handle, holding the connection shared.
    fn with_handle<R>(
        &self,
        operation: &'static str,
        call: impl FnOnce(&dyn Transport, NativeHandle) -> NativeResult<R>,
    ) -> Result<R> {
        let connection = self.inner.connection.read().unwrap_or_else(PoisonError::into_inner);
        let handle = (*connection).ok_or(ClientError::NotOpen)?;
        call(self.inner.transport.as_ref(), handle)
            .map_err(|status| ClientError::native(operation, status))
    }

    /// Declare `variable_name` under `definition_id`.
    ///
    /// The registry is updated only after the native side accepts the layout, and
    /// before this returns, so data for the definition decodes with `data_type`.
    pub fn register(
        &self,
        definition_id: u32,
        variable_name: &str,
        units: &str,
        data_type: DataType,
    ) -> Result<(), RegisterError> {
        self.with_handle("add_to_data_definition", |transport, handle| {
            transport.add_to_data_definition(handle, definition_id, variable_name, units, data_type)
        })?;

        self.inner.registry.register(
            definition_id,
            Definition {
                data_type,
                variable_name: variable_name.to_string(),
                units: units.to_string(),
            },
        );
        Ok(())
    }

    /// Clear a definition natively and forget its declared type.
    pub fn clear_definition(&self, definition_id: u32) -> Result<(), RegisterError> {
        self.with_handle("clear_data_definition", |transport, handle| {
            transport.clear_data_definition(handle, definition_id)
        })?;

        debug!(definition_id, "Definition cleared");
        self.inner.registry.remove(definition_id);
        Ok(())
    }

    /// Request a single sample of `definition_id` for the user object.
    pub fn request_once(&self, definition_id: u32, request_id: u32) -> Result<(), RequestError> {
        self.request_periodic(definition_id, request_id, Period::Once)
    }

    /// Request samples of `definition_id` for the user object at `period`.
    pub fn request_periodic(
        &self,
        definition_id: u32,
        request_id: u32,
        period: Period,
    ) -> Result<(), RequestError> {
        debug!(definition_id, request_id, ?period, "Requesting data");
        self.with_handle("request_data_on_sim_object", |transport, handle| {
            transport.request_data_on_sim_object(
                handle,
                request_id,
                definition_id,
                USER_OBJECT_ID,
                period,
            )
        })
    }

    /// Write `value` to the user object through a registered definition.
    ///
    /// Fails with [`ClientError::UnknownDefinition`] before any native call when the
    /// definition was never registered.
    pub fn set_value(&self, definition_id: u32, value: &SimValue) -> Result<(), SetError> {
        let data_type = self
            .inner
            .registry
            .lookup(definition_id)
            .ok_or(ClientError::UnknownDefinition { definition_id })?;

        let data = encode_value(value, data_type)
            .map_err(|details| ClientError::value_mismatch(definition_id, details))?;

        debug!(definition_id, bytes = data.len(), "Setting value");
        self.with_handle("set_data_on_sim_object", |transport, handle| {
            transport.set_data_on_sim_object(handle, definition_id, USER_OBJECT_ID, &data)
        })
    }

    /// Bind a client event ID to a named sim event.
    pub fn map_client_event(&self, event_id: u32, event_name: &str) -> Result<(), RequestError> {
        self.with_handle("map_client_event_to_sim_event", |transport, handle| {
            transport.map_client_event_to_sim_event(handle, event_id, event_name)
        })
    }

    /// Fire a mapped client event.
    pub fn transmit_event(
        &self,
        object_id: u32,
        event_id: u32,
        data: u32,
        group_id: u32,
        flags: u32,
    ) -> Result<(), RequestError> {
        self.with_handle("transmit_client_event", |transport, handle| {
            transport.transmit_client_event(handle, object_id, event_id, data, group_id, flags)
        })
    }

    /// Subscribe to a system event such as `"Frame"`, `"Pause"` or `"SimStart"`.
    pub fn subscribe_system_event(
        &self,
        event_id: u32,
        system_event_name: &str,
    ) -> Result<(), RequestError> {
        self.with_handle("subscribe_to_system_event", |transport, handle| {
            transport.subscribe_to_system_event(handle, event_id, system_event_name)
        })
    }

    /// Ask for a system state value; the reply arrives as a system state envelope.
    pub fn request_system_state(&self, request_id: u32, state_name: &str) -> Result<(), RequestError> {
        self.with_handle("request_system_state", |transport, handle| {
            transport.request_system_state(handle, request_id, state_name)
        })
    }

    /// Ask for a facility list; the reply arrives as one or more list envelopes.
    pub fn request_facilities_list(
        &self,
        kind: FacilityListKind,
        request_id: u32,
    ) -> Result<(), RequestError> {
        self.with_handle("request_facilities_list", |transport, handle| {
            transport.request_facilities_list(handle, kind, request_id)
        })
    }
}
