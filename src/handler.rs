//! Consumer seam for the envelope stream

use crate::protocol::Envelope;

/// Receives envelopes pumped by [`Client::run`](crate::Client::run).
///
/// Services and CLIs that sit on top of the runtime implement this instead of
/// driving the channel themselves. Plain closures taking an [`Envelope`] are
/// handlers too.
#[async_trait::async_trait]
pub trait EnvelopeHandler: Send {
    /// Called once per envelope, in delivery order.
    async fn on_envelope(&mut self, envelope: Envelope);

    /// Called once after the channel ends.
    async fn on_end(&mut self) {}
}

#[async_trait::async_trait]
impl<F> EnvelopeHandler for F
where
    F: FnMut(Envelope) + Send,
{
    async fn on_envelope(&mut self, envelope: Envelope) {
        self(envelope)
    }
}
