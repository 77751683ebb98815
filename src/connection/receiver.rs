//! Shared handle to the envelope channel

use futures::Stream;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

use crate::protocol::Envelope;

/// Receiving end of a client's bounded envelope channel.
///
/// Clones share the one underlying channel: every envelope goes to exactly one
/// receiver, whichever asks first. The channel ends once the dispatch loop has
/// stopped (or was never started and the client closed).
#[derive(Debug, Clone)]
pub struct EnvelopeReceiver {
    inner: Arc<Mutex<mpsc::Receiver<Envelope>>>,
}

impl EnvelopeReceiver {
    pub(crate) fn new(receiver: mpsc::Receiver<Envelope>) -> Self {
        Self { inner: Arc::new(Mutex::new(receiver)) }
    }

    /// Wait for the next envelope. `None` once the channel has ended.
    pub async fn recv(&self) -> Option<Envelope> {
        self.inner.lock().await.recv().await
    }

    /// Next envelope if one is ready right now.
    ///
    /// Returns `None` when the channel is empty, has ended, or another clone is
    /// currently waiting on it.
    pub fn try_recv(&self) -> Option<Envelope> {
        self.inner.try_lock().ok()?.try_recv().ok()
    }

    /// Whether both handles share one channel.
    pub fn same_channel(&self, other: &EnvelopeReceiver) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Envelopes as a stream that ends with the channel.
    pub fn into_stream(self) -> impl Stream<Item = Envelope> + Send + 'static {
        futures::stream::unfold(self, |receiver| async move {
            let envelope = receiver.recv().await?;
            Some((envelope, receiver))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BlockBuilder, Classifier};
    use crate::registry::DefinitionRegistry;
    use futures::StreamExt;

    fn envelope(id: u32) -> Envelope {
        Classifier::default().classify(&BlockBuilder::new(id).build(), &DefinitionRegistry::new())
    }

    #[tokio::test]
    async fn clones_share_one_channel() {
        let (tx, rx) = mpsc::channel(4);
        let first = EnvelopeReceiver::new(rx);
        let second = first.clone();
        assert!(first.same_channel(&second));

        tx.send(envelope(0)).await.expect("send");
        tx.send(envelope(3)).await.expect("send");

        assert_eq!(first.recv().await.map(|e| e.id()), Some(0));
        assert_eq!(second.try_recv().map(|e| e.id()), Some(3));
        assert!(first.try_recv().is_none());
    }

    #[tokio::test]
    async fn stream_ends_with_channel() {
        let (tx, rx) = mpsc::channel(4);
        let receiver = EnvelopeReceiver::new(rx);
        tx.send(envelope(3)).await.expect("send");
        drop(tx);

        let ids: Vec<u32> = receiver.into_stream().map(|e| e.id()).collect().await;
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn separate_channels_differ() {
        let (_tx1, rx1) = mpsc::channel(1);
        let (_tx2, rx2) = mpsc::channel(1);
        assert!(!EnvelopeReceiver::new(rx1).same_channel(&EnvelopeReceiver::new(rx2)));
    }
}
