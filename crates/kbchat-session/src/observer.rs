use tokio::sync::mpsc;

use crate::types::SessionEvent;

/// Subscriber to session state changes
///
/// Called synchronously, outside the session lock, in emission order.
/// Implementations must not block.
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, event: &SessionEvent);
}

/// Forwards every event into an unbounded tokio channel
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SessionObserver for ChannelObserver {
    fn on_event(&self, event: &SessionEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!("Session event receiver dropped");
        }
    }
}
