//! Broadcast distribution of privatized pose events.
//!
//! Bridges the synchronous pipeline fan-out to async subscribers over a
//! [`tokio::sync::broadcast`] channel: every subscriber receives every event
//! without any single subscriber blocking the others or the frame loop.
//!
//! An empty subscriber set is a normal condition, not an error; the frame
//! loop keeps running whether or not anyone is listening.

use tokio::sync::broadcast;
use tracing::warn;
use veil_pipeline::PoseConsumer;
use veil_types::{PrivatizedPoseEvent, VeilError};

/// Buffered events per subscriber before the oldest are dropped for a slow
/// receiver.
const DEFAULT_CAPACITY: usize = 256;

/// Shared pose event channel.  Clone it cheaply; all clones publish into the
/// same underlying broadcast channel.
#[derive(Clone, Debug)]
pub struct PoseBus {
    sender: broadcast::Sender<PrivatizedPoseEvent>,
}

impl PoseBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event.  Returns the number of subscribers that were handed
    /// the event; zero subscribers is normal.
    pub fn publish(&self, event: PrivatizedPoseEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to all subsequent events.
    pub fn subscribe(&self) -> PoseReceiver {
        PoseReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Active subscriber count.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for PoseBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Async receiver side of a [`PoseBus`].
///
/// Lag is absorbed: when this subscriber falls behind and the channel drops
/// old events, the loss is logged and reception continues with the newest
/// available event.
pub struct PoseReceiver {
    receiver: broadcast::Receiver<PrivatizedPoseEvent>,
}

impl PoseReceiver {
    /// Wait for the next event.  Returns `None` once the bus has shut down.
    pub async fn recv(&mut self) -> Option<PrivatizedPoseEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(dropped = n, "pose subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Pipeline consumer that republishes every event onto a [`PoseBus`].
pub struct BroadcastConsumer {
    bus: PoseBus,
}

impl BroadcastConsumer {
    pub fn new(bus: PoseBus) -> Self {
        Self { bus }
    }
}

impl PoseConsumer for BroadcastConsumer {
    fn name(&self) -> &str {
        "broadcast"
    }

    fn on_pose(&mut self, event: &PrivatizedPoseEvent) -> Result<(), VeilError> {
        self.bus.publish(event.clone());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use veil_types::{Pose, TrackedJoint};

    fn event(frame: u64) -> PrivatizedPoseEvent {
        PrivatizedPoseEvent::new(frame, TrackedJoint::Head, Pose::identity(), Pose::identity())
    }

    #[test]
    fn publish_without_subscribers_is_ok() {
        let bus = PoseBus::default();
        assert_eq!(bus.publish(event(1)), 0);
    }

    #[tokio::test]
    async fn every_subscriber_receives_every_event() {
        let bus = PoseBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let e = event(7);
        assert_eq!(bus.publish(e.clone()), 2);

        assert_eq!(rx1.recv().await.unwrap().id, e.id);
        assert_eq!(rx2.recv().await.unwrap().id, e.id);
    }

    #[tokio::test]
    async fn consumer_republishes_onto_bus() {
        let bus = PoseBus::default();
        let mut rx = bus.subscribe();
        let mut consumer = BroadcastConsumer::new(bus.clone());

        let e = event(3);
        consumer.on_pose(&e).unwrap();
        assert_eq!(rx.recv().await.unwrap().frame, 3);
    }

    #[tokio::test]
    async fn lagged_subscriber_recovers_with_newest_events() {
        let bus = PoseBus::new(8);
        let mut rx = bus.subscribe();

        for i in 0..1_000 {
            bus.publish(event(i));
        }
        // The first recv absorbs the lag and yields a surviving event.
        let got = rx.recv().await.unwrap();
        assert!(got.frame >= 992);
    }

    #[tokio::test]
    async fn recv_returns_none_after_shutdown() {
        let bus = PoseBus::default();
        let mut rx = bus.subscribe();
        drop(bus);
        assert!(rx.recv().await.is_none());
    }
}
