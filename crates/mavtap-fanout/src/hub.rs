use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mavtap_messages::TelemetryRecord;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::subscriber::Subscriber;

/// Outcome of one broadcast pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    /// Subscribers that received the event.
    pub delivered: usize,
    /// Subscribers skipped because they were not open.
    pub skipped: usize,
    /// Subscribers whose send failed during this pass.
    pub failed: usize,
}

/// The set of live subscribers.
///
/// Cheap to clone; clones share the same set. The relay broadcasts into it while
/// a listener thread registers new subscribers.
#[derive(Clone, Default)]
pub struct SubscriberHub {
    subscribers: Arc<Mutex<Vec<Box<dyn Subscriber>>>>,
}

impl SubscriberHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber.
    pub fn register(&self, subscriber: Box<dyn Subscriber>) {
        debug!(id = subscriber.id(), "subscriber registered");
        self.lock().push(subscriber);
    }

    /// Send one event to every open subscriber.
    ///
    /// Closed subscribers are skipped, not removed. A subscriber whose send fails
    /// is counted as failed and will be skipped from the next pass on.
    pub fn broadcast(&self, event: &str) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for subscriber in self.lock().iter_mut() {
            if !subscriber.is_open() {
                report.skipped += 1;
                continue;
            }
            match subscriber.send(event) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(id = subscriber.id(), %err, "subscriber send failed");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Serialize a record once and broadcast it.
    pub fn broadcast_record(&self, record: &TelemetryRecord) -> Result<BroadcastReport> {
        let event = record.to_json()?;
        Ok(self.broadcast(&event))
    }

    /// Remove closed subscribers, returning how many were removed.
    pub fn prune_closed(&self) -> usize {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.is_open());
        before - subscribers.len()
    }

    /// Number of registered subscribers, open or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of open subscribers.
    pub fn open_count(&self) -> usize {
        self.lock().iter().filter(|s| s.is_open()).count()
    }

    /// Ids of registered subscribers, in registration order.
    pub fn subscriber_ids(&self) -> Vec<String> {
        self.lock().iter().map(|s| s.id().to_string()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Box<dyn Subscriber>>> {
        // Poisoned only by a panicking subscriber; the list itself is still valid.
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SubscriberHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberHub")
            .field("subscribers", &self.subscriber_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::subscriber::{channel_subscriber, StreamSubscriber};

    /// Records every event and can be switched closed from outside.
    struct Probe {
        id: String,
        open: Arc<Mutex<bool>>,
        received: Arc<AtomicUsize>,
    }

    impl Subscriber for Probe {
        fn id(&self) -> &str {
            &self.id
        }

        fn is_open(&self) -> bool {
            *self.open.lock().unwrap()
        }

        fn send(&mut self, _event: &str) -> std::io::Result<()> {
            self.received.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn probe(id: &str) -> (Probe, Arc<Mutex<bool>>, Arc<AtomicUsize>) {
        let open = Arc::new(Mutex::new(true));
        let received = Arc::new(AtomicUsize::new(0));
        let probe = Probe {
            id: id.to_string(),
            open: Arc::clone(&open),
            received: Arc::clone(&received),
        };
        (probe, open, received)
    }

    #[test]
    fn broadcast_reaches_every_open_subscriber() {
        let hub = SubscriberHub::new();
        let (a, _, a_count) = probe("a");
        let (b, _, b_count) = probe("b");
        hub.register(Box::new(a));
        hub.register(Box::new(b));

        let report = hub.broadcast("{}");

        assert_eq!(
            report,
            BroadcastReport {
                delivered: 2,
                skipped: 0,
                failed: 0
            }
        );
        assert_eq!(a_count.load(Ordering::SeqCst), 1);
        assert_eq!(b_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn closed_subscribers_are_skipped_not_removed() {
        let hub = SubscriberHub::new();
        let (a, a_open, a_count) = probe("a");
        let (b, _, b_count) = probe("b");
        hub.register(Box::new(a));
        hub.register(Box::new(b));

        *a_open.lock().unwrap() = false;
        let report = hub.broadcast("{}");

        assert_eq!(report.delivered, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(a_count.load(Ordering::SeqCst), 0);
        assert_eq!(b_count.load(Ordering::SeqCst), 1);
        assert_eq!(hub.len(), 2);
        assert_eq!(hub.open_count(), 1);

        // Reopened subscribers receive again.
        *a_open.lock().unwrap() = true;
        assert_eq!(hub.broadcast("{}").delivered, 2);
    }

    #[test]
    fn failed_send_counts_once_then_skips() {
        let hub = SubscriberHub::new();
        let (sub, rx) = channel_subscriber("dropped");
        drop(rx);
        hub.register(Box::new(sub));

        assert_eq!(hub.broadcast("{}").failed, 1);
        assert_eq!(hub.broadcast("{}").skipped, 1);
    }

    #[test]
    fn prune_closed_removes_only_closed() {
        let hub = SubscriberHub::new();
        let mut closed = StreamSubscriber::new("closed", Vec::new());
        closed.close();
        hub.register(Box::new(closed));
        let (open, _, _) = probe("open");
        hub.register(Box::new(open));

        assert_eq!(hub.prune_closed(), 1);
        assert_eq!(hub.subscriber_ids(), vec!["open".to_string()]);
    }

    #[test]
    fn clones_share_the_same_set() {
        let hub = SubscriberHub::new();
        let other = hub.clone();
        let (sub, rx) = channel_subscriber("shared");
        other.register(Box::new(sub));

        assert!(!hub.is_empty());
        hub.broadcast("event");
        assert_eq!(rx.recv().unwrap(), "event");
    }

    #[test]
    fn broadcast_record_serializes_once_for_all() {
        let hub = SubscriberHub::new();
        let (first, first_rx) = channel_subscriber("first");
        let (second, second_rx) = channel_subscriber("second");
        hub.register(Box::new(first));
        hub.register(Box::new(second));

        let record = mavtap_messages::decode(&[0xFE, 0, 0, 7, 8, 200, 0, 0]).unwrap();
        let report = hub.broadcast_record(&record).unwrap();

        assert_eq!(report.delivered, 2);
        let expected = r#"{"msgId":200,"type":"UNKNOWN_200","sysid":7,"compid":8}"#;
        assert_eq!(first_rx.recv().unwrap(), expected);
        assert_eq!(second_rx.recv().unwrap(), expected);
    }

    #[test]
    fn empty_hub_broadcast_is_noop() {
        let hub = SubscriberHub::new();
        assert_eq!(hub.broadcast("{}"), BroadcastReport::default());
        assert!(hub.is_empty());
    }
}
