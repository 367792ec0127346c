// Change feed - Broadcast of record changes with debounced consumption
use crate::domain::records::Collection;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;

const CHANNEL_CAPACITY: usize = 256;

/// A burst never holds back a refresh longer than this many quiet periods.
const MAX_DELAY_FACTOR: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    /// Periodic poll; something may have changed upstream.
    Refreshed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub collection: Option<Collection>,
    pub kind: ChangeKind,
    pub id: Option<String>,
}

impl ChangeEvent {
    pub fn record(collection: Collection, kind: ChangeKind, id: impl Into<String>) -> Self {
        Self {
            collection: Some(collection),
            kind,
            id: Some(id.into()),
        }
    }

    pub fn refreshed() -> Self {
        Self {
            collection: None,
            kind: ChangeKind::Refreshed,
            id: None,
        }
    }
}

#[derive(Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: ChangeEvent) {
        // No subscribers is fine: nobody is watching the dashboard
        if self.sender.send(event).is_err() {
            tracing::trace!("Change published with no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

/// Emit a `Refreshed` event every `interval`, standing in for a push
/// subscription on APIs that only support polling.
pub fn spawn_poller(notifier: ChangeNotifier, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = IntervalStream::new(tokio::time::interval(interval));
        // The first tick fires immediately; skip it
        ticks.next().await;
        while ticks.next().await.is_some() {
            notifier.publish(ChangeEvent::refreshed());
        }
    })
}

/// Wait for the next burst of changes and return it once the feed has
/// been quiet for `quiet`. Returns `None` when the feed is closed.
pub async fn next_batch(
    changes: &mut broadcast::Receiver<ChangeEvent>,
    quiet: Duration,
) -> Option<Vec<ChangeEvent>> {
    let first = match changes.recv().await {
        Ok(event) => event,
        Err(RecvError::Lagged(skipped)) => {
            tracing::warn!("Change feed lagged, {} events skipped", skipped);
            ChangeEvent::refreshed()
        }
        Err(RecvError::Closed) => return None,
    };

    let deadline = Instant::now() + quiet * MAX_DELAY_FACTOR;
    let mut batch = vec![first];

    loop {
        let wake = std::cmp::min(Instant::now() + quiet, deadline);
        match tokio::time::timeout_at(wake, changes.recv()).await {
            Err(_) => return Some(batch),
            Ok(Ok(event)) => batch.push(event),
            Ok(Err(RecvError::Lagged(skipped))) => {
                tracing::warn!("Change feed lagged, {} events skipped", skipped);
            }
            Ok(Err(RecvError::Closed)) => return Some(batch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_coalesced() {
        let notifier = ChangeNotifier::new();
        let mut changes = notifier.subscribe();

        for id in ["1", "2", "3"] {
            notifier.publish(ChangeEvent::record(Collection::Assets, ChangeKind::Updated, id));
        }

        let batch = next_batch(&mut changes, Duration::from_millis(200)).await.unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[2].id.as_deref(), Some("3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_yield_separate_batches() {
        let notifier = ChangeNotifier::new();
        let mut changes = notifier.subscribe();
        let quiet = Duration::from_millis(100);

        let publisher = notifier.clone();
        tokio::spawn(async move {
            publisher.publish(ChangeEvent::record(Collection::Users, ChangeKind::Created, "a"));
            tokio::time::sleep(Duration::from_millis(500)).await;
            publisher.publish(ChangeEvent::record(Collection::Users, ChangeKind::Deleted, "a"));
        });

        let first = next_batch(&mut changes, quiet).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, ChangeKind::Created);

        let second = next_batch(&mut changes, quiet).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].kind, ChangeKind::Deleted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_changes_still_flush() {
        let notifier = ChangeNotifier::new();
        let mut changes = notifier.subscribe();
        let quiet = Duration::from_millis(100);

        let publisher = notifier.clone();
        let noisy = tokio::spawn(async move {
            loop {
                publisher.publish(ChangeEvent::refreshed());
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        });

        let started = Instant::now();
        let batch = next_batch(&mut changes, quiet).await.unwrap();
        noisy.abort();

        assert!(batch.len() > 1);
        assert!(started.elapsed() <= quiet * MAX_DELAY_FACTOR + Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_closed_feed_ends_batches() {
        let notifier = ChangeNotifier::new();
        let mut changes = notifier.subscribe();
        drop(notifier);

        assert!(next_batch(&mut changes, Duration::from_millis(10)).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_emits_refreshes() {
        let notifier = ChangeNotifier::new();
        let mut changes = notifier.subscribe();
        let poller = spawn_poller(notifier.clone(), Duration::from_secs(30));

        let event = changes.recv().await.unwrap();
        poller.abort();

        assert_eq!(event, ChangeEvent::refreshed());
    }
}
