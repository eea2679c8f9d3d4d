//! In-process relay over registered subscriber trait objects.

use crate::DEFAULT_DELIVERY_TIMEOUT;
use factline_core::fact::Fact;
use factline_core::relay::{Ack, Relay, RelayError, Subscriber};
use metrics::counter;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// In-process fan-out relay.
///
/// Holds a registry of [`Subscriber`] trait objects and forwards every
/// broadcast Fact to each of them on its own spawned task, bounded by a
/// per-subscriber delivery timeout. The registry is populated once at
/// wiring time; the relay itself stays stateless with respect to Facts.
///
/// Registration happens after construction because some subscribers (the
/// moderation service) hold the relay themselves to emit derived Facts
/// back through it.
///
/// # Example
///
/// ```ignore
/// let relay = Arc::new(InMemoryRelay::new());
/// let moderation = Arc::new(ModerationService::new(relay.clone(), policy));
/// relay.register(moderation).await;
/// relay.register(projector).await;
///
/// relay.broadcast(fact).await?; // acks immediately, deliveries in flight
/// ```
pub struct InMemoryRelay {
    subscribers: RwLock<Vec<Arc<dyn Subscriber>>>,
    delivery_timeout: Duration,
}

impl Default for InMemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRelay {
    /// Create a relay with the default delivery timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_delivery_timeout(DEFAULT_DELIVERY_TIMEOUT)
    }

    /// Create a relay with a custom per-subscriber delivery timeout.
    #[must_use]
    pub const fn with_delivery_timeout(delivery_timeout: Duration) -> Self {
        Self {
            subscribers: RwLock::const_new(Vec::new()),
            delivery_timeout,
        }
    }

    /// Add a subscriber to the fan-out set.
    pub async fn register(&self, subscriber: Arc<dyn Subscriber>) {
        self.subscribers.write().await.push(subscriber);
    }

    /// Number of registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

impl Relay for InMemoryRelay {
    fn broadcast(
        &self,
        fact: Fact,
    ) -> Pin<Box<dyn Future<Output = Result<Ack, RelayError>> + Send + '_>> {
        Box::pin(async move {
            let subscribers = self.subscribers.read().await.clone();
            let kind = fact.kind();

            for subscriber in &subscribers {
                let subscriber = Arc::clone(subscriber);
                let fact = fact.clone();
                let timeout = self.delivery_timeout;
                tokio::spawn(async move {
                    deliver(&subscriber, fact, timeout).await;
                });
            }

            tracing::debug!(
                kind,
                subscribers = subscribers.len(),
                "Fact accepted for fan-out"
            );
            Ok(Ack)
        })
    }
}

/// Attempt one delivery; on failure or timeout, log and drop.
async fn deliver(subscriber: &Arc<dyn Subscriber>, fact: Fact, timeout: Duration) {
    let kind = fact.kind();
    match tokio::time::timeout(timeout, subscriber.receive(fact)).await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            counter!("factline_relay_deliveries_dropped_total").increment(1);
            tracing::warn!(
                subscriber = subscriber.name(),
                kind,
                %error,
                "Delivery failed; fact dropped for this subscriber"
            );
        }
        Err(_) => {
            counter!("factline_relay_deliveries_dropped_total").increment(1);
            tracing::warn!(
                subscriber = subscriber.name(),
                kind,
                timeout_ms = timeout.as_millis(),
                "Delivery timed out; fact dropped for this subscriber"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factline_core::fact::EntityId;
    use factline_testing::{CaptureSubscriber, wait_until};

    fn post_created() -> Fact {
        Fact::PostCreated {
            id: EntityId::new("p1"),
            title: "Hello".to_string(),
        }
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn delivers_identical_fact_to_every_subscriber() {
        let relay = InMemoryRelay::new();
        let first = Arc::new(CaptureSubscriber::new("first"));
        let second = Arc::new(CaptureSubscriber::new("second"));
        relay.register(first.clone()).await;
        relay.register(second.clone()).await;

        relay.broadcast(post_created()).await.unwrap();

        assert!(
            wait_until(Duration::from_secs(2), || async {
                first.len() == 1 && second.len() == 1
            })
            .await
        );
        assert_eq!(first.received(), vec![post_created()]);
        assert_eq!(second.received(), vec![post_created()]);
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn failing_subscriber_does_not_affect_the_others() {
        let relay = InMemoryRelay::new();
        let broken = Arc::new(CaptureSubscriber::failing("broken"));
        let healthy = Arc::new(CaptureSubscriber::new("healthy"));
        relay.register(broken.clone()).await;
        relay.register(healthy.clone()).await;

        relay.broadcast(post_created()).await.unwrap();

        assert!(wait_until(Duration::from_secs(2), || async { healthy.len() == 1 }).await);
        assert!(broken.is_empty());
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn relay_retains_nothing_between_broadcasts() {
        let relay = InMemoryRelay::new();
        relay.broadcast(post_created()).await.unwrap();

        // A subscriber registered after a broadcast never sees it.
        let late = Arc::new(CaptureSubscriber::new("late"));
        relay.register(late.clone()).await;
        assert!(!wait_until(Duration::from_millis(50), || async { !late.is_empty() }).await);
    }
}
