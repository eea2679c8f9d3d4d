//! # Factline Testing
//!
//! In-memory test doubles and helpers for the Factline event platform:
//! - [`CaptureRelay`]: a [`Relay`] that records every broadcast Fact
//! - [`CaptureSubscriber`]: a [`Subscriber`] that records deliveries, with
//!   optional artificial delay and forced failure
//! - [`wait_until`]: polling helper for asserting on fire-and-forget
//!   effects
//!
//! # Example
//!
//! ```ignore
//! let relay = Arc::new(CaptureRelay::new());
//! let posts = PostsService::new(relay.clone());
//!
//! posts.create_post(NewPost { title: "Hello".into() }).await?;
//! assert_eq!(relay.len(), 1);
//! ```

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical

use factline_core::fact::Fact;
use factline_core::relay::{Ack, Relay, RelayError, Subscriber, SubscriberError};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// A [`Relay`] that records every broadcast Fact instead of forwarding it.
///
/// Captures synchronously, so a producer's emission can be asserted on
/// immediately after the producer call returns.
///
/// # Example
///
/// ```
/// use factline_testing::CaptureRelay;
/// use factline_core::fact::{EntityId, Fact};
/// use factline_core::relay::Relay;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let relay = CaptureRelay::new();
/// relay
///     .broadcast(Fact::PostCreated {
///         id: EntityId::new("p1"),
///         title: "Hello".to_string(),
///     })
///     .await?;
/// assert_eq!(relay.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct CaptureRelay {
    facts: Arc<RwLock<Vec<Fact>>>,
}

impl CaptureRelay {
    /// Create a new empty capture relay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All Facts broadcast so far, in emission order.
    #[must_use]
    pub fn facts(&self) -> Vec<Fact> {
        self.facts.read().unwrap().clone()
    }

    /// The most recently broadcast Fact, if any.
    #[must_use]
    pub fn last(&self) -> Option<Fact> {
        self.facts.read().unwrap().last().cloned()
    }

    /// Number of Facts broadcast so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.read().unwrap().len()
    }

    /// Whether nothing has been broadcast yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.read().unwrap().is_empty()
    }

    /// Clear captured Facts (for test isolation).
    pub fn clear(&self) {
        self.facts.write().unwrap().clear();
    }
}

impl Relay for CaptureRelay {
    fn broadcast(
        &self,
        fact: Fact,
    ) -> Pin<Box<dyn Future<Output = Result<Ack, RelayError>> + Send + '_>> {
        Box::pin(async move {
            self.facts.write().unwrap().push(fact);
            Ok(Ack)
        })
    }
}

/// A [`Subscriber`] that records every delivered Fact.
///
/// Supports an artificial processing delay (for timeout and ack-latency
/// tests) and a forced-failure mode (for independent-failure tests).
#[derive(Clone, Debug)]
pub struct CaptureSubscriber {
    name: String,
    received: Arc<RwLock<Vec<Fact>>>,
    delay: Option<Duration>,
    fail: bool,
}

impl CaptureSubscriber {
    /// Create a subscriber that records deliveries immediately.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            received: Arc::new(RwLock::new(Vec::new())),
            delay: None,
            fail: false,
        }
    }

    /// Create a subscriber that fails every delivery.
    #[must_use]
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    /// Sleep for `delay` before recording each delivery.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All Facts received so far, in delivery order.
    #[must_use]
    pub fn received(&self) -> Vec<Fact> {
        self.received.read().unwrap().clone()
    }

    /// Number of Facts received so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.received.read().unwrap().len()
    }

    /// Whether nothing has been delivered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.received.read().unwrap().is_empty()
    }
}

impl Subscriber for CaptureSubscriber {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive(
        &self,
        fact: Fact,
    ) -> Pin<Box<dyn Future<Output = Result<(), SubscriberError>> + Send + '_>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(SubscriberError::Processing {
                    subscriber: self.name.clone(),
                    kind: fact.kind(),
                    reason: "forced failure".to_string(),
                });
            }
            self.received.write().unwrap().push(fact);
            Ok(())
        })
    }
}

/// Poll `condition` until it returns `true` or `timeout` elapses.
///
/// Fan-out is fire-and-forget, so tests assert on its effects by polling
/// rather than by awaiting a completion signal. Returns `true` if the
/// condition held before the deadline.
///
/// # Example
///
/// ```ignore
/// assert!(wait_until(Duration::from_secs(2), || async {
///     subscriber.len() == 3
/// }).await);
/// ```
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factline_core::fact::EntityId;

    fn post_created() -> Fact {
        Fact::PostCreated {
            id: EntityId::new("p1"),
            title: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn capture_relay_records_in_order() {
        let relay = CaptureRelay::new();
        relay.broadcast(post_created()).await.unwrap();
        assert_eq!(relay.len(), 1);
        assert_eq!(relay.last(), Some(post_created()));
    }

    #[tokio::test]
    async fn failing_subscriber_reports_processing_error() {
        let subscriber = CaptureSubscriber::failing("broken");
        let result = subscriber.receive(post_created()).await;
        assert!(result.is_err());
        assert!(subscriber.is_empty());
    }

    #[tokio::test]
    async fn wait_until_observes_eventual_conditions() {
        let relay = CaptureRelay::new();
        let background = relay.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            background.broadcast(post_created()).await.unwrap();
        });

        assert!(wait_until(Duration::from_secs(2), || async { relay.len() == 1 }).await);
    }

    #[tokio::test]
    async fn wait_until_times_out_on_false_conditions() {
        assert!(!wait_until(Duration::from_millis(30), || async { false }).await);
    }
}
