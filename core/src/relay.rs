//! Relay and subscriber contracts for best-effort Fact distribution.
//!
//! The [`Relay`] is a stateless hub: it accepts one [`Fact`] and issues an
//! independent forward of the identical Fact to every configured
//! subscriber. The call acks as soon as the Fact is accepted for fan-out;
//! it never waits on subscribers and never inspects forwarding outcomes.
//!
//! # Delivery Semantics
//!
//! - **At-most-once**: a failed or timed-out delivery is dropped, not
//!   retried. The subscriber permanently misses that Fact.
//! - **Independently failing**: one unreachable subscriber has no effect on
//!   delivery to the others, nor on the emitter's ack.
//! - **No ordering guarantee**: deliveries run on independent tasks, so two
//!   causally related Facts may arrive at a subscriber in either order.
//! - **Stateless**: the relay holds no copy of any Fact after scheduling
//!   its fan-out. A relay restart loses nothing because it never held
//!   anything.
//!
//! # Dyn Compatibility
//!
//! Both traits use explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` to enable trait object usage (`Arc<dyn Relay>`,
//! `Arc<dyn Subscriber>`). Services capture the relay behind a trait object
//! so production and in-process wiring are interchangeable.

use crate::fact::Fact;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur while accepting a Fact for broadcast.
///
/// Note that per-subscriber delivery failures are *not* errors here: they
/// are dropped silently by design and never surfaced to the emitter.
#[derive(Error, Debug, Clone)]
pub enum RelayError {
    /// The relay refused the Fact before scheduling any fan-out.
    #[error("Relay rejected fact '{kind}': {reason}")]
    Rejected {
        /// Kind tag of the refused Fact.
        kind: &'static str,
        /// Why the relay refused it.
        reason: String,
    },

    /// The relay's own transport could not be set up.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors a subscriber can report for a single delivery.
///
/// The relay logs these and drops the delivery; they never propagate back
/// to the original emitter.
#[derive(Error, Debug, Clone)]
pub enum SubscriberError {
    /// The subscriber received the Fact but failed to process it.
    #[error("Subscriber '{subscriber}' failed to process '{kind}': {reason}")]
    Processing {
        /// Name of the failing subscriber.
        subscriber: String,
        /// Kind tag of the Fact being processed.
        kind: &'static str,
        /// Why processing failed.
        reason: String,
    },

    /// The subscriber could not be reached at all.
    #[error("Subscriber unavailable: {0}")]
    Unavailable(String),
}

/// Acknowledgment returned by [`Relay::broadcast`].
///
/// Deliberately carries no information: the relay acks as soon as it has
/// accepted the Fact for fan-out, before any delivery has been attempted,
/// and it never reports per-subscriber outcomes. The emitter cannot know
/// whether any subscriber succeeded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ack;

/// A stateless, best-effort broadcaster of Facts to a fixed subscriber set.
///
/// # Contract
///
/// `broadcast` must:
///
/// 1. schedule one independent delivery per configured subscriber,
/// 2. bound each delivery with a per-subscriber timeout,
/// 3. return [`Ack`] without waiting on any delivery, so ack latency does
///    not scale with a slow or unreachable subscriber.
///
/// # Examples
///
/// ```ignore
/// let relay: Arc<dyn Relay> = Arc::new(InMemoryRelay::new());
/// relay.broadcast(Fact::PostCreated { id, title }).await?;
/// // Ack received; deliveries are in flight (or already dropped).
/// ```
pub trait Relay: Send + Sync {
    /// Accept a Fact for fan-out to every configured subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError`] only if the Fact cannot be accepted at all.
    /// Individual delivery failures are dropped silently per the contract.
    fn broadcast(
        &self,
        fact: Fact,
    ) -> Pin<Box<dyn Future<Output = Result<Ack, RelayError>> + Send + '_>>;
}

/// A consumer registered with a relay.
///
/// Implementations must serialize their own internal read-modify-write:
/// the relay may deliver several Facts concurrently on independent tasks.
pub trait Subscriber: Send + Sync {
    /// Stable name used in logs when a delivery to this subscriber fails.
    fn name(&self) -> &str;

    /// Process one delivered Fact.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriberError`] if the Fact cannot be processed. The
    /// relay logs the error and drops the delivery; it is never retried.
    fn receive(
        &self,
        fact: Fact,
    ) -> Pin<Box<dyn Future<Output = Result<(), SubscriberError>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::EntityId;
    use std::sync::Mutex;

    struct Recording {
        seen: Mutex<Vec<&'static str>>,
    }

    impl Subscriber for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn receive(
            &self,
            fact: Fact,
        ) -> Pin<Box<dyn Future<Output = Result<(), SubscriberError>> + Send + '_>> {
            Box::pin(async move {
                #[allow(clippy::unwrap_used)]
                self.seen.lock().unwrap().push(fact.kind());
                Ok(())
            })
        }
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn subscriber_trait_objects_receive_owned_facts() {
        let subscriber: Box<dyn Subscriber> = Box::new(Recording {
            seen: Mutex::new(Vec::new()),
        });

        subscriber
            .receive(Fact::PostCreated {
                id: EntityId::new("p1"),
                title: "Hello".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(subscriber.name(), "recording");
    }

    #[test]
    fn errors_render_subscriber_context() {
        let error = SubscriberError::Processing {
            subscriber: "query".to_string(),
            kind: "CommentCreated",
            reason: "boom".to_string(),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("query"));
        assert!(rendered.contains("CommentCreated"));
    }
}
