//! HTTP relay over a fixed set of subscriber addresses.

use crate::DEFAULT_DELIVERY_TIMEOUT;
use factline_core::fact::Fact;
use factline_core::relay::{Ack, Relay, RelayError};
use metrics::counter;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A named subscriber address.
#[derive(Clone, Debug)]
struct Endpoint {
    name: String,
    url: String,
}

/// Relay that forwards Facts to a fixed, statically configured set of HTTP
/// subscriber addresses.
///
/// Each broadcast issues one independent `POST` per address carrying the
/// Fact's JSON envelope (`{"type": ..., "data": ...}`). Requests run on
/// their own spawned tasks with a bounded per-request timeout; the ack is
/// returned as soon as every request has been scheduled.
///
/// A non-success response status, a connection error, or a timeout all mean
/// the same thing: that subscriber misses this Fact, permanently. Nothing
/// is retried and nothing reaches the emitter.
///
/// # Example
///
/// ```ignore
/// let relay = HttpRelay::builder()
///     .subscriber("query", "http://localhost:4002/events")
///     .subscriber("moderation", "http://localhost:4003/events")
///     .delivery_timeout(Duration::from_secs(1))
///     .build()?;
/// ```
pub struct HttpRelay {
    client: reqwest::Client,
    subscribers: Vec<Endpoint>,
    delivery_timeout: Duration,
}

impl HttpRelay {
    /// Start building a relay from an empty subscriber set.
    #[must_use]
    pub fn builder() -> HttpRelayBuilder {
        HttpRelayBuilder::default()
    }

    /// Number of configured subscriber addresses.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Relay for HttpRelay {
    fn broadcast(
        &self,
        fact: Fact,
    ) -> Pin<Box<dyn Future<Output = Result<Ack, RelayError>> + Send + '_>> {
        Box::pin(async move {
            let kind = fact.kind();

            for endpoint in &self.subscribers {
                let request = self
                    .client
                    .post(&endpoint.url)
                    .timeout(self.delivery_timeout)
                    .json(&fact);
                let endpoint = endpoint.clone();
                tokio::spawn(async move {
                    forward(request, &endpoint, kind).await;
                });
            }

            tracing::debug!(
                kind,
                subscribers = self.subscribers.len(),
                "Fact accepted for fan-out"
            );
            Ok(Ack)
        })
    }
}

/// Send one forward; on any failure, log and drop.
async fn forward(request: reqwest::RequestBuilder, endpoint: &Endpoint, kind: &'static str) {
    match request.send().await {
        Ok(response) if response.status().is_success() => {}
        Ok(response) => {
            counter!("factline_relay_deliveries_dropped_total").increment(1);
            tracing::warn!(
                subscriber = %endpoint.name,
                url = %endpoint.url,
                kind,
                status = %response.status(),
                "Subscriber rejected delivery; fact dropped for this subscriber"
            );
        }
        Err(error) => {
            counter!("factline_relay_deliveries_dropped_total").increment(1);
            tracing::warn!(
                subscriber = %endpoint.name,
                url = %endpoint.url,
                kind,
                %error,
                "Delivery failed; fact dropped for this subscriber"
            );
        }
    }
}

/// Builder for [`HttpRelay`].
#[derive(Debug, Default)]
#[must_use]
pub struct HttpRelayBuilder {
    subscribers: Vec<Endpoint>,
    delivery_timeout: Option<Duration>,
}

impl HttpRelayBuilder {
    /// Add a named subscriber address (the full Fact-delivery URL,
    /// e.g. `http://localhost:4002/events`).
    pub fn subscriber(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.subscribers.push(Endpoint {
            name: name.into(),
            url: url.into(),
        });
        self
    }

    /// Bound each forward with this timeout (default
    /// [`DEFAULT_DELIVERY_TIMEOUT`]).
    pub const fn delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = Some(timeout);
        self
    }

    /// Build the relay.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn build(self) -> Result<HttpRelay, RelayError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        Ok(HttpRelay {
            client,
            subscribers: self.subscribers,
            delivery_timeout: self.delivery_timeout.unwrap_or(DEFAULT_DELIVERY_TIMEOUT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn builder_collects_subscribers_in_order() {
        let relay = HttpRelay::builder()
            .subscriber("query", "http://localhost:4002/events")
            .subscriber("moderation", "http://localhost:4003/events")
            .build()
            .unwrap();

        assert_eq!(relay.subscriber_count(), 2);
        assert_eq!(relay.subscribers[0].name, "query");
        assert_eq!(relay.delivery_timeout, DEFAULT_DELIVERY_TIMEOUT);
    }
}
