//! # Factline Relay
//!
//! Relay implementations for the Factline event platform.
//!
//! A relay accepts one Fact and forwards the identical Fact to every
//! configured subscriber, independently and best-effort:
//!
//! ```text
//!                    ┌──────────────┐
//!  broadcast(fact) ─▶│    Relay     │─▶ Ack (immediately)
//!                    └──────┬───────┘
//!               ┌───────────┼───────────┐
//!               ▼           ▼           ▼
//!          subscriber  subscriber  subscriber
//!          (own task,  (own task,  (own task,
//!           own timeout) ...)       ...)
//! ```
//!
//! Two implementations:
//!
//! - [`InMemoryRelay`]: fan-out over registered [`Subscriber`] trait
//!   objects in the same process. Used to wire services together in tests
//!   and single-process deployments.
//! - [`HttpRelay`]: fan-out over a fixed set of HTTP subscriber addresses,
//!   forwarding each Fact as a JSON `POST` body.
//!
//! Both share the same contract: a delivery that fails or exceeds its
//! per-subscriber timeout is logged at `warn`, counted, and dropped. The
//! emitter has already received its ack and is never told.
//!
//! [`Subscriber`]: factline_core::relay::Subscriber

use std::time::Duration;

mod http;
mod memory;

pub use http::{HttpRelay, HttpRelayBuilder};
pub use memory::InMemoryRelay;

/// Default bound on a single subscriber delivery.
///
/// After this long a delivery is abandoned; the abandoned delivery has no
/// effect on the emitter, which already received its ack.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(2);
