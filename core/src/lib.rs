//! # Factline Core
//!
//! Core types and contracts for the Factline event-driven content platform.
//!
//! Factline is built around a single idea: independent services own disjoint
//! pieces of state and exchange immutable **Facts** through a shared,
//! best-effort **Relay**. Nothing is stored in transit; nothing is retried.
//! Downstream consumers rebuild whatever view they need by folding the Fact
//! stream in arrival order.
//!
//! ```text
//! ┌───────────┐            ┌───────────┐
//! │   Posts   │            │ Comments  │
//! │ (producer)│            │ (producer)│
//! └─────┬─────┘            └─────┬─────┘
//!       │ PostCreated            │ CommentCreated
//!       └──────────┬─────────────┘
//!                  ▼
//!           ┌─────────────┐
//!           │    Relay    │  stateless, fire-and-forget fan-out
//!           └──────┬──────┘
//!          ┌───────┴────────┐
//!          ▼                ▼
//!   ┌────────────┐   ┌────────────┐
//!   │ Moderation │   │  Projector │
//!   │ (consumer +│   │ (fold into │
//!   │  producer) │   │ read view) │
//!   └─────┬──────┘   └────────────┘
//!         │ CommentModerated
//!         └──────────▶ back through the Relay
//! ```
//!
//! This crate defines the pieces every service shares:
//!
//! - [`fact`]: the [`Fact`](fact::Fact) data model and its JSON wire format
//! - [`relay`]: the [`Relay`](relay::Relay) and [`Subscriber`](relay::Subscriber)
//!   traits plus their error types
//!
//! # Delivery Contract
//!
//! The relay is explicitly **at-most-once**: a subscriber that is
//! unreachable at broadcast time permanently misses that Fact. There is no
//! durable log, no acknowledgment tracking, and no ordering guarantee
//! across independently delivered Facts, even causally related ones.
//! Consumers must tolerate out-of-order arrival.

pub mod fact;
pub mod relay;

pub use fact::{EntityId, Fact, ModerationStatus, ParseEntityIdError};
pub use relay::{Ack, Relay, RelayError, Subscriber, SubscriberError};
