//! # Factline Producers
//!
//! The owning services of the platform: each mutates its own local state
//! and emits exactly one Fact describing the mutation.
//!
//! A producer's contract is `create(input) -> entity`:
//!
//! 1. validate input shape (structural only: required fields present and
//!    non-empty, no semantic checks),
//! 2. assign a freshly generated id,
//! 3. store the entity in the service-local map,
//! 4. broadcast a Fact embedding the entity's id and relevant fields.
//!
//! The local write and the broadcast are **not transactional**. If the
//! process dies between them the entity exists locally but no Fact was
//! ever sent, a permanent desynchronization this design accepts. The same
//! applies when the broadcast itself fails: the failure is logged at
//! `error` and the create still succeeds toward the caller, because relay
//! and consumer errors never cross the Fact-emission boundary. From the
//! client's perspective moderation and projection happen asynchronously
//! and invisibly.
//!
//! State lives in an explicit service object (no process-global maps), so
//! services can be unit tested in isolation.

pub mod comments;
pub mod posts;

pub use comments::{Comment, CommentsService, NewComment};
pub use posts::{NewPost, Post, PostsService};

use factline_core::fact::Fact;
use factline_core::relay::Relay;
use thiserror::Error;

/// Errors a producer returns synchronously to its caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProducerError {
    /// Input failed structural validation; nothing was stored or emitted.
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Broadcast a Fact after a local write, swallowing relay errors.
///
/// The local write is already visible in this process; if the broadcast
/// fails the rest of the platform never learns about it. That gap is the
/// documented cost of best-effort emission, so it is logged loudly here
/// rather than propagated.
pub(crate) async fn emit(relay: &dyn Relay, fact: Fact) {
    let kind = fact.kind();
    if let Err(error) = relay.broadcast(fact).await {
        tracing::error!(
            kind,
            %error,
            "Broadcast failed after local write; downstream views will never see this mutation"
        );
    }
}
