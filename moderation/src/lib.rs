//! # Factline Moderation
//!
//! The policy service: a relay subscriber that reacts to exactly one Fact
//! kind and emits a derived Fact back through the same relay.
//!
//! ```text
//! CommentCreated ──▶ ModerationService ──▶ CommentModerated
//!                     (pure denylist            (status approved
//!                      verdict)                  or rejected)
//! ```
//!
//! Per comment, the service walks `unseen → pending(content) →
//! decided(status)`, but it holds none of that as state. Each verdict is
//! computed fresh from the Fact payload by a pure policy function, so a
//! duplicated delivery produces the identical verdict and the service
//! survives restarts with nothing to recover.

mod policy;

pub use policy::DenylistPolicy;

use factline_core::fact::Fact;
use factline_core::relay::{Relay, Subscriber, SubscriberError};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Relay subscriber that moderates freshly created comments.
///
/// Consumes `CommentCreated`, computes a verdict with its configured
/// [`DenylistPolicy`], and broadcasts `CommentModerated` echoing the
/// original content and post id unchanged. Every other Fact kind is
/// ignored.
pub struct ModerationService {
    relay: Arc<dyn Relay>,
    policy: DenylistPolicy,
}

impl ModerationService {
    /// Create a moderation service emitting verdicts through the given
    /// relay.
    #[must_use]
    pub fn new(relay: Arc<dyn Relay>, policy: DenylistPolicy) -> Self {
        Self { relay, policy }
    }

    /// The configured policy.
    #[must_use]
    pub const fn policy(&self) -> &DenylistPolicy {
        &self.policy
    }
}

impl Subscriber for ModerationService {
    fn name(&self) -> &str {
        "moderation"
    }

    fn receive(
        &self,
        fact: Fact,
    ) -> Pin<Box<dyn Future<Output = Result<(), SubscriberError>> + Send + '_>> {
        Box::pin(async move {
            let Fact::CommentCreated {
                id,
                post_id,
                content,
            } = fact
            else {
                return Ok(());
            };

            let status = self.policy.review(&content);
            tracing::info!(comment_id = %id, post_id = %post_id, %status, "Comment reviewed");

            let verdict = Fact::CommentModerated {
                id,
                post_id,
                content,
                status,
            };
            self.relay
                .broadcast(verdict)
                .await
                .map_err(|error| SubscriberError::Processing {
                    subscriber: "moderation".to_string(),
                    kind: "CommentCreated",
                    reason: format!("failed to broadcast verdict: {error}"),
                })?;
            Ok(())
        })
    }
}
