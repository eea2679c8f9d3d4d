//! Comments owning service.
//!
//! Comments are keyed by the post they belong to. The post itself lives in
//! a different service, so no existence check happens here: the comments
//! service only owns comment state, and downstream consumers are the ones
//! that join comments onto posts.

use crate::{ProducerError, emit};
use factline_core::fact::{EntityId, Fact};
use factline_core::relay::Relay;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A comment as stored by the comments service (the owning copy).
///
/// Moderation status is not tracked here; the verdict is downstream state
/// owned by whoever folds `CommentModerated`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Service-assigned id.
    pub id: EntityId,
    /// Comment body as submitted.
    pub content: String,
}

/// Input for [`CommentsService::create_comment`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    /// Comment body; must be non-empty.
    pub content: String,
}

/// The comments producer: owns per-post comment lists, emits
/// `CommentCreated`.
pub struct CommentsService {
    relay: Arc<dyn Relay>,
    comments_by_post: RwLock<HashMap<EntityId, Vec<Comment>>>,
}

impl CommentsService {
    /// Create a comments service emitting through the given relay.
    #[must_use]
    pub fn new(relay: Arc<dyn Relay>) -> Self {
        Self {
            relay,
            comments_by_post: RwLock::new(HashMap::new()),
        }
    }

    /// Create a comment on a post: validate, store locally, then broadcast
    /// `CommentCreated` carrying the owning post id.
    ///
    /// # Errors
    ///
    /// Returns [`ProducerError::Validation`] if the content is empty; no
    /// Fact is emitted in that case.
    pub async fn create_comment(
        &self,
        post_id: &EntityId,
        input: NewComment,
    ) -> Result<Comment, ProducerError> {
        if input.content.is_empty() {
            return Err(ProducerError::Validation(
                "content must not be empty".to_string(),
            ));
        }

        let comment = Comment {
            id: EntityId::generate(),
            content: input.content,
        };
        self.comments_by_post
            .write()
            .await
            .entry(post_id.clone())
            .or_default()
            .push(comment.clone());
        tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment created");

        emit(
            self.relay.as_ref(),
            Fact::CommentCreated {
                id: comment.id.clone(),
                post_id: post_id.clone(),
                content: comment.content.clone(),
            },
        )
        .await;

        Ok(comment)
    }

    /// Locally stored comments for a post, in creation order (empty if the
    /// post has none).
    pub async fn comments_for(&self, post_id: &EntityId) -> Vec<Comment> {
        self.comments_by_post
            .read()
            .await
            .get(post_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factline_testing::CaptureRelay;

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn create_appends_locally_and_emits_with_owning_post_id() {
        let relay = CaptureRelay::new();
        let service = CommentsService::new(Arc::new(relay.clone()));
        let post_id = EntityId::new("p1");

        let comment = service
            .create_comment(
                &post_id,
                NewComment {
                    content: "nice post".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(service.comments_for(&post_id).await, vec![comment.clone()]);
        assert_eq!(
            relay.facts(),
            vec![Fact::CommentCreated {
                id: comment.id,
                post_id,
                content: "nice post".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn empty_content_is_rejected_before_any_fact() {
        let relay = CaptureRelay::new();
        let service = CommentsService::new(Arc::new(relay.clone()));

        let result = service
            .create_comment(
                &EntityId::new("p1"),
                NewComment {
                    content: String::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(ProducerError::Validation(_))));
        assert!(relay.is_empty());
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn comments_accumulate_per_post_in_creation_order() {
        let relay = CaptureRelay::new();
        let service = CommentsService::new(Arc::new(relay));
        let post_id = EntityId::new("p1");

        let first = service
            .create_comment(
                &post_id,
                NewComment {
                    content: "one".to_string(),
                },
            )
            .await
            .unwrap();
        let second = service
            .create_comment(
                &post_id,
                NewComment {
                    content: "two".to_string(),
                },
            )
            .await
            .unwrap();

        let stored = service.comments_for(&post_id).await;
        assert_eq!(stored, vec![first, second]);
        assert!(
            service
                .comments_for(&EntityId::new("other"))
                .await
                .is_empty()
        );
    }
}
