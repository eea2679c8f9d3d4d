//! Posts owning service.

use crate::{ProducerError, emit};
use factline_core::fact::{EntityId, Fact};
use factline_core::relay::Relay;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A post as stored by the posts service (the owning copy).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Service-assigned id.
    pub id: EntityId,
    /// Title as submitted.
    pub title: String,
}

/// Input for [`PostsService::create_post`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    /// Post title; must be non-empty.
    pub title: String,
}

/// The posts producer: owns the post map, emits `PostCreated`.
pub struct PostsService {
    relay: Arc<dyn Relay>,
    posts: RwLock<HashMap<EntityId, Post>>,
}

impl PostsService {
    /// Create a posts service emitting through the given relay.
    #[must_use]
    pub fn new(relay: Arc<dyn Relay>) -> Self {
        Self {
            relay,
            posts: RwLock::new(HashMap::new()),
        }
    }

    /// Create a post: validate, store locally, then broadcast `PostCreated`.
    ///
    /// # Errors
    ///
    /// Returns [`ProducerError::Validation`] if the title is empty; no Fact
    /// is emitted in that case.
    pub async fn create_post(&self, input: NewPost) -> Result<Post, ProducerError> {
        if input.title.is_empty() {
            return Err(ProducerError::Validation(
                "title must not be empty".to_string(),
            ));
        }

        let post = Post {
            id: EntityId::generate(),
            title: input.title,
        };
        self.posts
            .write()
            .await
            .insert(post.id.clone(), post.clone());
        tracing::info!(post_id = %post.id, "Post created");

        emit(
            self.relay.as_ref(),
            Fact::PostCreated {
                id: post.id.clone(),
                title: post.title.clone(),
            },
        )
        .await;

        Ok(post)
    }

    /// Snapshot of all locally stored posts.
    pub async fn posts(&self) -> HashMap<EntityId, Post> {
        self.posts.read().await.clone()
    }

    /// Look up a single locally stored post.
    pub async fn post(&self, id: &EntityId) -> Option<Post> {
        self.posts.read().await.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factline_testing::CaptureRelay;

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn create_stores_locally_and_emits_one_matching_fact() {
        let relay = CaptureRelay::new();
        let service = PostsService::new(Arc::new(relay.clone()));

        let post = service
            .create_post(NewPost {
                title: "Hello".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(service.post(&post.id).await, Some(post.clone()));
        assert_eq!(
            relay.facts(),
            vec![Fact::PostCreated {
                id: post.id,
                title: "Hello".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn empty_title_is_rejected_before_any_fact() {
        let relay = CaptureRelay::new();
        let service = PostsService::new(Arc::new(relay.clone()));

        let result = service
            .create_post(NewPost {
                title: String::new(),
            })
            .await;

        assert!(matches!(result, Err(ProducerError::Validation(_))));
        assert!(relay.is_empty());
        assert!(service.posts().await.is_empty());
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn each_create_gets_its_own_id() {
        let relay = CaptureRelay::new();
        let service = PostsService::new(Arc::new(relay));

        let first = service
            .create_post(NewPost {
                title: "one".to_string(),
            })
            .await
            .unwrap();
        let second = service
            .create_post(NewPost {
                title: "two".to_string(),
            })
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(service.posts().await.len(), 2);
    }
}
