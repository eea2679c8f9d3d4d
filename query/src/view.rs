//! Denormalized read-view types.

use factline_core::fact::{EntityId, ModerationStatus};
use serde::{Deserialize, Serialize};

/// A post joined with its comments, as served to readers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    /// Post id.
    pub id: EntityId,
    /// Post title.
    pub title: String,
    /// Comments in fold order.
    pub comments: Vec<CommentView>,
}

/// A comment nested inside a [`PostView`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    /// Comment id.
    pub id: EntityId,
    /// Comment body (the most recently folded version).
    pub content: String,
    /// Verdict of the most recently folded moderation Fact, or `None`
    /// while no moderation Fact has arrived yet.
    pub status: Option<ModerationStatus>,
}
