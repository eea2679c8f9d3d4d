//! Fact data model and wire format.
//!
//! A [`Fact`] is an immutable record of something that has already happened
//! in an owning service. Facts are never retracted or amended: a correction
//! is expressed as a new Fact of a different kind referencing the same
//! entity id.
//!
//! # Wire Format
//!
//! Facts travel between services as a JSON envelope with an adjacently
//! tagged shape, matching the `POST /events` body every subscriber accepts:
//!
//! ```json
//! { "type": "CommentCreated",
//!   "data": { "id": "a1b2c3d4", "postId": "11223344", "content": "nice post" } }
//! ```
//!
//! The enum derives this format directly: `type` carries the kind tag,
//! `data` the payload, and payload fields are camelCase on the wire.
//!
//! # Example
//!
//! ```
//! use factline_core::fact::{EntityId, Fact};
//!
//! let fact = Fact::PostCreated {
//!     id: EntityId::new("a1b2c3d4"),
//!     title: "Hello".to_string(),
//! };
//! assert_eq!(fact.kind(), "PostCreated");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for [`EntityId`] parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid entity id: {0}")]
pub struct ParseEntityIdError(String);

/// Unique identifier for an entity owned by exactly one service.
///
/// Producers assign ids at creation time via [`EntityId::generate`], which
/// draws a random 32-bit token rendered as eight hex digits. Collision
/// probability is negligible at the scale this system targets; ids carry
/// no ordering or timestamp information.
///
/// # Validation
///
/// - `FromStr::from_str()`: Validates input (rejects empty strings)
/// - `From::from()` and `new()`: No validation (for internal use with trusted input)
///
/// # Examples
///
/// ```
/// use factline_core::fact::EntityId;
///
/// let id = EntityId::new("a1b2c3d4");
/// assert_eq!(id.as_str(), "a1b2c3d4");
///
/// let generated = EntityId::generate();
/// assert_eq!(generated.as_str().len(), 8);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Create an `EntityId` from a trusted string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id (32 random bits as eight hex digits).
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{:08x}", rand::random::<u32>()))
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl FromStr for EntityId {
    type Err = ParseEntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseEntityIdError("must not be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

/// Verdict attached to a comment by the moderation policy service.
///
/// Serialized lowercase on the wire (`"approved"` / `"rejected"`). A
/// comment that no moderation Fact has reached yet has no status at all;
/// consumers model that as `Option<ModerationStatus>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    /// The content passed the policy check.
    Approved,
    /// The content matched the policy denylist.
    Rejected,
}

impl ModerationStatus {
    /// Get the wire representation of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of something that happened in an owning service.
///
/// Every payload carries enough identifiers to locate the affected entity
/// in downstream state: comment Facts always embed the owning post id.
///
/// # Kinds
///
/// | kind | emitted by |
/// |---|---|
/// | `PostCreated` | posts producer |
/// | `CommentCreated` | comments producer |
/// | `CommentModerated` | moderation policy service |
/// | `CommentUpdated` | reserved for the future edit flow |
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all_fields = "camelCase")]
pub enum Fact {
    /// A post was created by the posts producer.
    PostCreated {
        /// Id of the new post.
        id: EntityId,
        /// Title as submitted.
        title: String,
    },
    /// A comment was created by the comments producer.
    CommentCreated {
        /// Id of the new comment.
        id: EntityId,
        /// Id of the post the comment belongs to.
        post_id: EntityId,
        /// Comment body as submitted.
        content: String,
    },
    /// The moderation service reached a verdict on a comment.
    ///
    /// Echoes the original content and post id unchanged.
    CommentModerated {
        /// Id of the moderated comment.
        id: EntityId,
        /// Id of the owning post.
        post_id: EntityId,
        /// The comment body the verdict was computed from.
        content: String,
        /// The computed verdict.
        status: ModerationStatus,
    },
    /// A comment was edited. Nothing emits this yet; the projector folds it
    /// so an edit flow can be added without touching the read side.
    CommentUpdated {
        /// Id of the edited comment.
        id: EntityId,
        /// Id of the owning post.
        post_id: EntityId,
        /// New comment body.
        content: String,
        /// Status carried forward by the editor.
        status: ModerationStatus,
    },
}

impl Fact {
    /// Returns the stable kind tag for this Fact.
    ///
    /// This is the exact string carried in the `type` field on the wire.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PostCreated { .. } => "PostCreated",
            Self::CommentCreated { .. } => "CommentCreated",
            Self::CommentModerated { .. } => "CommentModerated",
            Self::CommentUpdated { .. } => "CommentUpdated",
        }
    }

    /// Returns the id of the post this Fact ultimately belongs to.
    ///
    /// For `PostCreated` that is the post's own id; for comment Facts it is
    /// the owning post id. Consumers use this to key pending work when a
    /// Fact arrives before its parent.
    #[must_use]
    pub const fn post_id(&self) -> &EntityId {
        match self {
            Self::PostCreated { id, .. } => id,
            Self::CommentCreated { post_id, .. }
            | Self::CommentModerated { post_id, .. }
            | Self::CommentUpdated { post_id, .. } => post_id,
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(post {})", self.kind(), self.post_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_returns_wire_tag() {
        let fact = Fact::PostCreated {
            id: EntityId::new("p1"),
            title: "Hello".to_string(),
        };
        assert_eq!(fact.kind(), "PostCreated");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn comment_created_wire_format() {
        let fact = Fact::CommentCreated {
            id: EntityId::new("c1"),
            post_id: EntityId::new("p1"),
            content: "nice post".to_string(),
        };

        let value = serde_json::to_value(&fact).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "CommentCreated",
                "data": { "id": "c1", "postId": "p1", "content": "nice post" }
            })
        );
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn moderated_status_is_lowercase_on_the_wire() {
        let fact = Fact::CommentModerated {
            id: EntityId::new("c1"),
            post_id: EntityId::new("p1"),
            content: "I like oranges".to_string(),
            status: ModerationStatus::Rejected,
        };

        let value = serde_json::to_value(&fact).unwrap();
        assert_eq!(value["data"]["status"], json!("rejected"));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn envelope_parses_back_into_a_fact() {
        let body = r#"{"type":"PostCreated","data":{"id":"a1b2c3d4","title":"Hello"}}"#;
        let fact: Fact = serde_json::from_str(body).unwrap();
        assert_eq!(
            fact,
            Fact::PostCreated {
                id: EntityId::new("a1b2c3d4"),
                title: "Hello".to_string(),
            }
        );
    }

    #[test]
    fn post_id_points_at_the_owning_post() {
        let fact = Fact::CommentModerated {
            id: EntityId::new("c1"),
            post_id: EntityId::new("p1"),
            content: "hi".to_string(),
            status: ModerationStatus::Approved,
        };
        assert_eq!(fact.post_id(), &EntityId::new("p1"));
    }

    #[test]
    fn generated_ids_are_eight_hex_digits() {
        let id = EntityId::generate();
        assert_eq!(id.as_str().len(), 8);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn parsing_rejects_empty_ids() {
        assert!("".parse::<EntityId>().is_err());
        assert!("a1b2c3d4".parse::<EntityId>().is_ok());
    }
}
