//! # Factline Query
//!
//! The read side of the platform: a [`Projector`] that subscribes to every
//! Fact kind and folds them, in arrival order, into a denormalized join of
//! posts, their comments, and their moderation status.
//!
//! ```text
//!  PostCreated ──────┐
//!  CommentCreated ───┤    ┌───────────┐     ┌──────────────────────┐
//!  CommentModerated ─┼───▶│ Projector │────▶│ posts ▸ comments ▸    │
//!  CommentUpdated ───┘    │  (fold)   │     │ status (read view)    │
//!                         └─────┬─────┘     └──────────────────────┘
//!                               │ parent missing?
//!                               ▼
//!                     pending buffer ──▶ quarantine (bounded)
//! ```
//!
//! The relay gives no ordering guarantee across independently delivered
//! Facts, so a Fact can reference an entity the projector has not seen
//! yet. Such Facts are **parked** in a bounded pending buffer keyed by the
//! owning post id and replayed once the parent arrives; Facts that exceed
//! the buffer bounds or their replay budget land in an inspectable
//! quarantine instead of corrupting (or crashing) the view.

pub mod projector;
pub mod view;

pub use projector::{
    FoldOutcome, Projector, ProjectorConfig, QuarantineReason, QuarantinedFact,
};
pub use view::{CommentView, PostView};
