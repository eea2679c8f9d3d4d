//! The fold engine: Facts in, materialized Post/Comment tree out.

use crate::view::{CommentView, PostView};
use factline_core::fact::{EntityId, Fact};
use factline_core::relay::{Subscriber, SubscriberError};
use metrics::counter;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::RwLock;

/// Bounds for the pending buffer and quarantine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectorConfig {
    /// Maximum parked Facts awaiting a single post.
    pub max_parked_per_post: usize,
    /// Maximum parked Facts across all posts.
    pub max_parked_total: usize,
    /// Replay attempts before a parked Fact is quarantined.
    pub max_replay_attempts: u8,
    /// Quarantine capacity; beyond it quarantined Facts are counted and
    /// logged but no longer retained.
    pub max_quarantined: usize,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            max_parked_per_post: 64,
            max_parked_total: 1024,
            max_replay_attempts: 8,
            max_quarantined: 1024,
        }
    }
}

/// What the projector did with one applied Fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoldOutcome {
    /// The Fact updated the view.
    Applied,
    /// The Fact referenced a missing parent and was parked for replay.
    Parked,
    /// The Fact exceeded a pending bound or its replay budget.
    Quarantined,
}

/// Why a Fact was quarantined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuarantineReason {
    /// A pending-buffer bound was hit.
    BufferFull,
    /// The Fact failed every replay attempt.
    AttemptsExhausted,
}

/// A Fact the projector gave up on, kept for inspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuarantinedFact {
    /// The orphaned Fact.
    pub fact: Fact,
    /// Why it was quarantined.
    pub reason: QuarantineReason,
}

/// A parked Fact with its replay budget spent so far.
#[derive(Clone, Debug)]
struct Parked {
    fact: Fact,
    attempts: u8,
}

/// What a Fact was missing when it failed to fold.
enum Miss {
    Post(EntityId),
    Comment {
        post_id: EntityId,
        comment_id: EntityId,
    },
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post(id) => write!(f, "post {id}"),
            Self::Comment {
                post_id,
                comment_id,
            } => write!(f, "comment {comment_id} in post {post_id}"),
        }
    }
}

#[derive(Default)]
struct ProjectorState {
    posts: HashMap<EntityId, PostView>,
    parked: HashMap<EntityId, Vec<Parked>>,
    parked_total: usize,
    quarantined: Vec<QuarantinedFact>,
}

/// Folds the Fact stream into a materialized Post/Comment tree.
///
/// # Folding Rules
///
/// Applied in arrival order, no reordering, no deduplication:
///
/// - `PostCreated`: insert a post with no comments. An existing post with
///   the same id is **overwritten and its comments discarded** (the
///   documented idempotent-by-overwrite behavior), logged at `warn`.
/// - `CommentCreated`: append a comment with no status to its parent post.
/// - `CommentModerated` / `CommentUpdated`: linear-scan the parent post's
///   comments for the id; overwrite content and status in place. The most
///   recently folded moderation Fact wins, by arrival order (the system
///   has no timestamps).
///
/// # Missing Parents
///
/// A Fact whose parent post (or, for moderation, whose comment) has not
/// arrived yet is parked rather than fatal. Each successful
/// `PostCreated`/`CommentCreated` fold drains the parked Facts for that
/// post and replays them in arrival order; a replay that still cannot
/// apply re-parks with one attempt consumed. Facts that exceed any
/// [`ProjectorConfig`] bound move to the quarantine, observable via
/// [`Projector::quarantined`].
///
/// All mutation happens under a single write lock, so concurrent
/// deliveries for the same post cannot race on its comment sequence.
pub struct Projector {
    config: ProjectorConfig,
    state: RwLock<ProjectorState>,
}

impl Projector {
    /// Create a projector with the given bounds.
    #[must_use]
    pub fn new(config: ProjectorConfig) -> Self {
        Self {
            config,
            state: RwLock::new(ProjectorState::default()),
        }
    }

    /// Fold one Fact into the view, in arrival order.
    pub async fn apply(&self, fact: Fact) -> FoldOutcome {
        let mut state = self.state.write().await;
        self.fold(&mut state, fact)
    }

    /// Snapshot of the materialized view, keyed by post id.
    pub async fn view(&self) -> HashMap<EntityId, PostView> {
        self.state.read().await.posts.clone()
    }

    /// Snapshot of a single post's view.
    pub async fn post(&self, id: &EntityId) -> Option<PostView> {
        self.state.read().await.posts.get(id).cloned()
    }

    /// Number of Facts currently parked awaiting a missing parent.
    pub async fn parked_len(&self) -> usize {
        self.state.read().await.parked_total
    }

    /// Facts the projector has given up on, in quarantine order.
    pub async fn quarantined(&self) -> Vec<QuarantinedFact> {
        self.state.read().await.quarantined.clone()
    }

    fn fold(&self, state: &mut ProjectorState, fact: Fact) -> FoldOutcome {
        match try_fold(&mut state.posts, &fact) {
            Ok(()) => {
                counter!("factline_facts_folded_total").increment(1);
                tracing::debug!(kind = fact.kind(), post_id = %fact.post_id(), "Fact folded");
                if matches!(
                    fact,
                    Fact::PostCreated { .. } | Fact::CommentCreated { .. }
                ) {
                    let post_id = fact.post_id().clone();
                    self.flush(state, &post_id);
                }
                FoldOutcome::Applied
            }
            Err(miss) => self.park(state, fact, &miss),
        }
    }

    /// Park a Fact whose parent is missing, within the configured bounds.
    fn park(&self, state: &mut ProjectorState, fact: Fact, miss: &Miss) -> FoldOutcome {
        let key = fact.post_id().clone();
        let queued = state.parked.get(&key).map_or(0, Vec::len);
        if queued >= self.config.max_parked_per_post
            || state.parked_total >= self.config.max_parked_total
        {
            return self.quarantine(state, fact, QuarantineReason::BufferFull);
        }

        counter!("factline_facts_parked_total").increment(1);
        tracing::debug!(
            kind = fact.kind(),
            post_id = %key,
            missing = %miss,
            "Fact parked awaiting missing parent"
        );
        state
            .parked
            .entry(key)
            .or_default()
            .push(Parked { fact, attempts: 0 });
        state.parked_total += 1;
        FoldOutcome::Parked
    }

    /// Replay the parked Facts for a post whose state just grew.
    ///
    /// Loops while progress is being made: a replayed `CommentCreated` can
    /// itself unblock a moderation Fact parked earlier in arrival order.
    fn flush(&self, state: &mut ProjectorState, post_id: &EntityId) {
        loop {
            let Some(queue) = state.parked.remove(post_id) else {
                return;
            };
            state.parked_total -= queue.len();

            let mut progressed = false;
            let mut requeue = Vec::new();
            for mut parked in queue {
                match try_fold(&mut state.posts, &parked.fact) {
                    Ok(()) => {
                        progressed = true;
                        counter!("factline_facts_folded_total").increment(1);
                        counter!("factline_facts_flushed_total").increment(1);
                        tracing::debug!(
                            kind = parked.fact.kind(),
                            post_id = %post_id,
                            "Parked fact folded after parent arrived"
                        );
                    }
                    Err(_) => {
                        parked.attempts += 1;
                        if parked.attempts >= self.config.max_replay_attempts {
                            self.quarantine(
                                state,
                                parked.fact,
                                QuarantineReason::AttemptsExhausted,
                            );
                        } else {
                            requeue.push(parked);
                        }
                    }
                }
            }

            let drained = requeue.is_empty();
            if !drained {
                state.parked_total += requeue.len();
                state.parked.insert(post_id.clone(), requeue);
            }
            if drained || !progressed {
                return;
            }
        }
    }

    fn quarantine(
        &self,
        state: &mut ProjectorState,
        fact: Fact,
        reason: QuarantineReason,
    ) -> FoldOutcome {
        counter!("factline_facts_quarantined_total").increment(1);
        tracing::warn!(
            kind = fact.kind(),
            post_id = %fact.post_id(),
            ?reason,
            "Fact quarantined"
        );
        if state.quarantined.len() < self.config.max_quarantined {
            state.quarantined.push(QuarantinedFact { fact, reason });
        }
        FoldOutcome::Quarantined
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(ProjectorConfig::default())
    }
}

/// Apply one Fact to the post map, or report what it was missing.
fn try_fold(posts: &mut HashMap<EntityId, PostView>, fact: &Fact) -> Result<(), Miss> {
    match fact {
        Fact::PostCreated { id, title } => {
            let previous = posts.insert(
                id.clone(),
                PostView {
                    id: id.clone(),
                    title: title.clone(),
                    comments: Vec::new(),
                },
            );
            if previous.is_some() {
                tracing::warn!(
                    post_id = %id,
                    "PostCreated overwrote an existing post; prior comments discarded"
                );
            }
            Ok(())
        }
        Fact::CommentCreated {
            id,
            post_id,
            content,
        } => {
            let Some(post) = posts.get_mut(post_id) else {
                return Err(Miss::Post(post_id.clone()));
            };
            post.comments.push(CommentView {
                id: id.clone(),
                content: content.clone(),
                status: None,
            });
            Ok(())
        }
        Fact::CommentModerated {
            id,
            post_id,
            content,
            status,
        }
        | Fact::CommentUpdated {
            id,
            post_id,
            content,
            status,
        } => {
            let Some(post) = posts.get_mut(post_id) else {
                return Err(Miss::Post(post_id.clone()));
            };
            let Some(comment) = post.comments.iter_mut().find(|comment| &comment.id == id)
            else {
                return Err(Miss::Comment {
                    post_id: post_id.clone(),
                    comment_id: id.clone(),
                });
            };
            comment.content = content.clone();
            comment.status = Some(*status);
            Ok(())
        }
    }
}

impl Subscriber for Projector {
    fn name(&self) -> &str {
        "query"
    }

    fn receive(
        &self,
        fact: Fact,
    ) -> Pin<Box<dyn Future<Output = Result<(), SubscriberError>> + Send + '_>> {
        Box::pin(async move {
            // Parked and quarantined are normal outcomes here, not delivery
            // failures; the relay would only log and drop anyway.
            self.apply(fact).await;
            Ok(())
        })
    }
}
