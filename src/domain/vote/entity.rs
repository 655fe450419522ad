use super::state::{TargetType, VoteState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Identifies one votable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteTarget {
    pub id: Uuid,
    pub target_type: TargetType,
}

impl VoteTarget {
    pub fn post(id: Uuid) -> Self {
        Self {
            id,
            target_type: TargetType::Post,
        }
    }

    pub fn comment(id: Uuid) -> Self {
        Self {
            id,
            target_type: TargetType::Comment,
        }
    }
}

/// One user's current stance on one target.
///
/// # Invariants
/// - At most one row exists per (`user_id`, `target_type`, `target_id`).
/// - A retracted vote is deleted, so `state` is never "none".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_type: TargetType,
    pub target_id: Uuid,
    pub state: VoteState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(user_id: Uuid, target: VoteTarget, state: VoteState) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            target_type: target.target_type,
            target_id: target.id,
            state,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn target(&self) -> VoteTarget {
        VoteTarget {
            id: self.target_id,
            target_type: self.target_type,
        }
    }
}

/// A post or comment as far as voting is concerned.
///
/// `score` is the denormalized sum of vote weights. It is only ever changed
/// through signed deltas applied by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Votable {
    pub id: Uuid,
    pub target_type: TargetType,
    pub author_id: Uuid,
    pub score: i64,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Votable {
    pub fn target(&self) -> VoteTarget {
        VoteTarget {
            id: self.id,
            target_type: self.target_type,
        }
    }
}

/// Result of a cast or retract, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoteOutcome {
    pub target_id: Uuid,
    pub target_type: TargetType,
    #[ts(type = "number")]
    pub score: i64,
    pub vote_state: Option<VoteState>,
}

/// A votable rendered for one requester, with their stance attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VotableView {
    pub id: Uuid,
    pub target_type: TargetType,
    pub author_id: Uuid,
    #[ts(type = "number")]
    pub score: i64,
    pub vote_state: Option<VoteState>,
    pub created_at: DateTime<Utc>,
}

impl VotableView {
    pub fn new(votable: Votable, vote_state: Option<VoteState>) -> Self {
        Self {
            id: votable.id,
            target_type: votable.target_type,
            author_id: votable.author_id,
            score: votable.score,
            vote_state,
            created_at: votable.created_at,
        }
    }
}
