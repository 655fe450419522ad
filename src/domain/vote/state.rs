use crate::domain::shared::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;

/// A stance a user can hold on a votable target.
///
/// Only these two values are ever persisted. "No vote" is the absence of a
/// row, never a third stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum VoteState {
    Upvote,
    Downvote,
}

impl VoteState {
    /// Contribution of one vote in this state to the target's score.
    pub fn weight(self) -> i64 {
        match self {
            VoteState::Upvote => 1,
            VoteState::Downvote => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VoteState::Upvote => "UPVOTE",
            VoteState::Downvote => "DOWNVOTE",
        }
    }
}

impl fmt::Display for VoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPVOTE" => Ok(VoteState::Upvote),
            "DOWNVOTE" => Ok(VoteState::Downvote),
            other => Err(DomainError::InvalidVoteState(other.to_string())),
        }
    }
}

/// What a caller asks the reconciler to do: cast a stance, or retract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedVote {
    Cast(VoteState),
    Retract,
}

impl From<VoteState> for RequestedVote {
    fn from(state: VoteState) -> Self {
        RequestedVote::Cast(state)
    }
}

/// Kind of entity a vote points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum TargetType {
    Post,
    Comment,
}

impl TargetType {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Post => "POST",
            TargetType::Comment => "COMMENT",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
