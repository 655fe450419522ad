//! Vote state machine.
//!
//! Given what a user currently holds on a target and what they asked for,
//! decides the score delta and what happens to their vote row. Re-casting the
//! state already held retracts it ("click upvote again to undo").

use super::state::{RequestedVote, VoteState};

/// Effect of a transition on the user's vote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordChange {
    /// No row existed; create one.
    Insert(VoteState),
    /// A row existed with the other state; overwrite it.
    Update(VoteState),
    /// A row existed; remove it.
    Delete,
    /// No row existed and none is wanted.
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub delta: i64,
    pub change: RecordChange,
}

impl Transition {
    pub fn between(previous: Option<VoteState>, requested: RequestedVote) -> Self {
        match (previous, requested) {
            (None, RequestedVote::Cast(state)) => Self {
                delta: state.weight(),
                change: RecordChange::Insert(state),
            },
            (Some(held), RequestedVote::Cast(state)) if held == state => Self {
                delta: -held.weight(),
                change: RecordChange::Delete,
            },
            (Some(held), RequestedVote::Cast(state)) => Self {
                delta: state.weight() - held.weight(),
                change: RecordChange::Update(state),
            },
            (Some(held), RequestedVote::Retract) => Self {
                delta: -held.weight(),
                change: RecordChange::Delete,
            },
            (None, RequestedVote::Retract) => Self {
                delta: 0,
                change: RecordChange::Keep,
            },
        }
    }

    /// The state stored for the user once this transition is applied.
    pub fn resulting_state(&self) -> Option<VoteState> {
        match self.change {
            RecordChange::Insert(state) | RecordChange::Update(state) => Some(state),
            RecordChange::Delete | RecordChange::Keep => None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.delta == 0 && self.change == RecordChange::Keep
    }
}
