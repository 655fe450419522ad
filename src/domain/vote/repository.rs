use super::entity::{Votable, Vote, VoteTarget};
use super::state::VoteState;
use crate::domain::shared::errors::DomainError;
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// Per-user vote rows, scoped to one unit of work.
#[async_trait]
pub trait VoteRecordStore: Send {
    /// Reads the user's vote and holds it against concurrent writers until
    /// the unit of work ends.
    async fn get(&mut self, user_id: Uuid, target: VoteTarget)
    -> Result<Option<Vote>, DomainError>;

    /// Creates the user's vote. Fails with `StorageConflict` if a row for the
    /// same (user, target) already exists.
    async fn insert(
        &mut self,
        user_id: Uuid,
        target: VoteTarget,
        state: VoteState,
    ) -> Result<Vote, DomainError>;

    /// Overwrites the state of an existing vote. Fails with `StorageConflict`
    /// if the row vanished.
    async fn update(
        &mut self,
        user_id: Uuid,
        target: VoteTarget,
        state: VoteState,
    ) -> Result<Vote, DomainError>;

    /// Removes the user's vote; absent rows are not an error.
    async fn delete(&mut self, user_id: Uuid, target: VoteTarget) -> Result<(), DomainError>;

    async fn upsert(
        &mut self,
        user_id: Uuid,
        target: VoteTarget,
        state: VoteState,
    ) -> Result<Vote, DomainError> {
        match self.get(user_id, target).await? {
            Some(_) => self.update(user_id, target, state).await,
            None => self.insert(user_id, target, state).await,
        }
    }
}

/// The denormalized score owned by each votable.
#[async_trait]
pub trait ScoreAggregate: Send {
    async fn score(&mut self, target: VoteTarget) -> Result<i64, DomainError>;

    /// Adds `delta` in storage and returns the new score. Never computed as
    /// read-then-write in application memory.
    async fn apply_delta(&mut self, target: VoteTarget, delta: i64) -> Result<i64, DomainError>;
}

/// Vote row and score writes that commit together or not at all.
///
/// Dropping a unit of work without calling `commit` discards every write
/// made through it.
#[async_trait]
pub trait VoteUnitOfWork: VoteRecordStore + ScoreAggregate {
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn VoteUnitOfWork>, DomainError>;

    /// Resolves a non-deleted target.
    async fn find_votable(&self, target: VoteTarget) -> Result<Option<Votable>, DomainError>;

    /// The user's current states on the given targets. Targets without a
    /// vote are absent from the map.
    async fn find_states(
        &self,
        user_id: Uuid,
        target_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, VoteState>, DomainError>;

    /// Removes every vote on a target; returns how many rows went away.
    async fn delete_all_for_target(&self, target: VoteTarget) -> Result<u64, DomainError>;

    async fn ping(&self) -> Result<(), DomainError>;
}
