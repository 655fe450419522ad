//! Process-local vote store.
//!
//! Units of work are serialized behind one async mutex and stage their writes
//! in a copy of the tables that replaces the committed copy on `commit`, so a
//! dropped unit of work leaves no trace. With the `test-util` feature, two
//! fault hooks let tests force the interleavings that are hard to reproduce
//! against a real database.

use crate::domain::{
    shared::errors::DomainError,
    vote::{
        entity::{Votable, Vote, VoteTarget},
        repository::{ScoreAggregate, VoteRecordStore, VoteRepository, VoteUnitOfWork},
        state::VoteState,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

type VoteKey = (Uuid, VoteTarget);

#[derive(Debug, Clone, Default)]
struct Tables {
    votables: HashMap<VoteTarget, Votable>,
    votes: HashMap<VoteKey, Vote>,
}

#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
struct Faults {
    racing_casts: Vec<(Uuid, VoteTarget, VoteState)>,
    failing_deltas: usize,
}

#[derive(Debug, Default)]
struct Shared {
    tables: Tables,
    #[cfg(any(test, feature = "test-util"))]
    faults: Faults,
}

#[derive(Clone, Default)]
pub struct InMemoryVoteRepository {
    shared: Arc<Mutex<Shared>>,
}

pub struct InMemoryVoteUnitOfWork {
    shared: OwnedMutexGuard<Shared>,
    staged: Tables,
}

impl InMemoryVoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_post(&self, author_id: Uuid) -> VoteTarget {
        self.insert_votable(VoteTarget::post(Uuid::now_v7()), author_id)
            .await
    }

    pub async fn insert_comment(&self, author_id: Uuid) -> VoteTarget {
        self.insert_votable(VoteTarget::comment(Uuid::now_v7()), author_id)
            .await
    }

    async fn insert_votable(&self, target: VoteTarget, author_id: Uuid) -> VoteTarget {
        let votable = Votable {
            id: target.id,
            target_type: target.target_type,
            author_id,
            score: 0,
            deleted: false,
            created_at: Utc::now(),
        };
        self.shared
            .lock()
            .await
            .tables
            .votables
            .insert(votable.target(), votable);
        target
    }

    pub async fn soft_delete(&self, target: VoteTarget) {
        if let Some(votable) = self.shared.lock().await.tables.votables.get_mut(&target) {
            votable.deleted = true;
        }
    }

    /// Committed score, including soft-deleted targets.
    pub async fn stored_score(&self, target: VoteTarget) -> Option<i64> {
        self.shared
            .lock()
            .await
            .tables
            .votables
            .get(&target)
            .map(|v| v.score)
    }

    pub async fn votes_on(&self, target: VoteTarget) -> Vec<Vote> {
        self.shared
            .lock()
            .await
            .tables
            .votes
            .values()
            .filter(|vote| vote.target() == target)
            .cloned()
            .collect()
    }

    /// Makes another request by the same user commit `state` on `target`
    /// after the next unit of work has read the vote but before it inserts.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn race_next_insert(&self, user_id: Uuid, target: VoteTarget, state: VoteState) {
        self.shared
            .lock()
            .await
            .faults
            .racing_casts
            .push((user_id, target, state));
    }

    /// Fails the next score update with `StorageUnavailable`.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn fail_next_delta(&self) {
        self.shared.lock().await.faults.failing_deltas += 1;
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn begin(&self) -> Result<Box<dyn VoteUnitOfWork>, DomainError> {
        let shared = self.shared.clone().lock_owned().await;
        let staged = shared.tables.clone();
        Ok(Box::new(InMemoryVoteUnitOfWork { shared, staged }))
    }

    async fn find_votable(&self, target: VoteTarget) -> Result<Option<Votable>, DomainError> {
        Ok(self
            .shared
            .lock()
            .await
            .tables
            .votables
            .get(&target)
            .filter(|v| !v.deleted)
            .cloned())
    }

    async fn find_states(
        &self,
        user_id: Uuid,
        target_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, VoteState>, DomainError> {
        Ok(self
            .shared
            .lock()
            .await
            .tables
            .votes
            .values()
            .filter(|vote| vote.user_id == user_id && target_ids.contains(&vote.target_id))
            .map(|vote| (vote.target_id, vote.state))
            .collect())
    }

    async fn delete_all_for_target(&self, target: VoteTarget) -> Result<u64, DomainError> {
        let mut shared = self.shared.lock().await;
        let before = shared.tables.votes.len();
        shared.tables.votes.retain(|(_, t), _| *t != target);
        Ok((before - shared.tables.votes.len()) as u64)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

impl InMemoryVoteUnitOfWork {
    fn live_votable(&mut self, target: VoteTarget) -> Result<&mut Votable, DomainError> {
        self.staged
            .votables
            .get_mut(&target)
            .filter(|v| !v.deleted)
            .ok_or_else(|| {
                DomainError::NotFound(format!("{} {} not found", target.target_type, target.id))
            })
    }

    #[cfg(any(test, feature = "test-util"))]
    fn land_racing_cast(&mut self, user_id: Uuid, target: VoteTarget) {
        let faults = &mut self.shared.faults.racing_casts;
        let Some(pos) = faults
            .iter()
            .position(|(u, t, _)| *u == user_id && *t == target)
        else {
            return;
        };
        let (_, _, state) = faults.remove(pos);

        let committed = &mut self.shared.tables;
        committed
            .votes
            .insert((user_id, target), Vote::new(user_id, target, state));
        if let Some(votable) = committed.votables.get_mut(&target) {
            votable.score += state.weight();
        }
    }
}

#[async_trait]
impl VoteRecordStore for InMemoryVoteUnitOfWork {
    async fn get(
        &mut self,
        user_id: Uuid,
        target: VoteTarget,
    ) -> Result<Option<Vote>, DomainError> {
        Ok(self.staged.votes.get(&(user_id, target)).cloned())
    }

    async fn insert(
        &mut self,
        user_id: Uuid,
        target: VoteTarget,
        state: VoteState,
    ) -> Result<Vote, DomainError> {
        #[cfg(any(test, feature = "test-util"))]
        self.land_racing_cast(user_id, target);

        let key = (user_id, target);
        if self.staged.votes.contains_key(&key) || self.shared.tables.votes.contains_key(&key) {
            return Err(DomainError::StorageConflict(format!(
                "vote by {} on {} {} already exists",
                user_id, target.target_type, target.id
            )));
        }
        let vote = Vote::new(user_id, target, state);
        self.staged.votes.insert(key, vote.clone());
        Ok(vote)
    }

    async fn update(
        &mut self,
        user_id: Uuid,
        target: VoteTarget,
        state: VoteState,
    ) -> Result<Vote, DomainError> {
        let vote = self
            .staged
            .votes
            .get_mut(&(user_id, target))
            .ok_or_else(|| {
                DomainError::StorageConflict(format!(
                    "vote by {} on {} {} disappeared",
                    user_id, target.target_type, target.id
                ))
            })?;
        vote.state = state;
        vote.updated_at = Utc::now();
        Ok(vote.clone())
    }

    async fn delete(&mut self, user_id: Uuid, target: VoteTarget) -> Result<(), DomainError> {
        self.staged.votes.remove(&(user_id, target));
        Ok(())
    }
}

#[async_trait]
impl ScoreAggregate for InMemoryVoteUnitOfWork {
    async fn score(&mut self, target: VoteTarget) -> Result<i64, DomainError> {
        Ok(self.live_votable(target)?.score)
    }

    async fn apply_delta(&mut self, target: VoteTarget, delta: i64) -> Result<i64, DomainError> {
        #[cfg(any(test, feature = "test-util"))]
        if self.shared.faults.failing_deltas > 0 {
            self.shared.faults.failing_deltas -= 1;
            return Err(DomainError::StorageUnavailable("score update timed out".into()));
        }
        let votable = self.live_votable(target)?;
        votable.score += delta;
        Ok(votable.score)
    }
}

#[async_trait]
impl VoteUnitOfWork for InMemoryVoteUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let InMemoryVoteUnitOfWork { mut shared, staged } = *self;
        shared.tables = staged;
        Ok(())
    }
}
