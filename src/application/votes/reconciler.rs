use crate::domain::{
    shared::errors::DomainError,
    vote::{
        entity::{VoteOutcome, VoteTarget},
        repository::VoteRepository,
        state::RequestedVote,
        transition::{RecordChange, Transition},
    },
};
use std::sync::Arc;
use uuid::Uuid;

/// Applies one user's requested vote change to one target.
///
/// The previous state is read under lock inside the same unit of work that
/// writes the vote row and the score delta, so two requests from the same
/// user on the same target always observe each other's committed result.
/// A unique-key conflict on first cast means another request just landed;
/// the whole unit of work is retried from a fresh read, up to
/// `conflict_retries` times.
pub struct VoteReconciler {
    repository: Arc<dyn VoteRepository>,
    conflict_retries: u32,
}

impl VoteReconciler {
    pub fn new(repository: Arc<dyn VoteRepository>, conflict_retries: u32) -> Self {
        Self {
            repository,
            conflict_retries,
        }
    }

    pub async fn apply(
        &self,
        target: VoteTarget,
        user_id: Uuid,
        requested: RequestedVote,
    ) -> Result<VoteOutcome, DomainError> {
        let mut attempt = 0;
        loop {
            match self.apply_once(target, user_id, requested).await {
                Err(DomainError::StorageConflict(reason)) if attempt < self.conflict_retries => {
                    attempt += 1;
                    tracing::warn!(
                        %user_id,
                        target_id = %target.id,
                        target_type = %target.target_type,
                        attempt,
                        %reason,
                        "Vote write conflicted, re-reading previous state"
                    );
                }
                Err(err) => {
                    if err.is_transient() {
                        tracing::error!(
                            %user_id,
                            target_id = %target.id,
                            error = %err,
                            "Vote rolled back"
                        );
                    }
                    return Err(err);
                }
                Ok(outcome) => return Ok(outcome),
            }
        }
    }

    async fn apply_once(
        &self,
        target: VoteTarget,
        user_id: Uuid,
        requested: RequestedVote,
    ) -> Result<VoteOutcome, DomainError> {
        let mut uow = self.repository.begin().await?;

        let previous = uow.get(user_id, target).await?.map(|vote| vote.state);
        let transition = Transition::between(previous, requested);

        match transition.change {
            RecordChange::Insert(state) => {
                uow.insert(user_id, target, state).await?;
            }
            RecordChange::Update(state) => {
                uow.update(user_id, target, state).await?;
            }
            RecordChange::Delete => uow.delete(user_id, target).await?,
            RecordChange::Keep => {}
        }

        let score = if transition.is_noop() {
            uow.score(target).await?
        } else {
            uow.apply_delta(target, transition.delta).await?
        };

        uow.commit().await?;

        tracing::debug!(
            %user_id,
            target_id = %target.id,
            target_type = %target.target_type,
            ?previous,
            ?requested,
            delta = transition.delta,
            score,
            "Vote reconciled"
        );

        Ok(VoteOutcome {
            target_id: target.id,
            target_type: target.target_type,
            score,
            vote_state: transition.resulting_state(),
        })
    }
}
