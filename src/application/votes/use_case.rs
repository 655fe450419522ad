use super::{query::VoteQueryFacade, reconciler::VoteReconciler};
use crate::domain::{
    shared::errors::DomainError,
    vote::{
        entity::{VotableView, VoteOutcome, VoteTarget},
        repository::VoteRepository,
        state::{RequestedVote, VoteState},
    },
};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Entry points used by the post and comment handlers.
pub struct VoteUseCase {
    repository: Arc<dyn VoteRepository>,
    reconciler: VoteReconciler,
    query: VoteQueryFacade,
}

impl VoteUseCase {
    pub fn new(repository: Arc<dyn VoteRepository>, conflict_retries: u32) -> Self {
        Self {
            reconciler: VoteReconciler::new(repository.clone(), conflict_retries),
            query: VoteQueryFacade::new(repository.clone()),
            repository,
        }
    }

    /// Casts UPVOTE or DOWNVOTE. Casting the state already held retracts it.
    pub async fn cast_vote(
        &self,
        user_id: Uuid,
        target: VoteTarget,
        state: &str,
    ) -> Result<VoteOutcome, DomainError> {
        let state: VoteState = state.parse()?;
        self.reconciler
            .apply(target, user_id, RequestedVote::Cast(state))
            .await
    }

    pub async fn retract_vote(
        &self,
        user_id: Uuid,
        target: VoteTarget,
    ) -> Result<VoteOutcome, DomainError> {
        self.reconciler
            .apply(target, user_id, RequestedVote::Retract)
            .await
    }

    pub async fn get_vote_state_for_user(
        &self,
        user_id: Option<Uuid>,
        target_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Option<VoteState>>, DomainError> {
        self.query.states_for(user_id, target_ids).await
    }

    pub async fn get_votable(
        &self,
        user_id: Option<Uuid>,
        target: VoteTarget,
    ) -> Result<VotableView, DomainError> {
        self.query.view(user_id, target).await
    }

    /// Called by the target's hard-delete routine. The score is moot once
    /// the target is gone, so only the rows are removed.
    pub async fn purge_target_votes(&self, target: VoteTarget) -> Result<u64, DomainError> {
        let removed = self.repository.delete_all_for_target(target).await?;
        tracing::info!(
            target_id = %target.id,
            target_type = %target.target_type,
            removed,
            "Purged votes of deleted target"
        );
        Ok(removed)
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }
}
