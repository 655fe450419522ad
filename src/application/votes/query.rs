use crate::domain::{
    shared::errors::DomainError,
    vote::{
        entity::{Votable, VotableView, VoteTarget},
        repository::VoteRepository,
        state::VoteState,
    },
};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Read path that attaches a requester's vote state to votables.
///
/// Never writes. Anonymous requesters get `None` for every target without a
/// storage round-trip.
pub struct VoteQueryFacade {
    repository: Arc<dyn VoteRepository>,
}

impl VoteQueryFacade {
    pub fn new(repository: Arc<dyn VoteRepository>) -> Self {
        Self { repository }
    }

    /// Every requested id is present in the result, mapped to `None` when the
    /// user holds no vote on it.
    pub async fn states_for(
        &self,
        user_id: Option<Uuid>,
        target_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Option<VoteState>>, DomainError> {
        let held = match user_id {
            Some(user_id) if !target_ids.is_empty() => {
                self.repository.find_states(user_id, target_ids).await?
            }
            _ => HashMap::new(),
        };
        Ok(target_ids
            .iter()
            .map(|id| (*id, held.get(id).copied()))
            .collect())
    }

    pub async fn attach(
        &self,
        user_id: Option<Uuid>,
        votables: Vec<Votable>,
    ) -> Result<Vec<VotableView>, DomainError> {
        let ids: Vec<Uuid> = votables.iter().map(|v| v.id).collect();
        let states = self.states_for(user_id, &ids).await?;
        Ok(votables
            .into_iter()
            .map(|votable| {
                let state = states.get(&votable.id).copied().flatten();
                VotableView::new(votable, state)
            })
            .collect())
    }

    pub async fn view(
        &self,
        user_id: Option<Uuid>,
        target: VoteTarget,
    ) -> Result<VotableView, DomainError> {
        let votable = self
            .repository
            .find_votable(target)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("{} {} not found", target.target_type, target.id))
            })?;
        let mut views = self.attach(user_id, vec![votable]).await?;
        views
            .pop()
            .ok_or_else(|| DomainError::NotFound(format!("{} {}", target.target_type, target.id)))
    }
}
