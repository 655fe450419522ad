use crate::domain::{shared::errors::DomainError, vote::state::VoteState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Body of a cast request. `state` stays raw JSON so that unknown values,
/// non-strings and a missing field all reach the domain and are rejected as
/// `InvalidVoteState`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CastVoteRequest {
    #[serde(default)]
    #[ts(type = "string")]
    pub state: serde_json::Value,
}

impl CastVoteRequest {
    pub fn state(&self) -> Result<&str, DomainError> {
        self.state
            .as_str()
            .ok_or_else(|| DomainError::InvalidVoteState(self.state.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct VoteLookupRequest {
    #[validate(length(min = 1, max = 100))]
    pub target_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoteLookupResponse {
    pub votes: HashMap<Uuid, Option<VoteState>>,
}
