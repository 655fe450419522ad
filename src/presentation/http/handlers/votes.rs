use crate::application::votes::dto::{CastVoteRequest, VoteLookupRequest, VoteLookupResponse};
use crate::domain::vote::entity::{VotableView, VoteOutcome, VoteTarget};
use crate::presentation::http::{
    errors::AppError,
    middleware::user::{optional_user_id, required_user_id},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::HeaderMap,
};
use uuid::Uuid;
use validator::Validate;

async fn cast(
    state: &AppState,
    headers: &HeaderMap,
    target: VoteTarget,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<Json<VoteOutcome>, AppError> {
    let user_id = required_user_id(headers, &state.config.jwt_secret)?;
    let Json(body) = payload?;
    let outcome = state.votes.cast_vote(user_id, target, body.state()?).await?;
    Ok(Json(outcome))
}

async fn retract(
    state: &AppState,
    headers: &HeaderMap,
    target: VoteTarget,
) -> Result<Json<VoteOutcome>, AppError> {
    let user_id = required_user_id(headers, &state.config.jwt_secret)?;
    let outcome = state.votes.retract_vote(user_id, target).await?;
    Ok(Json(outcome))
}

async fn show(
    state: &AppState,
    headers: &HeaderMap,
    target: VoteTarget,
) -> Result<Json<VotableView>, AppError> {
    let user_id = optional_user_id(headers, &state.config.jwt_secret);
    let view = state.votes.get_votable(user_id, target).await?;
    Ok(Json(view))
}

pub async fn cast_post_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<Json<VoteOutcome>, AppError> {
    cast(&state, &headers, VoteTarget::post(id), payload).await
}

pub async fn retract_post_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<VoteOutcome>, AppError> {
    retract(&state, &headers, VoteTarget::post(id)).await
}

pub async fn cast_comment_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<Json<VoteOutcome>, AppError> {
    cast(&state, &headers, VoteTarget::comment(id), payload).await
}

pub async fn retract_comment_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<VoteOutcome>, AppError> {
    retract(&state, &headers, VoteTarget::comment(id)).await
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<VotableView>, AppError> {
    show(&state, &headers, VoteTarget::post(id)).await
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<VotableView>, AppError> {
    show(&state, &headers, VoteTarget::comment(id)).await
}

pub async fn lookup_votes(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<VoteLookupRequest>, JsonRejection>,
) -> Result<Json<VoteLookupResponse>, AppError> {
    let Json(body) = payload?;
    body.validate()?;
    let user_id = optional_user_id(&headers, &state.config.jwt_secret);
    let votes = state
        .votes
        .get_vote_state_for_user(user_id, &body.target_ids)
        .await?;
    Ok(Json(VoteLookupResponse { votes }))
}
