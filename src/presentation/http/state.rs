use crate::{application::votes::use_case::VoteUseCase, config::Config};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub votes: Arc<VoteUseCase>,
}
