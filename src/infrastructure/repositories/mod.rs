pub mod in_memory_vote_repository;
pub mod sqlx_vote_repository;
