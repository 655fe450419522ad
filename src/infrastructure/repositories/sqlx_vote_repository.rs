use crate::domain::{
    shared::errors::DomainError,
    vote::{
        entity::{Votable, Vote, VoteTarget},
        repository::{ScoreAggregate, VoteRecordStore, VoteRepository, VoteUnitOfWork},
        state::{TargetType, VoteState},
    },
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

pub struct SqlxVoteRepository {
    pub pool: PgPool,
}

impl SqlxVoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// One Postgres transaction. Row locks taken by `get` and by the score
/// update are held until commit; dropping it rolls back.
pub struct SqlxVoteUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl VoteRepository for SqlxVoteRepository {
    async fn begin(&self) -> Result<Box<dyn VoteUnitOfWork>, DomainError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqlxVoteUnitOfWork { tx }))
    }

    async fn find_votable(&self, target: VoteTarget) -> Result<Option<Votable>, DomainError> {
        let sql = match target.target_type {
            TargetType::Post => {
                "SELECT id, 'POST'::text AS target_type, author_id, score, deleted, created_at \
                 FROM posts WHERE id = $1 AND deleted = FALSE"
            }
            TargetType::Comment => {
                "SELECT id, 'COMMENT'::text AS target_type, author_id, score, deleted, created_at \
                 FROM comments WHERE id = $1 AND deleted = FALSE"
            }
        };
        let votable = sqlx::query_as::<_, Votable>(sql)
            .bind(target.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(votable)
    }

    async fn find_states(
        &self,
        user_id: Uuid,
        target_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, VoteState>, DomainError> {
        let rows = sqlx::query_as::<_, (Uuid, VoteState)>(
            "SELECT target_id, state FROM votes WHERE user_id = $1 AND target_id = ANY($2)",
        )
        .bind(user_id)
        .bind(target_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn delete_all_for_target(&self, target: VoteTarget) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM votes WHERE target_type = $1 AND target_id = $2")
            .bind(target.target_type)
            .bind(target.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl VoteRecordStore for SqlxVoteUnitOfWork {
    async fn get(
        &mut self,
        user_id: Uuid,
        target: VoteTarget,
    ) -> Result<Option<Vote>, DomainError> {
        let vote = sqlx::query_as::<_, Vote>(
            "SELECT id, user_id, target_type, target_id, state, created_at, updated_at \
             FROM votes \
             WHERE user_id = $1 AND target_type = $2 AND target_id = $3 \
             FOR UPDATE",
        )
        .bind(user_id)
        .bind(target.target_type)
        .bind(target.id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(vote)
    }

    async fn insert(
        &mut self,
        user_id: Uuid,
        target: VoteTarget,
        state: VoteState,
    ) -> Result<Vote, DomainError> {
        // A concurrent first cast blocks on the unique index and then lands
        // in DO NOTHING, which surfaces here as an empty result.
        sqlx::query_as::<_, Vote>(
            "INSERT INTO votes (id, user_id, target_type, target_id, state) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, target_type, target_id) DO NOTHING \
             RETURNING id, user_id, target_type, target_id, state, created_at, updated_at",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(target.target_type)
        .bind(target.id)
        .bind(state)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| {
            DomainError::StorageConflict(format!(
                "vote by {} on {} {} already exists",
                user_id, target.target_type, target.id
            ))
        })
    }

    async fn update(
        &mut self,
        user_id: Uuid,
        target: VoteTarget,
        state: VoteState,
    ) -> Result<Vote, DomainError> {
        sqlx::query_as::<_, Vote>(
            "UPDATE votes SET state = $4, updated_at = NOW() \
             WHERE user_id = $1 AND target_type = $2 AND target_id = $3 \
             RETURNING id, user_id, target_type, target_id, state, created_at, updated_at",
        )
        .bind(user_id)
        .bind(target.target_type)
        .bind(target.id)
        .bind(state)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| {
            DomainError::StorageConflict(format!(
                "vote by {} on {} {} disappeared",
                user_id, target.target_type, target.id
            ))
        })
    }

    async fn delete(&mut self, user_id: Uuid, target: VoteTarget) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM votes WHERE user_id = $1 AND target_type = $2 AND target_id = $3")
            .bind(user_id)
            .bind(target.target_type)
            .bind(target.id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ScoreAggregate for SqlxVoteUnitOfWork {
    async fn score(&mut self, target: VoteTarget) -> Result<i64, DomainError> {
        let sql = match target.target_type {
            TargetType::Post => "SELECT score FROM posts WHERE id = $1 AND deleted = FALSE",
            TargetType::Comment => "SELECT score FROM comments WHERE id = $1 AND deleted = FALSE",
        };
        sqlx::query_scalar::<_, i64>(sql)
            .bind(target.id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| not_found(target))
    }

    async fn apply_delta(&mut self, target: VoteTarget, delta: i64) -> Result<i64, DomainError> {
        let sql = match target.target_type {
            TargetType::Post => {
                "UPDATE posts SET score = score + $1 WHERE id = $2 AND deleted = FALSE RETURNING score"
            }
            TargetType::Comment => {
                "UPDATE comments SET score = score + $1 WHERE id = $2 AND deleted = FALSE RETURNING score"
            }
        };
        sqlx::query_scalar::<_, i64>(sql)
            .bind(delta)
            .bind(target.id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| not_found(target))
    }
}

#[async_trait]
impl VoteUnitOfWork for SqlxVoteUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let SqlxVoteUnitOfWork { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}

fn not_found(target: VoteTarget) -> DomainError {
    match target.target_type {
        TargetType::Post => DomainError::NotFound(format!("Post {} not found", target.id)),
        TargetType::Comment => DomainError::NotFound(format!("Comment {} not found", target.id)),
    }
}
