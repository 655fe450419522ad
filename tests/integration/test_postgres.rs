//! Runs the Postgres store against a live database:
//! `DATABASE_URL=postgres://… cargo test -- --ignored`

use forum_api::{
    application::votes::use_case::VoteUseCase,
    domain::{
        shared::errors::DomainError,
        vote::{entity::VoteTarget, repository::VoteRepository, state::VoteState},
    },
    infrastructure::{
        database::pool::create_pool, repositories::sqlx_vote_repository::SqlxVoteRepository,
    },
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use uuid::Uuid;

async fn connect() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
    let pool = create_pool(&url, 10, Duration::from_secs(5))
        .await
        .expect("failed to create pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations failed");
    pool
}

async fn insert_post(pool: &PgPool) -> VoteTarget {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO posts (id, author_id) VALUES ($1, $2)")
        .bind(id)
        .bind(Uuid::now_v7())
        .execute(pool)
        .await
        .expect("failed to insert post");
    VoteTarget::post(id)
}

async fn score_and_rows(pool: &PgPool, target: VoteTarget) -> (i64, i64) {
    let score: i64 = sqlx::query_scalar("SELECT score FROM posts WHERE id = $1")
        .bind(target.id)
        .fetch_one(pool)
        .await
        .expect("post missing");
    let rows: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(CASE state WHEN 'UPVOTE' THEN 1 ELSE -1 END), 0)::bigint \
         FROM votes WHERE target_type = 'POST' AND target_id = $1",
    )
    .bind(target.id)
    .fetch_one(pool)
    .await
    .expect("failed to sum votes");
    (score, rows)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires DATABASE_URL"]
async fn postgres_concurrent_voters_and_double_clicks_keep_the_invariant() {
    let pool = connect().await;
    let votes = Arc::new(VoteUseCase::new(
        Arc::new(SqlxVoteRepository::new(pool.clone())),
        1,
    ));
    let post = insert_post(&pool).await;
    let clicker = Uuid::now_v7();

    let mut handles = Vec::new();
    for i in 0..16 {
        let votes = votes.clone();
        // Every other task is the same user clicking UPVOTE again.
        let user = if i % 2 == 0 { clicker } else { Uuid::now_v7() };
        handles.push(tokio::spawn(async move {
            votes.cast_vote(user, post, "UPVOTE").await
        }));
    }
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => {}
            // A conflict that survives the retry is reported, never applied.
            Err(DomainError::StorageConflict(_)) => conflicts += 1,
            Err(err) => panic!("unexpected vote failure: {err}"),
        }
    }

    let (score, rows) = score_and_rows(&pool, post).await;
    assert_eq!(score, rows);
    assert!(conflicts < 16, "every vote conflicted");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn postgres_store_round_trips_vote_states() {
    let pool = connect().await;
    let repo = SqlxVoteRepository::new(pool.clone());
    let post = insert_post(&pool).await;
    let user = Uuid::now_v7();

    let mut uow = repo.begin().await.unwrap();
    assert!(uow.get(user, post).await.unwrap().is_none());
    uow.upsert(user, post, VoteState::Upvote).await.unwrap();
    assert_eq!(uow.apply_delta(post, 1).await.unwrap(), 1);
    uow.commit().await.unwrap();

    let mut uow = repo.begin().await.unwrap();
    let duplicate = uow.insert(user, post, VoteState::Downvote).await;
    assert!(duplicate.is_err());
    drop(uow);

    let states = repo.find_states(user, &[post.id]).await.unwrap();
    assert_eq!(states.get(&post.id), Some(&VoteState::Upvote));

    assert_eq!(repo.delete_all_for_target(post).await.unwrap(), 1);
    assert!(repo.find_states(user, &[post.id]).await.unwrap().is_empty());
}
