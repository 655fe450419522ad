use super::helpers::{assert_score_invariant, recomputed_score, spawn_app};
use forum_api::domain::{shared::errors::DomainError, vote::state::VoteState};
use futures_util::future::join_all;
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_distinct_voters_all_land() {
    let app = spawn_app();
    let post = app.repo.insert_post(Uuid::now_v7()).await;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let votes = app.votes.clone();
            tokio::spawn(async move { votes.cast_vote(Uuid::now_v7(), post, "UPVOTE").await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("vote failed");
    }

    assert_eq!(app.repo.stored_score(post).await, Some(2));
    assert_score_invariant(&app.repo, post).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_voters_on_one_target_keep_the_invariant() {
    let app = spawn_app();
    let comment = app.repo.insert_comment(Uuid::now_v7()).await;

    let handles: Vec<_> = (0..40)
        .map(|i| {
            let votes = app.votes.clone();
            let state = if i % 4 == 0 { "DOWNVOTE" } else { "UPVOTE" };
            tokio::spawn(async move { votes.cast_vote(Uuid::now_v7(), comment, state).await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("vote failed");
    }

    assert_eq!(app.repo.stored_score(comment).await, Some(30 - 10));
    assert_eq!(app.repo.votes_on(comment).await.len(), 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn double_submit_from_one_user_never_double_counts() {
    let app = spawn_app();
    let post = app.repo.insert_post(Uuid::now_v7()).await;
    let user = Uuid::now_v7();

    let results = join_all((0..2).map(|_| app.votes.cast_vote(user, post, "UPVOTE"))).await;
    for result in &results {
        assert!(result.is_ok(), "{:?}", result);
    }

    // The two clicks serialize: one casts, the other toggles off.
    assert_eq!(app.repo.stored_score(post).await, Some(0));
    assert!(app.repo.votes_on(post).await.is_empty());
    assert_score_invariant(&app.repo, post).await;
}

#[tokio::test]
async fn mixed_sequence_keeps_score_equal_to_rows() {
    let app = spawn_app();
    let post = app.repo.insert_post(Uuid::now_v7()).await;
    let users: Vec<Uuid> = (0..5).map(|_| Uuid::now_v7()).collect();

    // Deterministic mix of casts, switches, toggles and retracts.
    for round in 0..12usize {
        for (i, user) in users.iter().enumerate() {
            let result = match (round + i) % 5 {
                0 => app.votes.cast_vote(*user, post, "UPVOTE").await,
                1 => app.votes.cast_vote(*user, post, "DOWNVOTE").await,
                2 => app.votes.retract_vote(*user, post).await,
                3 => app.votes.cast_vote(*user, post, "UPVOTE").await,
                _ => app.votes.cast_vote(*user, post, "SIDEWAYS").await,
            };
            if let Err(err) = result {
                assert!(matches!(err, DomainError::InvalidVoteState(_)), "{:?}", err);
            }
            assert_score_invariant(&app.repo, post).await;
        }
    }

    let held = app
        .votes
        .get_vote_state_for_user(Some(users[0]), &[post.id])
        .await
        .unwrap();
    let expected_rows = app
        .repo
        .votes_on(post)
        .await
        .into_iter()
        .find(|vote| vote.user_id == users[0])
        .map(|vote| vote.state);
    assert_eq!(held[&post.id], expected_rows);
}

#[tokio::test]
async fn racing_first_cast_is_resolved_against_the_winner() {
    let app = spawn_app();
    let post = app.repo.insert_post(Uuid::now_v7()).await;
    let user = Uuid::now_v7();
    // The winning request downvoted; this one asked for an upvote.
    app.repo.race_next_insert(user, post, VoteState::Downvote).await;

    let outcome = app.votes.cast_vote(user, post, "UPVOTE").await.unwrap();

    assert_eq!(outcome.vote_state, Some(VoteState::Upvote));
    assert_eq!(outcome.score, 1);
    assert_eq!(recomputed_score(&app.repo, post).await, 1);
    assert_eq!(app.repo.votes_on(post).await.len(), 1);
}

#[tokio::test]
async fn purge_removes_only_the_deleted_targets_votes() {
    let app = spawn_app();
    let doomed = app.repo.insert_post(Uuid::now_v7()).await;
    let survivor = app.repo.insert_post(Uuid::now_v7()).await;
    for _ in 0..3 {
        let user = Uuid::now_v7();
        app.votes.cast_vote(user, doomed, "UPVOTE").await.unwrap();
        app.votes.cast_vote(user, survivor, "DOWNVOTE").await.unwrap();
    }

    let removed = app.votes.purge_target_votes(doomed).await.unwrap();

    assert_eq!(removed, 3);
    assert!(app.repo.votes_on(doomed).await.is_empty());
    assert_eq!(app.repo.votes_on(survivor).await.len(), 3);
    assert_score_invariant(&app.repo, survivor).await;
}

#[tokio::test]
async fn retract_on_untouched_target_leaves_score_alone() {
    let app = spawn_app();
    let comment = app.repo.insert_comment(Uuid::now_v7()).await;

    let outcome = app.votes.retract_vote(Uuid::now_v7(), comment).await.unwrap();

    assert_eq!(outcome.score, 0);
    assert_eq!(outcome.vote_state, None);
    assert!(app.repo.votes_on(comment).await.is_empty());
}
