use forum_api::domain::{
    shared::errors::DomainError,
    vote::{
        entity::{VoteOutcome, VoteTarget},
        state::{RequestedVote, TargetType, VoteState},
        transition::{RecordChange, Transition},
    },
};
use uuid::Uuid;

use RequestedVote::{Cast, Retract};
use VoteState::{Downvote, Upvote};

#[test]
fn transition_table_matches_documented_rows() {
    let rows: [(Option<VoteState>, RequestedVote, i64, RecordChange); 9] = [
        (None, Cast(Upvote), 1, RecordChange::Insert(Upvote)),
        (None, Cast(Downvote), -1, RecordChange::Insert(Downvote)),
        (Some(Upvote), Cast(Upvote), -1, RecordChange::Delete),
        (Some(Downvote), Cast(Downvote), 1, RecordChange::Delete),
        (Some(Upvote), Cast(Downvote), -2, RecordChange::Update(Downvote)),
        (Some(Downvote), Cast(Upvote), 2, RecordChange::Update(Upvote)),
        (Some(Upvote), Retract, -1, RecordChange::Delete),
        (Some(Downvote), Retract, 1, RecordChange::Delete),
        (None, Retract, 0, RecordChange::Keep),
    ];

    for (previous, requested, delta, change) in rows {
        let transition = Transition::between(previous, requested);
        assert_eq!(
            transition,
            Transition { delta, change },
            "{:?} -> {:?}",
            previous,
            requested
        );
    }
}

#[test]
fn replaying_a_cast_sequence_keeps_score_equal_to_held_weight() {
    let mut held: Option<VoteState> = None;
    let mut score = 0;
    let clicks = [
        Cast(Upvote),
        Cast(Upvote),
        Cast(Downvote),
        Cast(Upvote),
        Retract,
        Retract,
        Cast(Downvote),
        Cast(Downvote),
    ];

    for click in clicks {
        let transition = Transition::between(held, click);
        score += transition.delta;
        held = transition.resulting_state();
        assert_eq!(score, held.map_or(0, VoteState::weight));
    }
}

#[test]
fn unknown_states_are_typed_errors() {
    assert_eq!(
        "SIDEWAYS".parse::<VoteState>(),
        Err(DomainError::InvalidVoteState("SIDEWAYS".to_string()))
    );
    assert!("NONE".parse::<VoteState>().is_err());
}

#[test]
fn outcome_serializes_with_null_state_after_retract() {
    let target = VoteTarget::comment(Uuid::nil());
    let outcome = VoteOutcome {
        target_id: target.id,
        target_type: TargetType::Comment,
        score: -3,
        vote_state: None,
    };

    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["target_type"], "COMMENT");
    assert_eq!(json["score"], -3);
    assert!(json["vote_state"].is_null());
}
