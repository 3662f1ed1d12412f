//! End-to-end grading math over the pure kernels: evaluate a user's batch,
//! fold it into leaderboard totals, assign ranks and run the rating update.

use drona_core::{AnswerKey, GradableQuestion, QuestionType};
use drona_engine::{
    competition_ranks, evaluate, update_ratings, BatchTotals, Participant,
};
use uuid::Uuid;

fn integer_question(answer: i64, marks: i32) -> GradableQuestion {
    GradableQuestion {
        id: Uuid::new_v4(),
        question_type: QuestionType::Integer,
        marks,
        key: Some(AnswerKey::Integer { answer }),
    }
}

fn mcq_question(options: &[&str], correct: &[usize], marks: i32) -> GradableQuestion {
    GradableQuestion {
        id: Uuid::new_v4(),
        question_type: QuestionType::Mcq,
        marks,
        key: Some(AnswerKey::MultiChoice {
            options: options.iter().map(|s| s.to_string()).collect(),
            correct: correct.iter().copied().collect(),
        }),
    }
}

fn answers(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

#[test]
fn perfect_batch_produces_a_perfect_leaderboard_row() {
    // Contest with Q1 (integer 7, 4 marks) and Q2 (mcq {a,c}, 4 marks); the
    // user answers both correctly in 10s and 20s.
    let q1 = integer_question(7, 4);
    let q2 = mcq_question(&["a", "b", "c"], &[0, 2], 4);

    let mut totals = BatchTotals::default();
    totals.record(evaluate(&q1, &answers(&["7"])), 10);
    totals.record(evaluate(&q2, &answers(&["a", "c"])), 20);

    assert_eq!(totals.score, 8);
    assert_eq!(totals.correct, 2);
    assert_eq!(totals.incorrect, 0);
    assert_eq!(totals.attempted, 2);
    assert_eq!(totals.unattempted(2), 0);
    assert_eq!(totals.total_time, 30);
    assert!((totals.accuracy() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn wrong_pick_poisons_the_whole_selection() {
    let q2 = mcq_question(&["a", "b", "c"], &[0, 2], 4);
    let verdict = evaluate(&q2, &answers(&["a", "b"]));
    assert!(!verdict.is_correct);
    assert_eq!(verdict.marks, -2);
}

#[test]
fn leaderboard_invariants_hold_for_mixed_batches() {
    let q1 = integer_question(7, 4);
    let q2 = mcq_question(&["a", "b", "c"], &[0, 2], 4);
    let q3 = mcq_question(&["p", "q", "r", "s"], &[1], 5);

    let mut totals = BatchTotals::default();
    totals.record(evaluate(&q1, &answers(&["9"])), 12);
    totals.record(evaluate(&q2, &answers(&["a"])), 40);
    totals.record(evaluate(&q3, &answers(&["q"])), 33);

    let total_questions = 5;
    assert_eq!(totals.attempted, totals.correct + totals.incorrect);
    let unattempted = totals.unattempted(total_questions);
    assert!(unattempted >= 0 && unattempted <= total_questions);
    assert_eq!(unattempted, total_questions - totals.attempted);
    // -1 (wrong integer) + 1 (partial mcq) + 5 (correct scq-style pick).
    assert_eq!(totals.score, 5);
}

#[test]
fn tied_scores_share_first_place_and_ratings_match() {
    // Two users both scored 8; both rank 1, and with identical priors their
    // rating movement is identical too.
    let ranks = competition_ranks(&[8, 8]);
    assert_eq!(ranks, vec![1, 1]);

    let u1 = Uuid::new_v4();
    let u2 = Uuid::new_v4();
    let changes = update_ratings(&[
        Participant {
            user_id: u1,
            rating: 0,
            rank: 1,
            contests_played: 0,
        },
        Participant {
            user_id: u2,
            rating: 0,
            rank: 1,
            contests_played: 0,
        },
    ]);
    assert_eq!(changes[0].delta, changes[1].delta);
    assert_eq!(changes[0].rating_after, changes[1].rating_after);
}

#[test]
fn regrading_a_contest_is_idempotent() {
    let participants: Vec<Participant> = [(1540, 1, 9), (1510, 2, 4), (1480, 2, 0), (1300, 4, 12)]
        .iter()
        .map(|&(rating, rank, contests_played)| Participant {
            user_id: Uuid::new_v4(),
            rating,
            rank,
            contests_played,
        })
        .collect();

    let first = update_ratings(&participants);
    let second = update_ratings(&participants);
    assert_eq!(first, second);

    for change in &first {
        assert_eq!(change.rating_after, change.rating_before + change.delta);
    }
}

#[test]
fn max_rating_never_decreases_under_the_update_rule() {
    // The grading worker writes max(old_max, rating_after); verify the fold.
    let old_max = 1500;
    for rating_after in [1200, 1500, 1700] {
        assert!(old_max.max(rating_after) >= old_max);
    }
}

#[test]
fn a_second_batch_replaces_the_first_in_the_totals() {
    // Last write wins: the aggregate for batch B alone, not a merge of A+B.
    let q1 = integer_question(7, 4);
    let q2 = mcq_question(&["a", "b", "c"], &[0, 2], 4);

    let mut batch_a = BatchTotals::default();
    batch_a.record(evaluate(&q1, &answers(&["7"])), 10);

    let mut batch_b = BatchTotals::default();
    batch_b.record(evaluate(&q2, &answers(&["a", "c"])), 20);

    // The upsert overwrites with batch B's totals.
    assert_eq!(batch_b.score, 4);
    assert_eq!(batch_b.attempted, 1);
    assert_eq!(batch_b.unattempted(2), 1);
    assert_ne!(batch_a.score + batch_b.score, batch_b.score);
}
