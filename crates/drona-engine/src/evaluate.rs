use std::collections::BTreeSet;

use drona_core::{AnswerKey, GradableQuestion, QuestionType};

/// Outcome of grading one answer: negative marking is carried in `marks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub is_correct: bool,
    pub marks: i32,
}

impl Verdict {
    fn correct(marks: i32) -> Verdict {
        Verdict {
            is_correct: true,
            marks,
        }
    }

    fn wrong(marks: i32) -> Verdict {
        Verdict {
            is_correct: false,
            marks,
        }
    }
}

/// Grade one user answer against a question.
///
/// `user_answer` carries the selected option *texts* (or the integer
/// literal), matched against the question's options by trimmed equality.
/// Questions whose answer key failed to project fall back to the per-type
/// unkeyed policy, mirroring how incomplete rows have always been scored.
pub fn evaluate(question: &GradableQuestion, user_answer: &[String]) -> Verdict {
    match &question.key {
        Some(key) => evaluate_keyed(key, question.marks, user_answer),
        None => evaluate_unkeyed(question.question_type, user_answer),
    }
}

fn evaluate_keyed(key: &AnswerKey, marks: i32, user_answer: &[String]) -> Verdict {
    match key {
        AnswerKey::Integer { answer } => evaluate_integer(Some(*answer), user_answer, marks),
        AnswerKey::MultiChoice { options, correct } => {
            let selected = selected_index_set(options, user_answer);
            let wrong_picks = selected.difference(correct).count();
            if wrong_picks > 0 {
                // Any wrong option voids the partial credit entirely.
                Verdict::wrong(-2)
            } else if selected == *correct {
                Verdict::correct(marks)
            } else {
                // Subset of the correct options: one mark per correct pick.
                Verdict::wrong(selected.intersection(correct).count() as i32)
            }
        }
        AnswerKey::SingleChoice { options, correct } => {
            if user_answer.len() != 1 {
                return Verdict::wrong(-1);
            }
            match option_index(options, &user_answer[0]) {
                Some(index) if index == *correct => Verdict::correct(marks),
                _ => Verdict::wrong(-1),
            }
        }
        AnswerKey::MatchColumns { options, correct } => {
            let mut selected: Vec<usize> = user_answer
                .iter()
                .filter_map(|text| option_index(options, text))
                .collect();
            selected.sort_unstable();
            let mut expected = correct.clone();
            expected.sort_unstable();
            if selected == expected {
                Verdict::correct(marks)
            } else {
                Verdict::wrong(-1)
            }
        }
    }
}

/// Policy for questions with no usable answer key. These still produce an
/// attempt; they just cannot award full marks.
fn evaluate_unkeyed(question_type: QuestionType, user_answer: &[String]) -> Verdict {
    match question_type {
        QuestionType::Integer => evaluate_integer(None, user_answer, 0),
        QuestionType::Mcq => Verdict::wrong(0),
        QuestionType::Scq | QuestionType::Match => Verdict::wrong(-1),
    }
}

fn evaluate_integer(answer: Option<i64>, user_answer: &[String], marks: i32) -> Verdict {
    if user_answer.len() != 1 {
        return Verdict::wrong(-1);
    }
    match user_answer[0].trim().parse::<i64>() {
        Ok(value) => match answer {
            Some(expected) if value == expected => Verdict::correct(marks),
            Some(_) => Verdict::wrong(-1),
            // Parseable input against a missing key earns nothing but is not
            // penalised.
            None => Verdict::wrong(0),
        },
        Err(_) => Verdict::wrong(-1),
    }
}

/// Map answer texts to option indices by trimmed equality, dropping texts
/// that match no option.
fn selected_index_set(options: &[String], user_answer: &[String]) -> BTreeSet<usize> {
    let mut selected = BTreeSet::new();
    for text in user_answer {
        match option_index(options, text) {
            Some(index) => {
                selected.insert(index);
            }
            None => {
                tracing::warn!(answer = %text, "option text not found among question options");
            }
        }
    }
    selected
}

fn option_index(options: &[String], text: &str) -> Option<usize> {
    let needle = text.trim();
    options.iter().position(|option| option.trim() == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn scq_question(options: &[&str], correct: usize, marks: i32) -> GradableQuestion {
        GradableQuestion {
            id: Uuid::new_v4(),
            question_type: QuestionType::Scq,
            marks,
            key: Some(AnswerKey::SingleChoice {
                options: options.iter().map(|s| s.to_string()).collect(),
                correct,
            }),
        }
    }

    fn match_question(options: &[&str], correct: &[usize], marks: i32) -> GradableQuestion {
        GradableQuestion {
            id: Uuid::new_v4(),
            question_type: QuestionType::Match,
            marks,
            key: Some(AnswerKey::MatchColumns {
                options: options.iter().map(|s| s.to_string()).collect(),
                correct: correct.to_vec(),
            }),
        }
    }

    fn answers(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn integer_exact_match_earns_full_marks() {
        let q = integer_question(5, 4);
        assert_eq!(evaluate(&q, &answers(&["5"])), Verdict::correct(4));
    }

    #[test]
    fn integer_tolerates_surrounding_whitespace() {
        let q = integer_question(5, 4);
        assert_eq!(evaluate(&q, &answers(&[" 5 "])), Verdict::correct(4));
    }

    #[test]
    fn integer_wrong_value_is_penalised() {
        let q = integer_question(5, 4);
        assert_eq!(evaluate(&q, &answers(&["6"])), Verdict::wrong(-1));
    }

    #[test]
    fn integer_multiple_answers_are_penalised() {
        let q = integer_question(5, 4);
        assert_eq!(evaluate(&q, &answers(&["5", "6"])), Verdict::wrong(-1));
    }

    #[test]
    fn integer_unparsable_answer_is_penalised() {
        let q = integer_question(5, 4);
        assert_eq!(evaluate(&q, &answers(&["x"])), Verdict::wrong(-1));
        assert_eq!(evaluate(&q, &[]), Verdict::wrong(-1));
    }

    #[test]
    fn mcq_exact_selection_earns_full_marks() {
        let q = mcq_question(&["a", "b", "c", "d"], &[0, 2], 4);
        assert_eq!(evaluate(&q, &answers(&["a", "c"])), Verdict::correct(4));
    }

    #[test]
    fn mcq_partial_selection_earns_one_mark_per_correct_pick() {
        let q = mcq_question(&["a", "b", "c", "d"], &[0, 2], 4);
        assert_eq!(evaluate(&q, &answers(&["a"])), Verdict::wrong(1));
    }

    #[test]
    fn mcq_any_wrong_pick_voids_partial_credit() {
        let q = mcq_question(&["a", "b", "c", "d"], &[0, 2], 4);
        assert_eq!(evaluate(&q, &answers(&["a", "b"])), Verdict::wrong(-2));
        assert_eq!(evaluate(&q, &answers(&["d"])), Verdict::wrong(-2));
    }

    #[test]
    fn mcq_empty_selection_earns_nothing() {
        let q = mcq_question(&["a", "b", "c", "d"], &[0, 2], 4);
        assert_eq!(evaluate(&q, &[]), Verdict::wrong(0));
    }

    #[test]
    fn mcq_unknown_texts_are_dropped() {
        let q = mcq_question(&["a", "b", "c", "d"], &[0, 2], 4);
        // "z" matches nothing, so only "a" counts: a correct partial pick.
        assert_eq!(evaluate(&q, &answers(&["a", "z"])), Verdict::wrong(1));
    }

    #[test]
    fn mcq_matches_options_by_trimmed_text() {
        let q = mcq_question(&[" a", "b", "c ", "d"], &[0, 2], 4);
        assert_eq!(evaluate(&q, &answers(&["a ", " c"])), Verdict::correct(4));
    }

    #[test]
    fn mcq_without_key_earns_zero() {
        let q = GradableQuestion {
            id: Uuid::new_v4(),
            question_type: QuestionType::Mcq,
            marks: 4,
            key: None,
        };
        assert_eq!(evaluate(&q, &answers(&["a", "b"])), Verdict::wrong(0));
    }

    #[test]
    fn scq_correct_option_earns_full_marks() {
        let q = scq_question(&["a", "b", "c", "d"], 1, 4);
        assert_eq!(evaluate(&q, &answers(&["b"])), Verdict::correct(4));
    }

    #[test]
    fn scq_wrong_option_is_penalised() {
        let q = scq_question(&["a", "b", "c", "d"], 1, 4);
        assert_eq!(evaluate(&q, &answers(&["a"])), Verdict::wrong(-1));
    }

    #[test]
    fn scq_unknown_empty_or_multiple_are_penalised() {
        let q = scq_question(&["a", "b", "c", "d"], 1, 4);
        assert_eq!(evaluate(&q, &answers(&["nope"])), Verdict::wrong(-1));
        assert_eq!(evaluate(&q, &[]), Verdict::wrong(-1));
        assert_eq!(evaluate(&q, &answers(&["a", "b"])), Verdict::wrong(-1));
    }

    #[test]
    fn match_exact_set_earns_full_marks() {
        let q = match_question(&["a", "b", "c", "d"], &[1, 3], 4);
        assert_eq!(evaluate(&q, &answers(&["b", "d"])), Verdict::correct(4));
        // Selection order does not matter.
        assert_eq!(evaluate(&q, &answers(&["d", "b"])), Verdict::correct(4));
    }

    #[test]
    fn match_has_no_partial_credit() {
        let q = match_question(&["a", "b", "c", "d"], &[1, 3], 4);
        assert_eq!(evaluate(&q, &answers(&["b"])), Verdict::wrong(-1));
        assert_eq!(evaluate(&q, &answers(&["b", "c"])), Verdict::wrong(-1));
        assert_eq!(evaluate(&q, &[]), Verdict::wrong(-1));
    }

    #[test]
    fn unkeyed_integer_distinguishes_parseable_from_garbage() {
        let q = GradableQuestion {
            id: Uuid::new_v4(),
            question_type: QuestionType::Integer,
            marks: 4,
            key: None,
        };
        assert_eq!(evaluate(&q, &answers(&["7"])), Verdict::wrong(0));
        assert_eq!(evaluate(&q, &answers(&["seven"])), Verdict::wrong(-1));
    }

    #[test]
    fn unkeyed_scq_and_match_are_penalised() {
        for question_type in [QuestionType::Scq, QuestionType::Match] {
            let q = GradableQuestion {
                id: Uuid::new_v4(),
                question_type,
                marks: 4,
                key: None,
            };
            assert_eq!(evaluate(&q, &answers(&["a"])), Verdict::wrong(-1));
        }
    }
}
