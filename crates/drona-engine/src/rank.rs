/// Assign standard competition ranks to a score-descending sequence.
///
/// Equal scores share the lower rank and the next distinct score jumps past
/// the tie: scores `[100, 100, 90]` rank `[1, 1, 3]`. The input must already
/// be sorted descending; callers load leaderboard rows `ORDER BY score DESC`.
pub fn competition_ranks(scores: &[i32]) -> Vec<i32> {
    let mut ranks = Vec::with_capacity(scores.len());
    let mut current_rank = 1;
    let mut prev_score: Option<i32> = None;

    for (i, &score) in scores.iter().enumerate() {
        if let Some(prev) = prev_score {
            debug_assert!(score <= prev, "scores must be sorted descending");
            if score < prev {
                current_rank = i as i32 + 1;
            }
        }
        ranks.push(current_rank);
        prev_score = Some(score);
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_scores_rank_sequentially() {
        assert_eq!(competition_ranks(&[30, 20, 10]), vec![1, 2, 3]);
    }

    #[test]
    fn ties_share_the_lower_rank_and_skip() {
        assert_eq!(competition_ranks(&[100, 100, 90]), vec![1, 1, 3]);
        assert_eq!(competition_ranks(&[8, 8, 8, 5, 5, 1]), vec![1, 1, 1, 4, 4, 6]);
    }

    #[test]
    fn single_and_empty_inputs() {
        assert_eq!(competition_ranks(&[42]), vec![1]);
        assert!(competition_ranks(&[]).is_empty());
    }

    #[test]
    fn negative_scores_rank_like_any_other() {
        assert_eq!(competition_ranks(&[4, 0, -2, -2]), vec![1, 2, 3, 3]);
    }
}
