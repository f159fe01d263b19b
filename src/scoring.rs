//! Pure scoring function shared by every submitting client.
//!
//! Host and participant implementations must use the same answer window for
//! the decay to be fair; both read it from [`crate::config::TimingConfig`].

/// Score an answer from its correctness and how fast it was submitted.
///
/// A correct answer is worth 1000 points when instantaneous, decaying
/// linearly to 0 at or beyond the answer window. Incorrect answers are always
/// worth 0. `elapsed_ms` is measured from the moment choices became visible,
/// not from question display.
pub fn score(is_correct: bool, elapsed_ms: u64, answer_window_ms: u64) -> i32 {
    if !is_correct {
        return 0;
    }

    if elapsed_ms >= answer_window_ms {
        return 0;
    }

    let ratio = (elapsed_ms as f64 / answer_window_ms as f64).clamp(0.0, 1.0);
    1000 - (ratio * 1000.0).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incorrect_answers_score_zero() {
        assert_eq!(score(false, 0, 10_000), 0);
        assert_eq!(score(false, 5_000, 10_000), 0);
        assert_eq!(score(false, 20_000, 10_000), 0);
    }

    #[test]
    fn instantaneous_correct_answer_scores_full_points() {
        assert_eq!(score(true, 0, 10_000), 1000);
    }

    #[test]
    fn score_decays_linearly() {
        // 25% of the window spent: 1000 - round(0.25 * 1000) = 750.
        assert_eq!(score(true, 2_500, 10_000), 750);
        assert_eq!(score(true, 5_000, 10_000), 500);
    }

    #[test]
    fn score_is_zero_at_and_beyond_the_window() {
        assert_eq!(score(true, 10_000, 10_000), 0);
        assert_eq!(score(true, 90_000, 10_000), 0);
    }

    #[test]
    fn score_is_monotonically_non_increasing_and_bounded() {
        let window = 10_000;
        let mut previous = i32::MAX;
        for elapsed in (0..=window).step_by(97) {
            let value = score(true, elapsed, window);
            assert!((0..=1000).contains(&value), "score {value} out of bounds");
            assert!(value <= previous, "score increased at {elapsed}ms");
            previous = value;
        }
    }

    #[test]
    fn degenerate_zero_window_never_awards_points() {
        assert_eq!(score(true, 0, 0), 0);
        assert_eq!(score(true, 1, 0), 0);
    }
}
