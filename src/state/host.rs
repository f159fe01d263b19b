use std::collections::HashSet;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::state::game::{Answer, Question, SessionUpdate};

/// Sub-state of the host screen while collecting answers for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectStage {
    /// Choices are still hidden; the reveal-delay timer is running.
    CollectingHidden,
    /// Choices are visible; answers are being tallied against the window.
    CollectingOpen,
    /// The answer has been revealed; further triggers are no-ops.
    Revealed,
}

/// Running per-choice count of submitted answers for the active question.
///
/// The host controller is its sole reader and writer. Counting is
/// commutative, so the feed's lack of ordering guarantees is harmless.
#[derive(Debug, Clone)]
pub struct Tally {
    counts: IndexMap<Uuid, u32>,
    total: u32,
}

impl Tally {
    /// Empty tally with one zeroed bucket per choice, in display order.
    pub fn for_question(question: &Question) -> Self {
        Self {
            counts: question
                .choices
                .iter()
                .map(|choice| (choice.id, 0))
                .collect(),
            total: 0,
        }
    }

    /// Record one submitted answer.
    pub fn record(&mut self, choice_id: Uuid) {
        *self.counts.entry(choice_id).or_insert(0) += 1;
        self.total += 1;
    }

    /// Total number of answers recorded.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Number of answers for a single choice.
    pub fn count(&self, choice_id: Uuid) -> u32 {
        self.counts.get(&choice_id).copied().unwrap_or(0)
    }

    /// Bar-chart ratio for a choice: `count / max(total, 1)`.
    ///
    /// The divisor is clamped so an empty tally yields 0.0 instead of NaN.
    pub fn ratio(&self, choice_id: Uuid) -> f64 {
        f64::from(self.count(choice_id)) / f64::from(self.total.max(1))
    }

    /// Per-choice counts in display order.
    pub fn counts(&self) -> impl Iterator<Item = (Uuid, u32)> + '_ {
        self.counts.iter().map(|(id, count)| (*id, *count))
    }
}

/// State machine for the host side of a single question.
///
/// Owns the tally and the reveal guard. Timer expiries and feed events are
/// delivered by the surrounding controller; both reveal triggers
/// (count-complete and window timeout) funnel through [`HostMachine::try_reveal`]
/// so the reveal fires exactly once no matter how they interleave.
#[derive(Debug)]
pub struct HostMachine {
    question_id: Uuid,
    participant_count: usize,
    stage: CollectStage,
    tally: Tally,
    seen: HashSet<Uuid>,
}

impl HostMachine {
    /// Start collecting for a question with a frozen participant count.
    pub fn new(question: &Question, participant_count: usize) -> Self {
        Self {
            question_id: question.id,
            participant_count,
            stage: CollectStage::CollectingHidden,
            tally: Tally::for_question(question),
            seen: HashSet::new(),
        }
    }

    /// Question this machine is collecting for.
    pub fn question_id(&self) -> Uuid {
        self.question_id
    }

    /// Current collect stage.
    pub fn stage(&self) -> CollectStage {
        self.stage
    }

    /// The running tally.
    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Whether the reveal has already fired.
    pub fn is_revealed(&self) -> bool {
        self.stage == CollectStage::Revealed
    }

    /// Reveal-delay timer expired: choices are now visible to participants.
    /// Guarded against stale timers.
    pub fn open_choices(&mut self) -> bool {
        match self.stage {
            CollectStage::CollectingHidden => {
                self.stage = CollectStage::CollectingOpen;
                true
            }
            _ => false,
        }
    }

    /// Record an answer-insert notification from the change feed.
    ///
    /// Returns `true` when every participant has now answered and the reveal
    /// should fire. Events for other questions or arriving after the reveal
    /// are ignored; the feed is at-least-once, so redelivered rows are
    /// deduplicated by answer id.
    pub fn record_answer(&mut self, answer: &Answer) -> bool {
        if answer.question_id != self.question_id || self.is_revealed() {
            return false;
        }
        if !self.seen.insert(answer.id) {
            return false;
        }

        self.tally.record(answer.choice_id);
        self.tally.total() as usize >= self.participant_count
    }

    /// Check-and-set the reveal guard.
    ///
    /// Returns `true` only for the first caller; both the count-complete and
    /// the timeout path go through here, making the reveal exactly-once.
    pub fn try_reveal(&mut self) -> bool {
        if self.is_revealed() {
            return false;
        }
        self.stage = CollectStage::Revealed;
        true
    }
}

/// Decide the session update for a host `advance` action.
///
/// On the last question the session moves to the result phase; otherwise the
/// index advances (the store clears the reveal flag as part of the same
/// atomic update).
pub fn next_update(current_question_index: u32, question_count: u32) -> SessionUpdate {
    if current_question_index + 1 >= question_count {
        SessionUpdate::Finish
    } else {
        SessionUpdate::Advance
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::state::game::Choice;

    fn question_with_choices(count: usize) -> Question {
        Question {
            id: Uuid::new_v4(),
            order: 0,
            body: "capital of France?".into(),
            image_url: None,
            choices: (0..count)
                .map(|index| Choice {
                    id: Uuid::new_v4(),
                    body: format!("choice {index}"),
                    is_correct: index == 0,
                })
                .collect(),
        }
    }

    fn answer_for(question: &Question, choice_index: usize) -> Answer {
        Answer {
            id: Uuid::new_v4(),
            participant_id: Uuid::new_v4(),
            question_id: question.id,
            choice_id: question.choices[choice_index].id,
            score: 500,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn empty_tally_has_zero_ratios() {
        let question = question_with_choices(4);
        let tally = Tally::for_question(&question);
        for choice in &question.choices {
            assert_eq!(tally.ratio(choice.id), 0.0);
        }
    }

    #[test]
    fn ratios_reflect_counts() {
        let question = question_with_choices(2);
        let mut tally = Tally::for_question(&question);
        tally.record(question.choices[0].id);
        tally.record(question.choices[0].id);
        tally.record(question.choices[1].id);

        assert_eq!(tally.total(), 3);
        assert!((tally.ratio(question.choices[0].id) - 2.0 / 3.0).abs() < 1e-9);
        assert!((tally.ratio(question.choices[1].id) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn count_complete_signals_reveal() {
        let question = question_with_choices(4);
        let mut machine = HostMachine::new(&question, 2);
        machine.open_choices();

        assert!(!machine.record_answer(&answer_for(&question, 0)));
        assert!(machine.record_answer(&answer_for(&question, 1)));
    }

    #[test]
    fn reveal_fires_exactly_once() {
        let question = question_with_choices(4);
        let mut machine = HostMachine::new(&question, 1);
        machine.open_choices();

        // Count-complete and timeout racing in the same turn: only the first
        // trigger wins.
        assert!(machine.record_answer(&answer_for(&question, 0)));
        assert!(machine.try_reveal());
        assert!(!machine.try_reveal());
        assert!(machine.is_revealed());
    }

    #[test]
    fn answers_after_reveal_are_ignored() {
        let question = question_with_choices(4);
        let mut machine = HostMachine::new(&question, 3);
        machine.open_choices();
        machine.record_answer(&answer_for(&question, 0));
        machine.try_reveal();

        assert!(!machine.record_answer(&answer_for(&question, 1)));
        assert_eq!(machine.tally().total(), 1);
    }

    #[test]
    fn redelivered_answers_are_counted_once() {
        let question = question_with_choices(4);
        let mut machine = HostMachine::new(&question, 3);
        machine.open_choices();

        let answer = answer_for(&question, 0);
        assert!(!machine.record_answer(&answer));
        assert!(!machine.record_answer(&answer));
        assert_eq!(machine.tally().total(), 1);
    }

    #[test]
    fn answers_for_other_questions_are_ignored() {
        let question = question_with_choices(4);
        let other = question_with_choices(4);
        let mut machine = HostMachine::new(&question, 3);
        machine.open_choices();

        assert!(!machine.record_answer(&answer_for(&other, 0)));
        assert_eq!(machine.tally().total(), 0);
    }

    #[test]
    fn stale_reveal_delay_timer_is_ignored() {
        let question = question_with_choices(4);
        let mut machine = HostMachine::new(&question, 1);
        assert!(machine.open_choices());
        assert!(!machine.open_choices());
    }

    #[test]
    fn advance_decision_matches_question_count() {
        assert_eq!(next_update(0, 3), SessionUpdate::Advance);
        assert_eq!(next_update(1, 3), SessionUpdate::Advance);
        assert_eq!(next_update(2, 3), SessionUpdate::Finish);
        assert_eq!(next_update(0, 1), SessionUpdate::Finish);
    }
}
