use uuid::Uuid;

/// Answer-flow phase for one participant on one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantPhase {
    /// Choices are not visible yet; the reveal-delay timer is running.
    Hidden,
    /// Choices are visible and the answer window is open.
    Answerable,
    /// An answer was written to the store; waiting for the host to reveal.
    Submitted {
        /// Choice the participant picked.
        choice_id: Uuid,
    },
    /// The correct answer has been revealed.
    Revealed {
        /// The participant's own pick, or `None` if they never submitted.
        choice_id: Option<Uuid>,
    },
}

/// State machine driving the answer flow of a single participant.
///
/// The machine is deliberately free of timers and I/O; the surrounding
/// controller feeds it timer expiries, store outcomes, and session snapshots.
/// Every transition is guarded so a stale event (a timer firing after the
/// phase already moved on) is a no-op.
#[derive(Debug)]
pub struct ParticipantMachine {
    question_id: Option<Uuid>,
    phase: ParticipantPhase,
}

impl Default for ParticipantMachine {
    fn default() -> Self {
        Self {
            question_id: None,
            phase: ParticipantPhase::Hidden,
        }
    }
}

impl ParticipantMachine {
    /// Create a machine with no active question.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> ParticipantPhase {
        self.phase
    }

    /// Identity of the question the machine is tracking, if any.
    pub fn question_id(&self) -> Option<Uuid> {
        self.question_id
    }

    /// Start tracking a question. A changed question identity resets the
    /// machine to `Hidden`; re-announcing the same question is a no-op.
    pub fn begin_question(&mut self, question_id: Uuid) {
        if self.question_id == Some(question_id) {
            return;
        }
        self.question_id = Some(question_id);
        self.phase = ParticipantPhase::Hidden;
    }

    /// Reveal-delay timer expired: make the choices selectable.
    ///
    /// Returns `true` when the transition happened so the caller knows to
    /// record the answer-window start. Guarded against stale timers.
    pub fn open_choices(&mut self) -> bool {
        match self.phase {
            ParticipantPhase::Hidden => {
                self.phase = ParticipantPhase::Answerable;
                true
            }
            _ => false,
        }
    }

    /// Whether a submission is currently allowed.
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, ParticipantPhase::Answerable)
    }

    /// An answer insert was acknowledged by the store.
    ///
    /// A failed insert never reaches this method, so the machine stays in
    /// `Answerable` and the participant may retry.
    pub fn note_submitted(&mut self, choice_id: Uuid) {
        if self.can_submit() {
            self.phase = ParticipantPhase::Submitted { choice_id };
        }
    }

    /// The session record flagged the answer as revealed.
    ///
    /// Forces `Revealed` from any phase, carrying over the participant's own
    /// pick when one was submitted. Idempotent once revealed.
    pub fn apply_reveal(&mut self) {
        self.phase = match self.phase {
            ParticipantPhase::Submitted { choice_id } => ParticipantPhase::Revealed {
                choice_id: Some(choice_id),
            },
            ParticipantPhase::Revealed { choice_id } => ParticipantPhase::Revealed { choice_id },
            ParticipantPhase::Hidden | ParticipantPhase::Answerable => {
                ParticipantPhase::Revealed { choice_id: None }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_change_resets_to_hidden() {
        let mut machine = ParticipantMachine::new();
        let first = Uuid::new_v4();
        machine.begin_question(first);
        assert!(machine.open_choices());
        machine.note_submitted(Uuid::new_v4());

        machine.begin_question(Uuid::new_v4());
        assert_eq!(machine.phase(), ParticipantPhase::Hidden);
    }

    #[test]
    fn re_announcing_the_same_question_keeps_state() {
        let mut machine = ParticipantMachine::new();
        let question = Uuid::new_v4();
        machine.begin_question(question);
        machine.open_choices();

        machine.begin_question(question);
        assert_eq!(machine.phase(), ParticipantPhase::Answerable);
    }

    #[test]
    fn stale_reveal_delay_timer_is_ignored() {
        let mut machine = ParticipantMachine::new();
        machine.begin_question(Uuid::new_v4());
        assert!(machine.open_choices());
        machine.note_submitted(Uuid::new_v4());

        // Timer fires again after the phase moved on.
        assert!(!machine.open_choices());
        assert!(matches!(machine.phase(), ParticipantPhase::Submitted { .. }));
    }

    #[test]
    fn submit_only_allowed_while_answerable() {
        let mut machine = ParticipantMachine::new();
        machine.begin_question(Uuid::new_v4());
        assert!(!machine.can_submit());

        machine.open_choices();
        assert!(machine.can_submit());

        machine.note_submitted(Uuid::new_v4());
        assert!(!machine.can_submit());
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut machine = ParticipantMachine::new();
        machine.begin_question(Uuid::new_v4());
        machine.open_choices();
        let choice = Uuid::new_v4();
        machine.note_submitted(choice);

        machine.apply_reveal();
        let once = machine.phase();
        machine.apply_reveal();
        assert_eq!(machine.phase(), once);
        assert_eq!(
            once,
            ParticipantPhase::Revealed {
                choice_id: Some(choice)
            }
        );
    }

    #[test]
    fn reveal_without_submission_shows_no_choice() {
        let mut machine = ParticipantMachine::new();
        machine.begin_question(Uuid::new_v4());
        machine.open_choices();

        machine.apply_reveal();
        assert_eq!(
            machine.phase(),
            ParticipantPhase::Revealed { choice_id: None }
        );
    }
}
