use std::sync::Arc;

use tokio::{
    sync::watch,
    time::{Instant, sleep},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::TimingConfig,
    dao::store::QuizStore,
    error::ServiceError,
    scoring,
    state::{
        game::{Answer, Choice, GameSession, NewAnswer, Participant, Question},
        participant::{ParticipantMachine, ParticipantPhase},
    },
};

/// Client-side driver for one participant's answer flow.
///
/// Owns a [`ParticipantMachine`] and talks to the shared store; it holds no
/// connection to the host. Reveal and question-change signals arrive as full
/// session snapshots (polled or pushed), timer expiries come from
/// [`ParticipantController::wait_for_choices`].
pub struct ParticipantController {
    store: Arc<dyn QuizStore>,
    timing: TimingConfig,
    participant: Participant,
    machine: ParticipantMachine,
    question: Option<Question>,
    window_opened_at: Option<Instant>,
}

impl ParticipantController {
    /// Build a controller for a joined participant.
    pub fn new(store: Arc<dyn QuizStore>, timing: TimingConfig, participant: Participant) -> Self {
        Self {
            store,
            timing,
            participant,
            machine: ParticipantMachine::new(),
            question: None,
            window_opened_at: None,
        }
    }

    /// The participant this controller submits for.
    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    /// Current answer-flow phase.
    pub fn phase(&self) -> ParticipantPhase {
        self.machine.phase()
    }

    /// Whether the observed session snapshot points at a different question
    /// than the one currently tracked.
    pub fn needs_question_change(&self, session: &GameSession) -> bool {
        match &self.question {
            Some(question) => question.order != session.current_question_index,
            None => true,
        }
    }

    /// Start the answer flow for a question, resetting local state when the
    /// question identity changed.
    pub fn begin_question(&mut self, question: Question) {
        if self.machine.question_id() == Some(question.id) {
            return;
        }
        self.machine.begin_question(question.id);
        self.question = Some(question);
        self.window_opened_at = None;
    }

    /// Sleep through the reveal delay, then make the choices selectable.
    pub async fn wait_for_choices(&mut self) {
        sleep(self.timing.reveal_delay).await;
        self.open_choices();
    }

    /// Reveal-delay expiry: open the answer window and start the clock.
    /// Guarded, so a stale timer after a reveal or question change is a no-op.
    pub fn open_choices(&mut self) {
        if self.machine.open_choices() {
            self.window_opened_at = Some(Instant::now());
        }
    }

    /// Submit a choice for the active question.
    ///
    /// Computes the score from the elapsed answer-window time and writes one
    /// answer row. On a store failure the controller stays in `Answerable`
    /// and returns the error so the participant can retry.
    pub async fn submit(&mut self, choice_id: Uuid) -> Result<Answer, ServiceError> {
        if !self.machine.can_submit() {
            return Err(ServiceError::InvalidState(
                "answer can only be submitted while the question is open".into(),
            ));
        }
        let question = self
            .question
            .as_ref()
            .ok_or_else(|| ServiceError::InvalidState("no active question".into()))?;
        let choice = question
            .choice(choice_id)
            .ok_or_else(|| ServiceError::NotFound(format!("choice `{choice_id}` not found")))?;
        let opened_at = self
            .window_opened_at
            .ok_or_else(|| ServiceError::InvalidState("answer window not open".into()))?;

        let elapsed_ms = opened_at.elapsed().as_millis() as u64;
        let score = scoring::score(choice.is_correct, elapsed_ms, self.timing.answer_window_ms());

        let insert = self
            .store
            .insert_answer(NewAnswer {
                participant_id: self.participant.id,
                question_id: question.id,
                choice_id,
                score,
            })
            .await;

        match insert {
            Ok(answer) => {
                self.machine.note_submitted(choice_id);
                info!(
                    participant_id = %self.participant.id,
                    question_id = %question.id,
                    score,
                    elapsed_ms,
                    "answer submitted"
                );
                Ok(answer)
            }
            Err(err) => {
                // Stay answerable: the participant may pick again and retry.
                warn!(
                    participant_id = %self.participant.id,
                    question_id = %question.id,
                    error = %err,
                    "answer submission failed"
                );
                Err(err.into())
            }
        }
    }

    /// Apply a full session snapshot (from polling or the session watch).
    ///
    /// Reveal forces the revealed phase regardless of the current one and is
    /// idempotent; a changed question index is reported through
    /// [`ParticipantController::needs_question_change`] and handled by the
    /// caller fetching the new question.
    pub fn observe_session(&mut self, session: &GameSession) {
        if session.answer_revealed && !self.needs_question_change(session) {
            self.machine.apply_reveal();
        }
    }

    /// Block until the session flags the active question as revealed, then
    /// apply the reveal.
    pub async fn await_reveal(
        &mut self,
        session_rx: &mut watch::Receiver<GameSession>,
    ) -> Result<(), ServiceError> {
        loop {
            {
                let session = session_rx.borrow_and_update().clone();
                self.observe_session(&session);
                if matches!(self.machine.phase(), ParticipantPhase::Revealed { .. }) {
                    return Ok(());
                }
            }
            session_rx.changed().await.map_err(|_| {
                ServiceError::InvalidState("session watch closed before reveal".into())
            })?;
        }
    }

    /// The participant's own pick, resolved against the active question for
    /// the reveal display. `None` when nothing was submitted.
    pub fn chosen_choice(&self) -> Option<&Choice> {
        let choice_id = match self.machine.phase() {
            ParticipantPhase::Submitted { choice_id } => Some(choice_id),
            ParticipantPhase::Revealed { choice_id } => choice_id,
            _ => None,
        }?;
        self.question.as_ref()?.choice(choice_id)
    }
}
