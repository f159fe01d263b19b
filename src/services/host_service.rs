use std::sync::Arc;

use tokio::time::{Instant, sleep, sleep_until};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::TimingConfig,
    dao::store::QuizStore,
    error::ServiceError,
    state::{
        game::{GamePhase, QuizSet, SessionUpdate},
        host::{self, HostMachine, Tally},
    },
};

/// Outcome of a host `advance` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The session moved on to the question at this index.
    NextQuestion(u32),
    /// The last question was played; the session entered the result phase.
    Finished,
}

/// Client-side driver for the host screen.
///
/// Runs one question at a time: subscribes to the answer change feed, tallies
/// inserts, and forces the reveal on count-complete or the answer-window
/// timeout, whichever fires first. All session writes go through the store;
/// local stage never advances when a write fails.
pub struct HostController {
    store: Arc<dyn QuizStore>,
    timing: TimingConfig,
    game_id: Uuid,
    quiz_set: QuizSet,
    machine: Option<HostMachine>,
}

impl HostController {
    /// Load the session and its quiz set, ready to run questions.
    pub async fn new(
        store: Arc<dyn QuizStore>,
        timing: TimingConfig,
        game_id: Uuid,
    ) -> Result<Self, ServiceError> {
        let session = store.session(game_id).await?;
        let quiz_set = store.quiz_set(session.quiz_set_id).await?;

        Ok(Self {
            store,
            timing,
            game_id,
            quiz_set,
            machine: None,
        })
    }

    /// Tally of the most recently run question, if any.
    pub fn tally(&self) -> Option<&Tally> {
        self.machine.as_ref().map(HostMachine::tally)
    }

    /// Drive the active question from entry to reveal.
    ///
    /// Waits out the reveal delay, then collects feed events until either
    /// every participant answered or the answer window expires. Both reveal
    /// paths funnel through the machine's guard, so the session write happens
    /// exactly once. A dead feed is not fatal: the deadline still fires.
    pub async fn run_question(&mut self) -> Result<&Tally, ServiceError> {
        let session = self.store.session(self.game_id).await?;
        if session.phase != GamePhase::Question {
            return Err(ServiceError::InvalidState(
                "no active question to collect answers for".into(),
            ));
        }

        let question = self
            .quiz_set
            .questions
            .get(session.current_question_index as usize)
            .cloned()
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "question index {} out of range",
                    session.current_question_index
                ))
            })?;

        // Freeze the roster for this question; the lobby is closed by now.
        let participant_count = self.store.participants(self.game_id).await?.len();

        // Subscribe before any participant can answer so no insert is missed.
        let mut feed = self.store.subscribe_answers(question.id);
        let mut machine = HostMachine::new(&question, participant_count);

        info!(
            game_id = %self.game_id,
            question_id = %question.id,
            index = session.current_question_index,
            participant_count,
            "question started"
        );

        sleep(self.timing.reveal_delay).await;
        machine.open_choices();
        let deadline = Instant::now() + self.timing.answer_window;

        // Catch up on rows inserted before this controller attached; the feed
        // may redeliver them, the machine dedups by answer id.
        let mut complete = false;
        for answer in self.store.answers_for_question(question.id).await? {
            complete |= machine.record_answer(&answer);
        }

        while !complete {
            tokio::select! {
                event = feed.next() => match event {
                    Some(answer) => {
                        if machine.record_answer(&answer) {
                            info!(
                                game_id = %self.game_id,
                                question_id = %question.id,
                                answers = machine.tally().total(),
                                "all participants answered"
                            );
                            break;
                        }
                    }
                    None => {
                        // Feed closed; the timeout path still guarantees the
                        // reveal happens.
                        warn!(
                            game_id = %self.game_id,
                            question_id = %question.id,
                            "answer feed closed before reveal"
                        );
                        sleep_until(deadline).await;
                        break;
                    }
                },
                _ = sleep_until(deadline) => {
                    info!(
                        game_id = %self.game_id,
                        question_id = %question.id,
                        answers = machine.tally().total(),
                        "answer window expired"
                    );
                    break;
                }
            }
        }

        self.reveal(&mut machine).await?;
        // The feed subscription is released when `feed` goes out of scope.
        let machine = self.machine.insert(machine);
        Ok(machine.tally())
    }

    /// Write the reveal to the session record, exactly once per question.
    ///
    /// The store write comes before the local guard flips: if it fails, the
    /// machine stays unrevealed so the caller can retry and local state keeps
    /// reflecting the store of record.
    async fn reveal(&self, machine: &mut HostMachine) -> Result<(), ServiceError> {
        if machine.is_revealed() {
            return Ok(());
        }

        self.store
            .update_session(self.game_id, SessionUpdate::Reveal)
            .await?;
        machine.try_reveal();
        info!(game_id = %self.game_id, question_id = %machine.question_id(), "answer revealed");
        Ok(())
    }

    /// Host "Next" action, valid once the current question is revealed.
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, ServiceError> {
        let revealed = self
            .machine
            .as_ref()
            .is_some_and(HostMachine::is_revealed);
        if !revealed {
            return Err(ServiceError::InvalidState(
                "advance requires the current answer to be revealed".into(),
            ));
        }

        let session = self.store.session(self.game_id).await?;
        let update = host::next_update(
            session.current_question_index,
            self.quiz_set.questions.len() as u32,
        );
        let session = self.store.update_session(self.game_id, update).await?;

        self.machine = None;
        match update {
            SessionUpdate::Finish => {
                info!(game_id = %self.game_id, "game finished");
                Ok(AdvanceOutcome::Finished)
            }
            _ => {
                info!(
                    game_id = %self.game_id,
                    index = session.current_question_index,
                    "advanced to next question"
                );
                Ok(AdvanceOutcome::NextQuestion(session.current_question_index))
            }
        }
    }
}
