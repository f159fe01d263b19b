use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use dashmap::DashMap;
use futures::future::BoxFuture;
use time::OffsetDateTime;
use tokio::sync::{RwLock, broadcast, watch};
use uuid::Uuid;

use crate::{
    dao::{
        storage::{StorageError, StoreResult},
        store::{AnswerFeed, QuizStore},
    },
    state::game::{
        self, Answer, GamePhase, GameSession, NewAnswer, Participant, Question, QuizSet,
        SessionUpdate, Standing,
    },
};

/// Broadcast capacity per question hub. Answer bursts are bounded by the
/// participant count, which stays far below this.
const ANSWER_HUB_CAPACITY: usize = 64;

#[derive(Default)]
struct Tables {
    quiz_sets: HashMap<Uuid, QuizSet>,
    /// Question index across all quiz sets, for foreign-key checks.
    questions: HashMap<Uuid, Question>,
    sessions: HashMap<Uuid, GameSession>,
    /// Participants per session, in join order.
    participants: HashMap<Uuid, Vec<Participant>>,
    answers: Vec<Answer>,
    /// Uniqueness index over `(participant_id, question_id)`.
    answered: HashSet<(Uuid, Uuid)>,
}

struct Inner {
    tables: RwLock<Tables>,
    answer_hubs: DashMap<Uuid, broadcast::Sender<Answer>>,
    session_watches: DashMap<Uuid, watch::Sender<GameSession>>,
}

/// In-memory reference implementation of [`QuizStore`].
///
/// Backs the HTTP surface and the integration tests: plain locked tables, a
/// per-question broadcast hub for the answer change feed, and a per-session
/// watch channel for full-snapshot session notifications.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: RwLock::new(Tables::default()),
                answer_hubs: DashMap::new(),
                session_watches: DashMap::new(),
            }),
        }
    }
}

impl Inner {
    /// Push a fresh session snapshot to watchers, if any are registered.
    fn notify_session(&self, session: &GameSession) {
        if let Some(sender) = self.session_watches.get(&session.id) {
            sender.send_replace(session.clone());
        }
    }

    /// Publish an answer insert on the question's hub, if anyone subscribed.
    fn publish_answer(&self, answer: &Answer) {
        if let Some(hub) = self.answer_hubs.get(&answer.question_id) {
            let _ = hub.send(answer.clone());
        }
    }
}

impl QuizStore for MemoryStore {
    fn create_quiz_set(&self, set: QuizSet) -> BoxFuture<'static, StoreResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.tables.write().await;
            for question in &set.questions {
                tables.questions.insert(question.id, question.clone());
            }
            tables.quiz_sets.insert(set.id, set);
            Ok(())
        })
    }

    fn quiz_set(&self, id: Uuid) -> BoxFuture<'static, StoreResult<QuizSet>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.tables.read().await;
            tables
                .quiz_sets
                .get(&id)
                .cloned()
                .ok_or_else(|| StorageError::not_found("quiz set", id))
        })
    }

    fn create_session(
        &self,
        quiz_set_id: Uuid,
        join_code: String,
    ) -> BoxFuture<'static, StoreResult<GameSession>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.tables.write().await;
            if !tables.quiz_sets.contains_key(&quiz_set_id) {
                return Err(StorageError::not_found("quiz set", quiz_set_id));
            }

            let session = GameSession::new(quiz_set_id, join_code);
            tables.sessions.insert(session.id, session.clone());
            tables.participants.insert(session.id, Vec::new());
            Ok(session)
        })
    }

    fn session(&self, game_id: Uuid) -> BoxFuture<'static, StoreResult<GameSession>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.tables.read().await;
            tables
                .sessions
                .get(&game_id)
                .cloned()
                .ok_or_else(|| StorageError::not_found("game", game_id))
        })
    }

    fn find_session_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StoreResult<GameSession>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.tables.read().await;
            tables
                .sessions
                .values()
                .find(|session| session.join_code.eq_ignore_ascii_case(&code))
                .cloned()
                .ok_or_else(|| StorageError::not_found("game", code))
        })
    }

    fn add_participant(
        &self,
        game_id: Uuid,
        nickname: String,
        user_ref: Option<Uuid>,
    ) -> BoxFuture<'static, StoreResult<Participant>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.tables.write().await;
            let session = tables
                .sessions
                .get(&game_id)
                .ok_or_else(|| StorageError::not_found("game", game_id))?;
            if session.phase != GamePhase::Lobby {
                return Err(StorageError::invalid_transition(
                    "participants can only join during the lobby",
                ));
            }

            let participant = Participant {
                id: Uuid::new_v4(),
                game_id,
                nickname,
                user_ref,
            };
            tables
                .participants
                .entry(game_id)
                .or_default()
                .push(participant.clone());
            Ok(participant)
        })
    }

    fn participants(&self, game_id: Uuid) -> BoxFuture<'static, StoreResult<Vec<Participant>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.tables.read().await;
            tables
                .participants
                .get(&game_id)
                .cloned()
                .ok_or_else(|| StorageError::not_found("game", game_id))
        })
    }

    fn start_session(&self, game_id: Uuid) -> BoxFuture<'static, StoreResult<GameSession>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.tables.write().await;
            let session = tables
                .sessions
                .get_mut(&game_id)
                .ok_or_else(|| StorageError::not_found("game", game_id))?;
            if session.phase != GamePhase::Lobby {
                return Err(StorageError::invalid_transition(
                    "only a lobby session can be started",
                ));
            }

            session.phase = GamePhase::Question;
            session.current_question_index = 0;
            session.answer_revealed = false;
            let snapshot = session.clone();
            drop(tables);

            inner.notify_session(&snapshot);
            Ok(snapshot)
        })
    }

    fn update_session(
        &self,
        game_id: Uuid,
        update: SessionUpdate,
    ) -> BoxFuture<'static, StoreResult<GameSession>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.tables.write().await;
            let question_count = {
                let session = tables
                    .sessions
                    .get(&game_id)
                    .ok_or_else(|| StorageError::not_found("game", game_id))?;
                tables
                    .quiz_sets
                    .get(&session.quiz_set_id)
                    .map(|set| set.questions.len() as u32)
                    .ok_or_else(|| StorageError::not_found("quiz set", session.quiz_set_id))?
            };

            let session = tables
                .sessions
                .get_mut(&game_id)
                .ok_or_else(|| StorageError::not_found("game", game_id))?;
            if session.phase != GamePhase::Question {
                return Err(StorageError::invalid_transition(
                    "session updates require an active question",
                ));
            }

            match update {
                SessionUpdate::Reveal => {
                    // Monotonic: once set it stays set until the next advance.
                    session.answer_revealed = true;
                }
                SessionUpdate::Advance => {
                    if session.current_question_index + 1 >= question_count {
                        return Err(StorageError::invalid_transition(
                            "no further question to advance to",
                        ));
                    }
                    session.current_question_index += 1;
                    session.answer_revealed = false;
                }
                SessionUpdate::Finish => {
                    session.phase = GamePhase::Result;
                }
            }

            let snapshot = session.clone();
            drop(tables);

            inner.notify_session(&snapshot);
            Ok(snapshot)
        })
    }

    fn insert_answer(&self, answer: NewAnswer) -> BoxFuture<'static, StoreResult<Answer>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.tables.write().await;

            let question = tables
                .questions
                .get(&answer.question_id)
                .ok_or_else(|| StorageError::not_found("question", answer.question_id))?;
            if question.choice(answer.choice_id).is_none() {
                return Err(StorageError::not_found("choice", answer.choice_id));
            }
            let known_participant = tables
                .participants
                .values()
                .flatten()
                .any(|participant| participant.id == answer.participant_id);
            if !known_participant {
                return Err(StorageError::not_found(
                    "participant",
                    answer.participant_id,
                ));
            }

            let key = (answer.participant_id, answer.question_id);
            if !tables.answered.insert(key) {
                return Err(StorageError::DuplicateAnswer {
                    participant_id: answer.participant_id,
                    question_id: answer.question_id,
                });
            }

            let row = Answer {
                id: Uuid::new_v4(),
                participant_id: answer.participant_id,
                question_id: answer.question_id,
                choice_id: answer.choice_id,
                score: answer.score,
                created_at: OffsetDateTime::now_utc(),
            };
            tables.answers.push(row.clone());
            drop(tables);

            inner.publish_answer(&row);
            Ok(row)
        })
    }

    fn answers_for_question(
        &self,
        question_id: Uuid,
    ) -> BoxFuture<'static, StoreResult<Vec<Answer>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.tables.read().await;
            Ok(tables
                .answers
                .iter()
                .filter(|answer| answer.question_id == question_id)
                .cloned()
                .collect())
        })
    }

    fn standings(&self, game_id: Uuid) -> BoxFuture<'static, StoreResult<Vec<Standing>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.tables.read().await;
            let participants = tables
                .participants
                .get(&game_id)
                .ok_or_else(|| StorageError::not_found("game", game_id))?;
            Ok(game::standings(participants, &tables.answers))
        })
    }

    fn subscribe_answers(&self, question_id: Uuid) -> AnswerFeed {
        let hub = self
            .inner
            .answer_hubs
            .entry(question_id)
            .or_insert_with(|| broadcast::channel(ANSWER_HUB_CAPACITY).0);
        AnswerFeed::new(question_id, hub.subscribe())
    }

    fn watch_session(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StoreResult<watch::Receiver<GameSession>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.tables.read().await;
            let snapshot = tables
                .sessions
                .get(&game_id)
                .cloned()
                .ok_or_else(|| StorageError::not_found("game", game_id))?;

            // Register while still holding the tables lock: a session write
            // committing between the snapshot read and the registration would
            // otherwise never reach this watcher.
            let receiver = inner
                .session_watches
                .entry(game_id)
                .or_insert_with(|| watch::channel(snapshot).0)
                .subscribe();
            drop(tables);
            Ok(receiver)
        })
    }
}
