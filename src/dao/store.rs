use futures::future::BoxFuture;
use tokio::sync::{broadcast, watch};
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::storage::StoreResult,
    state::game::{
        Answer, GameSession, NewAnswer, Participant, QuizSet, SessionUpdate, Standing,
    },
};

/// Subscription to answer-insert notifications for a single question.
///
/// Delivery is at-least-once while subscribed; no ordering is guaranteed
/// between events. Dropping the feed unconditionally releases the
/// subscription, so a controller tearing down (or moving to the next
/// question) never tallies stale inserts.
pub struct AnswerFeed {
    question_id: Uuid,
    receiver: broadcast::Receiver<Answer>,
}

impl AnswerFeed {
    /// Wrap a broadcast receiver already scoped to one question.
    pub fn new(question_id: Uuid, receiver: broadcast::Receiver<Answer>) -> Self {
        Self {
            question_id,
            receiver,
        }
    }

    /// Question this feed is filtered to.
    pub fn question_id(&self) -> Uuid {
        self.question_id
    }

    /// Wait for the next answer insert, or `None` once the feed closes.
    ///
    /// A lagged receiver skips the lost events and keeps the stream alive;
    /// the subscriber's own timeout path guarantees forward progress when
    /// notifications go missing.
    pub async fn next(&mut self) -> Option<Answer> {
        loop {
            match self.receiver.recv().await {
                Ok(answer) => return Some(answer),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        question_id = %self.question_id,
                        skipped,
                        "answer feed lagged; continuing"
                    );
                    continue;
                }
            }
        }
    }
}

/// Abstraction over the shared state store both controllers coordinate
/// through. Mirrors the store's native query/notify interface: row reads and
/// writes plus change subscriptions, nothing more.
pub trait QuizStore: Send + Sync {
    /// Persist an authored quiz set.
    fn create_quiz_set(&self, set: QuizSet) -> BoxFuture<'static, StoreResult<()>>;
    /// Fetch a quiz set with its questions ordered by `order` ascending.
    fn quiz_set(&self, id: Uuid) -> BoxFuture<'static, StoreResult<QuizSet>>;

    /// Create a lobby-phase session for a quiz set.
    fn create_session(
        &self,
        quiz_set_id: Uuid,
        join_code: String,
    ) -> BoxFuture<'static, StoreResult<GameSession>>;
    /// Fetch a session snapshot by id.
    fn session(&self, game_id: Uuid) -> BoxFuture<'static, StoreResult<GameSession>>;
    /// Fetch a session snapshot by its join code.
    fn find_session_by_code(&self, code: String)
    -> BoxFuture<'static, StoreResult<GameSession>>;

    /// Register a participant; only valid while the session is in the lobby.
    fn add_participant(
        &self,
        game_id: Uuid,
        nickname: String,
        user_ref: Option<Uuid>,
    ) -> BoxFuture<'static, StoreResult<Participant>>;
    /// List participants of a session in join order.
    fn participants(&self, game_id: Uuid) -> BoxFuture<'static, StoreResult<Vec<Participant>>>;

    /// Move a lobby session to its first question.
    fn start_session(&self, game_id: Uuid) -> BoxFuture<'static, StoreResult<GameSession>>;
    /// Apply a host-owned atomic update to the session record.
    fn update_session(
        &self,
        game_id: Uuid,
        update: SessionUpdate,
    ) -> BoxFuture<'static, StoreResult<GameSession>>;

    /// Insert an answer row, rejecting duplicates and dangling references.
    fn insert_answer(&self, answer: NewAnswer) -> BoxFuture<'static, StoreResult<Answer>>;
    /// All answers recorded for a question so far.
    fn answers_for_question(
        &self,
        question_id: Uuid,
    ) -> BoxFuture<'static, StoreResult<Vec<Answer>>>;
    /// Read-time score aggregation per participant, sorted descending.
    fn standings(&self, game_id: Uuid) -> BoxFuture<'static, StoreResult<Vec<Standing>>>;

    /// Subscribe to answer inserts for one question.
    fn subscribe_answers(&self, question_id: Uuid) -> AnswerFeed;
    /// Watch full-snapshot updates of a session record.
    fn watch_session(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StoreResult<watch::Receiver<GameSession>>>;
}
