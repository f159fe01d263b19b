use time::OffsetDateTime;
use uuid::Uuid;

/// High-level phase stored on the shared game session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Participants are joining; no question is active yet.
    Lobby,
    /// A question is active (identified by `current_question_index`).
    Question,
    /// All questions played; final standings are displayed.
    Result,
}

/// The authoritative session record shared between the host and every
/// participant. The host is its single writer; everyone else observes it
/// through full-snapshot change notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    /// Primary key of the session.
    pub id: Uuid,
    /// Quiz set played in this session.
    pub quiz_set_id: Uuid,
    /// Short human-typable code participants use to find the lobby.
    pub join_code: String,
    /// Index of the active question. Only ever increases.
    pub current_question_index: u32,
    /// Whether the active question's answer has been revealed.
    pub answer_revealed: bool,
    /// Current phase of the session.
    pub phase: GamePhase,
}

impl GameSession {
    /// Build a fresh session in the lobby phase.
    pub fn new(quiz_set_id: Uuid, join_code: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            quiz_set_id,
            join_code,
            current_question_index: 0,
            answer_revealed: false,
            phase: GamePhase::Lobby,
        }
    }
}

/// Atomic updates the host applies to a session record. The store enforces
/// that the question index is monotonic and that the reveal flag is cleared
/// whenever the index changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Mark the active question's answer as revealed.
    Reveal,
    /// Move to the next question, clearing the reveal flag.
    Advance,
    /// Enter the result phase after the last question.
    Finish,
}

/// An ordered collection of questions, immutable once a game starts.
#[derive(Debug, Clone)]
pub struct QuizSet {
    /// Primary key of the quiz set.
    pub id: Uuid,
    /// Display name of the quiz set.
    pub name: String,
    /// Questions ordered by their `order` field (contiguous from 0).
    pub questions: Vec<Question>,
}

/// A single question with its ordered choices.
#[derive(Debug, Clone)]
pub struct Question {
    /// Primary key of the question.
    pub id: Uuid,
    /// 0-based position within the quiz set.
    pub order: u32,
    /// Question text shown to everyone.
    pub body: String,
    /// Optional illustration displayed with the question.
    pub image_url: Option<String>,
    /// Selectable choices in display order.
    pub choices: Vec<Choice>,
}

impl Question {
    /// Look up a choice of this question by id.
    pub fn choice(&self, choice_id: Uuid) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == choice_id)
    }

    /// The correct choice. Authoring validation guarantees exactly one.
    pub fn correct_choice(&self) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.is_correct)
    }
}

/// One selectable answer option.
#[derive(Debug, Clone)]
pub struct Choice {
    /// Primary key of the choice.
    pub id: Uuid,
    /// Choice text.
    pub body: String,
    /// Whether picking this choice scores points.
    pub is_correct: bool,
}

/// A player registered in a session. Created once at join time and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct Participant {
    /// Primary key of the participant.
    pub id: Uuid,
    /// Session the participant belongs to.
    pub game_id: Uuid,
    /// Display name shown on the host screen.
    pub nickname: String,
    /// Optional reference to an external user account.
    pub user_ref: Option<Uuid>,
}

/// A submitted answer row. Append-only; at most one per
/// `(participant_id, question_id)` pair.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Primary key of the answer.
    pub id: Uuid,
    /// Participant who submitted the answer.
    pub participant_id: Uuid,
    /// Question the answer belongs to.
    pub question_id: Uuid,
    /// Choice that was picked.
    pub choice_id: Uuid,
    /// Score computed at submission time.
    pub score: i32,
    /// Insertion timestamp.
    pub created_at: OffsetDateTime,
}

/// Payload for inserting a new answer row.
#[derive(Debug, Clone)]
pub struct NewAnswer {
    /// Participant submitting the answer.
    pub participant_id: Uuid,
    /// Question being answered.
    pub question_id: Uuid,
    /// Picked choice.
    pub choice_id: Uuid,
    /// Score computed by the submitting controller.
    pub score: i32,
}

/// One row of the derived game result view: a participant and their total
/// score. Computed at read time, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// Participant the total belongs to.
    pub participant_id: Uuid,
    /// Display name of the participant.
    pub nickname: String,
    /// Sum of all answer scores for this participant.
    pub total_score: i64,
}

/// Aggregate answer scores per participant, sorted by total descending.
///
/// Participants without any answer appear with a total of zero so the result
/// screen can still list them.
pub fn standings(participants: &[Participant], answers: &[Answer]) -> Vec<Standing> {
    let mut rows: Vec<Standing> = participants
        .iter()
        .map(|participant| Standing {
            participant_id: participant.id,
            nickname: participant.nickname.clone(),
            total_score: answers
                .iter()
                .filter(|answer| answer.participant_id == participant.id)
                .map(|answer| i64::from(answer.score))
                .sum(),
        })
        .collect();

    rows.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(nickname: &str) -> Participant {
        Participant {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            nickname: nickname.into(),
            user_ref: None,
        }
    }

    fn answer(participant_id: Uuid, score: i32) -> Answer {
        Answer {
            id: Uuid::new_v4(),
            participant_id,
            question_id: Uuid::new_v4(),
            choice_id: Uuid::new_v4(),
            score,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn standings_sum_scores_and_sort_descending() {
        let alice = participant("alice");
        let bob = participant("bob");
        let answers = vec![
            answer(alice.id, 400),
            answer(bob.id, 900),
            answer(alice.id, 700),
        ];

        let rows = standings(&[alice.clone(), bob.clone()], &answers);

        assert_eq!(rows[0].participant_id, alice.id);
        assert_eq!(rows[0].total_score, 1100);
        assert_eq!(rows[1].participant_id, bob.id);
        assert_eq!(rows[1].total_score, 900);
    }

    #[test]
    fn standings_include_silent_participants_with_zero() {
        let alice = participant("alice");
        let quiet = participant("quiet");
        let answers = vec![answer(alice.id, 500)];

        let rows = standings(&[alice, quiet.clone()], &answers);

        let quiet_row = rows
            .iter()
            .find(|row| row.participant_id == quiet.id)
            .unwrap();
        assert_eq!(quiet_row.total_score, 0);
    }

    #[test]
    fn new_session_starts_in_lobby() {
        let session = GameSession::new(Uuid::new_v4(), "K7Q2XZ".into());
        assert_eq!(session.phase, GamePhase::Lobby);
        assert_eq!(session.current_question_index, 0);
        assert!(!session.answer_revealed);
    }
}
