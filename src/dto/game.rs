use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{phase::VisibleGamePhase, validation::validate_nickname},
    state::game::{GameSession, Participant, Question, QuizSet, Standing},
};

/// Payload used to author a brand-new quiz set.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateQuizSetRequest {
    /// Display name of the quiz set.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Questions in play order.
    #[validate(nested)]
    pub questions: Vec<QuestionInput>,
}

/// Incoming question definition.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct QuestionInput {
    /// Question text.
    #[validate(length(min = 1))]
    pub body: String,
    /// Optional illustration URL.
    #[serde(default)]
    #[validate(url)]
    pub image_url: Option<String>,
    /// Selectable choices in display order; exactly one must be correct.
    pub choices: Vec<ChoiceInput>,
}

/// Incoming choice definition.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChoiceInput {
    /// Choice text.
    pub body: String,
    /// Whether this choice is the correct one.
    #[serde(default)]
    pub is_correct: bool,
}

/// Payload used to create a game session for an existing quiz set.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    /// Quiz set to play.
    pub quiz_set_id: Uuid,
}

/// Payload used by a participant to join a lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinGameRequest {
    /// Display name shown on the host screen.
    #[validate(custom(function = validate_nickname))]
    pub nickname: String,
    /// Optional reference to an external user account.
    #[serde(default)]
    pub user_ref: Option<Uuid>,
}

/// Summary returned once a quiz set has been authored.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizSetSummary {
    /// Identifier of the quiz set.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Questions in play order.
    pub questions: Vec<QuestionSummary>,
}

/// Public projection of a question.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionSummary {
    /// Identifier of the question.
    pub id: Uuid,
    /// 0-based position within the quiz set.
    pub order: u32,
    /// Question text.
    pub body: String,
    /// Optional illustration URL.
    pub image_url: Option<String>,
    /// Choices in display order.
    pub choices: Vec<ChoiceSummary>,
}

/// Public projection of a choice. Carries the correctness flag because both
/// screens need it once the answer is revealed.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChoiceSummary {
    /// Identifier of the choice.
    pub id: Uuid,
    /// Choice text.
    pub body: String,
    /// Whether this choice is the correct one.
    pub is_correct: bool,
}

/// Full-snapshot projection of a session record, used by REST and SSE alike.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSummary {
    /// Identifier of the session.
    pub id: Uuid,
    /// Quiz set played in this session.
    pub quiz_set_id: Uuid,
    /// Join code for the lobby.
    pub join_code: String,
    /// Index of the active question.
    pub current_question_index: u32,
    /// Whether the active question's answer is revealed.
    pub answer_revealed: bool,
    /// Current phase.
    pub phase: VisibleGamePhase,
}

/// Public projection of a participant.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantSummary {
    /// Identifier of the participant.
    pub id: Uuid,
    /// Session the participant belongs to.
    pub game_id: Uuid,
    /// Display name.
    pub nickname: String,
    /// Optional external user reference.
    pub user_ref: Option<Uuid>,
}

/// One row of the result screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct StandingRow {
    /// Identifier of the participant.
    pub participant_id: Uuid,
    /// Display name.
    pub nickname: String,
    /// Sum of all answer scores.
    pub total_score: i64,
}

impl From<QuizSet> for QuizSetSummary {
    fn from(value: QuizSet) -> Self {
        Self {
            id: value.id,
            name: value.name,
            questions: value.questions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Question> for QuestionSummary {
    fn from(value: Question) -> Self {
        Self {
            id: value.id,
            order: value.order,
            body: value.body,
            image_url: value.image_url,
            choices: value
                .choices
                .into_iter()
                .map(|choice| ChoiceSummary {
                    id: choice.id,
                    body: choice.body,
                    is_correct: choice.is_correct,
                })
                .collect(),
        }
    }
}

impl From<GameSession> for GameSummary {
    fn from(value: GameSession) -> Self {
        Self {
            id: value.id,
            quiz_set_id: value.quiz_set_id,
            join_code: value.join_code,
            current_question_index: value.current_question_index,
            answer_revealed: value.answer_revealed,
            phase: (&value.phase).into(),
        }
    }
}

impl From<Participant> for ParticipantSummary {
    fn from(value: Participant) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            nickname: value.nickname,
            user_ref: value.user_ref,
        }
    }
}

impl From<Standing> for StandingRow {
    fn from(value: Standing) -> Self {
        Self {
            participant_id: value.participant_id,
            nickname: value.nickname,
            total_score: value.total_score,
        }
    }
}
