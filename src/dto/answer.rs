use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dto::format_timestamp, state::game::Answer};

/// Payload used by a participant device to insert one answer row.
///
/// The score is computed client-side from the shared scoring function; the
/// store only enforces uniqueness and referential integrity, exactly like
/// the original backing store did.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitAnswerRequest {
    /// Participant submitting the answer.
    pub participant_id: Uuid,
    /// Question being answered.
    pub question_id: Uuid,
    /// Picked choice.
    pub choice_id: Uuid,
    /// Score computed at submission time.
    #[validate(range(min = 0, max = 1000))]
    pub score: i32,
}

/// Public projection of a stored answer row.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerSummary {
    /// Identifier of the answer row.
    pub id: Uuid,
    /// Participant who submitted.
    pub participant_id: Uuid,
    /// Question the answer belongs to.
    pub question_id: Uuid,
    /// Picked choice.
    pub choice_id: Uuid,
    /// Score recorded at submission time.
    pub score: i32,
    /// RFC 3339 insertion timestamp.
    pub created_at: String,
}

impl From<Answer> for AnswerSummary {
    fn from(value: Answer) -> Self {
        Self {
            id: value.id,
            participant_id: value.participant_id,
            question_id: value.question_id,
            choice_id: value.choice_id,
            score: value.score,
            created_at: format_timestamp(value.created_at),
        }
    }
}
