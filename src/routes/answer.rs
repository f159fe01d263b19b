use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::answer::{AnswerSummary, SubmitAnswerRequest},
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling participant answer submission.
pub fn router() -> Router<SharedState> {
    Router::new().route("/games/{id}/answers", post(submit_answer))
}

/// Record one participant answer for the active question.
#[utoipa::path(
    post,
    path = "/games/{id}/answers",
    tag = "answer",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = AnswerSummary),
        (status = 400, description = "No active question or answers closed"),
        (status = 404, description = "Unknown participant, question or choice"),
        (status = 409, description = "Participant already answered this question")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SubmitAnswerRequest>>,
) -> Result<Json<AnswerSummary>, AppError> {
    let summary = game_service::submit_answer(&state, id, payload).await?;
    Ok(Json(summary))
}
