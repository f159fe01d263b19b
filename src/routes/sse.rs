use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, Query, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    error::{AppError, ServiceError},
    services::sse_service,
    state::SharedState,
};

/// Query parameters of the answer event stream.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AnswerEventsQuery {
    /// Question whose answer inserts should be streamed.
    pub question_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/games/{id}/events",
    tag = "sse",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Full session snapshots, one per update", content_type = "text/event-stream", body = String),
        (status = 404, description = "Game not found")
    )
)]
/// Stream full-snapshot session updates to a connected screen.
pub async fn session_events(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let receiver = state
        .store()
        .watch_session(id)
        .await
        .map_err(ServiceError::from)?;
    info!(game_id = %id, "new session SSE connection");
    Ok(sse_service::session_event_stream(receiver))
}

#[utoipa::path(
    get,
    path = "/games/{id}/answers/events",
    tag = "sse",
    params(
        ("id" = Uuid, Path, description = "Identifier of the game"),
        AnswerEventsQuery
    ),
    responses(
        (status = 200, description = "One event per answer insert", content_type = "text/event-stream", body = String)
    )
)]
/// Stream answer-insert events for one question to the host screen.
pub async fn answer_events(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AnswerEventsQuery>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let feed = state.store().subscribe_answers(query.question_id);
    info!(game_id = %id, question_id = %query.question_id, "new answer SSE connection");
    sse_service::answer_event_stream(feed)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/games/{id}/events", get(session_events))
        .route("/games/{id}/answers/events", get(answer_events))
}
