use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::game::{
        CreateGameRequest, CreateQuizSetRequest, GameSummary, JoinGameRequest,
        ParticipantSummary, QuizSetSummary, StandingRow,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling quiz set authoring and the session lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/quiz-sets", post(create_quiz_set))
        .route("/games", post(create_game))
        .route("/games/code/{code}", get(find_game_by_code))
        .route("/games/{id}", get(game_snapshot))
        .route("/games/{id}/join", post(join_game))
        .route("/games/{id}/participants", get(list_participants))
        .route("/games/{id}/start", post(start_game))
        .route("/games/{id}/reveal", post(reveal_answer))
        .route("/games/{id}/advance", post(advance_game))
        .route("/games/{id}/results", get(game_results))
}

/// Author a new quiz set with its questions and choices.
#[utoipa::path(
    post,
    path = "/quiz-sets",
    tag = "game",
    request_body = CreateQuizSetRequest,
    responses(
        (status = 200, description = "Quiz set created", body = QuizSetSummary),
        (status = 400, description = "Invalid quiz set definition")
    )
)]
pub async fn create_quiz_set(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateQuizSetRequest>>,
) -> Result<Json<QuizSetSummary>, AppError> {
    let summary = game_service::create_quiz_set(&state, payload).await?;
    Ok(Json(summary))
}

/// Create a lobby-phase game session for an existing quiz set.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game created", body = GameSummary),
        (status = 404, description = "Quiz set not found")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::create_game(&state, payload).await?;
    Ok(Json(summary))
}

/// Resolve a lobby from its join code.
#[utoipa::path(
    get,
    path = "/games/code/{code}",
    tag = "game",
    params(("code" = String, Path, description = "Join code shown on the host screen")),
    responses(
        (status = 200, description = "Game found", body = GameSummary),
        (status = 404, description = "No game with this code")
    )
)]
pub async fn find_game_by_code(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::find_game_by_code(&state, code).await?;
    Ok(Json(summary))
}

/// Current full snapshot of a session record.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Current session snapshot", body = GameSummary),
        (status = 404, description = "Game not found")
    )
)]
pub async fn game_snapshot(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::session_snapshot(&state, id).await?;
    Ok(Json(summary))
}

/// Register a participant in a lobby.
#[utoipa::path(
    post,
    path = "/games/{id}/join",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = JoinGameRequest,
    responses(
        (status = 200, description = "Participant registered", body = ParticipantSummary),
        (status = 400, description = "Game already started or nickname invalid"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<JoinGameRequest>>,
) -> Result<Json<ParticipantSummary>, AppError> {
    let summary = game_service::join_game(&state, id, payload).await?;
    Ok(Json(summary))
}

/// List the participants of a session in join order.
#[utoipa::path(
    get,
    path = "/games/{id}/participants",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Participants in join order", body = [ParticipantSummary]),
        (status = 404, description = "Game not found")
    )
)]
pub async fn list_participants(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ParticipantSummary>>, AppError> {
    let participants = game_service::list_participants(&state, id).await?;
    Ok(Json(participants))
}

/// Host action: move the lobby onto its first question.
#[utoipa::path(
    post,
    path = "/games/{id}/start",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game started", body = GameSummary),
        (status = 400, description = "Game is not in the lobby phase"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::start_game(&state, id).await?;
    Ok(Json(summary))
}

/// Host action: publish the current question's answer.
#[utoipa::path(
    post,
    path = "/games/{id}/reveal",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Answer revealed", body = GameSummary),
        (status = 400, description = "No active question"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn reveal_answer(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::reveal_answer(&state, id).await?;
    Ok(Json(summary))
}

/// Host action: advance to the next question or finish the game.
#[utoipa::path(
    post,
    path = "/games/{id}/advance",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game advanced", body = GameSummary),
        (status = 400, description = "Current answer not yet revealed"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn advance_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::advance_game(&state, id).await?;
    Ok(Json(summary))
}

/// Result screen rows, best score first.
#[utoipa::path(
    get,
    path = "/games/{id}/results",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Standings sorted by total score", body = [StandingRow]),
        (status = 404, description = "Game not found")
    )
)]
pub async fn game_results(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StandingRow>>, AppError> {
    let standings = game_service::results(&state, id).await?;
    Ok(Json(standings))
}
