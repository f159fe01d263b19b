use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Quiz Pulse Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::create_quiz_set,
        crate::routes::game::create_game,
        crate::routes::game::find_game_by_code,
        crate::routes::game::join_game,
        crate::routes::game::list_participants,
        crate::routes::game::start_game,
        crate::routes::game::advance_game,
        crate::routes::game::reveal_answer,
        crate::routes::game::game_snapshot,
        crate::routes::game::game_results,
        crate::routes::answer::submit_answer,
        crate::routes::sse::session_events,
        crate::routes::sse::answer_events,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateQuizSetRequest,
            crate::dto::game::QuestionInput,
            crate::dto::game::ChoiceInput,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::JoinGameRequest,
            crate::dto::game::QuizSetSummary,
            crate::dto::game::QuestionSummary,
            crate::dto::game::ChoiceSummary,
            crate::dto::game::GameSummary,
            crate::dto::game::ParticipantSummary,
            crate::dto::game::StandingRow,
            crate::dto::answer::SubmitAnswerRequest,
            crate::dto::answer::AnswerSummary,
            crate::dto::phase::VisibleGamePhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Quiz set authoring and session lifecycle"),
        (name = "answer", description = "Answer submission"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
