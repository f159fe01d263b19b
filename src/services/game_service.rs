use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::storage::StorageError,
    dto::{
        answer::{AnswerSummary, SubmitAnswerRequest},
        game::{
            CreateGameRequest, CreateQuizSetRequest, GameSummary, JoinGameRequest,
            ParticipantSummary, QuestionInput, QuizSetSummary, StandingRow,
        },
    },
    error::ServiceError,
    state::{
        SharedState,
        game::{Choice, GamePhase, NewAnswer, Question, QuizSet, SessionUpdate},
        host,
    },
};

/// Characters used for join codes; ambiguous glyphs (0/O, 1/I) are excluded.
const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Length of a generated join code.
const JOIN_CODE_LENGTH: usize = 6;
/// Attempts before giving up on finding an unused join code.
const JOIN_CODE_ATTEMPTS: usize = 8;

/// Bounds on the number of choices per question.
const MIN_CHOICES: usize = 2;
const MAX_CHOICES: usize = 6;

/// Validate and persist an authored quiz set.
pub async fn create_quiz_set(
    state: &SharedState,
    request: CreateQuizSetRequest,
) -> Result<QuizSetSummary, ServiceError> {
    let set = build_quiz_set(request)?;
    state.store().create_quiz_set(set.clone()).await?;

    info!(quiz_set_id = %set.id, questions = set.questions.len(), "quiz set created");
    Ok(set.into())
}

/// Create a lobby-phase game session for an existing quiz set.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameSummary, ServiceError> {
    let store = state.store();
    // Make sure the quiz set exists before allocating a code.
    store.quiz_set(request.quiz_set_id).await?;

    for _ in 0..JOIN_CODE_ATTEMPTS {
        let code = generate_join_code();
        match store.find_session_by_code(code.clone()).await {
            Ok(_) => continue,
            Err(StorageError::NotFound { .. }) => {
                let session = store.create_session(request.quiz_set_id, code).await?;
                info!(game_id = %session.id, join_code = %session.join_code, "game created");
                return Ok(session.into());
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(ServiceError::InvalidState(
        "could not allocate an unused join code".into(),
    ))
}

/// Find a lobby by its join code.
pub async fn find_game_by_code(
    state: &SharedState,
    code: String,
) -> Result<GameSummary, ServiceError> {
    let session = state.store().find_session_by_code(code).await?;
    Ok(session.into())
}

/// Register a participant in a lobby.
pub async fn join_game(
    state: &SharedState,
    game_id: Uuid,
    request: JoinGameRequest,
) -> Result<ParticipantSummary, ServiceError> {
    let nickname = request.nickname.trim().to_string();
    if nickname.is_empty() {
        return Err(ServiceError::InvalidInput(
            "nickname must not be blank".into(),
        ));
    }

    let participant = state
        .store()
        .add_participant(game_id, nickname, request.user_ref)
        .await?;
    info!(game_id = %game_id, participant_id = %participant.id, "participant joined");
    Ok(participant.into())
}

/// List the participants of a session in join order.
pub async fn list_participants(
    state: &SharedState,
    game_id: Uuid,
) -> Result<Vec<ParticipantSummary>, ServiceError> {
    let participants = state.store().participants(game_id).await?;
    Ok(participants.into_iter().map(Into::into).collect())
}

/// Start a lobby session on its first question.
pub async fn start_game(state: &SharedState, game_id: Uuid) -> Result<GameSummary, ServiceError> {
    let session = state.store().start_session(game_id).await?;
    info!(game_id = %game_id, "game started");
    Ok(session.into())
}

/// Host "Next" action: advance to the next question or finish the game.
///
/// Gated on the current question being revealed, and delegated to the store
/// as a single atomic update so local state never runs ahead of the record.
pub async fn advance_game(state: &SharedState, game_id: Uuid) -> Result<GameSummary, ServiceError> {
    let store = state.store();
    let session = store.session(game_id).await?;
    if session.phase != GamePhase::Question {
        return Err(ServiceError::InvalidState(
            "advance requires an active question".into(),
        ));
    }
    if !session.answer_revealed {
        return Err(ServiceError::InvalidState(
            "advance requires the current answer to be revealed".into(),
        ));
    }

    let set = store.quiz_set(session.quiz_set_id).await?;
    let update = host::next_update(session.current_question_index, set.questions.len() as u32);
    let session = store.update_session(game_id, update).await?;
    info!(game_id = %game_id, phase = ?session.phase, index = session.current_question_index, "game advanced");
    Ok(session.into())
}

/// Host "Reveal" action: publish the current question's answer.
///
/// Revealing is idempotent at the store level, so a retried request after a
/// timeout is harmless.
pub async fn reveal_answer(
    state: &SharedState,
    game_id: Uuid,
) -> Result<GameSummary, ServiceError> {
    let store = state.store();
    let session = store.session(game_id).await?;
    if session.phase != GamePhase::Question {
        return Err(ServiceError::InvalidState(
            "reveal requires an active question".into(),
        ));
    }

    let session = store.update_session(game_id, SessionUpdate::Reveal).await?;
    info!(game_id = %game_id, index = session.current_question_index, "answer revealed");
    Ok(session.into())
}

/// Record one participant answer for the active question.
///
/// The score is validated against range bounds at the DTO layer and against
/// referential integrity by the store; duplicates keep the first row.
pub async fn submit_answer(
    state: &SharedState,
    game_id: Uuid,
    request: SubmitAnswerRequest,
) -> Result<AnswerSummary, ServiceError> {
    let store = state.store();
    let session = store.session(game_id).await?;
    if session.phase != GamePhase::Question {
        return Err(ServiceError::InvalidState(
            "answers are only accepted while a question is active".into(),
        ));
    }
    if session.answer_revealed {
        return Err(ServiceError::InvalidState(
            "answers are closed once the answer is revealed".into(),
        ));
    }

    let answer = store
        .insert_answer(NewAnswer {
            participant_id: request.participant_id,
            question_id: request.question_id,
            choice_id: request.choice_id,
            score: request.score,
        })
        .await?;
    info!(
        game_id = %game_id,
        participant_id = %answer.participant_id,
        question_id = %answer.question_id,
        "answer recorded"
    );
    Ok(answer.into())
}

/// Current session snapshot.
pub async fn session_snapshot(
    state: &SharedState,
    game_id: Uuid,
) -> Result<GameSummary, ServiceError> {
    let session = state.store().session(game_id).await?;
    Ok(session.into())
}

/// Read-time score aggregation for the result screen.
pub async fn results(
    state: &SharedState,
    game_id: Uuid,
) -> Result<Vec<StandingRow>, ServiceError> {
    let standings = state.store().standings(game_id).await?;
    Ok(standings.into_iter().map(Into::into).collect())
}

fn build_quiz_set(request: CreateQuizSetRequest) -> Result<QuizSet, ServiceError> {
    let CreateQuizSetRequest { name, questions } = request;

    if name.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "quiz set name must not be empty".into(),
        ));
    }
    if questions.is_empty() {
        return Err(ServiceError::InvalidInput(
            "a quiz set requires at least one question".into(),
        ));
    }

    let questions = questions
        .into_iter()
        .enumerate()
        .map(|(order, question)| build_question(order as u32, question))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuizSet {
        id: Uuid::new_v4(),
        name,
        questions,
    })
}

fn build_question(order: u32, input: QuestionInput) -> Result<Question, ServiceError> {
    if input.body.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "question body must not be empty".into(),
        ));
    }
    if !(MIN_CHOICES..=MAX_CHOICES).contains(&input.choices.len()) {
        return Err(ServiceError::InvalidInput(format!(
            "question {} must have between {MIN_CHOICES} and {MAX_CHOICES} choices",
            order + 1
        )));
    }

    // Scoring assumes a single correct choice; enforce it at authoring time.
    let correct_count = input
        .choices
        .iter()
        .filter(|choice| choice.is_correct)
        .count();
    if correct_count != 1 {
        return Err(ServiceError::InvalidInput(format!(
            "question {} must have exactly one correct choice (got {correct_count})",
            order + 1
        )));
    }

    let choices = input
        .choices
        .into_iter()
        .map(|choice| {
            if choice.body.trim().is_empty() {
                return Err(ServiceError::InvalidInput(
                    "choice body must not be empty".into(),
                ));
            }
            Ok(Choice {
                id: Uuid::new_v4(),
                body: choice.body,
                is_correct: choice.is_correct,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Question {
        id: Uuid::new_v4(),
        order,
        body: input.body,
        image_url: input.image_url,
        choices,
    })
}

fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..JOIN_CODE_LENGTH)
        .map(|_| {
            let index = rng.random_range(0..JOIN_CODE_ALPHABET.len());
            JOIN_CODE_ALPHABET[index] as char
        })
        .collect()
}
