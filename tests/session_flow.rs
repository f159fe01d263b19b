//! End-to-end session flows driving both controllers against the in-memory
//! store under paused time, so timer-dependent behavior is deterministic.

use std::{sync::Arc, time::Duration};

use tokio::time::{Instant, sleep};
use uuid::Uuid;

use quiz_pulse_back::{
    config::{AppConfig, TimingConfig},
    dao::{memory::MemoryStore, store::QuizStore},
    dto::game::{
        ChoiceInput, CreateGameRequest, CreateQuizSetRequest, JoinGameRequest, QuestionInput,
    },
    services::{
        game_service,
        host_service::{AdvanceOutcome, HostController},
        participant_service::ParticipantController,
    },
    state::{
        AppState, SharedState,
        game::{GamePhase, Question},
        participant::ParticipantPhase,
    },
};

const ANSWER_WINDOW: Duration = Duration::from_secs(10);
const REVEAL_DELAY: Duration = Duration::from_secs(1);

fn test_state(store: Arc<MemoryStore>) -> SharedState {
    let config = AppConfig {
        timing: TimingConfig {
            answer_window: ANSWER_WINDOW,
            reveal_delay: REVEAL_DELAY,
        },
    };
    AppState::new(store, config)
}

fn question_input(choices: usize) -> QuestionInput {
    QuestionInput {
        body: "capital of France?".into(),
        image_url: None,
        choices: (0..choices)
            .map(|index| ChoiceInput {
                body: format!("choice {index}"),
                is_correct: index == 0,
            })
            .collect(),
    }
}

/// Author a quiz set, create a game, join `nicknames`, and start the game.
/// Returns the game id, the questions in play order, and the participant
/// controllers in join order.
async fn start_game_with(
    state: &SharedState,
    question_count: usize,
    nicknames: &[&str],
) -> (Uuid, Vec<Question>, Vec<ParticipantController>) {
    let set = game_service::create_quiz_set(
        state,
        CreateQuizSetRequest {
            name: "geography".into(),
            questions: (0..question_count).map(|_| question_input(4)).collect(),
        },
    )
    .await
    .unwrap();

    let game = game_service::create_game(
        state,
        CreateGameRequest {
            quiz_set_id: set.id,
        },
    )
    .await
    .unwrap();

    let mut controllers = Vec::new();
    for nickname in nicknames {
        let joined = game_service::join_game(
            state,
            game.id,
            JoinGameRequest {
                nickname: (*nickname).into(),
                user_ref: None,
            },
        )
        .await
        .unwrap();
        let participant = state
            .store()
            .participants(game.id)
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.id == joined.id)
            .unwrap();
        controllers.push(ParticipantController::new(
            state.store(),
            *state.timing(),
            participant,
        ));
    }

    game_service::start_game(state, game.id).await.unwrap();

    let set = state.store().quiz_set(set.id).await.unwrap();
    (game.id, set.questions, controllers)
}

#[tokio::test(start_paused = true)]
async fn question_scores_decay_and_late_reveal_fires_on_timeout() {
    let store = Arc::new(MemoryStore::new());
    let state = test_state(store.clone());
    let (game_id, questions, mut participants) =
        start_game_with(&state, 1, &["ada", "grace", "edsger"]).await;
    let question = questions[0].clone();
    let correct = question.correct_choice().unwrap().id;
    let wrong = question.choices[1].id;

    let started = Instant::now();

    let host_store: Arc<dyn QuizStore> = store.clone();
    let mut host = HostController::new(host_store, *state.timing(), game_id)
        .await
        .unwrap();
    let host_task = tokio::spawn(async move {
        let tally = host.run_question().await.unwrap().clone();
        (host, tally)
    });

    // ada answers correctly 2s into the window, grace picks a wrong choice at
    // 5s, edsger never answers.
    let q = question.clone();
    let p1 = {
        let mut controller = participants.remove(0);
        let store = store.clone();
        let q = q.clone();
        tokio::spawn(async move {
            let mut session_rx = store.watch_session(game_id).await.unwrap();
            controller.begin_question(q);
            controller.wait_for_choices().await;
            sleep(Duration::from_secs(2)).await;
            let answer = controller.submit(correct).await.unwrap();
            controller.await_reveal(&mut session_rx).await.unwrap();
            (controller, answer.score)
        })
    };
    let p2 = {
        let mut controller = participants.remove(0);
        let store = store.clone();
        let q = q.clone();
        tokio::spawn(async move {
            let mut session_rx = store.watch_session(game_id).await.unwrap();
            controller.begin_question(q);
            controller.wait_for_choices().await;
            sleep(Duration::from_secs(5)).await;
            let answer = controller.submit(wrong).await.unwrap();
            controller.await_reveal(&mut session_rx).await.unwrap();
            (controller, answer.score)
        })
    };
    let p3 = {
        let mut controller = participants.remove(0);
        let store = store.clone();
        let q = q.clone();
        tokio::spawn(async move {
            let mut session_rx = store.watch_session(game_id).await.unwrap();
            controller.begin_question(q);
            controller.wait_for_choices().await;
            controller.await_reveal(&mut session_rx).await.unwrap();
            controller
        })
    };

    let (host, tally) = host_task.await.unwrap();
    let (p1, p1_score) = p1.await.unwrap();
    let (_p2, p2_score) = p2.await.unwrap();
    let p3 = p3.await.unwrap();

    // Score decays linearly across the 10s window: 2s in earns 800; a wrong
    // answer earns 0 regardless of timing.
    assert_eq!(p1_score, 800);
    assert_eq!(p2_score, 0);

    // One participant never answered, so the reveal came from the window
    // timeout: reveal delay plus the full answer window.
    assert_eq!(tally.total(), 2);
    assert_eq!(tally.count(correct), 1);
    assert_eq!(tally.count(wrong), 1);
    assert!(Instant::now() - started >= REVEAL_DELAY + ANSWER_WINDOW);
    assert!(host.tally().is_some());

    assert_eq!(
        p1.phase(),
        ParticipantPhase::Revealed {
            choice_id: Some(correct)
        }
    );
    assert!(p1.chosen_choice().is_some_and(|choice| choice.is_correct));
    assert_eq!(p3.phase(), ParticipantPhase::Revealed { choice_id: None });

    let session = store.session(game_id).await.unwrap();
    assert!(session.answer_revealed);
    assert_eq!(session.phase, GamePhase::Question);
}

#[tokio::test(start_paused = true)]
async fn reveal_fires_early_once_every_participant_answered() {
    let store = Arc::new(MemoryStore::new());
    let state = test_state(store.clone());
    let (game_id, questions, participants) = start_game_with(&state, 1, &["ada", "grace"]).await;
    let question = questions[0].clone();
    let correct = question.correct_choice().unwrap().id;

    let started = Instant::now();

    let host_store: Arc<dyn QuizStore> = store.clone();
    let mut host = HostController::new(host_store, *state.timing(), game_id)
        .await
        .unwrap();
    let host_task = tokio::spawn(async move {
        let tally = host.run_question().await.unwrap().clone();
        tally
    });

    let mut answer_tasks = Vec::new();
    for mut controller in participants {
        let store = store.clone();
        let q = question.clone();
        answer_tasks.push(tokio::spawn(async move {
            let mut session_rx = store.watch_session(game_id).await.unwrap();
            controller.begin_question(q);
            controller.wait_for_choices().await;
            sleep(Duration::from_secs(1)).await;
            controller.submit(correct).await.unwrap();
            controller.await_reveal(&mut session_rx).await.unwrap();
        }));
    }

    let tally = host_task.await.unwrap();
    for task in answer_tasks {
        task.await.unwrap();
    }

    assert_eq!(tally.total(), 2);
    assert_eq!(tally.count(correct), 2);

    // Count-complete reveal: well before the window would have expired.
    let elapsed = Instant::now() - started;
    assert!(elapsed < REVEAL_DELAY + ANSWER_WINDOW);
    assert!(elapsed >= REVEAL_DELAY + Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn advancing_walks_the_quiz_and_finishes_with_standings() {
    let store = Arc::new(MemoryStore::new());
    let state = test_state(store.clone());
    let (game_id, questions, mut participants) = start_game_with(&state, 2, &["ada"]).await;

    let host_store: Arc<dyn QuizStore> = store.clone();
    let mut host = HostController::new(host_store, *state.timing(), game_id)
        .await
        .unwrap();
    let mut controller = participants.remove(0);

    for (index, question) in questions.iter().enumerate() {
        let correct = question.correct_choice().unwrap().id;
        let watch_store = store.clone();
        let q = question.clone();
        let participant_task = tokio::spawn(async move {
            let mut session_rx = watch_store.watch_session(game_id).await.unwrap();
            controller.begin_question(q);
            controller.wait_for_choices().await;
            sleep(Duration::from_secs(2)).await;
            controller.submit(correct).await.unwrap();
            controller.await_reveal(&mut session_rx).await.unwrap();
            controller
        });

        let tally = host.run_question().await.unwrap();
        assert_eq!(tally.total(), 1);
        controller = participant_task.await.unwrap();

        let outcome = host.advance().await.unwrap();
        if index + 1 < questions.len() {
            assert_eq!(outcome, AdvanceOutcome::NextQuestion(index as u32 + 1));
            let session = store.session(game_id).await.unwrap();
            // Advance clears the reveal flag as part of the same update.
            assert!(!session.answer_revealed);
            assert_eq!(session.current_question_index, index as u32 + 1);
        } else {
            assert_eq!(outcome, AdvanceOutcome::Finished);
        }
    }

    let session = store.session(game_id).await.unwrap();
    assert_eq!(session.phase, GamePhase::Result);
    assert!(matches!(
        controller.phase(),
        ParticipantPhase::Revealed { .. }
    ));

    let standings = game_service::results(&state, game_id).await.unwrap();
    assert_eq!(standings.len(), 1);
    assert_eq!(standings[0].nickname, "ada");
    // Two questions answered 2s into a 10s window each.
    assert_eq!(standings[0].total_score, 1600);
}

#[tokio::test(start_paused = true)]
async fn answers_after_the_reveal_are_rejected() {
    let store = Arc::new(MemoryStore::new());
    let state = test_state(store.clone());
    let (game_id, questions, mut participants) = start_game_with(&state, 1, &["ada", "grace"]).await;
    let question = questions[0].clone();
    let correct = question.correct_choice().unwrap().id;

    let host_store: Arc<dyn QuizStore> = store.clone();
    let mut host = HostController::new(host_store, *state.timing(), game_id)
        .await
        .unwrap();
    let host_task = tokio::spawn(async move { host.run_question().await.map(|t| t.clone()) });

    // Only ada answers; grace waits out the whole window.
    let mut ada = participants.remove(0);
    let mut grace = participants.remove(0);
    let ada_task = {
        let store = store.clone();
        let q = question.clone();
        tokio::spawn(async move {
            let mut session_rx = store.watch_session(game_id).await.unwrap();
            ada.begin_question(q);
            ada.wait_for_choices().await;
            ada.submit(correct).await.unwrap();
            ada.await_reveal(&mut session_rx).await.unwrap();
        })
    };

    let grace_task = {
        let store = store.clone();
        let q = question.clone();
        tokio::spawn(async move {
            let mut session_rx = store.watch_session(game_id).await.unwrap();
            grace.begin_question(q);
            grace.wait_for_choices().await;
            grace.await_reveal(&mut session_rx).await.unwrap();
            grace
        })
    };

    host_task.await.unwrap().unwrap();
    ada_task.await.unwrap();
    let mut grace = grace_task.await.unwrap();

    // The machine is already in the revealed phase, so a late tap on a choice
    // is refused locally before it ever reaches the store.
    let err = grace.submit(correct).await.unwrap_err();
    assert!(matches!(
        err,
        quiz_pulse_back::error::ServiceError::InvalidState(_)
    ));
}
