use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

use crate::{
    dao::store::AnswerFeed,
    dto::{
        answer::AnswerSummary,
        game::GameSummary,
        sse::{ANSWER_INSERTED_EVENT, SESSION_CHANGED_EVENT, ServerEvent},
    },
    state::game::GameSession,
};

/// Convert a session watch into an SSE response.
///
/// Every update is forwarded as a full snapshot: observers replace their
/// state wholesale instead of patching fields, so stale partial reads cannot
/// occur. The current snapshot is sent immediately on connect.
pub fn session_event_stream(
    mut session_rx: watch::Receiver<GameSession>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            let snapshot: GameSummary = session_rx.borrow_and_update().clone().into();
            match ServerEvent::json(Some(SESSION_CHANGED_EVENT.to_string()), &snapshot) {
                Ok(event) => {
                    if tx.send(Ok(event.into())).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "failed to serialize session snapshot");
                }
            }

            if session_rx.changed().await.is_err() {
                break;
            }
        }
        tracing::info!("session SSE stream disconnected");
    });

    to_sse_response(rx)
}

/// Convert an answer feed into an SSE response carrying one event per insert.
pub fn answer_event_stream(
    mut feed: AnswerFeed,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        while let Some(answer) = feed.next().await {
            let summary: AnswerSummary = answer.into();
            match ServerEvent::json(Some(ANSWER_INSERTED_EVENT.to_string()), &summary) {
                Ok(event) => {
                    if tx.send(Ok(event.into())).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "failed to serialize answer event");
                }
            }
        }
        tracing::info!(question_id = %feed.question_id(), "answer SSE stream disconnected");
    });

    to_sse_response(rx)
}

/// Wrap a forwarder channel into the SSE response; axum drops the receiver
/// stream when the client disconnects, which tears down the forwarder task.
fn to_sse_response(
    rx: mpsc::Receiver<Result<Event, Infallible>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
