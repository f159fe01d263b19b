use axum::response::sse::Event;
use serde::Serialize;

/// Event name for full-snapshot session updates.
pub const SESSION_CHANGED_EVENT: &str = "game.session";
/// Event name for answer-insert notifications.
pub const ANSWER_INSERTED_EVENT: &str = "answer.inserted";

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

impl From<ServerEvent> for Event {
    fn from(value: ServerEvent) -> Self {
        let mut event = Event::default().data(value.data);
        if let Some(name) = value.event {
            event = event.event(name);
        }
        event
    }
}
