use serde::Serialize;
use utoipa::ToSchema;

use crate::state::game::GamePhase;

/// Publicly visible session phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleGamePhase {
    /// Participants are joining.
    Lobby,
    /// A question is active.
    Question,
    /// Final standings are displayed.
    Result,
}

impl From<&GamePhase> for VisibleGamePhase {
    fn from(value: &GamePhase) -> Self {
        match value {
            GamePhase::Lobby => VisibleGamePhase::Lobby,
            GamePhase::Question => VisibleGamePhase::Question,
            GamePhase::Result => VisibleGamePhase::Result,
        }
    }
}
