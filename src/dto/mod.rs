//! Request/response payloads for the HTTP surface.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod answer;
pub mod game;
pub mod health;
pub mod phase;
pub mod sse;
pub mod validation;

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
