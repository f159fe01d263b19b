//! Service layer: game bootstrap, the two session controllers, and SSE glue.

pub mod documentation;
pub mod game_service;
pub mod host_service;
pub mod participant_service;
pub mod sse_service;
