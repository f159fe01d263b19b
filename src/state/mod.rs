//! Shared application state and the session state machines.

pub mod game;
pub mod host;
pub mod participant;

use std::sync::Arc;

use crate::{
    config::{AppConfig, TimingConfig},
    dao::store::QuizStore,
};

/// Cheaply clonable handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the shared store plus immutable configuration.
pub struct AppState {
    store: Arc<dyn QuizStore>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn QuizStore>, config: AppConfig) -> SharedState {
        Arc::new(Self { store, config })
    }

    /// Obtain a handle to the shared store.
    pub fn store(&self) -> Arc<dyn QuizStore> {
        self.store.clone()
    }

    /// Game timing constants shared by host and participant controllers.
    pub fn timing(&self) -> &TimingConfig {
        &self.config.timing
    }
}
