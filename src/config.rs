//! Application-level configuration loading, including the shared game timing.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_PULSE_BACK_CONFIG_PATH";
/// Default duration of the scoring countdown.
const DEFAULT_ANSWER_WINDOW_MS: u64 = 20_000;
/// Default time choices stay hidden after a question appears.
const DEFAULT_REVEAL_DELAY_MS: u64 = 7_000;

/// Timing constants shared by the host and every participant.
///
/// Both sides must load identical values: the answer window drives scoring
/// decay and the host's reveal timeout, the reveal delay gates when choices
/// become selectable. Diverging values would skew scores and reveal timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Duration of the scoring countdown once choices are visible.
    pub answer_window: Duration,
    /// Pause after a question appears before choices become selectable.
    pub reveal_delay: Duration,
}

impl TimingConfig {
    /// Answer window in milliseconds, as consumed by the scoring function.
    pub fn answer_window_ms(&self) -> u64 {
        self.answer_window.as_millis() as u64
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            answer_window: Duration::from_millis(DEFAULT_ANSWER_WINDOW_MS),
            reveal_delay: Duration::from_millis(DEFAULT_REVEAL_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Game timing constants.
    pub timing: TimingConfig,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// built-in timing defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        answer_window_ms = app_config.timing.answer_window.as_millis() as u64,
                        reveal_delay_ms = app_config.timing.reveal_delay.as_millis() as u64,
                        "loaded game timing from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    answer_window_ms: Option<u64>,
    #[serde(default)]
    reveal_delay_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let answer_window_ms = sanitize_duration(
            "answer_window_ms",
            value.answer_window_ms,
            DEFAULT_ANSWER_WINDOW_MS,
        );
        let reveal_delay_ms = sanitize_duration(
            "reveal_delay_ms",
            value.reveal_delay_ms,
            DEFAULT_REVEAL_DELAY_MS,
        );

        Self {
            timing: TimingConfig {
                answer_window: Duration::from_millis(answer_window_ms),
                reveal_delay: Duration::from_millis(reveal_delay_ms),
            },
        }
    }
}

/// Reject zero durations, which would break scoring and reveal timing.
fn sanitize_duration(field: &str, value: Option<u64>, default: u64) -> u64 {
    match value {
        Some(0) => {
            warn!(field, "zero duration in config; using default");
            default
        }
        Some(ms) => ms,
        None => default,
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_with_values_is_honored() {
        let raw = RawConfig {
            answer_window_ms: Some(10_000),
            reveal_delay_ms: Some(3_000),
        };
        let config: AppConfig = raw.into();
        assert_eq!(config.timing.answer_window, Duration::from_secs(10));
        assert_eq!(config.timing.reveal_delay, Duration::from_secs(3));
    }

    #[test]
    fn zero_durations_fall_back_to_defaults() {
        let raw = RawConfig {
            answer_window_ms: Some(0),
            reveal_delay_ms: Some(0),
        };
        let config: AppConfig = raw.into();
        assert_eq!(config.timing, TimingConfig::default());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let raw: RawConfig = serde_json::from_str("{}").unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.timing, TimingConfig::default());
    }
}
