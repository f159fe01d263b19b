use std::error::Error;

use thiserror::Error;
use uuid::Uuid;

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A second answer for the same `(participant, question)` pair was
    /// rejected; the first row is untouched.
    #[error("participant `{participant_id}` already answered question `{question_id}`")]
    DuplicateAnswer {
        /// Participant that attempted the duplicate submission.
        participant_id: Uuid,
        /// Question the duplicate targeted.
        question_id: Uuid,
    },
    /// A referenced row does not exist.
    #[error("{kind} `{id}` not found")]
    NotFound {
        /// Table or entity kind the lookup targeted.
        kind: &'static str,
        /// Identifier that failed to resolve.
        id: String,
    },
    /// A session update violated the phase or monotonicity invariants.
    #[error("invalid session transition: {message}")]
    InvalidTransition {
        /// Human-readable description of the rejected transition.
        message: String,
    },
    /// The backend could not be reached.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failure.
        message: String,
        /// Underlying backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct a not-found error for an entity kind and id.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        StorageError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Construct an invalid-transition error.
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        StorageError::InvalidTransition {
            message: message.into(),
        }
    }

    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
