//! Error types shared by the quiz engine, the question bank and the scoreboard.

use thiserror::Error;

use crate::session::Phase;

/// Errors raised by the session engine and question bank loading.
#[derive(Debug, Error)]
pub enum QuizError {
    /// An operation was attempted in a phase that does not allow it.
    #[error("cannot {operation} while the quiz is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: Phase,
    },

    /// An answer was evaluated before any question was asked.
    #[error("no question has been asked yet")]
    NoCurrentQuestion,

    /// A submitted answer position does not exist on the current question.
    #[error("answer {index} is out of range for a question with {len} answers")]
    AnswerOutOfRange { index: usize, len: usize },

    #[error("invalid game parameters: {0}")]
    InvalidParameters(String),

    /// A question violates the bank invariants.
    #[error("question {id} is invalid: {reason}")]
    InvalidQuestion { id: u32, reason: String },

    #[error("question id {0} appears more than once")]
    DuplicateQuestionId(u32),

    #[error("question bank not found: {0}")]
    QuestionBankNotFound(String),

    #[error("unable to parse question bank: {0}")]
    QuestionBankFormat(#[from] serde_json::Error),

    #[error("unable to read question bank: {0}")]
    QuestionBankIo(#[from] std::io::Error),
}

/// Failures of the key-value blob storage backing the scoreboard.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage database failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Errors raised by the scoreboard store.
#[derive(Debug, Error)]
pub enum ScoreboardError {
    /// Initials were empty once surrounding whitespace was trimmed.
    #[error("initials must not be empty")]
    EmptyInitials,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("unable to encode scoreboard: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ScoreboardError {
    /// Returns `true` if the player should be asked to try again.
    pub fn is_validation(&self) -> bool {
        matches!(self, ScoreboardError::EmptyInitials)
    }
}

/// Anything the quiz controller can fail with.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error(transparent)]
    Scoreboard(#[from] ScoreboardError),
}
