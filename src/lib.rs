// Library surface for the terminal shell and headless/integration tests.
// Nothing in here knows how the quiz is drawn.
pub mod app_dirs;
pub mod bank;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod events;
pub mod runtime;
pub mod scoreboard;
pub mod scoring;
pub mod session;
pub mod storage;
pub mod timer;

pub use bank::{Answer, Question, QuestionBank};
pub use controller::{Presenter, QuizController};
pub use engine::{Outcome, SessionEngine, Tick};
pub use error::{ControllerError, QuizError, ScoreboardError, StorageError};
pub use scoreboard::{ScoreboardEntry, ScoreboardStore};
pub use scoring::ScoringStrategy;
pub use session::{GameParameters, Phase, SessionState};
