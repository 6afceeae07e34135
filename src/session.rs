use crate::error::QuizError;
use crate::scoring::ScoringStrategy;

/// Lifecycle of a single play-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    #[strum(to_string = "idle")]
    Idle,
    #[strum(to_string = "in progress")]
    InProgress,
    #[strum(to_string = "ended")]
    Ended,
}

/// Rules that stay fixed for every game of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameParameters {
    countdown_start_seconds: u32,
    incorrect_penalty_seconds: u32,
    points_per_correct_answer: u32,
    scoring: ScoringStrategy,
}

impl GameParameters {
    pub fn new(
        countdown_start_seconds: u32,
        incorrect_penalty_seconds: u32,
        points_per_correct_answer: u32,
        scoring: ScoringStrategy,
    ) -> Result<Self, QuizError> {
        if countdown_start_seconds == 0 {
            return Err(QuizError::InvalidParameters(
                "countdown must be at least one second".into(),
            ));
        }
        if points_per_correct_answer == 0 {
            return Err(QuizError::InvalidParameters(
                "a correct answer must be worth at least one point".into(),
            ));
        }

        Ok(Self {
            countdown_start_seconds,
            incorrect_penalty_seconds,
            points_per_correct_answer,
            scoring,
        })
    }

    pub fn countdown_start_seconds(&self) -> u32 {
        self.countdown_start_seconds
    }

    pub fn incorrect_penalty_seconds(&self) -> u32 {
        self.incorrect_penalty_seconds
    }

    pub fn points_per_correct_answer(&self) -> u32 {
        self.points_per_correct_answer
    }

    pub fn scoring(&self) -> ScoringStrategy {
        self.scoring
    }
}

impl Default for GameParameters {
    fn default() -> Self {
        Self {
            countdown_start_seconds: 90,
            incorrect_penalty_seconds: 15,
            points_per_correct_answer: 5,
            scoring: ScoringStrategy::default(),
        }
    }
}

/// Mutable per-game state, owned by the session engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    // Goes negative when a penalty lands close to the end.
    pub time_remaining_seconds: i64,
    pub count_correct_answers: u32,
    pub asked_question_ids: Vec<u32>,
}

impl SessionState {
    pub fn new(params: &GameParameters) -> Self {
        Self {
            time_remaining_seconds: i64::from(params.countdown_start_seconds),
            count_correct_answers: 0,
            asked_question_ids: Vec::new(),
        }
    }

    /// The question most recently handed out, if any.
    pub fn current_question_id(&self) -> Option<u32> {
        self.asked_question_ids.last().copied()
    }
}
