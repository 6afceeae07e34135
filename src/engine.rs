use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::debug;

use crate::bank::{Question, QuestionBank};
use crate::error::QuizError;
use crate::session::{GameParameters, Phase, SessionState};

#[derive(Clone, Debug, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Outcome {
    #[strum(to_string = "Correct!")]
    Correct,
    #[strum(to_string = "Wrong!")]
    Incorrect,
}

impl Outcome {
    fn from_correct(correct: bool) -> Self {
        if correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }
}

/// Result of one second elapsing on the countdown.
///
/// `remaining_before` is the clock as it read when the second began. Displays
/// show [`remaining_after`](Self::remaining_after), which is what the engine
/// now holds and what the next answer will be scored against.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Seconds remaining before this tick was applied.
    pub remaining_before: i64,
    /// Set once the countdown has reached zero or below.
    pub expired: bool,
}

impl Tick {
    pub fn remaining_after(&self) -> i64 {
        self.remaining_before - 1
    }
}

/// Drives one play-through: question selection, answer evaluation, the
/// countdown and the final score.
#[derive(Debug)]
pub struct SessionEngine {
    bank: Arc<QuestionBank>,
    params: GameParameters,
    state: SessionState,
    phase: Phase,
    rng: StdRng,
}

impl SessionEngine {
    pub fn new(bank: Arc<QuestionBank>, params: GameParameters) -> Self {
        Self::with_rng(bank, params, StdRng::from_entropy())
    }

    /// Deterministic question order, for reproducible games.
    pub fn with_seed(bank: Arc<QuestionBank>, params: GameParameters, seed: u64) -> Self {
        Self::with_rng(bank, params, StdRng::seed_from_u64(seed))
    }

    fn with_rng(bank: Arc<QuestionBank>, params: GameParameters, rng: StdRng) -> Self {
        Self {
            state: SessionState::new(&params),
            bank,
            params,
            phase: Phase::Idle,
            rng,
        }
    }

    pub fn reset(&mut self) {
        self.state = SessionState::new(&self.params);
        self.phase = Phase::InProgress;
        debug!(
            countdown = self.state.time_remaining_seconds,
            "session reset"
        );
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn params(&self) -> &GameParameters {
        &self.params
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn time_remaining(&self) -> i64 {
        self.state.time_remaining_seconds
    }

    pub fn count_correct_answers(&self) -> u32 {
        self.state.count_correct_answers
    }

    pub fn is_time_spent(&self) -> bool {
        self.state.time_remaining_seconds <= 0
    }

    /// Questions not yet asked this session, in bank order.
    pub fn get_available_questions(&self) -> Vec<&Question> {
        unasked(&self.bank, &self.state.asked_question_ids)
    }

    /// Picks an unasked question at random and marks it asked. `None` means
    /// the bank is exhausted and the quiz should end.
    pub fn get_new_question(&mut self) -> Result<Option<&Question>, QuizError> {
        self.require_in_progress("ask a question")?;

        let picked = unasked(&self.bank, &self.state.asked_question_ids)
            .choose(&mut self.rng)
            .map(|q| q.id);

        match picked {
            Some(id) => {
                self.state.asked_question_ids.push(id);
                debug!(id, asked = self.state.asked_question_ids.len(), "question asked");
                Ok(self.bank.get(id))
            }
            None => {
                debug!("question bank exhausted");
                Ok(None)
            }
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.state
            .current_question_id()
            .and_then(|id| self.bank.get(id))
    }

    /// Exact, case and whitespace sensitive comparison against the text of
    /// the current question's correct answer.
    pub fn is_answer_correct(&self, submitted: &str) -> Result<bool, QuizError> {
        let question = self.current_question().ok_or(QuizError::NoCurrentQuestion)?;
        Ok(question
            .correct_answer()
            .is_some_and(|answer| answer.text == submitted))
    }

    /// Compares by position within the current question, so answers that
    /// share a text cannot be mistaken for each other.
    pub fn is_choice_correct(&self, index: usize) -> Result<bool, QuizError> {
        let question = self.current_question().ok_or(QuizError::NoCurrentQuestion)?;
        let answer = question
            .answers
            .get(index)
            .ok_or(QuizError::AnswerOutOfRange {
                index,
                len: question.answers.len(),
            })?;
        Ok(answer.correct)
    }

    pub fn evaluate_answer(&mut self, submitted: &str) -> Result<Outcome, QuizError> {
        self.require_in_progress("evaluate an answer")?;
        let correct = self.is_answer_correct(submitted)?;
        Ok(self.apply(correct))
    }

    pub fn evaluate_choice(&mut self, index: usize) -> Result<Outcome, QuizError> {
        self.require_in_progress("evaluate an answer")?;
        let correct = self.is_choice_correct(index)?;
        Ok(self.apply(correct))
    }

    fn apply(&mut self, correct: bool) -> Outcome {
        let outcome = Outcome::from_correct(correct);
        match outcome {
            Outcome::Correct => self.state.count_correct_answers += 1,
            Outcome::Incorrect => {
                self.state.time_remaining_seconds -=
                    i64::from(self.params.incorrect_penalty_seconds())
            }
        }
        debug!(
            %outcome,
            correct = self.state.count_correct_answers,
            remaining = self.state.time_remaining_seconds,
            "answer evaluated"
        );
        outcome
    }

    /// Applies one elapsed second. A countdown of N seconds expires on the
    /// Nth tick.
    pub fn tick_time_remaining(&mut self) -> Result<Tick, QuizError> {
        self.require_in_progress("tick the timer")?;

        let remaining_before = self.state.time_remaining_seconds;
        self.state.time_remaining_seconds -= 1;

        Ok(Tick {
            remaining_before,
            expired: self.state.time_remaining_seconds <= 0,
        })
    }

    pub fn get_score(&self) -> u64 {
        self.params.scoring().score(
            self.state.count_correct_answers,
            self.params.points_per_correct_answer(),
            self.state.time_remaining_seconds,
        )
    }

    /// Closes the session and returns the final score.
    pub fn end_quiz(&mut self) -> Result<u64, QuizError> {
        self.require_in_progress("end the quiz")?;
        self.phase = Phase::Ended;
        let score = self.get_score();
        debug!(score, "session ended");
        Ok(score)
    }

    fn require_in_progress(&self, operation: &'static str) -> Result<(), QuizError> {
        if self.phase == Phase::InProgress {
            Ok(())
        } else {
            Err(QuizError::InvalidState {
                operation,
                phase: self.phase,
            })
        }
    }
}

fn unasked<'a>(bank: &'a QuestionBank, asked: &[u32]) -> Vec<&'a Question> {
    bank.questions()
        .iter()
        .filter(|q| !asked.contains(&q.id))
        .collect()
}
