use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::bank::{Question, QuestionBank};
use crate::engine::{Outcome, SessionEngine};
use crate::error::{ControllerError, QuizError, ScoreboardError};
use crate::events::{EventHandlers, Submission, UiEvent, UiEventKind};
use crate::scoreboard::{ScoreboardEntry, ScoreboardStore};
use crate::session::{GameParameters, Phase};
use crate::storage::BlobStore;
use crate::timer::{CountdownTimer, TimerId};

/// Everything the quiz asks a user interface to display.
pub trait Presenter {
    fn show_welcome(&mut self);
    fn show_question(&mut self, question: &Question);
    fn show_time_remaining(&mut self, seconds: i64);
    fn show_feedback(&mut self, outcome: Outcome);
    fn show_final_score(&mut self, score: u64);
    /// The initials were not recorded; the player may try again.
    fn show_initials_rejected(&mut self, error: &ScoreboardError);
    fn show_scoreboard(&mut self, entries: &[ScoreboardEntry]);
}

/// Composes a session engine, the scoreboard, a presenter and the countdown
/// timer into a playable quiz.
pub struct QuizController<P: Presenter, T: CountdownTimer, S: BlobStore> {
    bank: Arc<QuestionBank>,
    params: GameParameters,
    engine: SessionEngine,
    scoreboard: ScoreboardStore<S>,
    presenter: P,
    timer: T,
    active_timer: Option<TimerId>,
    // Score of the last finished game, until initials are recorded for it.
    pending_score: Option<u64>,
    seed: Option<u64>,
    games: u64,
}

impl<P: Presenter, T: CountdownTimer, S: BlobStore> QuizController<P, T, S> {
    pub fn new(
        bank: Arc<QuestionBank>,
        params: GameParameters,
        scoreboard: ScoreboardStore<S>,
        presenter: P,
        timer: T,
    ) -> Self {
        Self {
            engine: SessionEngine::new(bank.clone(), params),
            bank,
            params,
            scoreboard,
            presenter,
            timer,
            active_timer: None,
            pending_score: None,
            seed: None,
            games: 0,
        }
    }

    /// Makes question order reproducible across games.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.engine = self.fresh_engine();
        self
    }

    pub fn start(&mut self) {
        self.scoreboard.load();
        self.presenter.show_welcome();
    }

    pub fn begin_quiz(&mut self) -> Result<(), ControllerError> {
        self.stop_timer();
        self.pending_score = None;
        self.engine = self.fresh_engine();
        self.engine.reset();
        info!(
            bank = self.bank.name(),
            questions = self.bank.len(),
            "quiz started"
        );

        self.active_timer = Some(self.timer.start());
        self.presenter.show_time_remaining(self.engine.time_remaining());
        self.next_question()
    }

    pub fn submit_answer(&mut self, submission: &Submission) -> Result<Outcome, ControllerError> {
        let outcome = match submission {
            Submission::Text(text) => self.engine.evaluate_answer(text)?,
            Submission::Choice(index) => self.engine.evaluate_choice(*index)?,
        };
        self.presenter.show_feedback(outcome);

        if self.engine.is_time_spent() {
            self.end_quiz()?;
        } else {
            self.presenter.show_time_remaining(self.engine.time_remaining());
            self.next_question()?;
        }
        Ok(outcome)
    }

    /// Applies one second from the given timer run. Ticks from runs that
    /// have since been stopped are ignored.
    pub fn on_tick(&mut self, id: TimerId) -> Result<(), ControllerError> {
        if self.active_timer != Some(id) {
            debug!(?id, "ignoring tick from a stopped timer");
            return Ok(());
        }

        let tick = self.engine.tick_time_remaining()?;
        if tick.expired {
            self.end_quiz()
        } else {
            self.presenter.show_time_remaining(tick.remaining_after());
            Ok(())
        }
    }

    pub fn end_quiz(&mut self) -> Result<(), ControllerError> {
        self.stop_timer();
        let score = self.engine.end_quiz()?;
        info!(
            score,
            correct = self.engine.count_correct_answers(),
            remaining = self.engine.time_remaining(),
            "quiz ended"
        );

        self.pending_score = Some(score);
        self.presenter.show_final_score(score);
        Ok(())
    }

    pub fn submit_initials(&mut self, initials: &str) -> Result<(), ControllerError> {
        let score = self.pending_score.ok_or(QuizError::InvalidState {
            operation: "submit initials",
            phase: self.engine.phase(),
        })?;

        if let Err(e) = self.scoreboard.add(initials, score) {
            self.presenter.show_initials_rejected(&e);
            return Err(e.into());
        }

        self.pending_score = None;
        self.presenter.show_scoreboard(self.scoreboard.get_all());
        Ok(())
    }

    /// Leaves whatever is on screen for the scoreboard. A game in progress is
    /// abandoned.
    pub fn show_scoreboard(&mut self) {
        self.abandon_game();
        self.presenter.show_scoreboard(self.scoreboard.get_all());
    }

    pub fn return_to_welcome(&mut self) {
        self.abandon_game();
        self.presenter.show_welcome();
    }

    pub fn clear_scoreboard(&mut self) -> Result<(), ControllerError> {
        self.scoreboard.clear()?;
        self.presenter.show_scoreboard(self.scoreboard.get_all());
        Ok(())
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn scoreboard(&self) -> &ScoreboardStore<S> {
        &self.scoreboard
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn active_timer(&self) -> Option<TimerId> {
        self.active_timer
    }

    pub fn pending_score(&self) -> Option<u64> {
        self.pending_score
    }

    fn next_question(&mut self) -> Result<(), ControllerError> {
        match self.engine.get_new_question()?.cloned() {
            Some(question) => {
                self.presenter.show_question(&question);
                Ok(())
            }
            None => self.end_quiz(),
        }
    }

    fn stop_timer(&mut self) {
        if self.active_timer.take().is_some() {
            self.timer.stop();
        }
    }

    fn abandon_game(&mut self) {
        self.stop_timer();
        self.pending_score = None;
        if self.engine.phase() == Phase::InProgress {
            info!("quiz abandoned");
            self.engine = self.fresh_engine();
        }
    }

    fn fresh_engine(&mut self) -> SessionEngine {
        self.games += 1;
        match self.seed {
            Some(seed) => {
                SessionEngine::with_seed(self.bank.clone(), self.params, seed.wrapping_add(self.games))
            }
            None => SessionEngine::new(self.bank.clone(), self.params),
        }
    }
}

impl<P, T, S> QuizController<P, T, S>
where
    P: Presenter + 'static,
    T: CountdownTimer + 'static,
    S: BlobStore + 'static,
{
    /// One handler per UI event kind, routing into the controller. Illegal
    /// operations are logged and otherwise ignored.
    pub fn default_handlers() -> EventHandlers<Self> {
        let mut handlers = EventHandlers::new();

        handlers.register(UiEventKind::BeginQuiz, |c: &mut Self, _: &UiEvent| {
            report("begin quiz", c.begin_quiz())
        });
        handlers.register(UiEventKind::AnswerSubmitted, |c: &mut Self, ev: &UiEvent| {
            if let UiEvent::AnswerSubmitted(submission) = ev {
                report("submit answer", c.submit_answer(submission).map(|_| ()));
            }
        });
        handlers.register(UiEventKind::InitialsSubmitted, |c: &mut Self, ev: &UiEvent| {
            if let UiEvent::InitialsSubmitted(initials) = ev {
                report("submit initials", c.submit_initials(initials));
            }
        });
        handlers.register(UiEventKind::ReturnToWelcome, |c: &mut Self, _: &UiEvent| {
            c.return_to_welcome()
        });
        handlers.register(UiEventKind::ShowScoreboard, |c: &mut Self, _: &UiEvent| {
            c.show_scoreboard()
        });
        handlers.register(UiEventKind::ClearScoreboard, |c: &mut Self, _: &UiEvent| {
            report("clear scoreboard", c.clear_scoreboard())
        });

        handlers
    }
}

fn report(action: &str, result: Result<(), ControllerError>) {
    if let Err(e) = result {
        warn!("{action} failed: {e}");
    }
}
