use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use quizr::controller::{Presenter, QuizController};
use quizr::events::{Submission, UiEvent};
use quizr::runtime::{FixedTicker, QuizEvent, Runner, TestEventSource};
use quizr::scoreboard::ScoreboardStore;
use quizr::storage::MemoryBlobStore;
use quizr::timer::{CountdownTimer, ManualTimer, ThreadTimer};
use quizr::{
    Answer, GameParameters, Outcome, Phase, Question, QuestionBank, ScoreboardEntry,
    ScoreboardError, ScoringStrategy,
};

// Headless integration using the runtime + controller without a TTY.

#[derive(Debug, Default)]
struct Screen {
    questions: Vec<u32>,
    times: Vec<i64>,
    feedback: Vec<Outcome>,
    final_score: Option<u64>,
    rejected: usize,
    scoreboard: Vec<ScoreboardEntry>,
    welcomes: usize,
}

impl Presenter for Screen {
    fn show_welcome(&mut self) {
        self.welcomes += 1;
    }
    fn show_question(&mut self, question: &Question) {
        self.questions.push(question.id);
    }
    fn show_time_remaining(&mut self, seconds: i64) {
        self.times.push(seconds);
    }
    fn show_feedback(&mut self, outcome: Outcome) {
        self.feedback.push(outcome);
    }
    fn show_final_score(&mut self, score: u64) {
        self.final_score = Some(score);
    }
    fn show_initials_rejected(&mut self, _error: &ScoreboardError) {
        self.rejected += 1;
    }
    fn show_scoreboard(&mut self, entries: &[ScoreboardEntry]) {
        self.scoreboard = entries.to_vec();
    }
}

fn params(countdown: u32) -> GameParameters {
    GameParameters::new(countdown, 15, 5, ScoringStrategy::PerCorrectAnswer).unwrap()
}

fn two_questions() -> Arc<QuestionBank> {
    Arc::new(
        QuestionBank::new(
            "pair",
            vec![
                Question {
                    id: 0,
                    text: "Are null values and undefined values the same?".into(),
                    answers: vec![Answer::new("Yes", false), Answer::new("No", true)],
                },
                Question {
                    id: 1,
                    text: "An undeclared variable is the same as an undefined variable.".into(),
                    answers: vec![Answer::new("true", false), Answer::new("false", true)],
                },
            ],
        )
        .unwrap(),
    )
}

#[test]
fn headless_timed_quiz_finishes_by_time() {
    let (tx, rx) = mpsc::channel();
    let timer = ThreadTimer::new(Duration::from_millis(5), tx);
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(100)),
    );

    let mut quiz = QuizController::new(
        Arc::new(QuestionBank::builtin().unwrap()),
        params(3),
        ScoreboardStore::new(MemoryBlobStore::new()),
        Screen::default(),
        timer,
    );
    quiz.start();
    quiz.begin_quiz().unwrap();
    let run = quiz.active_timer().unwrap();

    // Drive a tiny event loop until finished (or bounded steps)
    for _ in 0..400u32 {
        if let Some(QuizEvent::Tick(id)) = runner.step() {
            quiz.on_tick(id).unwrap();
        }
        if quiz.engine().phase() == Phase::Ended {
            break;
        }
    }

    assert_eq!(quiz.engine().phase(), Phase::Ended, "quiz should end by timeout");
    assert_eq!(quiz.presenter().times, vec![3, 2, 1]);
    assert_eq!(quiz.presenter().final_score, Some(0));
    assert_eq!(quiz.presenter().questions.len(), 1);
    assert!(!quiz.timer().is_running());

    // Whatever was queued before the stop is ignored; nothing arrives afterwards.
    while let Some(event) = runner.step() {
        assert_eq!(event, QuizEvent::Tick(run));
        quiz.on_tick(run).unwrap();
    }
    assert_eq!(quiz.engine().time_remaining(), 0);
    assert_eq!(quiz.presenter().times, vec![3, 2, 1]);
}

#[test]
fn headless_scoreboard_detour_stops_ticking() {
    let (tx, rx) = mpsc::channel();
    let timer = ThreadTimer::new(Duration::from_millis(5), tx);
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(50)),
    );
    let mut quiz = QuizController::new(
        two_questions(),
        params(90),
        ScoreboardStore::new(MemoryBlobStore::new()),
        Screen::default(),
        timer,
    );
    quiz.start();
    quiz.begin_quiz().unwrap();

    // let a few ticks through
    let mut ticked = 0;
    while ticked < 3 {
        if let Some(QuizEvent::Tick(id)) = runner.step() {
            quiz.on_tick(id).unwrap();
            ticked += 1;
        }
    }

    quiz.show_scoreboard();
    let remaining = quiz.engine().time_remaining();

    std::thread::sleep(Duration::from_millis(30));
    while let Some(QuizEvent::Tick(id)) = runner.step() {
        quiz.on_tick(id).unwrap();
    }

    assert!(!quiz.timer().is_running());
    assert_eq!(quiz.engine().phase(), Phase::Idle);
    assert_eq!(quiz.engine().time_remaining(), remaining);
}

#[test]
fn headless_full_game_through_handlers() {
    let mut quiz = QuizController::new(
        two_questions(),
        params(90),
        ScoreboardStore::new(MemoryBlobStore::new()),
        Screen::default(),
        ManualTimer::new(),
    )
    .with_seed(3);
    let mut handlers = QuizController::default_handlers();
    quiz.start();

    handlers.dispatch(&mut quiz, &UiEvent::BeginQuiz);
    let first = quiz.engine().current_question().unwrap().clone();
    let right = first.correct_answer().unwrap().text.clone();
    handlers.dispatch(&mut quiz, &UiEvent::AnswerSubmitted(Submission::Text(right)));

    let second = quiz.engine().current_question().unwrap().clone();
    assert_ne!(first.id, second.id);
    handlers.dispatch(
        &mut quiz,
        &UiEvent::AnswerSubmitted(Submission::Text("definitely not".into())),
    );

    assert_eq!(quiz.engine().phase(), Phase::Ended);
    assert_eq!(quiz.engine().count_correct_answers(), 1);
    assert_eq!(quiz.engine().time_remaining(), 75);
    assert_eq!(
        quiz.presenter().feedback,
        vec![Outcome::Correct, Outcome::Incorrect]
    );
    assert_eq!(quiz.presenter().final_score, Some(5));

    handlers.dispatch(&mut quiz, &UiEvent::InitialsSubmitted("   ".into()));
    assert_eq!(quiz.presenter().rejected, 1);

    handlers.dispatch(&mut quiz, &UiEvent::InitialsSubmitted("bcf".into()));
    assert_eq!(quiz.presenter().scoreboard, vec![ScoreboardEntry::new("bcf", 5)]);

    handlers.dispatch(&mut quiz, &UiEvent::ReturnToWelcome);
    assert_eq!(quiz.presenter().welcomes, 2);
}

#[test]
fn headless_answering_after_end_is_ignored() {
    let mut quiz = QuizController::new(
        two_questions(),
        params(90),
        ScoreboardStore::new(MemoryBlobStore::new()),
        Screen::default(),
        ManualTimer::new(),
    );
    let mut handlers = QuizController::default_handlers();
    quiz.start();

    handlers.dispatch(&mut quiz, &UiEvent::BeginQuiz);
    handlers.dispatch(&mut quiz, &UiEvent::AnswerSubmitted(Submission::Choice(1)));
    handlers.dispatch(&mut quiz, &UiEvent::AnswerSubmitted(Submission::Choice(1)));
    assert_eq!(quiz.presenter().final_score, Some(10));

    handlers.dispatch(&mut quiz, &UiEvent::AnswerSubmitted(Submission::Choice(0)));

    assert_eq!(quiz.engine().phase(), Phase::Ended);
    assert_eq!(quiz.engine().time_remaining(), 90);
    assert_eq!(quiz.presenter().feedback.len(), 2);
}
