mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::Show,
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quizr::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    controller::QuizController,
    events::{EventHandlers, Submission, UiEvent},
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, Runner},
    scoreboard::ScoreboardStore,
    storage::SqliteBlobStore,
    timer::ThreadTimer,
    GameParameters, QuestionBank, ScoringStrategy,
};
use ui::{Screen, TerminalPresenter};

const TICK_RATE_MS: u64 = 1000;
const FRAME_RATE_MS: u64 = 100;

/// timed multiple-choice trivia quiz with a persistent high score table
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed multiple-choice trivia quiz. Wrong answers cost time, and finished games can be saved to a ranked high score table."
)]
pub struct Cli {
    /// seconds on the clock when a quiz starts
    #[clap(short = 's', long)]
    countdown: Option<u32>,

    /// seconds taken off the clock for each wrong answer
    #[clap(short = 'p', long)]
    penalty: Option<u32>,

    /// points awarded for each correct answer
    #[clap(long)]
    points: Option<u32>,

    /// how the final score is calculated
    #[clap(long, value_enum)]
    scoring: Option<ScoringStrategy>,

    /// question bank json file to use instead of the built-in questions
    #[clap(short = 'q', long)]
    questions: Option<PathBuf>,

    /// remember these settings for future runs
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line flags win over the stored config.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(countdown) = self.countdown {
            config.countdown_start_seconds = countdown;
        }
        if let Some(penalty) = self.penalty {
            config.incorrect_penalty_seconds = penalty;
        }
        if let Some(points) = self.points {
            config.points_per_correct_answer = points;
        }
        if let Some(scoring) = self.scoring {
            config.scoring = scoring;
        }
        if let Some(ref questions) = self.questions {
            config.question_bank = Some(questions.clone());
        }
        config
    }
}

pub type App = QuizController<TerminalPresenter, ThreadTimer, SqliteBlobStore>;

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Quit,
    Dispatch(UiEvent),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save_config {
        config_store.save(&config)?;
        info!(path = %config_store.path().display(), "config saved");
    }

    let params = GameParameters::try_from(&config)?;
    let bank = match config.question_bank {
        Some(ref path) => QuestionBank::from_path(path)?,
        None => QuestionBank::builtin()?,
    };

    let events = CrosstermEventSource::new();
    let timer = ThreadTimer::new(Duration::from_millis(TICK_RATE_MS), events.sender());
    let scoreboard = ScoreboardStore::new(SqliteBlobStore::new()?);
    let mut app = QuizController::new(
        Arc::new(bank),
        params,
        scoreboard,
        TerminalPresenter::default(),
        timer,
    );
    let mut handlers = App::default_handlers();
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(FRAME_RATE_MS)));

    enable_raw_mode()?;
    restore_after(
        run_in_alternate_screen(&mut app, &mut handlers, &runner),
        restore_terminal,
    )
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)
}

/// Runs `restore` whatever `result` holds. An error in `result` wins over one
/// from `restore`.
fn restore_after<T>(
    result: Result<T, Box<dyn Error>>,
    restore: impl FnOnce() -> io::Result<()>,
) -> Result<T, Box<dyn Error>> {
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

/// Everything between entering raw mode and leaving it. Errors come back to
/// the caller, which restores the terminal either way.
fn run_in_alternate_screen(
    app: &mut App,
    handlers: &mut EventHandlers<App>,
    runner: &Runner<CrosstermEventSource, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();
    start_tui(&mut terminal, app, handlers, runner)
}

/// Logs go to a file; the terminal belongs to the quiz.
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("QUIZR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    handlers: &mut EventHandlers<App>,
    runner: &Runner<CrosstermEventSource, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(app.presenter(), f.area()))?;

        match runner.step() {
            Some(QuizEvent::Tick(id)) => {
                if let Err(e) = app.on_tick(id) {
                    warn!("tick failed: {e}");
                }
            }
            Some(QuizEvent::Key(key)) => match handle_key(app.presenter_mut(), key) {
                Some(Action::Quit) => break,
                Some(Action::Dispatch(event)) => {
                    handlers.dispatch(app, &event);
                }
                None => {}
            },
            Some(QuizEvent::Resize) | None => {}
        }
    }

    Ok(())
}

fn handle_key(presenter: &mut TerminalPresenter, key: KeyEvent) -> Option<Action> {
    // ctrl+c to quit
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match &presenter.screen {
        Screen::Welcome => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Dispatch(UiEvent::BeginQuiz)),
            KeyCode::Char('h') => Some(Action::Dispatch(UiEvent::ShowScoreboard)),
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        },
        Screen::Question { selected, .. } => {
            let selected = *selected;
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    presenter.select_previous();
                    None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    presenter.select_next();
                    None
                }
                KeyCode::Enter => Some(Action::Dispatch(UiEvent::AnswerSubmitted(
                    Submission::Choice(selected),
                ))),
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    presenter.select(index).then(|| {
                        Action::Dispatch(UiEvent::AnswerSubmitted(Submission::Choice(index)))
                    })
                }
                KeyCode::Char('h') => Some(Action::Dispatch(UiEvent::ShowScoreboard)),
                KeyCode::Esc => Some(Action::Dispatch(UiEvent::ReturnToWelcome)),
                _ => None,
            }
        }
        Screen::EndQuiz { initials, .. } => match key.code {
            KeyCode::Enter => Some(Action::Dispatch(UiEvent::InitialsSubmitted(
                initials.clone(),
            ))),
            KeyCode::Esc => Some(Action::Dispatch(UiEvent::ReturnToWelcome)),
            KeyCode::Backspace => {
                presenter.pop_initial();
                None
            }
            KeyCode::Char(c) if !c.is_control() => {
                presenter.push_initial(c);
                None
            }
            _ => None,
        },
        Screen::Scoreboard { .. } => match key.code {
            KeyCode::Char('b') | KeyCode::Backspace => {
                Some(Action::Dispatch(UiEvent::ReturnToWelcome))
            }
            KeyCode::Char('c') => Some(Action::Dispatch(UiEvent::ClearScoreboard)),
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        },
    }
}
