use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::QuizError;
use crate::scoring::ScoringStrategy;
use crate::session::GameParameters;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub countdown_start_seconds: u32,
    pub incorrect_penalty_seconds: u32,
    pub points_per_correct_answer: u32,
    pub scoring: ScoringStrategy,
    /// Question bank file to use instead of the built-in one.
    pub question_bank: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let params = GameParameters::default();
        Self {
            countdown_start_seconds: params.countdown_start_seconds(),
            incorrect_penalty_seconds: params.incorrect_penalty_seconds(),
            points_per_correct_answer: params.points_per_correct_answer(),
            scoring: params.scoring(),
            question_bank: None,
        }
    }
}

impl TryFrom<&Config> for GameParameters {
    type Error = QuizError;

    fn try_from(cfg: &Config) -> Result<Self, Self::Error> {
        GameParameters::new(
            cfg.countdown_start_seconds,
            cfg.incorrect_penalty_seconds,
            cfg.points_per_correct_answer,
            cfg.scoring,
        )
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("quizr_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!("ignoring unreadable config {}: {e}", self.path.display()),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
