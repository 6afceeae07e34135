use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{info, warn};

use crate::error::ScoreboardError;
use crate::storage::BlobStore;

/// Key of the persisted scoreboard blob.
pub const SCOREBOARD_KEY: &str = "Scoreboard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardEntry {
    pub initials: String,
    pub score: u64,
}

impl ScoreboardEntry {
    pub fn new(initials: impl Into<String>, score: u64) -> Self {
        Self {
            initials: initials.into(),
            score,
        }
    }
}

/// Higher scores first; equal scores compare equal so a stable sort keeps
/// them in insertion order.
pub fn compare_scores(a: &ScoreboardEntry, b: &ScoreboardEntry) -> Ordering {
    if a.score > b.score {
        Ordering::Less
    } else if a.score < b.score {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Ranked record of past players, mirrored to a [`BlobStore`].
///
/// `add` is a read-modify-write of the persisted blob. Share a store between
/// threads only behind a `Mutex`.
#[derive(Debug)]
pub struct ScoreboardStore<S: BlobStore> {
    storage: S,
    entries: Vec<ScoreboardEntry>,
}

impl<S: BlobStore> ScoreboardStore<S> {
    /// Starts empty; call [`load`](Self::load) to pick up persisted entries.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            entries: Vec::new(),
        }
    }

    /// Replaces the in-memory scoreboard with the persisted one. Missing,
    /// unreadable or malformed data yields an empty scoreboard.
    pub fn load(&mut self) {
        self.entries = match self.storage.get(SCOREBOARD_KEY) {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<ScoreboardEntry>>(&blob) {
                Ok(mut entries) => {
                    entries.sort_by(compare_scores);
                    entries
                }
                Err(e) => {
                    warn!("discarding malformed scoreboard: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("unable to read scoreboard, starting empty: {e}");
                Vec::new()
            }
        };
    }

    pub fn add(&mut self, initials: &str, score: u64) -> Result<(), ScoreboardError> {
        let initials = initials.trim();
        if initials.is_empty() {
            return Err(ScoreboardError::EmptyInitials);
        }

        let mut entries = self.entries.clone();
        entries.push(ScoreboardEntry::new(initials, score));
        entries.sort_by(compare_scores);
        self.save(&entries)?;
        self.entries = entries;
        info!(initials, score, "scoreboard entry added");
        Ok(())
    }

    pub fn get_all(&self) -> &[ScoreboardEntry] {
        &self.entries
    }

    /// Empties the scoreboard and deletes the persisted blob itself.
    pub fn clear(&mut self) -> Result<(), ScoreboardError> {
        self.storage.remove(SCOREBOARD_KEY)?;
        self.entries.clear();
        info!("scoreboard cleared");
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // Memory only follows once the write has gone through.
    fn save(&mut self, entries: &[ScoreboardEntry]) -> Result<(), ScoreboardError> {
        let blob = serde_json::to_string(entries)?;
        self.storage.set(SCOREBOARD_KEY, &blob)?;
        Ok(())
    }
}
