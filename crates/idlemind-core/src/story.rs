//! Story screens, endings and per-story progress.
//!
//! Story text lives outside the core. The core only tracks which screen is
//! showing and, per story id, its completion flag, page index and the
//! player's choice.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::StoryId;

/// How a game ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ending {
    /// `iq + autonomy + generality` crossed the loss threshold.
    AgiThreshold,
    /// Enough wonders were completed.
    Wonder,
    /// A job type flagged as a bad end was unlocked; carries its ending id.
    Bad(String),
}

impl Ending {
    pub fn is_win(&self) -> bool {
        matches!(self, Ending::Wonder)
    }
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ending::AgiThreshold => f.write_str("ending_agi"),
            Ending::Wonder => f.write_str("ending_win"),
            Ending::Bad(id) => f.write_str(id),
        }
    }
}

/// The top-level screen. Anything other than `Main` pauses the tick.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Main,
    Story(StoryId),
    Ending(Ending),
}

impl Screen {
    pub fn is_main(&self) -> bool {
        matches!(self, Screen::Main)
    }
}

/// Progress through one story (chapter story or interlude).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryProgress {
    pub completed: bool,
    pub page: u32,
    pub choice: Option<String>,
}

/// Progress for every story the player has seen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryBook {
    entries: BTreeMap<StoryId, StoryProgress>,
}

impl StoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self, id: &StoryId) -> Option<&StoryProgress> {
        self.entries.get(id)
    }

    pub fn is_completed(&self, id: &StoryId) -> bool {
        self.entries.get(id).is_some_and(|p| p.completed)
    }

    pub fn mark_completed(&mut self, id: &StoryId) {
        self.entries.entry(id.clone()).or_default().completed = true;
    }

    /// Advance the page index; returns the new page.
    pub fn turn_page(&mut self, id: &StoryId) -> u32 {
        let entry = self.entries.entry(id.clone()).or_default();
        entry.page = entry.page.saturating_add(1);
        entry.page
    }

    pub fn set_choice(&mut self, id: &StoryId, choice: impl Into<String>) {
        self.entries.entry(id.clone()).or_default().choice = Some(choice.into());
    }

    pub fn choice(&self, id: &StoryId) -> Option<&str> {
        self.entries.get(id).and_then(|p| p.choice.as_deref())
    }
}
