//! The mutable, serializable part of a session.
//!
//! `GameState` is what an external save mechanism would persist. The RNG
//! state is kept next to it on the session and exposed separately.

use serde::{Deserialize, Serialize};

use crate::acceptance::RejectionBook;
use crate::config::GameConfig;
use crate::delivery::JobQueue;
use crate::fixed::Seconds;
use crate::interlude::InterludeQueue;
use crate::resource::Progression;
use crate::story::{Ending, Screen, StoryBook};
use crate::unlock::UnlockState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub progression: Progression,
    pub unlocks: UnlockState,
    pub queue: JobQueue,
    pub rejections: RejectionBook,
    pub stories: StoryBook,
    pub interludes: InterludeQueue,
    /// Current chapter, starting at 1.
    pub chapter: u32,
    /// Unpaused seconds spent in the current chapter.
    pub chapter_elapsed: Seconds,
    pub screen: Screen,
    pub total_completions: u64,
    /// Seconds accumulated toward the next automatic offer.
    pub offer_timer: Seconds,
    /// Display name of the job that last paid out wonder.
    pub last_wonder: Option<String>,
    pub ending: Option<Ending>,
}

impl GameState {
    /// Fresh state from the configured starting values.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            progression: config.starting.progression(),
            unlocks: UnlockState::new(&config.starting.unlocked),
            queue: JobQueue::new(),
            rejections: RejectionBook::new(),
            stories: StoryBook::new(),
            interludes: InterludeQueue::new(),
            chapter: 1,
            chapter_elapsed: Seconds::ZERO,
            screen: Screen::Main,
            total_completions: 0,
            offer_timer: Seconds::ZERO,
            last_wonder: None,
            ending: None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.ending.is_some()
    }

    /// Main screen showing and the game still running.
    pub fn is_running(&self) -> bool {
        !self.is_game_over() && self.screen.is_main()
    }

    /// Owned compute minus what active deliveries hold.
    pub fn available_compute(&self) -> u32 {
        self.progression
            .compute
            .saturating_sub(self.queue.compute_held())
    }
}
