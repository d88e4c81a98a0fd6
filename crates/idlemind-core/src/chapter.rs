//! Chapter definitions and the chapter-advance watcher.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::id::StoryId;
use crate::resource::Progression;
use crate::story::StoryBook;

/// The numeric gate for entering a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChapterThreshold {
    Completions(u64),
    Iq(u32),
    Generality(u32),
    Autonomy(u32),
}

impl ChapterThreshold {
    pub fn is_met(&self, progression: &Progression, completions: u64) -> bool {
        match *self {
            ChapterThreshold::Completions(n) => completions >= n,
            ChapterThreshold::Iq(n) => progression.iq >= n,
            ChapterThreshold::Generality(n) => progression.generality >= n,
            ChapterThreshold::Autonomy(n) => progression.autonomy >= n,
        }
    }
}

/// Bonus granted when a chapter's story is finished with a given choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceBonus {
    pub choice: String,
    /// Added to the speed bonus percentage.
    pub speed_bonus: u32,
    /// Added to the quality bonus percentage.
    pub quality_bonus: u32,
    /// Compute units granted.
    pub compute: u32,
}

impl ChoiceBonus {
    pub fn apply(&self, progression: &mut Progression) {
        progression.speed_bonus = progression.speed_bonus.saturating_add(self.speed_bonus);
        progression.quality_bonus = progression.quality_bonus.saturating_add(self.quality_bonus);
        progression.compute = progression.compute.saturating_add(self.compute);
    }
}

/// A chapter: its number, its opening story and its entry gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDef {
    pub number: u32,
    pub story: StoryId,
    pub threshold: ChapterThreshold,
    pub choice_bonuses: Vec<ChoiceBonus>,
}

impl ChapterDef {
    pub fn new(number: u32, story: impl Into<String>, threshold: ChapterThreshold) -> Self {
        Self {
            number,
            story: StoryId::new(story),
            threshold,
            choice_bonuses: Vec::new(),
        }
    }

    pub fn bonus_for(&self, choice: &str) -> Option<&ChoiceBonus> {
        self.choice_bonuses.iter().find(|b| b.choice == choice)
    }
}

/// The chapter after `current`, if its threshold is met and its story has
/// not already been completed.
pub fn next_chapter<'a>(
    catalog: &'a Catalog,
    current: u32,
    progression: &Progression,
    completions: u64,
    stories: &StoryBook,
) -> Option<&'a ChapterDef> {
    let next = catalog.chapter(current.checked_add(1)?)?;
    if next.threshold.is_met(progression, completions) && !stories.is_completed(&next.story) {
        Some(next)
    } else {
        None
    }
}
