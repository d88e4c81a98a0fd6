//! The immutable content catalog: job types, interludes and chapters.
//!
//! Content is registered through a [`CatalogBuilder`] at startup and frozen
//! by [`CatalogBuilder::build`], which validates every cross-reference.
//! Lookups by unknown id return `None`; callers fall back to safe defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chapter::ChapterDef;
use crate::condition::Condition;
use crate::fixed::Fixed64;
use crate::id::{JobTypeId, StoryId};
use crate::interlude::InterludeDef;
use crate::resource::{Cost, Payout, Resource};

/// Icon used when a job type has none, or when the id is unknown.
pub const GENERIC_ICON: &str = "generic";

// ---------------------------------------------------------------------------
// Job types
// ---------------------------------------------------------------------------

/// What kind of job a type is. Drives generation eligibility and the dynamic
/// rejection formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JobCategory {
    #[default]
    Standard,
    /// Spawned at most once and completed at most once per save.
    Onetime,
    Tool,
    Gameplay,
}

/// Inclusive duration range in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min: u32,
    pub max: u32,
}

/// A job type template. Loaded at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobType {
    pub id: JobTypeId,
    pub name: String,
    /// Chapters in which the type may be offered. Empty means every chapter.
    pub chapters: Vec<u32>,
    /// All must hold before the type can be unlocked.
    pub prerequisites: Vec<Condition>,
    /// Overrides `prerequisites` for visibility only.
    pub display_triggers: Option<Vec<Condition>>,
    pub unlock_cost: Vec<Cost>,
    pub run_cost: Vec<Cost>,
    pub payouts: Vec<Payout>,
    pub duration: Option<DurationRange>,
    pub category: JobCategory,
    /// Base acceptance probability; `None` means always accepted.
    pub acceptance_chance: Option<Fixed64>,
    /// This type's own rejection chain. Empty means the shared pool is used.
    pub rejection_messages: Vec<String>,
    pub wonder: bool,
    /// Unlocking this type ends the game with the named ending.
    pub bad_end: Option<String>,
    pub icon: Option<String>,
}

impl JobType {
    /// A bare job type with no costs, payouts or conditions.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: JobTypeId::new(id),
            name: name.into(),
            chapters: Vec::new(),
            prerequisites: Vec::new(),
            display_triggers: None,
            unlock_cost: Vec::new(),
            run_cost: Vec::new(),
            payouts: Vec::new(),
            duration: None,
            category: JobCategory::Standard,
            acceptance_chance: None,
            rejection_messages: Vec::new(),
            wonder: false,
            bad_end: None,
            icon: None,
        }
    }

    pub fn is_onetime(&self) -> bool {
        self.category == JobCategory::Onetime
    }

    /// Whether the type may appear in the given chapter.
    pub fn available_in(&self, chapter: u32) -> bool {
        self.chapters.is_empty() || self.chapters.contains(&chapter)
    }

    /// The conditions that decide whether the type is shown.
    pub fn display_conditions(&self) -> &[Condition] {
        self.display_triggers
            .as_deref()
            .unwrap_or(&self.prerequisites)
    }

    /// Minimum money payout, or 0 if the type pays no money.
    pub fn min_money_payout(&self) -> u64 {
        self.payouts
            .iter()
            .filter(|p| p.resource == Resource::Money)
            .map(|p| p.min)
            .max()
            .unwrap_or(0)
    }

    pub fn icon(&self) -> &str {
        self.icon.as_deref().unwrap_or(GENERIC_ICON)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while registering or validating content.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate job type id: {0}")]
    DuplicateJob(JobTypeId),

    #[error("duplicate story id: {0}")]
    DuplicateStory(StoryId),

    #[error("duplicate chapter number: {0}")]
    DuplicateChapter(u32),

    #[error("{owner} references unknown job type {job}")]
    UnknownJob { owner: String, job: JobTypeId },

    #[error("{owner} references unknown interlude {story}")]
    UnknownInterlude { owner: String, story: StoryId },

    #[error("job type {0} has an empty or inverted duration range")]
    InvalidDuration(JobTypeId),

    #[error("chapters must be numbered consecutively from 1; missing chapter {0}")]
    ChapterGap(u32),

    #[error("config field {field} is out of range: {value}")]
    InvalidConfig { field: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects content before freezing it into a [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    jobs: Vec<JobType>,
    job_index: HashMap<JobTypeId, usize>,
    interludes: Vec<InterludeDef>,
    interlude_index: HashMap<StoryId, usize>,
    chapters: Vec<ChapterDef>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job type. Catalog order is registration order.
    pub fn register_job(&mut self, job: JobType) -> Result<&mut Self, CatalogError> {
        if self.job_index.contains_key(&job.id) {
            return Err(CatalogError::DuplicateJob(job.id));
        }
        if let Some(range) = job.duration
            && range.min > range.max
        {
            return Err(CatalogError::InvalidDuration(job.id));
        }
        self.job_index.insert(job.id.clone(), self.jobs.len());
        self.jobs.push(job);
        Ok(self)
    }

    pub fn register_interlude(&mut self, interlude: InterludeDef) -> Result<&mut Self, CatalogError> {
        if self.interlude_index.contains_key(&interlude.id)
            || self.chapters.iter().any(|c| c.story == interlude.id)
        {
            return Err(CatalogError::DuplicateStory(interlude.id));
        }
        self.interlude_index
            .insert(interlude.id.clone(), self.interludes.len());
        self.interludes.push(interlude);
        Ok(self)
    }

    pub fn register_chapter(&mut self, chapter: ChapterDef) -> Result<&mut Self, CatalogError> {
        if self.chapters.iter().any(|c| c.number == chapter.number) {
            return Err(CatalogError::DuplicateChapter(chapter.number));
        }
        if self
            .interlude_index
            .contains_key(&chapter.story)
            || self.chapters.iter().any(|c| c.story == chapter.story)
        {
            return Err(CatalogError::DuplicateStory(chapter.story));
        }
        self.chapters.push(chapter);
        Ok(self)
    }

    /// Validate cross-references and freeze the catalog.
    pub fn build(mut self) -> Result<Catalog, CatalogError> {
        for job in &self.jobs {
            let conditions = job
                .prerequisites
                .iter()
                .chain(job.display_triggers.iter().flatten());
            for cond in conditions {
                if let Some(target) = cond.referenced_job()
                    && !self.job_index.contains_key(target)
                {
                    return Err(CatalogError::UnknownJob {
                        owner: format!("job type {}", job.id),
                        job: target.clone(),
                    });
                }
            }
        }

        for interlude in &self.interludes {
            if let Some(target) = interlude.trigger.referenced_job()
                && !self.job_index.contains_key(target)
            {
                return Err(CatalogError::UnknownJob {
                    owner: format!("interlude {}", interlude.id),
                    job: target.clone(),
                });
            }
        }

        self.chapters.sort_by_key(|c| c.number);
        for (i, chapter) in self.chapters.iter().enumerate() {
            let expected = i as u32 + 1;
            if chapter.number != expected {
                return Err(CatalogError::ChapterGap(expected));
            }
        }

        Ok(Catalog {
            jobs: self.jobs,
            job_index: self.job_index,
            interludes: self.interludes,
            interlude_index: self.interlude_index,
            chapters: self.chapters,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable content catalog. Frozen after build; share it with `Arc`.
#[derive(Debug, Clone)]
pub struct Catalog {
    jobs: Vec<JobType>,
    job_index: HashMap<JobTypeId, usize>,
    interludes: Vec<InterludeDef>,
    interlude_index: HashMap<StoryId, usize>,
    chapters: Vec<ChapterDef>,
}

impl Catalog {
    /// Job types in catalog order.
    pub fn jobs(&self) -> &[JobType] {
        &self.jobs
    }

    pub fn job(&self, id: &JobTypeId) -> Option<&JobType> {
        self.job_index.get(id).map(|&i| &self.jobs[i])
    }

    pub fn contains_job(&self, id: &JobTypeId) -> bool {
        self.job_index.contains_key(id)
    }

    /// Interlude definitions in catalog order.
    pub fn interludes(&self) -> &[InterludeDef] {
        &self.interludes
    }

    pub fn interlude(&self, id: &StoryId) -> Option<&InterludeDef> {
        self.interlude_index.get(id).map(|&i| &self.interludes[i])
    }

    /// Chapters ordered by number, starting at 1.
    pub fn chapters(&self) -> &[ChapterDef] {
        &self.chapters
    }

    pub fn chapter(&self, number: u32) -> Option<&ChapterDef> {
        number
            .checked_sub(1)
            .and_then(|i| self.chapters.get(i as usize))
    }

    /// The chapter whose story has the given id.
    pub fn chapter_for_story(&self, story: &StoryId) -> Option<&ChapterDef> {
        self.chapters.iter().find(|c| &c.story == story)
    }

    /// Icon for a job type id, falling back to the generic icon.
    pub fn icon_for(&self, id: &JobTypeId) -> &str {
        self.job(id).map(JobType::icon).unwrap_or(GENERIC_ICON)
    }

    /// Check an interlude id list (e.g. a configured warning sequence)
    /// against the catalog.
    pub fn validate_interlude_ids<'a>(
        &self,
        owner: &str,
        ids: impl IntoIterator<Item = &'a StoryId>,
    ) -> Result<(), CatalogError> {
        for id in ids {
            if !self.interlude_index.contains_key(id) {
                return Err(CatalogError::UnknownInterlude {
                    owner: owner.to_string(),
                    story: id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Check a job id list against the catalog.
    pub fn validate_job_ids<'a>(
        &self,
        owner: &str,
        ids: impl IntoIterator<Item = &'a JobTypeId>,
    ) -> Result<(), CatalogError> {
        for id in ids {
            if !self.contains_job(id) {
                return Err(CatalogError::UnknownJob {
                    owner: owner.to_string(),
                    job: id.clone(),
                });
            }
        }
        Ok(())
    }
}
