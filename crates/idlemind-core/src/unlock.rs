//! Unlock sets, prerequisite checks and sticky visibility.
//!
//! The unlocked list is ordered by unlock time; generation biases toward
//! its tail. Everything else is a set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, JobType};
use crate::condition::{ConditionContext, all_met};
use crate::fixed::Seconds;
use crate::id::JobTypeId;
use crate::interlude::TriggerContext;
use crate::resource::Progression;

/// Which job types the player has unlocked, seen, spawned and completed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnlockState {
    unlocked: Vec<JobTypeId>,
    ever_visible: BTreeSet<JobTypeId>,
    completed_onetime: BTreeSet<JobTypeId>,
    spawned_onetime: BTreeSet<JobTypeId>,
    choice_unlocks: BTreeSet<JobTypeId>,
    jobs_run: BTreeSet<JobTypeId>,
}

impl UnlockState {
    /// Start with the given job types unlocked, in order. Duplicates are
    /// dropped.
    pub fn new(starting: &[JobTypeId]) -> Self {
        let mut state = Self::default();
        for id in starting {
            state.unlock(id.clone());
        }
        state
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Unlocked job types, oldest first.
    pub fn unlocked(&self) -> &[JobTypeId] {
        &self.unlocked
    }

    pub fn is_unlocked(&self, id: &JobTypeId) -> bool {
        self.unlocked.contains(id)
    }

    pub fn ever_visible(&self) -> &BTreeSet<JobTypeId> {
        &self.ever_visible
    }

    pub fn completed_onetime(&self) -> &BTreeSet<JobTypeId> {
        &self.completed_onetime
    }

    pub fn spawned_onetime(&self) -> &BTreeSet<JobTypeId> {
        &self.spawned_onetime
    }

    pub fn choice_unlocks(&self) -> &BTreeSet<JobTypeId> {
        &self.choice_unlocks
    }

    pub fn jobs_run(&self) -> &BTreeSet<JobTypeId> {
        &self.jobs_run
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Append to the unlocked list. Returns `false` if already unlocked.
    pub fn unlock(&mut self, id: JobTypeId) -> bool {
        if self.is_unlocked(&id) {
            return false;
        }
        self.ever_visible.insert(id.clone());
        self.unlocked.push(id);
        true
    }

    pub fn mark_spawned(&mut self, id: JobTypeId) -> bool {
        self.spawned_onetime.insert(id)
    }

    pub fn mark_completed(&mut self, id: JobTypeId) -> bool {
        self.completed_onetime.insert(id)
    }

    /// Record that a job of this type has finished at least once.
    pub fn record_run(&mut self, id: JobTypeId) -> bool {
        self.jobs_run.insert(id)
    }

    pub fn add_choice_unlock(&mut self, id: JobTypeId) -> bool {
        self.choice_unlocks.insert(id)
    }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    pub fn condition_context<'a>(&'a self, progression: &'a Progression) -> ConditionContext<'a> {
        ConditionContext {
            progression,
            unlocked: &self.unlocked,
            completed_onetime: &self.completed_onetime,
            choice_unlocks: &self.choice_unlocks,
        }
    }

    pub fn trigger_context<'a>(
        &'a self,
        progression: &'a Progression,
        chapter: u32,
        chapter_elapsed: Seconds,
    ) -> TriggerContext<'a> {
        TriggerContext {
            progression,
            unlocked: &self.unlocked,
            completed_onetime: &self.completed_onetime,
            jobs_run: &self.jobs_run,
            chapter,
            chapter_elapsed,
        }
    }

    /// Whether the job type's display conditions currently hold.
    pub fn can_display(&self, job: &JobType, progression: &Progression, chapter: u32) -> bool {
        job.available_in(chapter)
            && all_met(job.display_conditions(), &self.condition_context(progression))
    }

    /// Visible now or at any point in the past.
    pub fn is_visible(&self, job: &JobType, progression: &Progression, chapter: u32) -> bool {
        self.ever_visible.contains(&job.id) || self.can_display(job, progression, chapter)
    }

    /// Whether the player may unlock the job type right now: not yet
    /// unlocked, prerequisites met and unlock cost affordable. Compute
    /// unlock costs are checked against owned units.
    pub fn can_unlock(&self, job: &JobType, progression: &Progression) -> bool {
        !self.is_unlocked(&job.id)
            && all_met(&job.prerequisites, &self.condition_context(progression))
            && progression.can_afford(&job.unlock_cost, progression.compute)
    }

    /// Add every currently displayable type to the sticky set. Returns the
    /// newly visible ids.
    pub fn refresh_visibility(
        &mut self,
        catalog: &Catalog,
        progression: &Progression,
        chapter: u32,
    ) -> Vec<JobTypeId> {
        let fresh: Vec<JobTypeId> = catalog
            .jobs()
            .iter()
            .filter(|job| !self.ever_visible.contains(&job.id))
            .filter(|job| self.can_display(job, progression, chapter))
            .map(|job| job.id.clone())
            .collect();
        self.ever_visible.extend(fresh.iter().cloned());
        fresh
    }

    /// One-shot types that should be spawned now: unlocked, available in
    /// this chapter, never spawned and never completed. Unlock order.
    pub fn onetime_to_spawn<'a>(&self, catalog: &'a Catalog, chapter: u32) -> Vec<&'a JobType> {
        self.unlocked
            .iter()
            .filter_map(|id| catalog.job(id))
            .filter(|job| {
                job.is_onetime()
                    && job.available_in(chapter)
                    && !self.spawned_onetime.contains(&job.id)
                    && !self.completed_onetime.contains(&job.id)
            })
            .collect()
    }

    /// Types the generator may pick from: unlocked, known to the catalog,
    /// available in this chapter and not one-shot. Unlock order.
    pub fn generation_pool<'a>(&self, catalog: &'a Catalog, chapter: u32) -> Vec<&'a JobType> {
        self.unlocked
            .iter()
            .filter_map(|id| catalog.job(id))
            .filter(|job| !job.is_onetime() && job.available_in(chapter))
            .collect()
    }
}
