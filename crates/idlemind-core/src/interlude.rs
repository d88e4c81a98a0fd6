//! Interlude definitions, triggers and the pending-interlude queue.
//!
//! An interlude with a job-count delay waits in an ordered queue; the head
//! entry counts down one per completed job. Members of the configured AGI
//! warning sequence always keep their fixed relative order in the queue,
//! whatever order their triggers fire in.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::fixed::{Amount, Seconds};
use crate::id::{JobTypeId, StoryId};
use crate::resource::Progression;

/// The state threshold that fires an interlude.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    Money(Amount),
    Data(u64),
    Iq(u32),
    Autonomy(u32),
    Generality(u32),
    /// `iq + autonomy + generality` at or above the value.
    AgiSum(u32),
    /// A one-shot job type has been completed.
    CompletedJob(JobTypeId),
    UnlockedJob(JobTypeId),
    /// A job type has been run to completion at least once.
    JobRun(JobTypeId),
    /// Unpaused seconds spent in the given chapter.
    ChapterTime { chapter: u32, seconds: Seconds },
}

/// State a trigger is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct TriggerContext<'a> {
    pub progression: &'a Progression,
    pub unlocked: &'a [JobTypeId],
    pub completed_onetime: &'a BTreeSet<JobTypeId>,
    pub jobs_run: &'a BTreeSet<JobTypeId>,
    pub chapter: u32,
    pub chapter_elapsed: Seconds,
}

impl Trigger {
    pub fn is_met(&self, ctx: &TriggerContext<'_>) -> bool {
        let p = ctx.progression;
        match self {
            Trigger::Money(min) => p.money >= *min,
            Trigger::Data(min) => p.data >= *min,
            Trigger::Iq(min) => p.iq >= *min,
            Trigger::Autonomy(min) => p.autonomy >= *min,
            Trigger::Generality(min) => p.generality >= *min,
            Trigger::AgiSum(min) => p.agi_sum() >= *min,
            Trigger::CompletedJob(id) => ctx.completed_onetime.contains(id),
            Trigger::UnlockedJob(id) => ctx.unlocked.contains(id),
            Trigger::JobRun(id) => ctx.jobs_run.contains(id),
            Trigger::ChapterTime { chapter, seconds } => {
                ctx.chapter == *chapter && ctx.chapter_elapsed >= *seconds
            }
        }
    }

    pub fn referenced_job(&self) -> Option<&JobTypeId> {
        match self {
            Trigger::CompletedJob(id) | Trigger::UnlockedJob(id) | Trigger::JobRun(id) => Some(id),
            _ => None,
        }
    }
}

/// A one-shot narrative interstitial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterludeDef {
    pub id: StoryId,
    pub trigger: Trigger,
    /// Completed jobs to wait before showing. `None` opens immediately
    /// (unless the interlude belongs to the AGI warning sequence).
    pub delay_jobs: Option<u32>,
}

impl InterludeDef {
    pub fn new(id: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            id: StoryId::new(id),
            trigger,
            delay_jobs: None,
        }
    }

    /// Job-count delay for this interlude, or `None` to open it at once.
    pub fn delay(&self, agi_sequence: &[StoryId], agi_default_delay: u32) -> Option<u32> {
        if agi_sequence.contains(&self.id) {
            Some(self.delay_jobs.unwrap_or(agi_default_delay))
        } else {
            self.delay_jobs
        }
    }
}

// ---------------------------------------------------------------------------
// Pending queue
// ---------------------------------------------------------------------------

/// An interlude waiting for `jobs_remaining` more completions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInterlude {
    pub id: StoryId,
    pub jobs_remaining: u32,
}

/// Ordered queue of deferred interludes. Only the head counts down.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterludeQueue {
    pending: VecDeque<PendingInterlude>,
}

impl InterludeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, id: &StoryId) -> bool {
        self.pending.iter().any(|p| &p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingInterlude> {
        self.pending.iter()
    }

    pub fn head(&self) -> Option<&PendingInterlude> {
        self.pending.front()
    }

    /// Queue an interlude. Members of `agi_sequence` are placed before the
    /// first queued member that comes later in the sequence; everything
    /// else goes to the tail. Already-queued ids are ignored.
    pub fn enqueue(&mut self, id: StoryId, jobs_remaining: u32, agi_sequence: &[StoryId]) {
        if self.contains(&id) {
            return;
        }
        let entry = PendingInterlude { id, jobs_remaining };
        let Some(rank) = agi_sequence.iter().position(|s| *s == entry.id) else {
            self.pending.push_back(entry);
            return;
        };
        let slot = self.pending.iter().position(|p| {
            agi_sequence
                .iter()
                .position(|s| *s == p.id)
                .is_some_and(|other| other > rank)
        });
        match slot {
            Some(i) => self.pending.insert(i, entry),
            None => self.pending.push_back(entry),
        }
    }

    /// Count one completed job against the head entry. Returns `true` if
    /// the head is now ready to show.
    pub fn count_completion(&mut self) -> bool {
        match self.pending.front_mut() {
            Some(head) => {
                head.jobs_remaining = head.jobs_remaining.saturating_sub(1);
                head.jobs_remaining == 0
            }
            None => false,
        }
    }

    /// Whether the head entry has finished counting down.
    pub fn head_ready(&self) -> bool {
        self.pending.front().is_some_and(|h| h.jobs_remaining == 0)
    }

    /// Remove and return the head if it is ready.
    pub fn pop_ready(&mut self) -> Option<StoryId> {
        if self.head_ready() {
            self.pending.pop_front().map(|p| p.id)
        } else {
            None
        }
    }
}
