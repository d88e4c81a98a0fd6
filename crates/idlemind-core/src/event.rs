//! Events recorded by a session for the presentation layer.
//!
//! The session appends events as they happen; the UI drains them once per
//! frame. Events are transient and never part of a save.

use crate::fixed::Seconds;
use crate::id::{DeliveryId, JobTypeId, StoryId};
use crate::resource::Reward;
use crate::story::Ending;

/// Something that happened inside a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    OfferAdded {
        id: DeliveryId,
        job_type: JobTypeId,
    },
    OfferAccepted {
        id: DeliveryId,
        job_type: JobTypeId,
        duration: Seconds,
    },
    /// A click was refused; `message` is the current line of the chain.
    OfferRejected {
        id: DeliveryId,
        state: u32,
        message: String,
    },
    OfferDeclined {
        id: DeliveryId,
    },
    DeliveryCompleted {
        id: DeliveryId,
        job_type: JobTypeId,
        rewards: Vec<Reward>,
    },
    JobUnlocked {
        job_type: JobTypeId,
    },
    OnetimeSpawned {
        id: DeliveryId,
        job_type: JobTypeId,
    },
    InterludeQueued {
        story: StoryId,
        jobs_remaining: u32,
    },
    StoryOpened {
        story: StoryId,
    },
    StoryClosed {
        story: StoryId,
    },
    ChapterAdvanced {
        chapter: u32,
    },
    /// The "story choice made" channel.
    ChoiceMade {
        story: StoryId,
        choice: String,
        unlocks: Option<JobTypeId>,
    },
    GameEnded {
        ending: Ending,
    },
}

/// Append-only event buffer drained by the UI.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
    total_written: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
        self.total_written += 1;
    }

    /// Drain all pending events. Returns events and clears the internal list.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get a read-only view of pending events.
    pub fn pending(&self) -> &[GameEvent] {
        &self.events
    }

    /// Events ever recorded, drained or not.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_clears_but_keeps_count() {
        let mut log = EventLog::new();
        log.push(GameEvent::ChapterAdvanced { chapter: 2 });
        log.push(GameEvent::OfferDeclined { id: DeliveryId(1) });
        assert_eq!(log.pending().len(), 2);

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.pending().is_empty());
        assert_eq!(log.total_written(), 2);
    }
}
