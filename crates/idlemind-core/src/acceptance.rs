//! Offer acceptance odds and the per-offer rejection state machine.
//!
//! State 0 is an untouched offer. A failed acceptance roll moves it to
//! state 1 and fixes a rejection chain for it; each further click shows
//! the next line. Once the state passes the chain length the offer is
//! declined. A chain of `N` lines therefore takes `N + 1` clicks in total.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{JobCategory, JobType};
use crate::fixed::Fixed64;
use crate::id::DeliveryId;
use crate::resource::Progression;

/// Lowest acceptance the stat-driven formula can push a job to.
pub fn acceptance_floor() -> Fixed64 {
    Fixed64::from_num(0.6)
}

/// Stat-driven rejection chance for tool and gameplay jobs:
/// `((autonomy - 0.5) * 4 + (generality - 1) + (iq - 2) * 0.5) / 100`.
pub fn dynamic_rejection(progression: &Progression) -> Fixed64 {
    let stat = |v: u32| Fixed64::saturating_from_num(v);
    let autonomy = (stat(progression.autonomy) - Fixed64::from_num(0.5))
        .saturating_mul(Fixed64::from_num(4));
    let generality = stat(progression.generality) - Fixed64::from_num(1);
    let iq = (stat(progression.iq) - Fixed64::from_num(2)).saturating_mul(Fixed64::from_num(0.5));
    autonomy.saturating_add(generality).saturating_add(iq) / Fixed64::from_num(100)
}

/// Probability that a click accepts an offer of this type. Unknown types
/// are always accepted.
pub fn acceptance_probability(job: Option<&JobType>, progression: &Progression) -> Fixed64 {
    let Some(job) = job else {
        return Fixed64::from_num(1);
    };
    let base = job.acceptance_chance.unwrap_or(Fixed64::from_num(1));
    let dynamic = matches!(job.category, JobCategory::Tool | JobCategory::Gameplay)
        && progression.autonomy >= 1
        && progression.generality >= 1;
    if !dynamic {
        return base;
    }
    let formula = (Fixed64::from_num(1) - dynamic_rejection(progression)).max(acceptance_floor());
    base.min(formula)
}

/// Rejection progress of one offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub state: u32,
    pub chain: Vec<String>,
}

/// What a click on an already-rejected offer does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionStep {
    /// Show this line; the offer stays queued.
    Message { state: u32, message: String },
    /// The chain is exhausted; decline the offer.
    Exhausted,
}

/// Rejection state for every offer that has been refused at least once,
/// plus the round-robin cursor into the shared chain pool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RejectionBook {
    entries: BTreeMap<DeliveryId, Rejection>,
    pool_cursor: usize,
}

impl RejectionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for an offer; 0 when it has never been refused.
    pub fn state(&self, id: DeliveryId) -> u32 {
        self.entries.get(&id).map_or(0, |r| r.state)
    }

    pub fn get(&self, id: DeliveryId) -> Option<&Rejection> {
        self.entries.get(&id)
    }

    pub fn clear(&mut self, id: DeliveryId) {
        self.entries.remove(&id);
    }

    /// The job's own chain, or the next chain from the shared pool.
    pub fn select_chain(&mut self, job: Option<&JobType>, pool: &[Vec<String>]) -> Vec<String> {
        if let Some(job) = job
            && !job.rejection_messages.is_empty()
        {
            return job.rejection_messages.clone();
        }
        if pool.is_empty() {
            return Vec::new();
        }
        let chain = pool[self.pool_cursor % pool.len()].clone();
        self.pool_cursor = (self.pool_cursor + 1) % pool.len();
        chain
    }

    /// Record the first refusal. Returns the step for this click.
    pub fn begin(&mut self, id: DeliveryId, chain: Vec<String>) -> RejectionStep {
        let step = match chain.first() {
            Some(first) => RejectionStep::Message {
                state: 1,
                message: first.clone(),
            },
            None => RejectionStep::Exhausted,
        };
        if step == RejectionStep::Exhausted {
            self.entries.remove(&id);
        } else {
            self.entries.insert(id, Rejection { state: 1, chain });
        }
        step
    }

    /// Advance an already-refused offer by one click.
    pub fn advance(&mut self, id: DeliveryId) -> RejectionStep {
        let Some(entry) = self.entries.get_mut(&id) else {
            return RejectionStep::Exhausted;
        };
        entry.state += 1;
        let state = entry.state;
        if state as usize > entry.chain.len() {
            self.entries.remove(&id);
            return RejectionStep::Exhausted;
        }
        RejectionStep::Message {
            state,
            message: entry.chain[state as usize - 1].clone(),
        }
    }
}
