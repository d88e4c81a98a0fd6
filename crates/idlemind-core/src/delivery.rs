//! Job offers and active deliveries.
//!
//! A [`DeliveryJob`] is a generated offer waiting in the queue with its
//! payouts already rolled. Accepting it turns it into an [`ActiveDelivery`]
//! that counts down and resolves exactly once.

use serde::{Deserialize, Serialize};

use crate::fixed::Seconds;
use crate::id::{DeliveryId, JobTypeId};
use crate::resource::Reward;

/// A queued job offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryJob {
    pub id: DeliveryId,
    pub job_type: JobTypeId,
    /// Seconds, after the speed bonus.
    pub duration: u32,
    pub rewards: Vec<Reward>,
}

/// An accepted job counting down to its payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDelivery {
    pub job: DeliveryJob,
    pub time_remaining: Seconds,
    /// Compute units reserved until the delivery resolves.
    pub compute_held: u32,
}

impl ActiveDelivery {
    pub fn new(job: DeliveryJob, compute_held: u32) -> Self {
        let time_remaining = Seconds::saturating_from_num(job.duration);
        Self {
            job,
            time_remaining,
            compute_held,
        }
    }

    /// Subtract `delta` from the countdown. Returns `true` once the
    /// delivery is due; the owner removes it on resolution.
    pub fn advance(&mut self, delta: Seconds) -> bool {
        self.time_remaining = self.time_remaining.saturating_sub(delta);
        self.time_remaining <= Seconds::ZERO
    }

    /// Fraction complete in `[0, 1]`, for progress bars.
    pub fn progress(&self) -> Seconds {
        if self.job.duration == 0 {
            return Seconds::from_num(1);
        }
        let total = Seconds::saturating_from_num(self.job.duration);
        let done = (total - self.time_remaining.max(Seconds::ZERO)).max(Seconds::ZERO);
        (done / total).min(Seconds::from_num(1))
    }
}

/// Pending offers, active deliveries and the offer id counter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobQueue {
    offers: Vec<DeliveryJob>,
    active: Vec<ActiveDelivery>,
    next_id: u64,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next offer id. Ids are never reused.
    pub fn allocate_id(&mut self) -> DeliveryId {
        self.next_id += 1;
        DeliveryId(self.next_id)
    }

    pub fn push_offer(&mut self, job: DeliveryJob) {
        self.offers.push(job);
    }

    pub fn offers(&self) -> &[DeliveryJob] {
        &self.offers
    }

    pub fn offer(&self, id: DeliveryId) -> Option<&DeliveryJob> {
        self.offers.iter().find(|o| o.id == id)
    }

    pub fn remove_offer(&mut self, id: DeliveryId) -> Option<DeliveryJob> {
        let idx = self.offers.iter().position(|o| o.id == id)?;
        Some(self.offers.remove(idx))
    }

    /// How many queued offers are of the given type.
    pub fn count_of_type(&self, job_type: &JobTypeId) -> usize {
        self.offers.iter().filter(|o| &o.job_type == job_type).count()
    }

    pub fn active(&self) -> &[ActiveDelivery] {
        &self.active
    }

    pub(crate) fn active_mut(&mut self) -> &mut Vec<ActiveDelivery> {
        &mut self.active
    }

    /// Move an accepted offer into the active set.
    pub fn start(&mut self, job: DeliveryJob, compute_held: u32) {
        self.active.push(ActiveDelivery::new(job, compute_held));
    }

    /// Compute units reserved by all active deliveries.
    pub fn compute_held(&self) -> u32 {
        self.active
            .iter()
            .map(|a| a.compute_held)
            .fold(0u32, u32::saturating_add)
    }
}
