//! Player resources and stats, and the cost/payout records that move them.

use crate::fixed::{Amount, apply_percent};
use fixed::traits::ToFixed;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resource kinds
// ---------------------------------------------------------------------------

/// Every quantity a job can cost or pay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Money,
    Data,
    /// Owned compute units. Held (not spent) by active deliveries.
    Compute,
    Iq,
    Autonomy,
    Generality,
    Wonder,
}

impl Resource {
    /// Stats are whole-number counters that never receive the quality bonus.
    pub fn is_stat(self) -> bool {
        !matches!(self, Resource::Money | Resource::Data)
    }
}

// ---------------------------------------------------------------------------
// Costs and payouts
// ---------------------------------------------------------------------------

/// A single cost entry on a job type (unlock or run cost).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub resource: Resource,
    pub amount: Amount,
}

impl Cost {
    pub fn new<N: ToFixed>(resource: Resource, amount: N) -> Self {
        Self {
            resource,
            amount: Amount::from_num(amount),
        }
    }
}

/// A payout template on a job type. Only the minimum is stored; the
/// maximum is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub resource: Resource,
    pub min: u64,
}

impl Payout {
    pub fn new(resource: Resource, min: u64) -> Self {
        Self { resource, min }
    }

    /// `min` for small payouts, otherwise `floor(min * 1.3)`. Never below
    /// `min`.
    pub fn max(&self) -> u64 {
        if self.min <= 5 {
            self.min
        } else {
            self.min.saturating_add(self.min / 10 * 3 + self.min % 10 * 3 / 10)
        }
    }

    /// Whether this payout is rolled within a range (and may be doubled).
    pub fn is_ranged(&self) -> bool {
        self.min > 5
    }
}

/// A payout amount fixed at offer generation time.
///
/// Non-money amounts are always whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub resource: Resource,
    pub amount: Amount,
}

/// Apply the quality bonus to a rolled amount. Stats pass through
/// untouched; data is floored to a whole number.
pub fn apply_quality(resource: Resource, rolled: u64, quality_bonus: u32) -> Amount {
    let base = Amount::saturating_from_num(rolled);
    match resource {
        Resource::Money => apply_percent(base, quality_bonus),
        Resource::Data => apply_percent(base, quality_bonus).floor(),
        _ => base,
    }
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

/// Scalar player resources and bonuses.
///
/// Mutated only by job payouts, chapter bonuses, spending and debug tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub money: Amount,
    pub data: u64,
    /// Owned compute units.
    pub compute: u32,
    pub iq: u32,
    pub autonomy: u32,
    pub generality: u32,
    pub wonder: u32,
    /// Duration divisor in percent (100 = normal speed).
    pub speed_bonus: u32,
    /// Money/data payout multiplier in percent (100 = no bonus).
    pub quality_bonus: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            money: Amount::ZERO,
            data: 0,
            compute: 0,
            iq: 0,
            autonomy: 0,
            generality: 0,
            wonder: 0,
            speed_bonus: 100,
            quality_bonus: 100,
        }
    }
}

impl Progression {
    /// `iq + autonomy + generality`.
    pub fn agi_sum(&self) -> u32 {
        self.iq
            .saturating_add(self.autonomy)
            .saturating_add(self.generality)
    }

    /// Current value of a resource as an amount.
    pub fn get(&self, resource: Resource) -> Amount {
        match resource {
            Resource::Money => self.money,
            Resource::Data => Amount::from_num(self.data),
            Resource::Compute => Amount::from_num(self.compute),
            Resource::Iq => Amount::from_num(self.iq),
            Resource::Autonomy => Amount::from_num(self.autonomy),
            Resource::Generality => Amount::from_num(self.generality),
            Resource::Wonder => Amount::from_num(self.wonder),
        }
    }

    /// Add an amount to a resource. Negative amounts are ignored for stats,
    /// which never decrease.
    pub fn add(&mut self, resource: Resource, amount: Amount) {
        let whole = |a: Amount| -> u32 {
            if a <= Amount::ZERO {
                0
            } else {
                a.to_num::<u64>().min(u32::MAX as u64) as u32
            }
        };
        match resource {
            Resource::Money => self.money = self.money.saturating_add(amount),
            Resource::Data => {
                let delta = if amount <= Amount::ZERO { 0 } else { amount.to_num::<u64>() };
                self.data = self.data.saturating_add(delta);
            }
            Resource::Compute => self.compute = self.compute.saturating_add(whole(amount)),
            Resource::Iq => self.iq = self.iq.saturating_add(whole(amount)),
            Resource::Autonomy => self.autonomy = self.autonomy.saturating_add(whole(amount)),
            Resource::Generality => {
                self.generality = self.generality.saturating_add(whole(amount))
            }
            Resource::Wonder => self.wonder = self.wonder.saturating_add(whole(amount)),
        }
    }

    /// Whether money and data cover every spendable entry in `costs`, and
    /// `compute_available` covers every compute entry.
    pub fn can_afford(&self, costs: &[Cost], compute_available: u32) -> bool {
        costs.iter().all(|cost| match cost.resource {
            Resource::Money => self.money >= cost.amount,
            Resource::Data => Amount::from_num(self.data) >= cost.amount,
            Resource::Compute => Amount::from_num(compute_available) >= cost.amount,
            other => self.get(other) >= cost.amount,
        })
    }

    /// Deduct the money and data entries of `costs`. Compute and stat
    /// entries are requirements, not expenses.
    pub fn spend(&mut self, costs: &[Cost]) {
        for cost in costs {
            match cost.resource {
                Resource::Money => self.money = (self.money - cost.amount).max(Amount::ZERO),
                Resource::Data => {
                    let amount = cost.amount.max(Amount::ZERO).ceil().to_num::<u64>();
                    self.data = self.data.saturating_sub(amount);
                }
                _ => {}
            }
        }
    }
}

/// Sum of the compute entries in a cost list, as whole units.
pub fn compute_cost(costs: &[Cost]) -> u32 {
    costs
        .iter()
        .filter(|c| c.resource == Resource::Compute)
        .map(|c| c.amount.max(Amount::ZERO).ceil().to_num::<u64>().min(u32::MAX as u64) as u32)
        .fold(0u32, u32::saturating_add)
}
