//! Job offer generation.
//!
//! Picks a job type through a chain of probabilistic gates (first match
//! wins), then rolls its duration and payouts. Generation is read-only with
//! respect to the session apart from the RNG; the caller assigns the offer
//! id and queues it.
//!
//! Gate order:
//!
//! 1. Starter job for the first `starter_completions` completions.
//! 2. Recency bias: 20% most recent, 10% second, then 7%/7% third and
//!    fourth once at least six types are unlocked.
//! 3. Web-scrape job at 8% from `web_scrape_min_chapter` on.
//! 4. 15% highest minimum money payout.
//! 5. Uniform.

use crate::catalog::{Catalog, JobType};
use crate::config::GameConfig;
use crate::delivery::{DeliveryJob, JobQueue};
use crate::fixed::{Fixed64, percent};
use crate::id::{DeliveryId, JobTypeId};
use crate::resource::{Payout, Progression, Reward, apply_quality};
use crate::rng::SimRng;
use crate::unlock::UnlockState;

/// Reroll attempts made by [`generate_distinct`].
pub const MAX_REROLLS: usize = 10;

/// Unlocked types needed before the third and fourth recency gates open.
const RECENCY_DEEP_MIN_UNLOCKED: usize = 6;
const DOUBLING_THRESHOLD: u64 = 100;

/// Everything generation reads.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub catalog: &'a Catalog,
    pub config: &'a GameConfig,
    pub progression: &'a Progression,
    pub unlocks: &'a UnlockState,
    pub chapter: u32,
    pub total_completions: u64,
}

/// A generated offer before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferDraft {
    pub job_type: JobTypeId,
    pub duration: u32,
    pub rewards: Vec<Reward>,
}

impl OfferDraft {
    pub fn into_job(self, id: DeliveryId) -> DeliveryJob {
        DeliveryJob {
            id,
            job_type: self.job_type,
            duration: self.duration,
            rewards: self.rewards,
        }
    }
}

// ---------------------------------------------------------------------------
// Rolls
// ---------------------------------------------------------------------------

/// Longest duration an offer may carry; the largest whole number of seconds
/// a [`Seconds`] value holds.
pub const MAX_DURATION: u32 = i32::MAX as u32;

/// Scale a base duration by the speed bonus, rounding down. Capped at
/// [`MAX_DURATION`].
pub fn apply_speed(seconds: u32, speed_bonus: u32) -> u32 {
    let scaled = u64::from(seconds) * 100 / u64::from(speed_bonus.max(1));
    scaled.min(u64::from(MAX_DURATION)) as u32
}

/// Roll a duration from the type's range, or the configured default.
pub fn roll_duration(job: &JobType, default_duration: u32, speed_bonus: u32, rng: &mut SimRng) -> u32 {
    let base = match job.duration {
        Some(range) => {
            let spread = u64::from(range.max.saturating_sub(range.min));
            range.min.saturating_add(rng.up_to(spread) as u32)
        }
        None => default_duration,
    };
    apply_speed(base, speed_bonus)
}

/// Roll one payout before quality: `[min, max]` for ranged payouts, `min`
/// otherwise, then the 30% double and the nested 10% second double for
/// large ranged rolls.
pub fn roll_amount(payout: &Payout, rng: &mut SimRng) -> u64 {
    if !payout.is_ranged() {
        return payout.min;
    }
    let mut amount = payout.min + rng.up_to(payout.max() - payout.min);
    if amount >= DOUBLING_THRESHOLD && rng.chance(percent(30)) {
        amount = amount.saturating_mul(2);
        if rng.chance(percent(10)) {
            amount = amount.saturating_mul(2);
        }
    }
    amount
}

/// Roll every payout independently and apply the quality bonus.
pub fn roll_payouts(payouts: &[Payout], quality_bonus: u32, rng: &mut SimRng) -> Vec<Reward> {
    payouts
        .iter()
        .map(|p| Reward {
            resource: p.resource,
            amount: apply_quality(p.resource, roll_amount(p, rng), quality_bonus),
        })
        .collect()
}

/// Minimum payouts with the quality bonus, used for starter and one-shot
/// jobs.
pub fn min_payouts(payouts: &[Payout], quality_bonus: u32) -> Vec<Reward> {
    payouts
        .iter()
        .map(|p| Reward {
            resource: p.resource,
            amount: apply_quality(p.resource, p.min, quality_bonus),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Type selection
// ---------------------------------------------------------------------------

fn starter<'a>(ctx: &GenerationContext<'a>) -> Option<&'a JobType> {
    if ctx.total_completions >= ctx.config.starter_completions {
        return None;
    }
    ctx.catalog.job(&ctx.config.starter_job)
}

fn recent<'a>(pool: &[&'a JobType], unlocked: usize, rng: &mut SimRng) -> Option<&'a JobType> {
    let n = pool.len();
    let mut gates: Vec<(usize, u32)> = Vec::with_capacity(4);
    if n >= 1 {
        gates.push((1, 20));
    }
    if n >= 2 {
        gates.push((2, 10));
    }
    if unlocked >= RECENCY_DEEP_MIN_UNLOCKED {
        if n >= 3 {
            gates.push((3, 7));
        }
        if n >= 4 {
            gates.push((4, 7));
        }
    }
    gates
        .into_iter()
        .find(|&(_, p)| rng.chance(percent(p)))
        .map(|(back, _)| pool[n - back])
}

fn best_paying<'a>(pool: &[&'a JobType]) -> Option<&'a JobType> {
    let mut best: Option<&'a JobType> = None;
    for &job in pool {
        if best.is_none_or(|b| job.min_money_payout() > b.min_money_payout()) {
            best = Some(job);
        }
    }
    best
}

/// Choose a job type. Returns `None` when nothing is eligible. The flag
/// is `true` when the starter gate fired.
pub fn choose_job_type<'a>(ctx: &GenerationContext<'a>, rng: &mut SimRng) -> Option<(&'a JobType, bool)> {
    if let Some(job) = starter(ctx) {
        return Some((job, true));
    }

    let pool = ctx.unlocks.generation_pool(ctx.catalog, ctx.chapter);
    if pool.is_empty() {
        return None;
    }

    if let Some(job) = recent(&pool, ctx.unlocks.unlocked().len(), rng) {
        return Some((job, false));
    }

    if ctx.chapter >= ctx.config.web_scrape_min_chapter
        && let Some(&scrape) = pool.iter().find(|j| j.id == ctx.config.web_scrape_job)
        && rng.chance(percent(8))
    {
        return Some((scrape, false));
    }

    if rng.chance(percent(15)) {
        return best_paying(&pool).map(|job| (job, false));
    }

    rng.pick(&pool).map(|&job| (job, false))
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate one offer, or `None` if no type is eligible.
pub fn generate(ctx: &GenerationContext<'_>, rng: &mut SimRng) -> Option<OfferDraft> {
    let (job, is_starter) = choose_job_type(ctx, rng)?;
    let speed = ctx.progression.speed_bonus;
    let quality = ctx.progression.quality_bonus;

    let draft = if is_starter {
        OfferDraft {
            job_type: job.id.clone(),
            duration: apply_speed(ctx.config.starter_duration, speed),
            rewards: min_payouts(&job.payouts, quality),
        }
    } else {
        OfferDraft {
            job_type: job.id.clone(),
            duration: roll_duration(job, ctx.config.default_duration, speed, rng),
            rewards: roll_payouts(&job.payouts, quality, rng),
        }
    };
    Some(draft)
}

/// Reroll probability given how many offers of the same type are queued.
pub fn reroll_chance(existing: usize) -> Fixed64 {
    match existing {
        0 => Fixed64::ZERO,
        1 => percent(60),
        _ => percent(90),
    }
}

/// [`generate`] with duplicate avoidance: while the rolled type already
/// sits in the queue, reroll with 60% (one copy) or 90% (two or more)
/// probability, at most [`MAX_REROLLS`] attempts. Keeps the last roll.
pub fn generate_distinct(
    ctx: &GenerationContext<'_>,
    queue: &JobQueue,
    rng: &mut SimRng,
) -> Option<OfferDraft> {
    let mut kept = None;
    for _ in 0..MAX_REROLLS {
        let Some(draft) = generate(ctx, rng) else {
            break;
        };
        let existing = queue.count_of_type(&draft.job_type);
        kept = Some(draft);
        if !rng.chance(reroll_chance(existing)) {
            break;
        }
    }
    kept
}
