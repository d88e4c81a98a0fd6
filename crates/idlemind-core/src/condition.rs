//! Prerequisite and display-trigger conditions.
//!
//! Threshold conditions compare with `>=`; job, completion and choice
//! conditions are set membership.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fixed::Amount;
use crate::id::JobTypeId;
use crate::resource::Progression;

/// A single prerequisite condition on a job type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// The job type has been unlocked.
    JobUnlocked(JobTypeId),
    Money(Amount),
    Data(u64),
    /// Owned compute units.
    Compute(u32),
    Iq(u32),
    Autonomy(u32),
    Generality(u32),
    Wonder(u32),
    /// The one-shot job type has been completed.
    CompletedJob(JobTypeId),
    /// A story choice unlocked this job type.
    Choice(JobTypeId),
}

/// Read-only view of the state a condition is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    pub progression: &'a Progression,
    pub unlocked: &'a [JobTypeId],
    pub completed_onetime: &'a BTreeSet<JobTypeId>,
    pub choice_unlocks: &'a BTreeSet<JobTypeId>,
}

impl Condition {
    /// Evaluate this condition.
    pub fn is_met(&self, ctx: &ConditionContext<'_>) -> bool {
        let p = ctx.progression;
        match self {
            Condition::JobUnlocked(id) => ctx.unlocked.contains(id),
            Condition::Money(min) => p.money >= *min,
            Condition::Data(min) => p.data >= *min,
            Condition::Compute(min) => p.compute >= *min,
            Condition::Iq(min) => p.iq >= *min,
            Condition::Autonomy(min) => p.autonomy >= *min,
            Condition::Generality(min) => p.generality >= *min,
            Condition::Wonder(min) => p.wonder >= *min,
            Condition::CompletedJob(id) => ctx.completed_onetime.contains(id),
            Condition::Choice(id) => ctx.choice_unlocks.contains(id),
        }
    }

    /// Job types this condition refers to, for catalog validation.
    pub fn referenced_job(&self) -> Option<&JobTypeId> {
        match self {
            Condition::JobUnlocked(id) | Condition::CompletedJob(id) | Condition::Choice(id) => {
                Some(id)
            }
            _ => None,
        }
    }
}

/// True when every condition holds. An empty list is always met.
pub fn all_met(conditions: &[Condition], ctx: &ConditionContext<'_>) -> bool {
    conditions.iter().all(|c| c.is_met(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        progression: Progression,
        unlocked: Vec<JobTypeId>,
        completed: BTreeSet<JobTypeId>,
        choices: BTreeSet<JobTypeId>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                progression: Progression::default(),
                unlocked: vec![JobTypeId::from("imgclassifier")],
                completed: BTreeSet::new(),
                choices: BTreeSet::new(),
            }
        }

        fn ctx(&self) -> ConditionContext<'_> {
            ConditionContext {
                progression: &self.progression,
                unlocked: &self.unlocked,
                completed_onetime: &self.completed,
                choice_unlocks: &self.choices,
            }
        }
    }

    #[test]
    fn thresholds_are_inclusive() {
        let mut f = Fixture::new();
        f.progression.iq = 3;
        f.progression.money = Amount::from_num(100);
        assert!(Condition::Iq(3).is_met(&f.ctx()));
        assert!(!Condition::Iq(4).is_met(&f.ctx()));
        assert!(Condition::Money(Amount::from_num(100)).is_met(&f.ctx()));
        assert!(!Condition::Money(Amount::from_num(100.5)).is_met(&f.ctx()));
    }

    #[test]
    fn membership_conditions() {
        let mut f = Fixture::new();
        assert!(Condition::JobUnlocked("imgclassifier".into()).is_met(&f.ctx()));
        assert!(!Condition::JobUnlocked("webscrape".into()).is_met(&f.ctx()));

        assert!(!Condition::CompletedJob("paper".into()).is_met(&f.ctx()));
        f.completed.insert("paper".into());
        assert!(Condition::CompletedJob("paper".into()).is_met(&f.ctx()));

        assert!(!Condition::Choice("lab".into()).is_met(&f.ctx()));
        f.choices.insert("lab".into());
        assert!(Condition::Choice("lab".into()).is_met(&f.ctx()));
    }

    #[test]
    fn all_met_requires_every_condition() {
        let mut f = Fixture::new();
        f.progression.data = 50;
        let conds = vec![Condition::Data(50), Condition::Autonomy(1)];
        assert!(!all_met(&conds, &f.ctx()));
        f.progression.autonomy = 1;
        assert!(all_met(&conds, &f.ctx()));
        assert!(all_met(&[], &f.ctx()));
    }
}
