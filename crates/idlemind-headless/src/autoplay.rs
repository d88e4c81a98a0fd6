//! A greedy auto-player.
//!
//! Each simulated second the player closes any open story (taking the first
//! chapter bonus on offer), unlocks every visible, affordable job type that
//! does not end the game, clicks every offer it can pay for, and then ticks one
//! second.

use idlemind_core::fixed::{Amount, Seconds};
use idlemind_core::id::JobTypeId;
use idlemind_core::session::{ClickOutcome, GameSession, UnlockOutcome};
use idlemind_core::story::{Ending, Screen};
use tracing::{debug, info};

/// Clicks spent on one offer before giving up on it this second.
const MAX_CLICKS: usize = 16;
/// Stories closed in a row before the player moves on.
const MAX_STORIES: usize = 16;

/// Final numbers of an auto-played run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub seconds: u32,
    pub ending: Option<Ending>,
    pub chapter: u32,
    pub completions: u64,
    pub money: Amount,
    pub agi_sum: u32,
    pub wonder: u32,
    pub unlocked: Vec<JobTypeId>,
    pub stories_read: usize,
}

/// Play until the game ends or `limit` seconds of game time pass.
pub fn play(session: &mut GameSession, limit: u32) -> RunSummary {
    let mut seconds = 0;
    let mut stories_read = 0;

    while seconds < limit && session.ending().is_none() {
        stories_read += settle_screen(session);
        if session.ending().is_some() {
            break;
        }
        unlock_affordable(session);
        work_offers(session);
        if session.offers().is_empty() && session.active().is_empty() {
            session.request_offer();
        }
        session.tick(Seconds::from_num(1));
        seconds += 1;
    }
    stories_read += settle_screen(session);

    let state = session.state();
    let summary = RunSummary {
        seconds,
        ending: state.ending.clone(),
        chapter: state.chapter,
        completions: state.total_completions,
        money: state.progression.money,
        agi_sum: state.progression.agi_sum(),
        wonder: state.progression.wonder,
        unlocked: state.unlocks.unlocked().to_vec(),
        stories_read,
    };
    info!(
        seconds,
        chapter = summary.chapter,
        completions = summary.completions,
        ending = ?summary.ending,
        "run finished"
    );
    summary
}

/// Close open stories. Returns how many were closed.
pub fn settle_screen(session: &mut GameSession) -> usize {
    let mut closed = 0;
    while closed < MAX_STORIES {
        let Screen::Story(story) = session.screen().clone() else {
            break;
        };
        let bonus = session
            .catalog()
            .chapter_for_story(&story)
            .and_then(|chapter| chapter.choice_bonuses.first())
            .map(|bonus| bonus.choice.clone());
        if let Some(choice) = bonus {
            session.make_choice(choice, None);
        }
        session.turn_page();
        if !session.finish_story() {
            break;
        }
        debug!(%story, "story read");
        closed += 1;
    }
    closed
}

/// Unlock every visible, affordable job type that is not a bad end.
pub fn unlock_affordable(session: &mut GameSession) -> usize {
    let candidates: Vec<JobTypeId> = session
        .catalog()
        .jobs()
        .iter()
        .filter(|job| job.bad_end.is_none())
        .map(|job| job.id.clone())
        .collect();

    let mut unlocked = 0;
    for id in candidates {
        if session.is_job_visible(&id)
            && session.can_unlock_job(&id)
            && session.unlock_job(&id) == UnlockOutcome::Unlocked
        {
            unlocked += 1;
        }
    }
    unlocked
}

/// Click each queued offer until it is accepted, declined or unaffordable.
pub fn work_offers(session: &mut GameSession) -> usize {
    let ids: Vec<_> = session.offers().iter().map(|o| o.id).collect();
    let mut accepted = 0;
    for id in ids {
        for _ in 0..MAX_CLICKS {
            match session.click_offer(id) {
                ClickOutcome::Rejected { .. } => continue,
                ClickOutcome::Accepted => {
                    accepted += 1;
                    break;
                }
                ClickOutcome::Declined | ClickOutcome::Ignored => break,
            }
        }
        if !session.screen().is_main() {
            break;
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use idlemind_core::catalog::{CatalogBuilder, JobType};
    use idlemind_core::config::{GameConfig, StartingState};
    use idlemind_core::test_utils::{fixture_session, job_id, seeded_session};

    #[test]
    fn play_makes_progress() {
        let mut session = fixture_session();
        let summary = play(&mut session, 300);
        assert!(summary.completions > 0);
        assert!(summary.unlocked.contains(&job_id("sentiment")));
    }

    #[test]
    fn play_never_unlocks_bad_end() {
        let mut session = fixture_session();
        let summary = play(&mut session, 600);
        assert!(!summary.unlocked.contains(&job_id("doom")));
        assert!(!matches!(summary.ending, Some(Ending::Bad(_))));
    }

    #[test]
    fn play_stops_at_limit() {
        let mut session = fixture_session();
        let summary = play(&mut session, 5);
        assert!(summary.seconds <= 5);
    }

    #[test]
    fn same_seed_same_run() {
        let mut a = seeded_session(99);
        let mut b = seeded_session(99);
        assert_eq!(play(&mut a, 400), play(&mut b, 400));
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn hidden_job_types_stay_locked() {
        let mut hidden = JobType::new("hidden", "Hidden");
        hidden.chapters = vec![2];
        let mut b = CatalogBuilder::new();
        b.register_job(JobType::new("open", "Open")).unwrap();
        b.register_job(hidden).unwrap();
        let config = GameConfig {
            starter_job: job_id("open"),
            starting: StartingState {
                unlocked: Vec::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut session = GameSession::new(Arc::new(b.build().unwrap()), config);

        assert!(session.can_unlock_job(&job_id("hidden")));
        assert!(!session.is_job_visible(&job_id("hidden")));
        assert_eq!(unlock_affordable(&mut session), 1);
        assert!(session.state().unlocks.is_unlocked(&job_id("open")));
        assert!(!session.state().unlocks.is_unlocked(&job_id("hidden")));
    }

    #[test]
    fn settle_screen_on_main_is_noop() {
        let mut session = fixture_session();
        assert_eq!(settle_screen(&mut session), 0);
    }
}
