//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::catalog::{Catalog, CatalogBuilder, DurationRange, JobCategory, JobType};
use crate::chapter::{ChapterDef, ChapterThreshold, ChoiceBonus};
use crate::condition::Condition;
use crate::config::GameConfig;
use crate::fixed::{Amount, Fixed64, Seconds};
use crate::hooks::{SaveReason, SessionHooks};
use crate::id::{DeliveryId, JobTypeId, StoryId};
use crate::interlude::{InterludeDef, Trigger};
use crate::resource::{Cost, Payout, Resource};
use crate::session::{ClickOutcome, GameSession};

// ===========================================================================
// Fixed-point helpers
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

pub fn secs(v: f64) -> Seconds {
    Seconds::from_num(v)
}

pub fn money(v: i64) -> Amount {
    Amount::from_num(v)
}

pub fn job_id(id: &str) -> JobTypeId {
    JobTypeId::new(id)
}

pub fn story_id(id: &str) -> StoryId {
    StoryId::new(id)
}

// ===========================================================================
// Fixture content
// ===========================================================================

fn job(
    id: &str,
    name: &str,
    payouts: &[(Resource, u64)],
    duration: Option<(u32, u32)>,
) -> JobType {
    let mut job = JobType::new(id, name);
    job.payouts = payouts
        .iter()
        .map(|&(resource, min)| Payout::new(resource, min))
        .collect();
    job.duration = duration.map(|(min, max)| DurationRange { min, max });
    job
}

/// A small catalog covering every mechanic:
///
/// - `imgclassifier`: the starter, 1 compute to run.
/// - `sentiment`: money-gated, 50 to unlock.
/// - `translate`: needs `sentiment`, visible at 100 money, best paying.
/// - `paper`: one-shot, needs `sentiment`.
/// - `webscrape`: chapters 3 and 4 only.
/// - `chatbot`: tool job with a 50% base chance and its own chain.
/// - `cure`: pays wonder.
/// - `doom`: bad end.
/// - `secret`: unlocked by a story choice.
pub fn fixture_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();

    let mut imgclassifier = job(
        "imgclassifier",
        "Image Classifier",
        &[(Resource::Money, 4), (Resource::Data, 2)],
        Some((4, 6)),
    );
    imgclassifier.run_cost = vec![Cost::new(Resource::Compute, 1)];
    imgclassifier.icon = Some("eye".into());

    let mut sentiment = job(
        "sentiment",
        "Sentiment Analysis",
        &[(Resource::Money, 8), (Resource::Data, 3)],
        Some((8, 12)),
    );
    sentiment.prerequisites = vec![Condition::Money(money(60))];
    sentiment.unlock_cost = vec![Cost::new(Resource::Money, 50)];
    sentiment.run_cost = vec![Cost::new(Resource::Compute, 1)];

    let mut translate = job("translate", "Translation", &[(Resource::Money, 20)], Some((10, 15)));
    translate.prerequisites = vec![Condition::JobUnlocked(job_id("sentiment"))];
    translate.display_triggers = Some(vec![Condition::Money(money(100))]);
    translate.unlock_cost = vec![Cost::new(Resource::Money, 150), Cost::new(Resource::Data, 10)];
    translate.run_cost = vec![Cost::new(Resource::Compute, 1), Cost::new(Resource::Money, 5)];

    let mut paper = job("paper", "Write a Paper", &[(Resource::Iq, 1), (Resource::Money, 30)], Some((5, 5)));
    paper.category = JobCategory::Onetime;
    paper.prerequisites = vec![Condition::JobUnlocked(job_id("sentiment"))];
    paper.unlock_cost = vec![Cost::new(Resource::Money, 10)];

    let mut webscrape = job("webscrape", "Web Scrape", &[(Resource::Data, 10)], None);
    webscrape.chapters = vec![3, 4];

    let mut chatbot = job(
        "chatbot",
        "Chatbot",
        &[(Resource::Money, 15), (Resource::Autonomy, 1)],
        Some((6, 6)),
    );
    chatbot.category = JobCategory::Tool;
    chatbot.acceptance_chance = Some(fixed(0.5));
    chatbot.rejection_messages = vec!["Busy.".into(), "Still busy.".into()];
    chatbot.prerequisites = vec![Condition::JobUnlocked(job_id("translate"))];

    let mut cure = job("cure", "Cure a Disease", &[(Resource::Wonder, 1)], Some((3, 3)));
    cure.wonder = true;
    cure.prerequisites = vec![Condition::Iq(3)];

    let mut doom = job("doom", "Paperclip Maximizer", &[(Resource::Money, 1)], None);
    doom.bad_end = Some("ending_paperclips".into());
    doom.unlock_cost = vec![Cost::new(Resource::Money, 1000)];

    let mut secret = job("secret", "Secret Project", &[(Resource::Generality, 1)], Some((5, 5)));
    secret.prerequisites = vec![Condition::Choice(job_id("secret"))];

    for j in [
        imgclassifier,
        sentiment,
        translate,
        paper,
        webscrape,
        chatbot,
        cure,
        doom,
        secret,
    ] {
        b.register_job(j).expect("fixture job");
    }

    b.register_interlude(InterludeDef::new("first_pay", Trigger::Money(money(100))))
        .expect("fixture interlude");
    b.register_interlude(InterludeDef::new("agi_warning_1", Trigger::AgiSum(6)))
        .expect("fixture interlude");
    b.register_interlude(InterludeDef::new("agi_warning_2", Trigger::AgiSum(12)))
        .expect("fixture interlude");
    let mut paper_read = InterludeDef::new("paper_read", Trigger::CompletedJob(job_id("paper")));
    paper_read.delay_jobs = Some(1);
    b.register_interlude(paper_read).expect("fixture interlude");

    b.register_chapter(ChapterDef::new(1, "chapter_1", ChapterThreshold::Completions(0)))
        .expect("fixture chapter");
    let mut chapter_2 = ChapterDef::new(2, "chapter_2", ChapterThreshold::Completions(5));
    chapter_2.choice_bonuses = vec![ChoiceBonus {
        choice: "focus".into(),
        speed_bonus: 100,
        quality_bonus: 0,
        compute: 1,
    }];
    b.register_chapter(chapter_2).expect("fixture chapter");
    b.register_chapter(ChapterDef::new(3, "chapter_3", ChapterThreshold::Iq(3)))
        .expect("fixture chapter");

    b.build().expect("fixture catalog")
}

/// Default config plus the fixture's AGI warning sequence.
pub fn fixture_config() -> GameConfig {
    GameConfig {
        agi_warning_sequence: vec![story_id("agi_warning_1"), story_id("agi_warning_2")],
        ..GameConfig::default()
    }
}

pub fn fixture_session() -> GameSession {
    GameSession::new(Arc::new(fixture_catalog()), fixture_config())
}

pub fn seeded_session(seed: u64) -> GameSession {
    let config = GameConfig {
        seed,
        ..fixture_config()
    };
    GameSession::new(Arc::new(fixture_catalog()), config)
}

// ===========================================================================
// Recording hooks
// ===========================================================================

#[derive(Debug, Default)]
pub struct HookLog {
    pub saves: Vec<SaveReason>,
    pub shakes: Vec<DeliveryId>,
}

/// Hooks that record every call. Clone before boxing to keep a handle.
#[derive(Debug, Default, Clone)]
pub struct RecordingHooks {
    log: Rc<RefCell<HookLog>>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> Vec<SaveReason> {
        self.log.borrow().saves.clone()
    }

    pub fn shakes(&self) -> Vec<DeliveryId> {
        self.log.borrow().shakes.clone()
    }

    pub fn count(&self, reason: SaveReason) -> usize {
        self.log.borrow().saves.iter().filter(|&&r| r == reason).count()
    }
}

impl SessionHooks for RecordingHooks {
    fn save_now(&mut self, reason: SaveReason) {
        self.log.borrow_mut().saves.push(reason);
    }

    fn shake(&mut self, offer: DeliveryId) {
        self.log.borrow_mut().shakes.push(offer);
    }
}

/// A fixture session wired to recording hooks.
pub fn recorded_session() -> (GameSession, RecordingHooks) {
    let hooks = RecordingHooks::new();
    let session = GameSession::with_hooks(
        Arc::new(fixture_catalog()),
        fixture_config(),
        Box::new(hooks.clone()),
    );
    (session, hooks)
}

// ===========================================================================
// Driving helpers
// ===========================================================================

/// Click an offer until it is accepted or leaves the queue.
pub fn click_until_settled(session: &mut GameSession, id: DeliveryId) -> ClickOutcome {
    for _ in 0..64 {
        match session.click_offer(id) {
            ClickOutcome::Rejected { .. } => continue,
            other => return other,
        }
    }
    ClickOutcome::Ignored
}

/// Tick in one-second steps until no delivery is active or `limit`
/// seconds pass.
pub fn run_until_idle(session: &mut GameSession, limit: u32) {
    for _ in 0..limit {
        if session.active().is_empty() {
            return;
        }
        session.tick(secs(1.0));
    }
}

/// Request, accept and finish one job. Returns the job type run.
pub fn complete_one(session: &mut GameSession) -> Option<JobTypeId> {
    let id = match session.offers().first() {
        Some(offer) => offer.id,
        None => session.request_offer()?,
    };
    let job_type = session.offers().iter().find(|o| o.id == id)?.job_type.clone();
    if click_until_settled(session, id) != ClickOutcome::Accepted {
        return None;
    }
    run_until_idle(session, 200);
    Some(job_type)
}
