//! The game session: one player's game and everything that drives it.
//!
//! # Update model
//!
//! All mutation happens synchronously inside [`GameSession::tick`] or a
//! player action (`click_offer`, `unlock_job`, `finish_story`, ...). Each
//! mutation marks [`DirtyFlags`]; every tick and action ends with one
//! re-evaluation pass that runs, in order:
//!
//! 1. story-choice unlocks,
//! 2. sticky visibility,
//! 3. one-shot job spawning,
//! 4. a ready pending interlude,
//! 5. interlude triggers,
//! 6. the chapter watcher.
//!
//! Any screen other than [`Screen::Main`] pauses the tick entirely.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::acceptance::{RejectionStep, acceptance_probability};
use crate::catalog::Catalog;
use crate::chapter::next_chapter;
use crate::config::GameConfig;
use crate::delivery::{ActiveDelivery, DeliveryJob};
use crate::dirty::DirtyFlags;
use crate::event::{EventLog, GameEvent};
use crate::fixed::{Amount, Fixed64, Seconds};
use crate::generation::{GenerationContext, generate_distinct, min_payouts, roll_duration};
use crate::hooks::{NoopHooks, SaveReason, SessionHooks};
use crate::id::{DeliveryId, JobTypeId, StoryId};
use crate::resource::{Cost, Progression, Resource, compute_cost};
use crate::rng::SimRng;
use crate::state::GameState;
use crate::story::{Ending, Screen};

/// Result of clicking an offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The offer became an active delivery.
    Accepted,
    /// Refused; `message` is the chain line to show.
    Rejected { state: u32, message: String },
    /// The rejection chain ran out and the offer was removed.
    Declined,
    /// Stale or illegal click; nothing changed.
    Ignored,
}

/// Result of an unlock action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked,
    /// The job type was a bad end; the game is over.
    Ended(Ending),
    Ignored,
}

/// A pending "story choice made" message.
#[derive(Debug, Clone)]
struct ChoiceMessage {
    story: StoryId,
    unlocks: Option<JobTypeId>,
}

pub struct GameSession {
    catalog: Arc<Catalog>,
    config: GameConfig,
    state: GameState,
    rng: SimRng,
    dev_speed: Fixed64,
    dirty: DirtyFlags,
    events: EventLog,
    choices: VecDeque<ChoiceMessage>,
    hooks: Box<dyn SessionHooks>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("state", &self.state)
            .field("rng", &self.rng)
            .field("dev_speed", &self.dev_speed)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Start a new game with no-op hooks.
    pub fn new(catalog: Arc<Catalog>, config: GameConfig) -> Self {
        Self::with_hooks(catalog, config, Box::new(NoopHooks))
    }

    /// Start a new game seeded from `config.seed`.
    pub fn with_hooks(catalog: Arc<Catalog>, config: GameConfig, hooks: Box<dyn SessionHooks>) -> Self {
        let state = GameState::new(&config);
        let rng = SimRng::new(config.seed);
        Self::from_state(catalog, config, state, rng, hooks)
    }

    /// Resume from saved state.
    pub fn from_state(
        catalog: Arc<Catalog>,
        config: GameConfig,
        state: GameState,
        rng: SimRng,
        hooks: Box<dyn SessionHooks>,
    ) -> Self {
        let mut session = Self {
            catalog,
            config,
            state,
            rng,
            dev_speed: Fixed64::from_num(1),
            dirty: DirtyFlags::all(),
            events: EventLog::new(),
            choices: VecDeque::new(),
            hooks,
        };
        session.reevaluate();
        session
    }

    // =======================================================================
    // Queries
    // =======================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn progression(&self) -> &Progression {
        &self.state.progression
    }

    pub fn rng(&self) -> &SimRng {
        &self.rng
    }

    pub fn screen(&self) -> &Screen {
        &self.state.screen
    }

    pub fn ending(&self) -> Option<&Ending> {
        self.state.ending.as_ref()
    }

    pub fn offers(&self) -> &[DeliveryJob] {
        self.state.queue.offers()
    }

    pub fn active(&self) -> &[ActiveDelivery] {
        self.state.queue.active()
    }

    pub fn dev_speed(&self) -> Fixed64 {
        self.dev_speed
    }

    /// Owned compute minus the compute held by active deliveries.
    pub fn available_compute(&self) -> u32 {
        self.state.available_compute()
    }

    pub fn can_display_job(&self, id: &JobTypeId) -> bool {
        self.catalog.job(id).is_some_and(|job| {
            self.state
                .unlocks
                .can_display(job, &self.state.progression, self.state.chapter)
        })
    }

    /// Sticky visibility: displayable now or at any earlier point.
    pub fn is_job_visible(&self, id: &JobTypeId) -> bool {
        self.catalog.job(id).is_some_and(|job| {
            self.state
                .unlocks
                .is_visible(job, &self.state.progression, self.state.chapter)
        })
    }

    pub fn can_unlock_job(&self, id: &JobTypeId) -> bool {
        self.catalog
            .job(id)
            .is_some_and(|job| self.state.unlocks.can_unlock(job, &self.state.progression))
    }

    /// Acceptance probability for an offer of the given type.
    pub fn acceptance_probability(&self, id: &JobTypeId) -> Fixed64 {
        acceptance_probability(self.catalog.job(id), &self.state.progression)
    }

    /// Run cost of a job type; empty for unknown ids.
    pub fn run_cost(&self, id: &JobTypeId) -> &[Cost] {
        self.catalog
            .job(id)
            .map(|job| job.run_cost.as_slice())
            .unwrap_or_default()
    }

    /// Unlock cost of a job type; empty for unknown ids.
    pub fn unlock_cost(&self, id: &JobTypeId) -> &[Cost] {
        self.catalog
            .job(id)
            .map(|job| job.unlock_cost.as_slice())
            .unwrap_or_default()
    }

    pub fn icon_for(&self, id: &JobTypeId) -> &str {
        self.catalog.icon_for(id)
    }

    /// Current rejection state of an offer (0 if never refused).
    pub fn rejection_state(&self, id: DeliveryId) -> u32 {
        self.state.rejections.state(id)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        self.events.pending()
    }

    // =======================================================================
    // Tick
    // =======================================================================

    /// Advance time by `delta` seconds (scaled by dev speed). No-op while
    /// any non-main screen is showing or after the game ends.
    pub fn tick(&mut self, delta: Seconds) {
        if !self.state.is_running() {
            return;
        }
        let delta = delta.saturating_mul(self.dev_speed);
        if delta <= Seconds::ZERO {
            return;
        }

        self.state.chapter_elapsed = self.state.chapter_elapsed.saturating_add(delta);
        self.dirty.mark(DirtyFlags::CLOCK);

        let due: Vec<bool> = self
            .state
            .queue
            .active_mut()
            .iter_mut()
            .map(|active| active.advance(delta))
            .collect();
        trace!(%delta, active = due.len(), "tick");

        // Backward so removal leaves lower indices intact. A resolution that
        // opens a screen or ends the game stops the rest until next tick.
        for index in (0..due.len()).rev() {
            if !due[index] {
                continue;
            }
            let delivery = self.state.queue.active_mut().remove(index);
            self.resolve(delivery);
            if !self.state.is_running() {
                break;
            }
        }

        if self.state.is_running() {
            self.advance_offer_timer(delta);
        }
        self.reevaluate();
    }

    fn advance_offer_timer(&mut self, delta: Seconds) {
        let interval = self.config.offer_interval();
        self.state.offer_timer = self.state.offer_timer.saturating_add(delta);
        while self.state.offer_timer >= interval {
            self.state.offer_timer -= interval;
            if self.state.queue.offers().len() < self.config.queue_cap {
                self.spawn_offer();
            }
        }
    }

    fn resolve(&mut self, delivery: ActiveDelivery) {
        let catalog = Arc::clone(&self.catalog);
        let job = delivery.job;
        let def = catalog.job(&job.job_type);

        for reward in &job.rewards {
            self.state.progression.add(reward.resource, reward.amount);
            if reward.resource == Resource::Wonder && reward.amount > Amount::ZERO {
                let name = def.map_or_else(|| job.job_type.to_string(), |d| d.name.clone());
                self.state.last_wonder = Some(name);
            }
        }
        self.dirty.mark(DirtyFlags::STATS);
        debug!(id = %job.id, job_type = %job.job_type, "delivery completed");
        self.events.push(GameEvent::DeliveryCompleted {
            id: job.id,
            job_type: job.job_type.clone(),
            rewards: job.rewards.clone(),
        });

        if !self.state.is_game_over() {
            let p = &self.state.progression;
            // Lose is checked first so it wins a simultaneous crossing.
            if p.agi_sum() >= self.config.agi_sum_lose {
                self.end_game(Ending::AgiThreshold);
            } else if p.wonder >= self.config.wonder_win {
                self.end_game(Ending::Wonder);
            }
        }

        if def.is_some_and(|d| d.is_onetime()) && self.state.unlocks.mark_completed(job.job_type.clone()) {
            self.dirty.mark(DirtyFlags::COMPLETIONS);
            self.hooks.save_now(SaveReason::OnetimeCompleted);
        }
        if self.state.unlocks.record_run(job.job_type.clone()) {
            self.dirty.mark(DirtyFlags::JOBS_RUN);
        }

        self.state.total_completions += 1;
        self.dirty.mark(DirtyFlags::COMPLETIONS);

        if self.state.interludes.count_completion() && self.state.is_running() {
            self.open_ready_interlude();
        }

        if self.state.total_completions == 1
            && !self.state.is_game_over()
            && self.state.queue.offers().len() < self.config.queue_cap
        {
            self.spawn_offer();
        }
    }

    // =======================================================================
    // Player actions
    // =======================================================================

    /// Click an offer: accept or advance its rejection chain.
    pub fn click_offer(&mut self, id: DeliveryId) -> ClickOutcome {
        if !self.state.is_running() {
            return ClickOutcome::Ignored;
        }
        let Some(offer) = self.state.queue.offer(id).cloned() else {
            return ClickOutcome::Ignored;
        };
        self.hooks.shake(id);

        let outcome = if self.state.rejections.state(id) == 0 {
            self.first_click(offer)
        } else {
            match self.state.rejections.advance(id) {
                RejectionStep::Message { state, message } => self.rejected(id, state, message),
                RejectionStep::Exhausted => self.auto_decline(id),
            }
        };
        self.reevaluate();
        outcome
    }

    fn first_click(&mut self, offer: DeliveryJob) -> ClickOutcome {
        let catalog = Arc::clone(&self.catalog);
        let def = catalog.job(&offer.job_type);
        let run_cost: &[Cost] = def.map(|d| d.run_cost.as_slice()).unwrap_or_default();

        if let Some(def) = def
            && !self.state.unlocks.is_unlocked(&def.id)
        {
            return ClickOutcome::Ignored;
        }
        if !self
            .state
            .progression
            .can_afford(run_cost, self.state.available_compute())
        {
            return ClickOutcome::Ignored;
        }

        let p = acceptance_probability(def, &self.state.progression);
        if self.rng.chance(p) {
            return self.accept(offer, run_cost);
        }

        let chain = self
            .state
            .rejections
            .select_chain(def, &self.config.default_rejections);
        match self.state.rejections.begin(offer.id, chain) {
            RejectionStep::Message { state, message } => self.rejected(offer.id, state, message),
            RejectionStep::Exhausted => self.auto_decline(offer.id),
        }
    }

    fn accept(&mut self, offer: DeliveryJob, run_cost: &[Cost]) -> ClickOutcome {
        let Some(offer) = self.state.queue.remove_offer(offer.id) else {
            return ClickOutcome::Ignored;
        };
        self.state.progression.spend(run_cost);
        self.state.rejections.clear(offer.id);
        self.dirty.mark(DirtyFlags::STATS);
        debug!(id = %offer.id, job_type = %offer.job_type, duration = offer.duration, "offer accepted");
        self.events.push(GameEvent::OfferAccepted {
            id: offer.id,
            job_type: offer.job_type.clone(),
            duration: Seconds::saturating_from_num(offer.duration),
        });
        self.state.queue.start(offer, compute_cost(run_cost));
        ClickOutcome::Accepted
    }

    fn rejected(&mut self, id: DeliveryId, state: u32, message: String) -> ClickOutcome {
        debug!(%id, state, "offer rejected");
        self.events.push(GameEvent::OfferRejected {
            id,
            state,
            message: message.clone(),
        });
        ClickOutcome::Rejected { state, message }
    }

    fn auto_decline(&mut self, id: DeliveryId) -> ClickOutcome {
        self.remove_offer(id);
        ClickOutcome::Declined
    }

    fn remove_offer(&mut self, id: DeliveryId) -> bool {
        self.state.rejections.clear(id);
        if self.state.queue.remove_offer(id).is_none() {
            return false;
        }
        debug!(%id, "offer declined");
        self.events.push(GameEvent::OfferDeclined { id });
        true
    }

    /// Remove an offer from the queue without running it.
    pub fn decline_offer(&mut self, id: DeliveryId) -> bool {
        if self.state.is_game_over() {
            return false;
        }
        let removed = self.remove_offer(id);
        self.reevaluate();
        removed
    }

    /// Generate one offer on demand if the queue has room.
    pub fn request_offer(&mut self) -> Option<DeliveryId> {
        if self.state.is_game_over() || self.state.queue.offers().len() >= self.config.queue_cap {
            return None;
        }
        let id = self.spawn_offer();
        self.reevaluate();
        id
    }

    /// Unlock a job type, paying its money and data unlock cost.
    pub fn unlock_job(&mut self, id: &JobTypeId) -> UnlockOutcome {
        if self.state.is_game_over() {
            return UnlockOutcome::Ignored;
        }
        let catalog = Arc::clone(&self.catalog);
        let Some(def) = catalog.job(id) else {
            return UnlockOutcome::Ignored;
        };
        if !self.state.unlocks.can_unlock(def, &self.state.progression) {
            return UnlockOutcome::Ignored;
        }

        self.state.progression.spend(&def.unlock_cost);
        self.state.unlocks.unlock(def.id.clone());
        self.dirty.mark(DirtyFlags::UNLOCKS | DirtyFlags::STATS);
        self.hooks.save_now(SaveReason::JobUnlock);
        info!(job_type = %def.id, "job unlocked");
        self.events.push(GameEvent::JobUnlocked {
            job_type: def.id.clone(),
        });

        let outcome = match &def.bad_end {
            Some(ending) => {
                let ending = Ending::Bad(ending.clone());
                self.end_game(ending.clone());
                UnlockOutcome::Ended(ending)
            }
            None => {
                self.spawn_onetime();
                UnlockOutcome::Unlocked
            }
        };
        self.reevaluate();
        outcome
    }

    /// Advance the page of the open story. Returns the new page index.
    pub fn turn_page(&mut self) -> Option<u32> {
        let Screen::Story(story) = &self.state.screen else {
            return None;
        };
        let story = story.clone();
        Some(self.state.stories.turn_page(&story))
    }

    /// Record the player's choice in the open story. `unlocks` is a job
    /// type the choice makes available.
    pub fn make_choice(&mut self, choice: impl Into<String>, unlocks: Option<JobTypeId>) -> bool {
        let Screen::Story(story) = &self.state.screen else {
            return false;
        };
        let story = story.clone();
        let choice = choice.into();
        self.state.stories.set_choice(&story, choice.clone());
        debug!(%story, %choice, "story choice made");
        self.events.push(GameEvent::ChoiceMade {
            story: story.clone(),
            choice,
            unlocks: unlocks.clone(),
        });
        self.choices.push_back(ChoiceMessage { story, unlocks });
        self.dirty.mark(DirtyFlags::CHOICES);
        self.reevaluate();
        true
    }

    /// Close the open story, marking it completed and applying any chapter
    /// choice bonus. Ending screens stay put.
    pub fn finish_story(&mut self) -> bool {
        let Screen::Story(story) = &self.state.screen else {
            return false;
        };
        let story = story.clone();
        self.state.stories.mark_completed(&story);

        let catalog = Arc::clone(&self.catalog);
        if let Some(chapter) = catalog.chapter_for_story(&story)
            && let Some(choice) = self.state.stories.choice(&story)
            && let Some(bonus) = chapter.bonus_for(choice)
        {
            bonus.apply(&mut self.state.progression);
            self.dirty.mark(DirtyFlags::STATS);
            info!(%story, choice = %bonus.choice, "chapter bonus applied");
        }

        self.state.screen = Screen::Main;
        self.dirty.mark(DirtyFlags::SCREEN | DirtyFlags::COMPLETIONS);
        self.events.push(GameEvent::StoryClosed { story });
        self.reevaluate();
        true
    }

    // =======================================================================
    // Debug tools
    // =======================================================================

    /// Add to a resource directly.
    pub fn debug_grant(&mut self, resource: Resource, amount: Amount) {
        self.state.progression.add(resource, amount);
        self.dirty.mark(DirtyFlags::STATS);
        self.reevaluate();
    }

    /// Multiplier on tick delta. Negative values clamp to zero.
    pub fn set_dev_speed(&mut self, multiplier: Fixed64) {
        self.dev_speed = multiplier.max(Fixed64::ZERO);
    }

    // =======================================================================
    // Internals
    // =======================================================================

    /// Generate one offer with duplicate avoidance and queue it.
    fn spawn_offer(&mut self) -> Option<DeliveryId> {
        let ctx = GenerationContext {
            catalog: &self.catalog,
            config: &self.config,
            progression: &self.state.progression,
            unlocks: &self.state.unlocks,
            chapter: self.state.chapter,
            total_completions: self.state.total_completions,
        };
        let draft = generate_distinct(&ctx, &self.state.queue, &mut self.rng)?;
        let id = self.state.queue.allocate_id();
        debug!(%id, job_type = %draft.job_type, duration = draft.duration, "offer generated");
        self.events.push(GameEvent::OfferAdded {
            id,
            job_type: draft.job_type.clone(),
        });
        self.state.queue.push_offer(draft.into_job(id));
        Some(id)
    }

    /// Queue every one-shot type that is due, bypassing the queue cap.
    fn spawn_onetime(&mut self) {
        if self.state.is_game_over() {
            return;
        }
        let catalog = Arc::clone(&self.catalog);
        let due = self
            .state
            .unlocks
            .onetime_to_spawn(&catalog, self.state.chapter);
        for job in due {
            let id = self.state.queue.allocate_id();
            let offer = DeliveryJob {
                id,
                job_type: job.id.clone(),
                duration: roll_duration(
                    job,
                    self.config.default_duration,
                    self.state.progression.speed_bonus,
                    &mut self.rng,
                ),
                rewards: min_payouts(&job.payouts, self.state.progression.quality_bonus),
            };
            self.state.queue.push_offer(offer);
            self.state.unlocks.mark_spawned(job.id.clone());
            self.hooks.save_now(SaveReason::OnetimeSpawn);
            info!(%id, job_type = %job.id, "one-shot job spawned");
            self.events.push(GameEvent::OnetimeSpawned {
                id,
                job_type: job.id.clone(),
            });
        }
    }

    fn end_game(&mut self, ending: Ending) {
        if self.state.is_game_over() {
            return;
        }
        info!(%ending, "game over");
        self.state.ending = Some(ending.clone());
        self.state.screen = Screen::Ending(ending.clone());
        self.dirty.mark(DirtyFlags::SCREEN);
        self.events.push(GameEvent::GameEnded { ending });
    }

    fn open_story(&mut self, story: StoryId) {
        info!(%story, "story opened");
        self.state.screen = Screen::Story(story.clone());
        self.dirty.mark(DirtyFlags::SCREEN);
        self.events.push(GameEvent::StoryOpened { story });
    }

    fn open_ready_interlude(&mut self) {
        if let Some(story) = self.state.interludes.pop_ready() {
            self.open_story(story);
            self.hooks.save_now(SaveReason::InterludeDequeue);
        }
    }

    // -----------------------------------------------------------------------
    // Re-evaluation pass
    // -----------------------------------------------------------------------

    /// Run the watchers for whatever changed since the last pass.
    fn reevaluate(&mut self) {
        let mut flags = self.dirty.take();

        while let Some(message) = self.choices.pop_front() {
            if let Some(job) = message.unlocks
                && self.state.unlocks.add_choice_unlock(job.clone())
            {
                debug!(story = %message.story, job_type = %job, "choice unlock");
                flags.mark(DirtyFlags::CHOICES);
            }
        }

        if flags.any(
            DirtyFlags::STATS
                | DirtyFlags::UNLOCKS
                | DirtyFlags::COMPLETIONS
                | DirtyFlags::CHOICES
                | DirtyFlags::CHAPTER,
        ) {
            let catalog = Arc::clone(&self.catalog);
            self.state
                .unlocks
                .refresh_visibility(&catalog, &self.state.progression, self.state.chapter);
        }

        if flags.any(DirtyFlags::UNLOCKS | DirtyFlags::CHAPTER) {
            self.spawn_onetime();
        }

        if self.state.is_running() && self.state.interludes.head_ready() {
            self.open_ready_interlude();
        }

        let watched = DirtyFlags::STATS
            | DirtyFlags::UNLOCKS
            | DirtyFlags::COMPLETIONS
            | DirtyFlags::JOBS_RUN
            | DirtyFlags::SCREEN
            | DirtyFlags::CHAPTER
            | DirtyFlags::CLOCK;
        if flags.any(watched) {
            self.evaluate_interludes();
            self.evaluate_chapter();
        }
    }

    fn evaluate_interludes(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        for def in catalog.interludes() {
            if self.state.stories.is_completed(&def.id)
                || self.state.interludes.contains(&def.id)
                || self.state.screen == Screen::Story(def.id.clone())
            {
                continue;
            }
            let ctx = self.state.unlocks.trigger_context(
                &self.state.progression,
                self.state.chapter,
                self.state.chapter_elapsed,
            );
            if !def.trigger.is_met(&ctx) {
                continue;
            }
            match def.delay(&self.config.agi_warning_sequence, self.config.agi_warning_delay) {
                Some(jobs) => {
                    self.state
                        .interludes
                        .enqueue(def.id.clone(), jobs, &self.config.agi_warning_sequence);
                    debug!(story = %def.id, jobs, "interlude queued");
                    self.events.push(GameEvent::InterludeQueued {
                        story: def.id.clone(),
                        jobs_remaining: jobs,
                    });
                }
                None if self.state.is_running() => self.open_story(def.id.clone()),
                None => {}
            }
        }
        // A zero-delay entry may be ready straight away.
        if self.state.is_running() && self.state.interludes.head_ready() {
            self.open_ready_interlude();
        }
    }

    fn evaluate_chapter(&mut self) {
        if !self.state.is_running() {
            return;
        }
        let catalog = Arc::clone(&self.catalog);
        let Some(next) = next_chapter(
            &catalog,
            self.state.chapter,
            &self.state.progression,
            self.state.total_completions,
            &self.state.stories,
        ) else {
            return;
        };
        self.state.chapter = next.number;
        self.state.chapter_elapsed = Seconds::ZERO;
        self.dirty.mark(DirtyFlags::CHAPTER);
        info!(chapter = next.number, "chapter advanced");
        self.events.push(GameEvent::ChapterAdvanced {
            chapter: next.number,
        });
        self.open_story(next.story.clone());
        self.hooks.save_now(SaveReason::ChapterTransition);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, DurationRange, JobType};
    use crate::generation::MAX_DURATION;
    use crate::interlude::{InterludeDef, Trigger};
    use crate::resource::{Payout, Reward};
    use crate::test_utils::*;

    fn single_job_session(job: JobType) -> GameSession {
        let id = job.id.clone();
        let mut b = CatalogBuilder::new();
        b.register_job(job).unwrap();
        let mut config = GameConfig::default();
        config.starter_job = id.clone();
        config.starting.unlocked = vec![id];
        GameSession::new(Arc::new(b.build().unwrap()), config)
    }

    fn refusing_job(messages: &[&str]) -> JobType {
        let mut job = JobType::new("stubborn", "Stubborn");
        job.acceptance_chance = Some(Fixed64::ZERO);
        job.rejection_messages = messages.iter().map(|m| m.to_string()).collect();
        job
    }

    #[test]
    fn oversized_content_saturates_instead_of_panicking() {
        let mut job = JobType::new("huge", "Huge");
        job.duration = Some(DurationRange {
            min: 3_000_000_000,
            max: 3_000_000_000,
        });
        job.payouts = vec![Payout::new(Resource::Money, 10_000_000_000_000_000_000)];
        let mut s = single_job_session(job);
        s.config.starter_completions = 0;

        let id = s.request_offer().unwrap();
        assert_eq!(s.offers()[0].duration, MAX_DURATION);
        assert!(s.offers()[0].rewards[0].amount > Amount::ZERO);
        assert_eq!(s.click_offer(id), ClickOutcome::Accepted);
        assert_eq!(s.active()[0].time_remaining, Seconds::from_num(i32::MAX));
        s.tick(secs(1.0));
        assert_eq!(s.active().len(), 1);
    }

    #[test]
    fn due_deliveries_wait_while_interlude_is_open() {
        let mut job = JobType::new("twin", "Twin");
        job.payouts = vec![Payout::new(Resource::Money, 1)];
        let id = job.id.clone();
        let mut b = CatalogBuilder::new();
        b.register_job(job).unwrap();
        let mut later = InterludeDef::new("later", Trigger::Money(Amount::ZERO));
        later.delay_jobs = Some(1);
        b.register_interlude(later).unwrap();
        let mut config = GameConfig::default();
        config.starter_job = id.clone();
        config.starting.unlocked = vec![id];
        let mut s = GameSession::new(Arc::new(b.build().unwrap()), config);

        let first = s.request_offer().unwrap();
        let second = s.request_offer().unwrap();
        assert_eq!(s.click_offer(first), ClickOutcome::Accepted);
        assert_eq!(s.click_offer(second), ClickOutcome::Accepted);
        assert!(s.state().interludes.contains(&story_id("later")));
        assert_eq!(s.active().len(), 2);

        // Both come due together; the first completion opens the interlude.
        s.tick(secs(4.0));
        assert_eq!(s.active().len(), 1);
        assert_eq!(s.screen(), &Screen::Story(story_id("later")));
        assert_eq!(s.state().total_completions, 1);

        // Paused while the story is open.
        s.tick(secs(1.0));
        assert_eq!(s.state().total_completions, 1);

        assert!(s.finish_story());
        s.tick(secs(0.1));
        assert!(s.active().is_empty());
        assert_eq!(s.state().total_completions, 2);

        s.tick(secs(1.0));
        assert_eq!(s.state().total_completions, 2);
    }

    #[test]
    fn starter_offer_from_starting_state() {
        let mut s = fixture_session();
        assert_eq!(s.progression().money, money(48));
        assert_eq!(s.available_compute(), 1);

        let id = s.request_offer().unwrap();
        let offer = &s.offers()[0];
        assert_eq!(offer.id, id);
        assert_eq!(offer.job_type, job_id("imgclassifier"));
        assert_eq!(offer.duration, 4);
        assert_eq!(
            offer.rewards,
            vec![
                Reward { resource: Resource::Money, amount: money(4) },
                Reward { resource: Resource::Data, amount: money(2) },
            ]
        );
    }

    #[test]
    fn certain_acceptance_goes_straight_to_active() {
        let mut s = fixture_session();
        let id = s.request_offer().unwrap();
        assert_eq!(s.click_offer(id), ClickOutcome::Accepted);
        assert_eq!(s.rejection_state(id), 0);
        assert!(s.offers().is_empty());
        assert_eq!(s.active().len(), 1);
        assert_eq!(s.available_compute(), 0);
    }

    #[test]
    fn click_without_free_compute_is_ignored() {
        let mut s = fixture_session();
        let first = s.request_offer().unwrap();
        let second = s.request_offer().unwrap();
        assert_eq!(s.click_offer(first), ClickOutcome::Accepted);
        assert_eq!(s.click_offer(second), ClickOutcome::Ignored);
        assert_eq!(s.offers().len(), 1);
    }

    #[test]
    fn delivery_resolves_once_and_backfills() {
        let mut s = fixture_session();
        let id = s.request_offer().unwrap();
        s.click_offer(id);
        s.drain_events();

        for _ in 0..3 {
            s.tick(secs(1.0));
        }
        assert_eq!(s.active()[0].time_remaining, secs(1.0));
        s.tick(secs(1.0));

        assert!(s.active().is_empty());
        assert_eq!(s.progression().money, money(52));
        assert_eq!(s.progression().data, 2);
        assert_eq!(s.state().total_completions, 1);
        assert_eq!(s.available_compute(), 1);
        // First completion ever backfills one offer.
        assert_eq!(s.offers().len(), 1);

        let completed = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::DeliveryCompleted { .. }))
            .count();
        assert_eq!(completed, 1);
    }

    #[test]
    fn offers_arrive_on_the_interval_up_to_the_cap() {
        let mut s = fixture_session();
        for _ in 0..9 {
            s.tick(secs(1.0));
        }
        assert!(s.offers().is_empty());
        s.tick(secs(1.0));
        assert_eq!(s.offers().len(), 1);
        s.tick(secs(100.0));
        assert_eq!(s.offers().len(), s.config().queue_cap);
        assert!(s.request_offer().is_none());
    }

    #[test]
    fn rejection_chain_takes_n_plus_one_clicks() {
        let mut s = single_job_session(refusing_job(&["No.", "Still no."]));
        let id = s.request_offer().unwrap();

        assert_eq!(
            s.click_offer(id),
            ClickOutcome::Rejected { state: 1, message: "No.".into() }
        );
        assert_eq!(s.rejection_state(id), 1);
        assert_eq!(
            s.click_offer(id),
            ClickOutcome::Rejected { state: 2, message: "Still no.".into() }
        );
        assert_eq!(s.click_offer(id), ClickOutcome::Declined);
        assert!(s.offers().is_empty());
        assert_eq!(s.click_offer(id), ClickOutcome::Ignored);
    }

    #[test]
    fn shared_pool_used_without_own_chain() {
        let mut s = single_job_session(refusing_job(&[]));
        let id = s.request_offer().unwrap();
        let pool_len = s.config().default_rejections[0].len();
        for _ in 0..pool_len {
            assert!(matches!(s.click_offer(id), ClickOutcome::Rejected { .. }));
        }
        assert_eq!(s.click_offer(id), ClickOutcome::Declined);
    }

    #[test]
    fn every_click_shakes() {
        let hooks = RecordingHooks::new();
        let mut b = CatalogBuilder::new();
        b.register_job(refusing_job(&["No."])).unwrap();
        let mut config = GameConfig::default();
        config.starter_job = job_id("stubborn");
        config.starting.unlocked = vec![job_id("stubborn")];
        let mut s = GameSession::with_hooks(Arc::new(b.build().unwrap()), config, Box::new(hooks.clone()));

        let id = s.request_offer().unwrap();
        s.click_offer(id);
        s.click_offer(id);
        assert_eq!(hooks.shakes(), vec![id, id]);
    }

    #[test]
    fn explicit_decline() {
        let mut s = fixture_session();
        let id = s.request_offer().unwrap();
        assert!(s.decline_offer(id));
        assert!(!s.decline_offer(id));
        assert!(s.offers().is_empty());
    }

    #[test]
    fn unlock_requires_prerequisites_and_pays_cost() {
        let (mut s, hooks) = recorded_session();
        let sentiment = job_id("sentiment");
        assert_eq!(s.unlock_job(&sentiment), UnlockOutcome::Ignored);

        s.debug_grant(Resource::Money, money(20));
        assert!(s.can_unlock_job(&sentiment));
        assert_eq!(s.unlock_job(&sentiment), UnlockOutcome::Unlocked);
        assert_eq!(s.progression().money, money(18));
        assert_eq!(s.unlock_job(&sentiment), UnlockOutcome::Ignored);
        assert_eq!(hooks.count(SaveReason::JobUnlock), 1);
        assert_eq!(s.unlock_job(&job_id("nonexistent")), UnlockOutcome::Ignored);
    }

    #[test]
    fn onetime_job_spawns_once_and_completes_once() {
        let (mut s, hooks) = recorded_session();
        s.debug_grant(Resource::Money, money(20));
        s.unlock_job(&job_id("sentiment"));
        assert_eq!(s.unlock_job(&job_id("paper")), UnlockOutcome::Unlocked);

        let paper: Vec<_> = s.offers().iter().filter(|o| o.job_type == job_id("paper")).collect();
        assert_eq!(paper.len(), 1);
        assert_eq!(
            paper[0].rewards,
            vec![
                Reward { resource: Resource::Iq, amount: money(1) },
                Reward { resource: Resource::Money, amount: money(30) },
            ]
        );
        assert_eq!(hooks.count(SaveReason::OnetimeSpawn), 1);
        let paper_id = paper[0].id;

        // Later passes never respawn it.
        s.tick(secs(1.0));
        assert_eq!(s.offers().iter().filter(|o| o.job_type == job_id("paper")).count(), 1);

        assert_eq!(s.click_offer(paper_id), ClickOutcome::Accepted);
        run_until_idle(&mut s, 20);
        assert!(s.state().unlocks.completed_onetime().contains(&job_id("paper")));
        assert_eq!(hooks.count(SaveReason::OnetimeCompleted), 1);
        assert_eq!(s.progression().iq, 1);
        assert!(s.offers().iter().all(|o| o.job_type != job_id("paper")));
    }

    #[test]
    fn delayed_interlude_waits_for_completions() {
        let (mut s, hooks) = recorded_session();
        s.debug_grant(Resource::Money, money(20));
        s.unlock_job(&job_id("sentiment"));
        s.unlock_job(&job_id("paper"));
        let paper_id = s.offers()[0].id;
        s.click_offer(paper_id);
        run_until_idle(&mut s, 20);

        assert!(s.state().interludes.contains(&story_id("paper_read")));
        assert!(s.screen().is_main());

        // The backfilled offer completes next and releases the interlude.
        complete_one(&mut s).unwrap();
        assert_eq!(s.screen(), &Screen::Story(story_id("paper_read")));
        assert_eq!(hooks.count(SaveReason::InterludeDequeue), 1);
        assert!(s.state().interludes.is_empty());
    }

    #[test]
    fn immediate_interlude_pauses_the_tick() {
        let mut s = fixture_session();
        let id = s.request_offer().unwrap();
        s.click_offer(id);
        s.debug_grant(Resource::Money, money(100));
        assert_eq!(s.screen(), &Screen::Story(story_id("first_pay")));

        let before = s.active()[0].time_remaining;
        s.tick(secs(10.0));
        assert_eq!(s.active()[0].time_remaining, before);

        assert!(s.finish_story());
        assert!(s.screen().is_main());
        assert!(s.state().stories.is_completed(&story_id("first_pay")));
        s.tick(secs(10.0));
        assert!(s.active().is_empty());
    }

    #[test]
    fn agi_warnings_queue_in_sequence_order() {
        let mut s = fixture_session();
        s.debug_grant(Resource::Iq, money(12));
        let queued: Vec<_> = s.state().interludes.iter().map(|p| p.id.clone()).collect();
        assert_eq!(queued, vec![story_id("agi_warning_1"), story_id("agi_warning_2")]);
        assert_eq!(s.state().interludes.head().unwrap().jobs_remaining, 2);
    }

    #[test]
    fn sticky_visibility_survives_spending() {
        let mut s = fixture_session();
        let translate = job_id("translate");
        assert!(!s.is_job_visible(&translate));

        s.debug_grant(Resource::Money, money(52));
        assert!(s.can_display_job(&translate));
        s.finish_story();

        s.unlock_job(&job_id("sentiment"));
        assert!(!s.can_display_job(&translate));
        assert!(s.is_job_visible(&translate));
        assert!(s.state().unlocks.ever_visible().contains(&translate));
    }

    #[test]
    fn chapter_advances_and_applies_choice_bonus() {
        let (mut s, hooks) = recorded_session();
        for _ in 0..5 {
            complete_one(&mut s).unwrap();
        }
        assert_eq!(s.state().chapter, 2);
        assert_eq!(s.screen(), &Screen::Story(story_id("chapter_2")));
        assert_eq!(hooks.count(SaveReason::ChapterTransition), 1);

        assert_eq!(s.turn_page(), Some(1));
        assert!(s.make_choice("focus", Some(job_id("secret"))));
        assert!(s.state().unlocks.choice_unlocks().contains(&job_id("secret")));
        assert!(s.finish_story());

        assert_eq!(s.progression().speed_bonus, 200);
        assert_eq!(s.progression().compute, 2);
        assert!(s.can_unlock_job(&job_id("secret")));
        assert!(s.state().stories.is_completed(&story_id("chapter_2")));
    }

    #[test]
    fn lose_beats_win_on_the_same_completion() {
        let mut job = JobType::new("omni", "Omni");
        job.payouts = vec![Payout::new(Resource::Iq, 21), Payout::new(Resource::Wonder, 5)];
        let mut s = single_job_session(job);
        let id = s.request_offer().unwrap();
        s.click_offer(id);
        s.tick(secs(4.0));
        assert_eq!(s.ending(), Some(&Ending::AgiThreshold));
        assert_eq!(s.screen(), &Screen::Ending(Ending::AgiThreshold));
        assert_eq!(s.state().last_wonder.as_deref(), Some("Omni"));
    }

    #[test]
    fn wonder_win_records_last_wonder() {
        let mut job = JobType::new("marvel", "Marvel");
        job.payouts = vec![Payout::new(Resource::Wonder, 5)];
        let mut s = single_job_session(job);
        let id = s.request_offer().unwrap();
        s.click_offer(id);
        s.tick(secs(4.0));
        assert_eq!(s.ending(), Some(&Ending::Wonder));
        assert_eq!(s.state().last_wonder.as_deref(), Some("Marvel"));

        // Everything is frozen afterwards.
        assert!(s.request_offer().is_none());
        assert!(!s.finish_story());
    }

    #[test]
    fn bad_end_unlock_ends_the_game() {
        let mut s = fixture_session();
        s.debug_grant(Resource::Money, money(1000));
        let outcome = s.unlock_job(&job_id("doom"));
        let ending = Ending::Bad("ending_paperclips".into());
        assert_eq!(outcome, UnlockOutcome::Ended(ending.clone()));
        assert_eq!(s.screen(), &Screen::Ending(ending));
        assert!(s.offers().iter().all(|o| o.job_type != job_id("doom")));
    }

    #[test]
    fn dev_speed_scales_time() {
        let mut s = fixture_session();
        s.set_dev_speed(fixed(2.0));
        let id = s.request_offer().unwrap();
        s.click_offer(id);
        s.tick(secs(2.0));
        assert!(s.active().is_empty());
        assert_eq!(s.state().chapter_elapsed, secs(4.0));
    }

    #[test]
    fn unknown_ids_fall_back_to_defaults() {
        let s = fixture_session();
        let ghost = job_id("ghost");
        assert!(s.run_cost(&ghost).is_empty());
        assert!(s.unlock_cost(&ghost).is_empty());
        assert_eq!(s.icon_for(&ghost), crate::catalog::GENERIC_ICON);
        assert_eq!(s.acceptance_probability(&ghost), fixed(1.0));
        assert!(!s.is_job_visible(&ghost));
    }

    #[test]
    fn equal_seeds_evolve_identically() {
        let mut a = seeded_session(77);
        let mut b = seeded_session(77);
        for _ in 0..6 {
            complete_one(&mut a);
            complete_one(&mut b);
            a.finish_story();
            b.finish_story();
        }
        assert_eq!(a.state(), b.state());
        assert_eq!(a.rng(), b.rng());
    }
}
