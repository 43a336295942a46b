//! Game session: owner of every runtime service for one level attempt
//!
//! The session wires the clock, economy, event bus, and queue controller
//! together and fixes the order of work inside a tick:
//! 1. the clock advances,
//! 2. the controller checks for a missed showtime,
//! 3. due scheduled tasks run,
//! 4. player decisions submitted since the last tick are applied.

use log::{error, info};

use super::clock::{ScheduleClock, TimeScale};
use super::economy::Economy;
use super::events::{EventBus, GameEvent, SubscriptionId};
use super::level::{Level, LevelDatabase};
use super::progress::{
    record_level_completion, LevelCompletion, MemoryProgressStore, ProgressStore, KEY_COINS,
    KEY_UNLOCKED_LEVELS,
};
use super::queue_controller::{ControllerContext, TicketQueueController};
use super::ticket_factory::TicketFactory;
use super::types::{CheckResult, Decision};
use super::validator::{TicketValidator, ValidatorConfig};

/// Construction options for a [`GameSession`]
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub level_index: usize,
    /// Seed for ticket generation; `None` uses the thread RNG
    pub seed: Option<u64>,
    pub validator: ValidatorConfig,
    /// Events kept in the bus history (0 disables it)
    pub event_history: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            level_index: 0,
            seed: None,
            validator: ValidatorConfig::default(),
            event_history: 256,
        }
    }
}

pub struct GameSession {
    levels: LevelDatabase,
    level_index: usize,
    pub time_scale: TimeScale,
    clock: ScheduleClock,
    economy: Economy,
    events: EventBus,
    controller: TicketQueueController,
    progress: Box<dyn ProgressStore>,
    pending_decisions: Vec<Decision>,
    decision_results: Vec<CheckResult>,
    completion: Option<LevelCompletion>,
    started: bool,
}

impl GameSession {
    pub fn new(levels: LevelDatabase, config: SessionConfig) -> Self {
        let factory = match config.seed {
            Some(seed) => TicketFactory::new_with_seed(seed),
            None => TicketFactory::new(),
        };
        let controller = TicketQueueController::new(factory, TicketValidator::new(config.validator));

        Self {
            levels,
            level_index: config.level_index,
            time_scale: TimeScale::default(),
            clock: ScheduleClock::new(),
            economy: Economy::new(),
            events: EventBus::with_history(config.event_history),
            controller,
            progress: Box::new(MemoryProgressStore::new()),
            pending_decisions: Vec::new(),
            decision_results: Vec::new(),
            completion: None,
            started: false,
        }
    }

    pub fn with_progress_store(mut self, store: Box<dyn ProgressStore>) -> Self {
        self.progress = store;
        self
    }

    fn split(&mut self) -> (&mut TicketQueueController, ControllerContext<'_>) {
        (
            &mut self.controller,
            ControllerContext {
                level: self.levels.level(self.level_index),
                clock: &mut self.clock,
                economy: &mut self.economy,
                events: &mut self.events,
            },
        )
    }

    /// Begin (or begin again) the current level
    pub fn start(&mut self) {
        self.clock = ScheduleClock::new();
        self.completion = None;
        self.pending_decisions.clear();
        self.decision_results.clear();

        match self.levels.level(self.level_index) {
            Some(level) => {
                info!("Starting level {} '{}'", self.level_index, level.name);
                self.economy.set_current_level(level);
            }
            None => {
                error!("Level index {} does not exist", self.level_index);
                self.economy.clear_level();
            }
        }

        self.started = true;
        let (controller, mut ctx) = self.split();
        controller.start_level(&mut ctx);
        self.check_completion();
    }

    pub fn restart(&mut self) {
        self.start();
    }

    /// Switch to another level and start it
    pub fn load_level(&mut self, level_index: usize) {
        self.level_index = level_index;
        self.start();
    }

    /// Advance one frame by the raw (unscaled) frame delta
    pub fn tick(&mut self, raw_delta_secs: f32) {
        if !self.started || self.completion.is_some() {
            return;
        }
        let delta = self.time_scale.delta(raw_delta_secs);

        self.clock.update(delta);

        let decisions = std::mem::take(&mut self.pending_decisions);
        let mut results = Vec::new();
        {
            let (controller, mut ctx) = self.split();
            controller.check_show_time_and_countdown(&mut ctx);
            controller.run_due_tasks(&mut ctx, delta);
            for decision in decisions {
                if let Some(result) = controller.decide(&mut ctx, decision) {
                    results.push(result);
                }
            }
        }
        self.decision_results.extend(results);

        self.check_completion();
    }

    /// Queue a decision to be applied at the end of the next tick
    pub fn submit(&mut self, decision: Decision) {
        self.pending_decisions.push(decision);
    }

    /// Results of submitted decisions that were accepted by the controller
    pub fn take_decision_results(&mut self) -> Vec<CheckResult> {
        std::mem::take(&mut self.decision_results)
    }

    pub fn accept_current_ticket(&mut self) -> Option<CheckResult> {
        self.decide_now(Decision::Accept)
    }

    pub fn reject_current_ticket(&mut self) -> Option<CheckResult> {
        self.decide_now(Decision::Reject)
    }

    fn decide_now(&mut self, decision: Decision) -> Option<CheckResult> {
        if self.completion.is_some() {
            return None;
        }
        let (controller, mut ctx) = self.split();
        controller.decide(&mut ctx, decision)
    }

    /// Final scoring once the controller reports game over
    fn check_completion(&mut self) {
        if self.completion.is_some() || !self.controller.is_level_complete() {
            return;
        }

        if self.level().is_none() {
            // Nothing was played, so the store is left untouched
            self.completion = Some(LevelCompletion {
                level_index: self.level_index,
                stars: 0,
                best_stars: 0,
                coins_awarded: 0,
                total_coins: self.progress.get_int(KEY_COINS).unwrap_or(0),
                unlocked_levels: self.progress.get_int(KEY_UNLOCKED_LEVELS).unwrap_or(1),
            });
            return;
        }

        let stars = self.economy.star_rating();
        let coins = self.economy.currency_award();
        let completion =
            record_level_completion(self.progress.as_mut(), self.level_index, stars, coins);
        info!(
            "Level {} finished: income {}, {} stars, {} coins awarded",
            self.level_index,
            self.economy.income(),
            stars,
            coins
        );
        self.completion = Some(completion);
    }

    pub fn subscribe(&mut self, listener: Box<dyn FnMut(&GameEvent)>) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn level(&self) -> Option<&Level> {
        self.levels.level(self.level_index)
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn levels(&self) -> &LevelDatabase {
        &self.levels
    }

    pub fn clock(&self) -> &ScheduleClock {
        &self.clock
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn controller(&self) -> &TicketQueueController {
        &self.controller
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn progress(&self) -> &dyn ProgressStore {
        self.progress.as_ref()
    }

    pub fn completion(&self) -> Option<&LevelCompletion> {
        self.completion.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.completion.is_some()
    }

    /// One-line status for headless output
    pub fn summary(&self) -> String {
        format!(
            "Clock: {} | Show: {} | Queue: {} | Income: {} | {}",
            self.clock.current_game_time(),
            self.controller.show_index(),
            self.controller.queue_len(),
            self.economy.income(),
            self.controller.stats().summary()
        )
    }
}
