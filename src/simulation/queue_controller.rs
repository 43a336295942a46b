//! Show and ticket state machine
//!
//! The controller walks through the shows of a level: it builds each show's
//! queue, presents tickets one at a time, validates the player's decisions,
//! and moves on to the next show when the queue drains or the showtime is
//! missed. All waits are tasks on a [`TaskScheduler`] so that a show ended
//! early can cancel everything still pending for it.

use log::{debug, error, info, warn};
use std::collections::VecDeque;

use super::clock::ScheduleClock;
use super::economy::Economy;
use super::events::{EventBus, GameEvent};
use super::level::{Level, Show, ADMISSION_WINDOW_MINUTES};
use super::scheduler::TaskScheduler;
use super::stats::ShiftStats;
use super::ticket_factory::TicketFactory;
use super::types::{CheckResult, Decision, TicketData};
use super::validator::TicketValidator;

/// Delay used when a show time cannot be parsed
pub const FALLBACK_DELAY_SECS: f32 = 1.0;

/// Minutes before showtime at which the countdown cue fires
pub const COUNTDOWN_MINUTES: f32 = 3.0;

/// Sub-state while a show is being admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowPhase {
    /// No ticket on screen, the next one is scheduled
    WaitingForTicket,
    /// A ticket is sliding in
    PresentingTicket,
    /// Ticket on screen, accept/reject allowed
    WaitingForInput,
    /// Decision taken, exit animation running
    ProcessingDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    ShowActive(ShowPhase),
    Intermission,
    LevelComplete,
}

/// Deferred continuations of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerTask {
    StartShow,
    NextTicket,
    /// The view finished sliding the ticket in
    EntranceComplete,
    /// The view finished sliding the checked ticket out
    ExitComplete,
    EndLevel,
}

/// Collaborators owned by the session and lent to the controller per call
pub struct ControllerContext<'a> {
    pub level: Option<&'a Level>,
    pub clock: &'a mut ScheduleClock,
    pub economy: &'a mut Economy,
    pub events: &'a mut EventBus,
}

pub struct TicketQueueController {
    state: ControllerState,
    show_index: usize,
    /// Shows merged into the current queue (more than one for mixed queues)
    shows_in_queue: usize,
    queue: VecDeque<TicketData>,
    current_ticket: Option<TicketData>,
    is_processing: bool,
    waiting_for_input: bool,
    show_active: bool,
    countdown_armed: bool,
    scheduler: TaskScheduler<ControllerTask>,
    factory: TicketFactory,
    validator: TicketValidator,
    stats: ShiftStats,
}

impl TicketQueueController {
    pub fn new(factory: TicketFactory, validator: TicketValidator) -> Self {
        Self {
            state: ControllerState::Idle,
            show_index: 0,
            shows_in_queue: 1,
            queue: VecDeque::new(),
            current_ticket: None,
            is_processing: false,
            waiting_for_input: false,
            show_active: false,
            countdown_armed: true,
            scheduler: TaskScheduler::new(),
            factory,
            validator,
            stats: ShiftStats::default(),
        }
    }

    /// Return to `Idle`, dropping all pending work
    pub fn reset(&mut self) {
        self.state = ControllerState::Idle;
        self.show_index = 0;
        self.shows_in_queue = 1;
        self.queue.clear();
        self.current_ticket = None;
        self.is_processing = false;
        self.waiting_for_input = false;
        self.show_active = false;
        self.countdown_armed = true;
        self.scheduler.reset();
        self.stats = ShiftStats::default();
    }

    pub fn start_level(&mut self, ctx: &mut ControllerContext) {
        self.reset();
        self.start_show(ctx);
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn show_index(&self) -> usize {
        self.show_index
    }

    pub fn current_ticket(&self) -> Option<&TicketData> {
        self.current_ticket.as_ref()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queued_tickets(&self) -> impl Iterator<Item = &TicketData> {
        self.queue.iter()
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn is_waiting_for_input(&self) -> bool {
        self.waiting_for_input
    }

    pub fn is_show_active(&self) -> bool {
        self.show_active
    }

    pub fn is_level_complete(&self) -> bool {
        self.state == ControllerState::LevelComplete
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn stats(&self) -> &ShiftStats {
        &self.stats
    }

    pub fn validator(&self) -> &TicketValidator {
        &self.validator
    }

    /// Begin the show at `show_index`, or finish the level if none is left
    pub fn start_show(&mut self, ctx: &mut ControllerContext) {
        let level = match ctx.level {
            Some(level) => level,
            None => {
                error!("No level loaded, ending game");
                self.finish_level(ctx);
                return;
            }
        };

        let show = match level.show(self.show_index) {
            Some(show) => show,
            None => {
                info!(
                    "Show index {} is past the {} shows of '{}'",
                    self.show_index,
                    level.show_count(),
                    level.name
                );
                self.finish_level(ctx);
                return;
            }
        };

        if self.show_index == 0 {
            ctx.clock.set_time_factor(level.timing.time_factor);
            ctx.clock.set_level_start_time(&level.effective_start_time());
        }

        self.queue = self.factory.build_queue(show, &level.date);
        self.shows_in_queue = 1;
        self.begin_show(ctx, level, show);
    }

    /// Start one queue holding every upcoming show inside the admission window
    ///
    /// The clock only targets the earliest merged show. Tickets for the later
    /// shows fail the time match, so the only correct call on them is reject.
    fn start_mixed_show(&mut self, ctx: &mut ControllerContext, level: &Level) {
        let now = ctx.clock.elapsed_seconds();
        let window = ADMISSION_WINDOW_MINUTES * 60.0;

        let mut shows: Vec<&Show> = Vec::new();
        for show in level.shows.iter().skip(self.show_index) {
            let within = match show.start_seconds() {
                Some(start) => start - now <= window,
                None => false,
            };
            if !within && !shows.is_empty() {
                break;
            }
            shows.push(show);
            if !within {
                break;
            }
        }

        let first = match shows.first() {
            Some(first) => *first,
            None => {
                self.finish_level(ctx);
                return;
            }
        };

        debug!(
            "Mixing {} shows starting at '{}' {}",
            shows.len(),
            first.film_title,
            first.start_time
        );
        self.queue = self.factory.build_mixed_queue(&shows, &level.date);
        self.shows_in_queue = shows.len();
        self.begin_show(ctx, level, first);
    }

    fn begin_show(&mut self, ctx: &mut ControllerContext, level: &Level, show: &Show) {
        ctx.clock.set_target_show(&show.film_title, &show.start_time, ctx.events);
        self.current_ticket = None;
        self.is_processing = false;
        self.waiting_for_input = false;
        self.show_active = true;
        self.countdown_armed = true;
        self.state = ControllerState::ShowActive(ShowPhase::WaitingForTicket);

        info!(
            "Show {} started: '{}' at {} with {} tickets (clock {})",
            self.show_index,
            show.film_title,
            show.start_time,
            self.queue.len(),
            ctx.clock.current_game_time()
        );
        ctx.events.publish(GameEvent::ShowStarted {
            show_index: self.show_index,
            film_title: show.film_title.clone(),
            show_time: show.start_time.clone(),
            ticket_count: self.queue.len(),
        });

        self.scheduler
            .schedule(level.timing.initial_delay, ControllerTask::NextTicket);
    }

    /// Present the next ticket, or end the show when the queue is empty
    pub fn next_ticket(&mut self, ctx: &mut ControllerContext) {
        if !self.show_active {
            debug!("Ignoring next ticket request outside an active show");
            return;
        }

        let ticket = match self.queue.pop_front() {
            Some(ticket) => ticket,
            None => {
                let on_time = ctx.clock.finished_before_showtime()
                    && ctx.clock.minutes_until_target().map_or(true, |m| m >= 0.0);
                self.end_show(ctx, on_time);
                return;
            }
        };

        let slide_in = ctx
            .level
            .map(|l| l.timing.slide_in_duration)
            .unwrap_or(FALLBACK_DELAY_SECS);

        debug!(
            "Presenting ticket '{}' {} ({:?}), {} left",
            ticket.film_title,
            ticket.show_time,
            ticket.special,
            self.queue.len()
        );
        self.current_ticket = Some(ticket.clone());
        self.is_processing = false;
        self.waiting_for_input = false;
        self.state = ControllerState::ShowActive(ShowPhase::PresentingTicket);
        self.stats.tickets_presented += 1;
        self.scheduler
            .schedule(slide_in, ControllerTask::EntranceComplete);

        ctx.events.publish(GameEvent::TicketSpawned {
            ticket,
            remaining: self.queue.len(),
        });
    }

    /// The view reports the ticket is fully on screen
    pub fn on_entrance_complete(&mut self) {
        if self.current_ticket.is_some() && !self.is_processing && self.show_active {
            self.waiting_for_input = true;
            self.state = ControllerState::ShowActive(ShowPhase::WaitingForInput);
        }
    }

    pub fn accept_current_ticket(&mut self, ctx: &mut ControllerContext) -> Option<CheckResult> {
        self.decide(ctx, Decision::Accept)
    }

    pub fn reject_current_ticket(&mut self, ctx: &mut ControllerContext) -> Option<CheckResult> {
        self.decide(ctx, Decision::Reject)
    }

    /// Validate and score the player's decision on the displayed ticket
    ///
    /// Returns `None` when no decision is allowed right now, which covers
    /// duplicate and re-entrant input.
    pub fn decide(&mut self, ctx: &mut ControllerContext, decision: Decision) -> Option<CheckResult> {
        if self.is_processing || !self.waiting_for_input {
            debug!("Ignoring {:?}: not waiting for input", decision);
            return None;
        }
        let ticket = self.current_ticket.clone()?;

        self.waiting_for_input = false;
        self.is_processing = true;
        self.state = ControllerState::ShowActive(ShowPhase::ProcessingDecision);

        let result = self.validator.validate(decision, &ticket, ctx.clock);
        debug!(
            "{:?} '{}' {} -> {:?} ({:+}) {}",
            decision,
            ticket.film_title,
            ticket.show_time,
            result.outcome,
            result.income_delta,
            result.reason
        );
        self.stats.record(result.outcome);

        ctx.events.publish(GameEvent::TicketChecked {
            ticket,
            decision,
            result: result.clone(),
        });
        ctx.economy.apply_result(&result, ctx.events);

        let slide_out = ctx
            .level
            .map(|l| l.timing.slide_out_duration)
            .unwrap_or(FALLBACK_DELAY_SECS);
        self.scheduler.schedule(slide_out, ControllerTask::ExitComplete);

        Some(result)
    }

    /// The view finished the exit animation of the checked ticket
    pub fn on_exit_complete(&mut self, ctx: &mut ControllerContext) {
        if !self.is_processing {
            return;
        }
        self.current_ticket = None;
        self.is_processing = false;
        self.state = ControllerState::ShowActive(ShowPhase::WaitingForTicket);

        let delay = ctx
            .level
            .map(|l| l.timing.ticket_interval_delay)
            .unwrap_or(FALLBACK_DELAY_SECS);
        self.scheduler.schedule(delay, ControllerTask::NextTicket);
    }

    /// Per-frame missed-showtime detection and countdown cue
    pub fn check_show_time_and_countdown(&mut self, ctx: &mut ControllerContext) {
        if !self.show_active {
            return;
        }
        let minutes = match ctx.clock.minutes_until_target() {
            Some(minutes) => minutes,
            None => return,
        };

        if minutes < 0.0 && !self.queue.is_empty() {
            self.stop_checking(ctx);
            return;
        }

        if minutes > COUNTDOWN_MINUTES {
            self.countdown_armed = true;
        } else if minutes > 0.0 && self.countdown_armed {
            self.countdown_armed = false;
            ctx.events.publish(GameEvent::CountdownCue {
                minutes_left: minutes,
            });
        }
    }

    /// Cut the show off: drop the remaining queue and all pending tasks
    pub fn stop_checking(&mut self, ctx: &mut ControllerContext) {
        let undecided = usize::from(self.current_ticket.is_some() && !self.is_processing);
        let dropped = self.queue.len() + undecided;
        warn!(
            "Showtime {} passed with {} tickets unchecked",
            ctx.clock.target_time(),
            dropped
        );
        self.stats.tickets_missed += dropped;

        self.queue.clear();
        self.current_ticket = None;
        self.is_processing = false;
        self.waiting_for_input = false;
        self.scheduler.cancel_all();

        self.end_show(ctx, false);
    }

    fn end_show(&mut self, ctx: &mut ControllerContext, on_time: bool) {
        ctx.clock.set_finished_before_showtime(on_time);
        info!(
            "Show {} ended ({})",
            self.show_index,
            if on_time { "on time" } else { "late" }
        );
        ctx.events.publish(GameEvent::ShowEnded {
            show_index: self.show_index,
            finished_before_showtime: on_time,
        });
        self.stats.record_show_end(on_time);

        self.show_index += self.shows_in_queue;
        self.shows_in_queue = 1;
        self.show_active = false;
        self.current_ticket = None;
        self.is_processing = false;
        self.waiting_for_input = false;

        self.after_show(ctx);
    }

    /// Intermission: jump the clock or mix close shows, or wrap up the level
    fn after_show(&mut self, ctx: &mut ControllerContext) {
        let level = match ctx.level {
            Some(level) => level,
            None => {
                error!("Level disappeared between shows, ending game");
                self.finish_level(ctx);
                return;
            }
        };

        let next = match level.show(self.show_index) {
            Some(next) => next,
            None => {
                self.state = ControllerState::Intermission;
                self.scheduler
                    .schedule(level.timing.level_end_delay, ControllerTask::EndLevel);
                return;
            }
        };

        self.state = ControllerState::Intermission;
        ctx.events.publish(GameEvent::IntermissionHint {
            next_film_title: next.film_title.clone(),
            next_show_time: next.start_time.clone(),
        });

        match next.start_seconds() {
            Some(next_start) => {
                let window = ADMISSION_WINDOW_MINUTES * 60.0;
                let gap = next_start - ctx.clock.elapsed_seconds();
                if gap > window {
                    ctx.clock.jump_to(next_start - window);
                    debug!("Clock jumped to {}", ctx.clock.current_game_time());
                    self.scheduler
                        .schedule(level.timing.show_interval_delay, ControllerTask::StartShow);
                } else {
                    self.start_mixed_show(ctx, level);
                }
            }
            None => {
                warn!(
                    "Next show '{}' has unparsable time '{}', starting after fallback delay",
                    next.film_title, next.start_time
                );
                self.scheduler
                    .schedule(FALLBACK_DELAY_SECS, ControllerTask::StartShow);
            }
        }
    }

    fn finish_level(&mut self, ctx: &mut ControllerContext) {
        if self.state == ControllerState::LevelComplete {
            return;
        }
        self.scheduler.cancel_all();
        self.queue.clear();
        self.current_ticket = None;
        self.show_active = false;
        self.is_processing = false;
        self.waiting_for_input = false;
        self.state = ControllerState::LevelComplete;
        info!("Level complete after {} shows", self.show_index);
        ctx.events.publish(GameEvent::GameOver);
    }

    /// Advance scheduler time and run every task that came due
    pub fn run_due_tasks(&mut self, ctx: &mut ControllerContext, delta_secs: f32) {
        self.scheduler.advance(delta_secs);
        while let Some(task) = self.scheduler.pop_due() {
            self.run_task(ctx, task);
        }
    }

    fn run_task(&mut self, ctx: &mut ControllerContext, task: ControllerTask) {
        match task {
            ControllerTask::StartShow => self.start_show(ctx),
            ControllerTask::NextTicket => self.next_ticket(ctx),
            ControllerTask::EntranceComplete => self.on_entrance_complete(),
            ControllerTask::ExitComplete => self.on_exit_complete(ctx),
            ControllerTask::EndLevel => self.finish_level(ctx),
        }
    }
}
