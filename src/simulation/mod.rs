//! Standalone ticket checking engine
//!
//! This module contains the schedule clock, ticket generation, validation,
//! scoring, and the show/ticket state machine. It runs without any engine
//! or renderer and can be driven from tests or the headless binary.

mod autoplayer;
mod clock;
mod economy;
mod events;
mod level;
mod progress;
mod queue_controller;
mod scheduler;
mod session;
mod stats;
mod ticket_factory;
mod types;
mod validator;

// Re-export public types for external use
pub use autoplayer::AutoPlayer;
pub use clock::{format_hhmm, parse_hhmm, ScheduleClock, TimeScale, DEFAULT_START_TIME, SECONDS_PER_DAY};
pub use economy::{stars_for_income, Economy, COINS_PER_STAR};
pub use events::{EventBus, GameEvent, SubscriptionId};
pub use level::{
    Level, LevelDatabase, LevelTiming, Show, SpecialEventConfig, StarThresholds,
    ADMISSION_WINDOW_MINUTES, MAX_AUDIENCE,
};
pub use progress::{
    is_level_unlocked, level_stars_key, record_level_completion, LevelCompletion,
    MemoryProgressStore, ProgressStore, KEY_COINS, KEY_UNLOCKED_LEVELS,
};
pub use queue_controller::{
    ControllerContext, ControllerState, ControllerTask, ShowPhase, TicketQueueController,
    COUNTDOWN_MINUTES, FALLBACK_DELAY_SECS,
};
pub use scheduler::{TaskHandle, TaskScheduler};
pub use session::{GameSession, SessionConfig};
pub use stats::ShiftStats;
pub use ticket_factory::{fisher_yates, format_ticket_date, TicketFactory};
pub use types::{CheckOutcome, CheckResult, Decision, SpecialEventType, TicketData};
pub use validator::{
    TicketFindings, TicketValidator, ValidatorConfig, REASON_ADMITTED_EARLY, REASON_ADMIT_OK,
    REASON_INVALID_ADMITTED, REASON_REJECT_OK, REASON_SHOULD_ADMIT, REWARD_CORRECT_ACCEPT,
};
