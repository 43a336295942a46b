//! Accept/reject rule evaluation
//!
//! Validation is a pure function of the ticket, the clock, and the penalty
//! configuration. Rules are checked in order and the first match wins, so an
//! invalid ticket that is also early is reported as invalid.

use super::clock::ScheduleClock;
use super::level::ADMISSION_WINDOW_MINUTES;
use super::types::{CheckOutcome, CheckResult, Decision, SpecialEventType, TicketData};

/// Income gained for admitting a valid ticket
pub const REWARD_CORRECT_ACCEPT: i32 = 1;

pub const REASON_INVALID_ADMITTED: &str = "Invalid ticket admitted";
pub const REASON_ADMITTED_EARLY: &str = "Admitted too early";
pub const REASON_ADMIT_OK: &str = "Admit OK";
pub const REASON_REJECT_OK: &str = "Reject OK";
pub const REASON_SHOULD_ADMIT: &str = "Should have admitted";

/// Penalties and thresholds used by the validator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatorConfig {
    pub penalty_invalid: i32,
    pub penalty_early: i32,
    /// A ticket is too early when its show is at least this many minutes away
    pub early_minutes: f32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            penalty_invalid: 10,
            penalty_early: 5,
            early_minutes: ADMISSION_WINDOW_MINUTES,
        }
    }
}

/// Predicates shared by both entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketFindings {
    pub name_match: bool,
    pub time_match: bool,
    pub too_early: bool,
    pub invalid_special: bool,
    pub early_check: bool,
}

impl TicketFindings {
    /// Something makes the ticket inadmissible right now
    pub fn should_reject(&self) -> bool {
        !self.name_match || !self.time_match || self.invalid_special || self.too_early || self.early_check
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TicketValidator {
    config: ValidatorConfig,
}

impl TicketValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn findings(&self, ticket: &TicketData, clock: &ScheduleClock) -> TicketFindings {
        TicketFindings {
            name_match: clock.is_film_today(&ticket.film_title),
            time_match: clock.is_correct_showtime(&ticket.show_time),
            too_early: clock.is_earlier_than_minutes(&ticket.show_time, self.config.early_minutes),
            invalid_special: ticket.special.is_invalid_kind() || !ticket.has_stub,
            early_check: ticket.special == SpecialEventType::EarlyCheck,
        }
    }

    pub fn validate_accept(&self, ticket: &TicketData, clock: &ScheduleClock) -> CheckResult {
        let f = self.findings(ticket, clock);

        if !f.name_match || !f.time_match || f.invalid_special {
            CheckResult::new(
                CheckOutcome::WrongAccept,
                -self.config.penalty_invalid,
                REASON_INVALID_ADMITTED,
            )
        } else if f.too_early || f.early_check {
            CheckResult::new(
                CheckOutcome::WrongAccept,
                -self.config.penalty_early,
                REASON_ADMITTED_EARLY,
            )
        } else {
            CheckResult::new(CheckOutcome::CorrectAccept, REWARD_CORRECT_ACCEPT, REASON_ADMIT_OK)
        }
    }

    pub fn validate_reject(&self, ticket: &TicketData, clock: &ScheduleClock) -> CheckResult {
        if self.findings(ticket, clock).should_reject() {
            CheckResult::new(CheckOutcome::CorrectReject, 0, REASON_REJECT_OK)
        } else {
            CheckResult::new(CheckOutcome::WrongReject, 0, REASON_SHOULD_ADMIT)
        }
    }

    pub fn validate(&self, decision: Decision, ticket: &TicketData, clock: &ScheduleClock) -> CheckResult {
        match decision {
            Decision::Accept => self.validate_accept(ticket, clock),
            Decision::Reject => self.validate_reject(ticket, clock),
        }
    }
}
