//! Core types for the ticket checking game
//!
//! These are standalone value types shared by the factory, validator,
//! economy, and queue controller.

use serde::{Deserialize, Serialize};

/// Anomaly class attached to a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum SpecialEventType {
    /// A regular ticket
    #[default]
    None,
    /// Film title on the ticket does not match the show
    WrongFilm,
    /// Stale ticket from a past date
    OldTicket,
    /// Photocopied ticket
    CopyTicket,
    /// Forged, hand drawn ticket
    DrawnTicket,
    /// Screenshot or reused electronic ticket
    ElectronicAbuse,
    /// Torn or unreadable ticket
    DamagedTicket,
    /// Ticket presented without its stub
    MissingStub,
    /// Ticket for a later show presented before its admission window
    EarlyCheck,
}

impl SpecialEventType {
    /// Types that are never admissible regardless of film or showtime
    pub fn is_invalid_kind(self) -> bool {
        matches!(
            self,
            SpecialEventType::OldTicket
                | SpecialEventType::CopyTicket
                | SpecialEventType::DrawnTicket
                | SpecialEventType::ElectronicAbuse
                | SpecialEventType::DamagedTicket
        )
    }
}

/// A single ticket presented to the player
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketData {
    pub film_title: String,
    /// Showtime printed on the ticket (`HH:mm`)
    pub show_time: String,
    /// Date in ticket display form (`Month/yy/dd`)
    pub show_date: String,
    pub special: SpecialEventType,
    pub has_stub: bool,
    /// Ground truth from the level configuration
    pub is_valid: bool,
}

impl TicketData {
    /// Create a regular ticket for a show
    pub fn normal(film_title: &str, show_time: &str, show_date: &str) -> Self {
        Self {
            film_title: film_title.to_string(),
            show_time: show_time.to_string(),
            show_date: show_date.to_string(),
            special: SpecialEventType::None,
            has_stub: true,
            is_valid: true,
        }
    }

    pub fn is_special(&self) -> bool {
        self.special != SpecialEventType::None
    }
}

/// The player's action on the current ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Accept,
    Reject,
}

/// Correctness of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckOutcome {
    CorrectAccept,
    WrongAccept,
    CorrectReject,
    WrongReject,
}

impl CheckOutcome {
    pub const ALL: [CheckOutcome; 4] = [
        CheckOutcome::CorrectAccept,
        CheckOutcome::WrongAccept,
        CheckOutcome::CorrectReject,
        CheckOutcome::WrongReject,
    ];

    pub fn is_correct(self) -> bool {
        matches!(self, CheckOutcome::CorrectAccept | CheckOutcome::CorrectReject)
    }
}

/// Result of validating one decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub outcome: CheckOutcome,
    pub income_delta: i32,
    pub reason: String,
}

impl CheckResult {
    pub fn new(outcome: CheckOutcome, income_delta: i32, reason: &str) -> Self {
        Self {
            outcome,
            income_delta,
            reason: reason.to_string(),
        }
    }
}
