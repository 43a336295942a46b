//! Income and star rating for the active level
//!
//! Income starts at zero for every level attempt and can never go below
//! zero. Stars are awarded by comparing the final income against the
//! level's three ascending thresholds.

use log::warn;

use super::events::{EventBus, GameEvent};
use super::level::{Level, StarThresholds};
use super::types::CheckResult;

/// Coins awarded per star on top of the final income
pub const COINS_PER_STAR: i32 = 5;

#[derive(Debug, Clone, Default)]
pub struct Economy {
    income: i32,
    thresholds: Option<StarThresholds>,
}

impl Economy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch level; income restarts at zero
    pub fn set_current_level(&mut self, level: &Level) {
        self.thresholds = Some(level.thresholds);
        self.reset_income();
    }

    pub fn clear_level(&mut self) {
        self.thresholds = None;
        self.reset_income();
    }

    pub fn reset_income(&mut self) {
        self.income = 0;
    }

    pub fn income(&self) -> i32 {
        self.income
    }

    /// Apply a score delta, floor-clamped at zero
    pub fn apply_result(&mut self, result: &CheckResult, events: &mut EventBus) {
        self.income = self.income.saturating_add(result.income_delta).max(0);
        events.publish(GameEvent::IncomeChanged {
            income: self.income,
            result: result.clone(),
        });
    }

    pub fn star_rating(&self) -> u8 {
        match &self.thresholds {
            Some(t) => stars_for_income(self.income, t),
            None => {
                warn!("No active level for star rating, returning 0");
                0
            }
        }
    }

    /// Coins granted for finishing the level with the current income
    pub fn currency_award(&self) -> i32 {
        self.income + COINS_PER_STAR * self.star_rating() as i32
    }
}

/// Stars earned for `income` against `thresholds`
pub fn stars_for_income(income: i32, thresholds: &StarThresholds) -> u8 {
    if income >= thresholds.star3 {
        3
    } else if income >= thresholds.star2 {
        2
    } else if income >= thresholds.star1 {
        1
    } else {
        0
    }
}
