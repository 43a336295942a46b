//! In-game wall clock
//!
//! Simulated time is kept as seconds since midnight and advanced every
//! tick by the scaled frame delta times the level's time factor.

use chrono::{NaiveTime, Timelike};
use log::{error, warn};

use super::events::{EventBus, GameEvent};

/// Seconds in one day
pub const SECONDS_PER_DAY: f32 = 86_400.0;

/// Fallback start of day when a level start time cannot be parsed
pub const DEFAULT_START_TIME: &str = "08:00";

/// Parse an `HH:mm` string into seconds since midnight
pub fn parse_hhmm(value: &str) -> Option<f32> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .ok()
        .map(|t| t.num_seconds_from_midnight() as f32)
}

/// Format seconds since midnight as `HH:mm`, wrapping at 24h
pub fn format_hhmm(seconds: f32) -> String {
    let whole = if seconds.is_finite() { seconds.floor() as i64 } else { 0 };
    let wrapped = whole.rem_euclid(SECONDS_PER_DAY as i64) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(wrapped, 0)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| DEFAULT_START_TIME.to_string())
}

/// Global time scaling service
///
/// Converts the raw frame delta into the delta seen by the game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub scale: f32,
    pub paused: bool,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            scale: 1.0,
            paused: false,
        }
    }
}

impl TimeScale {
    pub fn delta(&self, raw_delta_secs: f32) -> f32 {
        if self.paused || !raw_delta_secs.is_finite() || raw_delta_secs <= 0.0 {
            0.0
        } else {
            raw_delta_secs * self.scale.max(0.0)
        }
    }
}

/// Simulated schedule clock
#[derive(Debug, Clone)]
pub struct ScheduleClock {
    elapsed_seconds: f32,
    time_factor: f32,
    target_film: String,
    target_time: String,
    finished_before_showtime: bool,
}

impl Default for ScheduleClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleClock {
    pub fn new() -> Self {
        Self {
            elapsed_seconds: parse_hhmm(DEFAULT_START_TIME).unwrap_or(8.0 * 3600.0),
            time_factor: 1.0,
            target_film: String::new(),
            target_time: String::new(),
            finished_before_showtime: true,
        }
    }

    pub fn set_time_factor(&mut self, factor: f32) {
        if factor.is_finite() && factor >= 0.0 {
            self.time_factor = factor;
        } else {
            warn!("Ignoring invalid time factor {}", factor);
        }
    }

    pub fn time_factor(&self) -> f32 {
        self.time_factor
    }

    /// Reset simulated time to the given `HH:mm`; falls back to 08:00
    pub fn set_level_start_time(&mut self, hhmm: &str) {
        self.elapsed_seconds = match parse_hhmm(hhmm) {
            Some(seconds) => seconds,
            None => {
                warn!(
                    "Could not parse level start time '{}', defaulting to {}",
                    hhmm, DEFAULT_START_TIME
                );
                parse_hhmm(DEFAULT_START_TIME).unwrap_or(8.0 * 3600.0)
            }
        };
    }

    /// Record the show currently being admitted
    pub fn set_target_show(&mut self, film_title: &str, show_time: &str, events: &mut EventBus) {
        self.target_film = film_title.to_string();
        self.target_time = show_time.to_string();
        self.finished_before_showtime = true;
        events.publish(GameEvent::ScheduleSet {
            film_title: self.target_film.clone(),
            show_time: self.target_time.clone(),
        });
    }

    /// Advance by an already time-scaled frame delta
    pub fn update(&mut self, delta_secs: f32) {
        if delta_secs.is_finite() && delta_secs > 0.0 {
            self.elapsed_seconds += delta_secs * self.time_factor;
        }
    }

    /// Move simulated time to an absolute point (show transitions)
    pub fn jump_to(&mut self, seconds: f32) {
        if seconds.is_finite() {
            self.elapsed_seconds = seconds;
        } else {
            error!("Refusing to jump clock to non-finite time");
        }
    }

    pub fn is_film_today(&self, film_title: &str) -> bool {
        !self.target_film.is_empty() && self.target_film == film_title
    }

    pub fn is_correct_showtime(&self, show_time: &str) -> bool {
        !self.target_time.is_empty() && self.target_time == show_time
    }

    /// Minutes from now until `show_hhmm`; negative once it has passed
    pub fn minutes_until(&self, show_hhmm: &str) -> Option<f32> {
        parse_hhmm(show_hhmm).map(|show| (show - self.elapsed_seconds) / 60.0)
    }

    pub fn minutes_until_target(&self) -> Option<f32> {
        if self.target_time.is_empty() {
            return None;
        }
        self.minutes_until(&self.target_time)
    }

    /// True when the show is at least `minutes` away
    pub fn is_earlier_than_minutes(&self, show_hhmm: &str, minutes: f32) -> bool {
        match self.minutes_until(show_hhmm) {
            Some(until) => until >= minutes,
            None => {
                warn!("Could not parse showtime '{}'", show_hhmm);
                false
            }
        }
    }

    pub fn current_game_time(&self) -> String {
        format_hhmm(self.elapsed_seconds)
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed_seconds
    }

    pub fn target_film(&self) -> &str {
        &self.target_film
    }

    pub fn target_time(&self) -> &str {
        &self.target_time
    }

    pub fn finished_before_showtime(&self) -> bool {
        self.finished_before_showtime
    }

    pub fn set_finished_before_showtime(&mut self, on_time: bool) {
        self.finished_before_showtime = on_time;
    }

    /// Forget the current target show
    pub fn clear_target(&mut self) {
        self.target_film.clear();
        self.target_time.clear();
    }
}
