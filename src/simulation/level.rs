//! Static level configuration
//!
//! A level is one working day at the cinema: an ordered list of shows plus
//! the timing and star thresholds used while playing it. Levels are loaded
//! once from JSON (or the built-in campaign) and never mutated at runtime.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::clock::parse_hhmm;
use super::types::SpecialEventType;

/// Largest audience a single show may have
pub const MAX_AUDIENCE: u32 = 200;

/// Minutes before a show at which admission opens
pub const ADMISSION_WINDOW_MINUTES: f32 = 20.0;

/// Anomaly class to inject into a show's queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialEventConfig {
    pub event_type: SpecialEventType,
    pub count: u32,
    #[serde(default)]
    pub custom_film_title: Option<String>,
    #[serde(default)]
    pub custom_show_time: Option<String>,
    /// `MM/dd/yy`
    #[serde(default)]
    pub custom_show_date: Option<String>,
    /// Correct action for tickets of this class
    #[serde(default)]
    pub should_accept: bool,
    /// Film of the later show an early-check ticket belongs to
    #[serde(default)]
    pub target_film: Option<String>,
    #[serde(default)]
    pub target_time: Option<String>,
}

impl SpecialEventConfig {
    pub fn new(event_type: SpecialEventType, count: u32) -> Self {
        Self {
            event_type,
            count,
            custom_film_title: None,
            custom_show_time: None,
            custom_show_date: None,
            should_accept: false,
            target_film: None,
            target_time: None,
        }
    }
}

/// One scheduled screening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub film_title: String,
    /// `HH:mm`
    pub start_time: String,
    pub audience_count: u32,
    #[serde(default)]
    pub ticket_price: u32,
    #[serde(default)]
    pub special_events: Vec<SpecialEventConfig>,
}

impl Show {
    pub fn new(film_title: &str, start_time: &str, audience_count: u32) -> Self {
        Self {
            film_title: film_title.to_string(),
            start_time: start_time.to_string(),
            audience_count,
            ticket_price: 0,
            special_events: Vec::new(),
        }
    }

    pub fn with_special(mut self, config: SpecialEventConfig) -> Self {
        self.special_events.push(config);
        self
    }

    pub fn total_special_tickets(&self) -> u32 {
        self.special_events
            .iter()
            .fold(0u32, |total, e| total.saturating_add(e.count))
    }

    /// Start time in seconds since midnight, if parsable
    pub fn start_seconds(&self) -> Option<f32> {
        parse_hhmm(&self.start_time)
    }
}

fn default_time_factor() -> f32 {
    60.0
}
fn default_show_interval_delay() -> f32 {
    2.0
}
fn default_ticket_interval_delay() -> f32 {
    0.5
}
fn default_slide_duration() -> f32 {
    0.4
}
fn default_initial_delay() -> f32 {
    1.0
}
fn default_level_end_delay() -> f32 {
    2.0
}

/// Timing parameters, all in real (unscaled by the level factor) seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTiming {
    /// Simulated seconds per real second
    #[serde(default = "default_time_factor")]
    pub time_factor: f32,
    #[serde(default = "default_show_interval_delay")]
    pub show_interval_delay: f32,
    #[serde(default = "default_ticket_interval_delay")]
    pub ticket_interval_delay: f32,
    #[serde(default = "default_slide_duration")]
    pub slide_in_duration: f32,
    #[serde(default = "default_slide_duration")]
    pub slide_out_duration: f32,
    #[serde(default = "default_initial_delay")]
    pub initial_delay: f32,
    #[serde(default = "default_level_end_delay")]
    pub level_end_delay: f32,
}

impl Default for LevelTiming {
    fn default() -> Self {
        Self {
            time_factor: default_time_factor(),
            show_interval_delay: default_show_interval_delay(),
            ticket_interval_delay: default_ticket_interval_delay(),
            slide_in_duration: default_slide_duration(),
            slide_out_duration: default_slide_duration(),
            initial_delay: default_initial_delay(),
            level_end_delay: default_level_end_delay(),
        }
    }
}

/// Income cutoffs for one, two, and three stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarThresholds {
    pub star1: i32,
    pub star2: i32,
    pub star3: i32,
}

impl StarThresholds {
    pub fn new(star1: i32, star2: i32, star3: i32) -> Self {
        Self { star1, star2, star3 }
    }

    pub fn is_ascending(&self) -> bool {
        self.star1 <= self.star2 && self.star2 <= self.star3
    }
}

/// A day of shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    /// Date printed on regular tickets (`MM/dd/yy`)
    pub date: String,
    /// Clock start (`HH:mm`); defaults to the first show's admission window
    #[serde(default)]
    pub start_time: Option<String>,
    pub shows: Vec<Show>,
    #[serde(default)]
    pub timing: LevelTiming,
    pub thresholds: StarThresholds,
}

impl Level {
    pub fn new(name: &str, date: &str, shows: Vec<Show>, thresholds: StarThresholds) -> Self {
        Self {
            name: name.to_string(),
            date: date.to_string(),
            start_time: None,
            shows,
            timing: LevelTiming::default(),
            thresholds,
        }
    }

    pub fn show(&self, index: usize) -> Option<&Show> {
        self.shows.get(index)
    }

    pub fn show_count(&self) -> usize {
        self.shows.len()
    }

    /// The `HH:mm` the clock is reset to when the first show starts
    pub fn effective_start_time(&self) -> String {
        if let Some(start) = &self.start_time {
            return start.clone();
        }
        match self.shows.first().and_then(|s| s.start_seconds()) {
            Some(first) => super::clock::format_hhmm(first - ADMISSION_WINDOW_MINUTES * 60.0),
            None => super::clock::DEFAULT_START_TIME.to_string(),
        }
    }

    pub fn total_audience(&self) -> u32 {
        self.shows.iter().map(|s| s.audience_count).sum()
    }

    /// Describe configuration anomalies; each is recovered from at runtime
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.shows.is_empty() {
            warnings.push(format!("Level '{}' has no shows", self.name));
        }
        if !self.thresholds.is_ascending() {
            warnings.push(format!(
                "Level '{}' star thresholds are not ascending: {:?}",
                self.name, self.thresholds
            ));
        }
        if let Some(start) = &self.start_time {
            if parse_hhmm(start).is_none() {
                warnings.push(format!(
                    "Level '{}' start time '{}' is not HH:mm",
                    self.name, start
                ));
            }
        }

        for (index, show) in self.shows.iter().enumerate() {
            if show.start_seconds().is_none() {
                warnings.push(format!(
                    "Show {} ('{}') start time '{}' is not HH:mm",
                    index, show.film_title, show.start_time
                ));
            }
            if show.audience_count > MAX_AUDIENCE {
                warnings.push(format!(
                    "Show {} ('{}') audience {} exceeds {}",
                    index, show.film_title, show.audience_count, MAX_AUDIENCE
                ));
            }
            let specials = show.total_special_tickets();
            if specials > show.audience_count {
                warnings.push(format!(
                    "Show {} ('{}') has {} special tickets for an audience of {}",
                    index, show.film_title, specials, show.audience_count
                ));
            }
        }

        warnings
    }
}

/// Read-only collection of levels indexed by position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelDatabase {
    pub levels: Vec<Level>,
}

impl LevelDatabase {
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse level database JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read level database {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize level database")
    }

    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Small three-day campaign used by the headless binary
    pub fn builtin() -> Self {
        let mut early = SpecialEventConfig::new(SpecialEventType::EarlyCheck, 1);
        early.target_film = Some("The Last Reel".to_string());
        early.target_time = Some("15:00".to_string());

        let day_one = Level::new(
            "Opening Day",
            "06/14/25",
            vec![
                Show::new("Nova", "10:00", 6)
                    .with_special(SpecialEventConfig::new(SpecialEventType::WrongFilm, 1)),
                Show::new("Harbor Lights", "11:30", 8)
                    .with_special(SpecialEventConfig::new(SpecialEventType::MissingStub, 1))
                    .with_special(SpecialEventConfig::new(SpecialEventType::OldTicket, 1)),
            ],
            StarThresholds::new(4, 8, 11),
        );

        let mut day_two = Level::new(
            "Matinee Rush",
            "06/15/25",
            vec![
                Show::new("Nova", "13:00", 10)
                    .with_special(early)
                    .with_special(SpecialEventConfig::new(SpecialEventType::CopyTicket, 2)),
                Show::new("Harbor Lights", "13:10", 6)
                    .with_special(SpecialEventConfig::new(SpecialEventType::DrawnTicket, 1)),
                Show::new("The Last Reel", "15:00", 8)
                    .with_special(SpecialEventConfig::new(SpecialEventType::ElectronicAbuse, 1))
                    .with_special(SpecialEventConfig::new(SpecialEventType::DamagedTicket, 1)),
            ],
            StarThresholds::new(8, 14, 18),
        );
        day_two.timing.ticket_interval_delay = 0.3;

        let mut vip = SpecialEventConfig::new(SpecialEventType::OldTicket, 1);
        vip.custom_show_date = Some("06/16/25".to_string());
        vip.should_accept = false;

        let day_three = Level::new(
            "Premiere Night",
            "06/16/25",
            vec![
                Show::new("Starfall", "19:00", 12)
                    .with_special(vip)
                    .with_special(SpecialEventConfig::new(SpecialEventType::WrongFilm, 2))
                    .with_special(SpecialEventConfig::new(SpecialEventType::MissingStub, 1)),
                Show::new("Starfall", "21:30", 10)
                    .with_special(SpecialEventConfig::new(SpecialEventType::CopyTicket, 1))
                    .with_special(SpecialEventConfig::new(SpecialEventType::DamagedTicket, 1)),
            ],
            StarThresholds::new(8, 13, 16),
        );

        Self::new(vec![day_one, day_two, day_three])
    }
}
