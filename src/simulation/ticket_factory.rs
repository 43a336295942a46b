//! Ticket queue synthesis
//!
//! Builds the shuffled queue of tickets presented for a show, mixing regular
//! tickets with the anomalies configured for it.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::ops::Range;

use super::level::{Show, SpecialEventConfig};
use super::types::{SpecialEventType, TicketData};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Render an `MM/dd/yy` date in ticket form (`Month/yy/dd`)
///
/// Malformed dates and unknown months are returned unchanged.
pub fn format_ticket_date(date: &str) -> String {
    let parts: Vec<&str> = date.split('/').collect();
    if parts.len() != 3 {
        warn!("Ticket date '{}' is not MM/dd/yy, leaving as is", date);
        return date.to_string();
    }

    let month_name = parts[0]
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|m| MONTH_NAMES.get(m));

    match month_name {
        Some(name) => format!("{}/{}/{}", name, parts[2], parts[1]),
        None => {
            warn!("Unknown month in ticket date '{}', leaving as is", date);
            date.to_string()
        }
    }
}

/// In-place Fisher-Yates shuffle: position `i` swaps with a uniform index in `[i, n)`
pub fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    let n = items.len();
    for i in 0..n.saturating_sub(1) {
        let j = rng.random_range(i..n);
        items.swap(i, j);
    }
}

/// Produces ticket queues for shows
pub struct TicketFactory {
    /// Optional seeded RNG for reproducible queues
    rng: Option<StdRng>,
}

impl Default for TicketFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketFactory {
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Create a factory with a seeded RNG for reproducible queues
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    fn random_index(&mut self, range: Range<usize>) -> usize {
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        match &mut self.rng {
            Some(rng) => fisher_yates(items, rng),
            None => fisher_yates(items, &mut rand::rng()),
        }
    }

    /// Build the shuffled queue for one show
    pub fn build_queue(&mut self, show: &Show, level_date: &str) -> VecDeque<TicketData> {
        let mut tickets = self.synthesize(show, level_date);
        self.shuffle(&mut tickets);
        tickets.into()
    }

    /// Build one shuffled queue holding the tickets of several shows
    pub fn build_mixed_queue(&mut self, shows: &[&Show], level_date: &str) -> VecDeque<TicketData> {
        let mut tickets = Vec::new();
        for show in shows {
            tickets.extend(self.synthesize(show, level_date));
        }
        self.shuffle(&mut tickets);
        tickets.into()
    }

    /// Unshuffled tickets for a show: exactly `audience_count` of them
    pub fn synthesize(&mut self, show: &Show, level_date: &str) -> Vec<TicketData> {
        let default_date = format_ticket_date(level_date);
        let audience = show.audience_count as usize;

        // A single class never needs more tickets than there are seats
        let mut specials = Vec::new();
        for config in &show.special_events {
            let count = (config.count as usize).min(audience);
            for _ in 0..count {
                let ticket = self.special_ticket(show, config, &default_date);
                specials.push(ticket);
            }
        }

        let requested = show.total_special_tickets();
        if requested > show.audience_count {
            warn!(
                "Show '{}' at {} has {} special tickets for an audience of {}, dropping extras",
                show.film_title,
                show.start_time,
                requested,
                audience
            );
            while specials.len() > audience {
                let index = self.random_index(0..specials.len());
                specials.swap_remove(index);
            }
        }

        let normal_count = audience - specials.len();
        let mut tickets: Vec<TicketData> = (0..normal_count)
            .map(|_| TicketData::normal(&show.film_title, &show.start_time, &default_date))
            .collect();
        tickets.extend(specials);

        debug!(
            "Built {} tickets for '{}' at {} ({} normal)",
            tickets.len(),
            show.film_title,
            show.start_time,
            normal_count
        );
        tickets
    }

    fn special_ticket(
        &mut self,
        show: &Show,
        config: &SpecialEventConfig,
        default_date: &str,
    ) -> TicketData {
        let film_title = match config
            .custom_film_title
            .as_ref()
            .or(config.target_film.as_ref())
        {
            Some(title) => title.clone(),
            None if config.event_type == SpecialEventType::WrongFilm => {
                self.misspell(&show.film_title)
            }
            None => show.film_title.clone(),
        };

        let show_time = config
            .custom_show_time
            .as_ref()
            .or(config.target_time.as_ref())
            .cloned()
            .unwrap_or_else(|| show.start_time.clone());

        let show_date = match &config.custom_show_date {
            Some(date) => format_ticket_date(date),
            None => default_date.to_string(),
        };

        TicketData {
            film_title,
            show_time,
            show_date,
            special: config.event_type,
            has_stub: config.event_type != SpecialEventType::MissingStub,
            is_valid: config.should_accept,
        }
    }

    /// A title that is guaranteed to differ from `title`
    fn misspell(&mut self, title: &str) -> String {
        let mut chars: Vec<char> = title.chars().collect();
        let swappable: Vec<usize> = (0..chars.len().saturating_sub(1))
            .filter(|&i| {
                chars[i] != chars[i + 1] && chars[i].is_alphabetic() && chars[i + 1].is_alphabetic()
            })
            .collect();

        if swappable.is_empty() {
            chars.push('e');
        } else {
            let pick = swappable[self.random_index(0..swappable.len())];
            chars.swap(pick, pick + 1);
        }
        chars.into_iter().collect()
    }
}
