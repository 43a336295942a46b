//! Scripted player for headless runs
//!
//! Waits a reaction time once a ticket can be decided, then admits it when
//! the ticket is genuine and belongs to the current show, occasionally
//! getting it wrong on purpose.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::level::ADMISSION_WINDOW_MINUTES;
use super::session::GameSession;
use super::types::Decision;

pub struct AutoPlayer {
    /// Real seconds between a ticket becoming decidable and the decision
    pub reaction_time: f32,
    /// Probability of flipping the right answer
    pub mistake_rate: f64,
    waited: f32,
    rng: Option<StdRng>,
}

impl AutoPlayer {
    pub fn new(reaction_time: f32, mistake_rate: f64) -> Self {
        Self {
            reaction_time,
            mistake_rate: mistake_rate.clamp(0.0, 1.0),
            waited: 0.0,
            rng: None,
        }
    }

    pub fn new_with_seed(reaction_time: f32, mistake_rate: f64, seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
            ..Self::new(reaction_time, mistake_rate)
        }
    }

    fn roll_mistake(&mut self) -> bool {
        if self.mistake_rate <= 0.0 {
            return false;
        }
        match &mut self.rng {
            Some(rng) => rng.random_bool(self.mistake_rate),
            None => rand::rng().random_bool(self.mistake_rate),
        }
    }

    /// Decision to submit this frame, if any
    pub fn update(&mut self, session: &GameSession, delta_secs: f32) -> Option<Decision> {
        let controller = session.controller();
        if !controller.is_waiting_for_input() {
            self.waited = 0.0;
            return None;
        }

        self.waited += delta_secs;
        if self.waited < self.reaction_time {
            return None;
        }
        self.waited = 0.0;

        let ticket = controller.current_ticket()?;
        let clock = session.clock();
        let admissible = ticket.is_valid
            && clock.is_film_today(&ticket.film_title)
            && clock.is_correct_showtime(&ticket.show_time)
            && !clock.is_earlier_than_minutes(&ticket.show_time, ADMISSION_WINDOW_MINUTES);

        let admit = admissible != self.roll_mistake();
        Some(if admit { Decision::Accept } else { Decision::Reject })
    }
}
