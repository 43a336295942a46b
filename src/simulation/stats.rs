//! Shift statistics
//!
//! Counters collected by the queue controller while a level is played.

use super::types::CheckOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftStats {
    pub correct_accepts: usize,
    pub wrong_accepts: usize,
    pub correct_rejects: usize,
    pub wrong_rejects: usize,
    /// Tickets put in front of the player
    pub tickets_presented: usize,
    /// Tickets dropped because their showtime passed
    pub tickets_missed: usize,
    pub shows_on_time: usize,
    pub shows_late: usize,
}

impl ShiftStats {
    pub fn record(&mut self, outcome: CheckOutcome) {
        match outcome {
            CheckOutcome::CorrectAccept => self.correct_accepts += 1,
            CheckOutcome::WrongAccept => self.wrong_accepts += 1,
            CheckOutcome::CorrectReject => self.correct_rejects += 1,
            CheckOutcome::WrongReject => self.wrong_rejects += 1,
        }
    }

    pub fn count(&self, outcome: CheckOutcome) -> usize {
        match outcome {
            CheckOutcome::CorrectAccept => self.correct_accepts,
            CheckOutcome::WrongAccept => self.wrong_accepts,
            CheckOutcome::CorrectReject => self.correct_rejects,
            CheckOutcome::WrongReject => self.wrong_rejects,
        }
    }

    pub fn total_checked(&self) -> usize {
        self.correct_accepts + self.wrong_accepts + self.correct_rejects + self.wrong_rejects
    }

    /// Percentage of correct decisions (0 when nothing was checked)
    pub fn accuracy(&self) -> f32 {
        let total = self.total_checked();
        if total == 0 {
            0.0
        } else {
            (self.correct_accepts + self.correct_rejects) as f32 / total as f32 * 100.0
        }
    }

    pub fn record_show_end(&mut self, on_time: bool) {
        if on_time {
            self.shows_on_time += 1;
        } else {
            self.shows_late += 1;
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Checked: {} | Correct: {} | Wrong: {} | Missed: {} | Shows on time: {}/{}",
            self.total_checked(),
            self.correct_accepts + self.correct_rejects,
            self.wrong_accepts + self.wrong_rejects,
            self.tickets_missed,
            self.shows_on_time,
            self.shows_on_time + self.shows_late
        )
    }
}
