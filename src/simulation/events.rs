//! Typed publish/subscribe notifications
//!
//! Listeners are invoked synchronously, in subscription order, from the
//! thread that publishes. Nothing is queued or replayed except the optional
//! bounded history used for inspection.

use std::collections::VecDeque;

use super::types::{CheckResult, Decision, TicketData};

/// Every notification the core emits
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The clock has a new expected show
    ScheduleSet { film_title: String, show_time: String },
    ShowStarted {
        show_index: usize,
        film_title: String,
        show_time: String,
        ticket_count: usize,
    },
    ShowEnded {
        show_index: usize,
        finished_before_showtime: bool,
    },
    TicketSpawned { ticket: TicketData, remaining: usize },
    TicketChecked {
        ticket: TicketData,
        decision: Decision,
        result: CheckResult,
    },
    IncomeChanged { income: i32, result: CheckResult },
    /// Hint shown between shows
    IntermissionHint {
        next_film_title: String,
        next_show_time: String,
    },
    /// Fired once when the target show is three minutes or less away
    CountdownCue { minutes_left: f32 },
    GameOver,
}

/// Handle returned from [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub usize);

type Listener = Box<dyn FnMut(&GameEvent)>;

/// In-process event dispatcher
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: usize,
    history: VecDeque<GameEvent>,
    history_capacity: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bus that remembers the last `capacity` events
    pub fn with_history(capacity: usize) -> Self {
        Self {
            history_capacity: capacity,
            history: VecDeque::with_capacity(capacity.min(1024)),
            ..Self::default()
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn FnMut(&GameEvent)>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if the subscription was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, event: GameEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }

        if self.history_capacity > 0 {
            if self.history.len() == self.history_capacity {
                self.history.pop_front();
            }
            self.history.push_back(event);
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &GameEvent> {
        self.history.iter()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
