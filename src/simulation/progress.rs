//! Persistent player progress
//!
//! Progress lives in an external integer key/value store. Only level
//! completion writes to it.

use std::collections::HashMap;

pub const KEY_UNLOCKED_LEVELS: &str = "unlocked_levels";
pub const KEY_COINS: &str = "coins";

pub fn level_stars_key(level_index: usize) -> String {
    format!("level_{}_stars", level_index)
}

/// Integer key/value store
pub trait ProgressStore {
    fn get_int(&self, key: &str) -> Option<i32>;
    fn set_int(&mut self, key: &str, value: i32);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    values: HashMap<String, i32>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn get_int(&self, key: &str) -> Option<i32> {
        self.values.get(key).copied()
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.values.insert(key.to_string(), value);
    }
}

/// What finishing a level changed in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCompletion {
    pub level_index: usize,
    pub stars: u8,
    pub best_stars: u8,
    pub coins_awarded: i32,
    pub total_coins: i32,
    pub unlocked_levels: i32,
}

/// Record a finished level: best stars, next unlock, and coins
pub fn record_level_completion(
    store: &mut dyn ProgressStore,
    level_index: usize,
    stars: u8,
    coins_awarded: i32,
) -> LevelCompletion {
    let key = level_stars_key(level_index);
    let previous = store.get_int(&key).unwrap_or(0).clamp(0, 3) as u8;
    let best_stars = previous.max(stars);
    store.set_int(&key, best_stars as i32);

    // Level 0 is always unlocked; a completed level opens the next one
    let unlocked = store.get_int(KEY_UNLOCKED_LEVELS).unwrap_or(1);
    let unlocked_levels = if stars > 0 {
        unlocked.max(level_index as i32 + 2)
    } else {
        unlocked
    };
    store.set_int(KEY_UNLOCKED_LEVELS, unlocked_levels);

    let total_coins = store
        .get_int(KEY_COINS)
        .unwrap_or(0)
        .saturating_add(coins_awarded.max(0));
    store.set_int(KEY_COINS, total_coins);

    LevelCompletion {
        level_index,
        stars,
        best_stars,
        coins_awarded,
        total_coins,
        unlocked_levels,
    }
}

pub fn is_level_unlocked(store: &dyn ProgressStore, level_index: usize) -> bool {
    (level_index as i32) < store.get_int(KEY_UNLOCKED_LEVELS).unwrap_or(1)
}
