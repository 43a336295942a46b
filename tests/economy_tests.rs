//! Income, star rating, and level progress

use ticket_check::simulation::{
    is_level_unlocked, level_stars_key, record_level_completion, stars_for_income, CheckOutcome,
    CheckResult, Economy, EventBus, GameEvent, Level, MemoryProgressStore, ProgressStore, Show,
    StarThresholds, COINS_PER_STAR, KEY_COINS, KEY_UNLOCKED_LEVELS,
};

fn level_with_thresholds(star1: i32, star2: i32, star3: i32) -> Level {
    Level::new(
        "Test Day",
        "06/14/25",
        vec![Show::new("Nova", "14:00", 3)],
        StarThresholds::new(star1, star2, star3),
    )
}

fn result(delta: i32) -> CheckResult {
    let outcome = if delta >= 0 {
        CheckOutcome::CorrectAccept
    } else {
        CheckOutcome::WrongAccept
    };
    CheckResult::new(outcome, delta, "test")
}

#[test]
fn test_income_never_negative() {
    let mut economy = Economy::new();
    let mut events = EventBus::new();
    economy.set_current_level(&level_with_thresholds(1, 2, 3));

    let deltas = [1, -10, 1, 1, -5, -5, 1, -10, 1, 1, 1];
    for delta in deltas {
        economy.apply_result(&result(delta), &mut events);
        assert!(economy.income() >= 0, "income went negative");
    }
    assert_eq!(economy.income(), 3);
}

#[test]
fn test_income_changed_event_carries_total_and_result() {
    let mut economy = Economy::new();
    let mut events = EventBus::with_history(4);
    economy.set_current_level(&level_with_thresholds(1, 2, 3));

    economy.apply_result(&result(1), &mut events);
    economy.apply_result(&result(-10), &mut events);

    let history: Vec<GameEvent> = events.history().cloned().collect();
    assert_eq!(
        history,
        vec![
            GameEvent::IncomeChanged {
                income: 1,
                result: result(1)
            },
            GameEvent::IncomeChanged {
                income: 0,
                result: result(-10)
            },
        ]
    );
}

#[test]
fn test_star_thresholds_are_inclusive() {
    let thresholds = StarThresholds::new(2, 5, 9);
    assert_eq!(stars_for_income(0, &thresholds), 0);
    assert_eq!(stars_for_income(1, &thresholds), 0);
    assert_eq!(stars_for_income(2, &thresholds), 1);
    assert_eq!(stars_for_income(4, &thresholds), 1);
    assert_eq!(stars_for_income(5, &thresholds), 2);
    assert_eq!(stars_for_income(8, &thresholds), 2);
    assert_eq!(stars_for_income(9, &thresholds), 3);
    assert_eq!(stars_for_income(100, &thresholds), 3);
}

#[test]
fn test_star_rating_is_monotonic() {
    let thresholds = StarThresholds::new(3, 7, 12);
    let mut previous = 0;
    for income in 0..30 {
        let stars = stars_for_income(income, &thresholds);
        assert!(stars >= previous);
        previous = stars;
    }
}

#[test]
fn test_star_rating_without_level_is_zero() {
    let mut economy = Economy::new();
    let mut events = EventBus::new();
    economy.apply_result(&result(50), &mut events);
    assert_eq!(economy.star_rating(), 0);
}

#[test]
fn test_switching_level_resets_income() {
    let mut economy = Economy::new();
    let mut events = EventBus::new();
    economy.set_current_level(&level_with_thresholds(1, 2, 3));
    economy.apply_result(&result(1), &mut events);
    economy.apply_result(&result(1), &mut events);
    assert_eq!(economy.star_rating(), 2);
    assert_eq!(economy.currency_award(), 2 + 2 * COINS_PER_STAR);

    economy.set_current_level(&level_with_thresholds(5, 6, 7));
    assert_eq!(economy.income(), 0);
    assert_eq!(economy.star_rating(), 0);
}

#[test]
fn test_level_completion_keeps_best_stars_and_unlocks() {
    let mut store = MemoryProgressStore::new();
    assert!(is_level_unlocked(&store, 0));
    assert!(!is_level_unlocked(&store, 1));

    let first = record_level_completion(&mut store, 0, 2, 12);
    assert_eq!(first.best_stars, 2);
    assert_eq!(first.total_coins, 12);
    assert_eq!(store.get_int(&level_stars_key(0)), Some(2));
    assert_eq!(store.get_int(KEY_UNLOCKED_LEVELS), Some(2));
    assert!(is_level_unlocked(&store, 1));

    let second = record_level_completion(&mut store, 0, 1, 3);
    assert_eq!(second.stars, 1);
    assert_eq!(second.best_stars, 2);
    assert_eq!(store.get_int(&level_stars_key(0)), Some(2));
    assert_eq!(store.get_int(KEY_COINS), Some(15));
}

#[test]
fn test_zero_star_completion_does_not_unlock() {
    let mut store = MemoryProgressStore::new();
    let done = record_level_completion(&mut store, 0, 0, 0);
    assert_eq!(done.unlocked_levels, 1);
    assert!(!is_level_unlocked(&store, 1));
}
