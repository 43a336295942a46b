//! Deferred task scheduling and the event bus

use std::cell::RefCell;
use std::rc::Rc;

use ticket_check::simulation::{EventBus, GameEvent, TaskScheduler};

fn drain(scheduler: &mut TaskScheduler<&'static str>) -> Vec<&'static str> {
    let mut fired = Vec::new();
    while let Some(task) = scheduler.pop_due() {
        fired.push(task);
    }
    fired
}

#[test]
fn test_tasks_fire_in_time_then_insertion_order() {
    let mut scheduler = TaskScheduler::new();
    scheduler.schedule(2.0, "late");
    scheduler.schedule(1.0, "first");
    scheduler.schedule(1.0, "second");
    scheduler.schedule(0.0, "now");

    assert_eq!(drain(&mut scheduler), vec!["now"]);

    scheduler.advance(1.0);
    assert_eq!(drain(&mut scheduler), vec!["first", "second"]);

    scheduler.advance(0.5);
    assert!(drain(&mut scheduler).is_empty());

    scheduler.advance(0.5);
    assert_eq!(drain(&mut scheduler), vec!["late"]);
    assert!(scheduler.is_empty());
}

#[test]
fn test_cancel_by_handle() {
    let mut scheduler = TaskScheduler::new();
    let keep = scheduler.schedule(1.0, "keep");
    let drop = scheduler.schedule(1.0, "drop");
    assert_ne!(keep, drop);

    scheduler.cancel(drop);
    assert_eq!(scheduler.pending(), 1);

    scheduler.advance(1.0);
    assert_eq!(drain(&mut scheduler), vec!["keep"]);

    // Cancelling something that already fired is a no-op
    scheduler.cancel(keep);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn test_cancel_all_and_bad_delays() {
    let mut scheduler = TaskScheduler::new();
    scheduler.schedule(1.0, "a");
    scheduler.schedule(3.0, "b");
    scheduler.cancel_all();
    scheduler.advance(5.0);
    assert!(drain(&mut scheduler).is_empty());

    scheduler.schedule(-4.0, "negative");
    scheduler.schedule(f32::NAN, "nan");
    assert_eq!(drain(&mut scheduler), vec!["negative", "nan"]);
}

#[test]
fn test_event_bus_delivers_in_subscription_order() {
    let mut bus = EventBus::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let first = seen.clone();
    let id = bus.subscribe(Box::new(move |event: &GameEvent| {
        first.borrow_mut().push(("first", event.clone()));
    }));
    let second = seen.clone();
    bus.subscribe(Box::new(move |event: &GameEvent| {
        second.borrow_mut().push(("second", event.clone()));
    }));

    bus.publish(GameEvent::GameOver);
    assert_eq!(
        *seen.borrow(),
        vec![("first", GameEvent::GameOver), ("second", GameEvent::GameOver)]
    );

    assert!(bus.unsubscribe(id));
    assert!(!bus.unsubscribe(id));
    assert_eq!(bus.listener_count(), 1);

    seen.borrow_mut().clear();
    bus.publish(GameEvent::GameOver);
    assert_eq!(*seen.borrow(), vec![("second", GameEvent::GameOver)]);
}

#[test]
fn test_event_history_is_bounded() {
    let mut bus = EventBus::with_history(2);
    for minutes in [3.0, 2.0, 1.0] {
        bus.publish(GameEvent::CountdownCue {
            minutes_left: minutes,
        });
    }
    let kept: Vec<&GameEvent> = bus.history().collect();
    assert_eq!(
        kept,
        vec![
            &GameEvent::CountdownCue { minutes_left: 2.0 },
            &GameEvent::CountdownCue { minutes_left: 1.0 },
        ]
    );

    let mut silent = EventBus::new();
    silent.publish(GameEvent::GameOver);
    assert_eq!(silent.history().count(), 0);
}
