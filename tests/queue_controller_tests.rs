//! Show/ticket state machine driven through a game session

use std::cell::RefCell;
use std::rc::Rc;

use ticket_check::simulation::{
    level_stars_key, parse_hhmm, CheckOutcome, ControllerContext, ControllerState, Decision,
    Economy, EventBus, GameEvent, GameSession, Level, LevelDatabase, LevelTiming, ScheduleClock,
    SessionConfig, Show, ShowPhase, StarThresholds, TicketFactory, TicketQueueController,
    TicketValidator, KEY_COINS,
};

const TICK: f32 = 0.1;

fn test_level(start: &str, shows: Vec<Show>, thresholds: StarThresholds) -> Level {
    let mut level = Level::new("Test Day", "06/14/25", shows, thresholds);
    level.start_time = Some(start.to_string());
    level.timing = LevelTiming {
        time_factor: 60.0,
        show_interval_delay: 1.0,
        ticket_interval_delay: 0.5,
        slide_in_duration: 0.5,
        slide_out_duration: 0.5,
        initial_delay: 1.0,
        level_end_delay: 1.0,
    };
    level
}

fn session_for(level: Level) -> GameSession {
    GameSession::new(
        LevelDatabase::new(vec![level]),
        SessionConfig {
            seed: Some(7),
            ..SessionConfig::default()
        },
    )
}

#[test]
fn test_all_valid_tickets_accepted() {
    let level = test_level(
        "13:45",
        vec![Show::new("Nova", "14:00", 3)],
        StarThresholds::new(1, 2, 3),
    );
    let mut session = session_for(level);
    session.start();
    assert_eq!(
        session.controller().state(),
        ControllerState::ShowActive(ShowPhase::WaitingForTicket)
    );

    let mut outcomes = Vec::new();
    for _ in 0..300 {
        if session.is_finished() {
            break;
        }
        session.tick(TICK);
        if session.controller().is_waiting_for_input() {
            if let Some(result) = session.accept_current_ticket() {
                outcomes.push(result.outcome);
            }
        }
    }

    assert!(session.is_finished());
    assert_eq!(outcomes, vec![CheckOutcome::CorrectAccept; 3]);
    assert_eq!(session.economy().income(), 3);
    assert_eq!(session.controller().state(), ControllerState::LevelComplete);
    assert_eq!(session.controller().show_index(), 1);
    assert_eq!(session.controller().stats().shows_on_time, 1);

    let completion = session.completion().expect("completed");
    assert_eq!(completion.stars, 3);
    assert_eq!(session.progress().get_int(&level_stars_key(0)), Some(3));
    assert_eq!(session.progress().get_int(KEY_COINS), Some(completion.coins_awarded));

    let game_overs = session
        .events()
        .history()
        .filter(|e| **e == GameEvent::GameOver)
        .count();
    assert_eq!(game_overs, 1);
}

#[test]
fn test_missed_showtime_cuts_over_to_next_show() {
    let level = test_level(
        "13:58",
        vec![
            Show::new("Nova", "14:00", 10),
            Show::new("Harbor Lights", "15:00", 2),
        ],
        StarThresholds::new(1, 2, 3),
    );
    let mut session = session_for(level);

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    session.subscribe(Box::new(move |event: &GameEvent| {
        sink.borrow_mut().push(event.clone());
    }));

    session.start();

    let mut second_show_clock = None;
    for _ in 0..400 {
        if session.is_finished() {
            break;
        }
        session.tick(TICK);

        let controller = session.controller();
        if controller.show_index() == 1 && controller.is_show_active() && second_show_clock.is_none() {
            second_show_clock = Some(session.clock().elapsed_seconds());
        }
        // Only the second show gets any decisions
        if controller.show_index() == 1 && controller.is_waiting_for_input() {
            session.accept_current_ticket();
        }
    }

    assert!(session.is_finished());
    let events = log.borrow();

    let cutover = events
        .iter()
        .position(|e| {
            *e == GameEvent::ShowEnded {
                show_index: 0,
                finished_before_showtime: false,
            }
        })
        .expect("first show should end late");

    let spawned_before: Vec<&GameEvent> = events[..cutover]
        .iter()
        .filter(|e| matches!(e, GameEvent::TicketSpawned { .. }))
        .collect();
    assert_eq!(spawned_before.len(), 1);

    for event in &events[cutover..] {
        if let GameEvent::TicketSpawned { ticket, .. } = event {
            assert_eq!(ticket.film_title, "Harbor Lights", "stale ticket presented");
        }
    }

    let hint = events[cutover..]
        .iter()
        .position(|e| matches!(e, GameEvent::IntermissionHint { .. }))
        .expect("intermission hint");
    let restart = events[cutover..]
        .iter()
        .position(|e| matches!(e, GameEvent::ShowStarted { show_index: 1, .. }))
        .expect("second show starts");
    assert!(hint < restart);

    let cues_before = events[..cutover]
        .iter()
        .filter(|e| matches!(e, GameEvent::CountdownCue { .. }))
        .count();
    assert_eq!(cues_before, 1);

    // Clock jumped to the second show's admission window
    let jumped = second_show_clock.expect("second show ran");
    let window_open = parse_hhmm("14:40").expect("parsable");
    assert!(jumped >= window_open && jumped < window_open + 120.0);

    let stats = session.controller().stats();
    assert_eq!(stats.tickets_missed, 10);
    assert_eq!(stats.shows_late, 1);
    assert_eq!(stats.shows_on_time, 1);
    assert_eq!(stats.correct_accepts, 2);
    assert_eq!(session.economy().income(), 2);
}

#[test]
fn test_close_shows_share_a_mixed_queue() {
    let level = test_level(
        "13:45",
        vec![
            Show::new("Nova", "14:00", 1),
            Show::new("Harbor Lights", "14:05", 2),
            Show::new("The Last Reel", "14:06", 1),
        ],
        StarThresholds::new(1, 2, 3),
    );
    let mut session = session_for(level);
    session.start();

    for _ in 0..400 {
        if session.is_finished() {
            break;
        }
        session.tick(TICK);
        if session.controller().is_waiting_for_input() {
            let for_target = session
                .controller()
                .current_ticket()
                .map(|t| session.clock().is_correct_showtime(&t.show_time))
                .unwrap_or(false);
            if for_target {
                session.accept_current_ticket();
            } else {
                session.reject_current_ticket();
            }
        }
    }

    assert!(session.is_finished());
    assert_eq!(session.controller().show_index(), 3);

    let started: Vec<&GameEvent> = session
        .events()
        .history()
        .filter(|e| matches!(e, GameEvent::ShowStarted { .. }))
        .collect();
    assert_eq!(started.len(), 2);
    assert_eq!(
        started[1],
        &GameEvent::ShowStarted {
            show_index: 1,
            film_title: "Harbor Lights".to_string(),
            show_time: "14:05".to_string(),
            ticket_count: 3,
        }
    );

    let stats = session.controller().stats();
    assert_eq!(stats.correct_accepts, 3);
    assert_eq!(stats.correct_rejects, 1);
    assert_eq!(stats.wrong_accepts + stats.wrong_rejects, 0);
    assert_eq!(session.economy().income(), 3);
}

#[test]
fn test_duplicate_input_is_ignored() {
    let level = test_level(
        "13:45",
        vec![Show::new("Nova", "14:00", 2)],
        StarThresholds::new(1, 2, 3),
    );
    let mut session = session_for(level);
    session.start();

    // Decisions are refused while the ticket is still sliding in
    for _ in 0..50 {
        session.tick(TICK);
        if session.controller().current_ticket().is_some() {
            break;
        }
    }
    assert!(session.controller().current_ticket().is_some());
    assert!(!session.controller().is_waiting_for_input());
    assert!(session.accept_current_ticket().is_none());

    for _ in 0..50 {
        if session.controller().is_waiting_for_input() {
            break;
        }
        session.tick(TICK);
    }
    assert!(session.controller().is_waiting_for_input());

    assert!(session.reject_current_ticket().is_some());
    assert!(session.reject_current_ticket().is_none());
    assert!(session.accept_current_ticket().is_none());
    assert!(session.controller().is_processing());
    assert_eq!(
        session.controller().state(),
        ControllerState::ShowActive(ShowPhase::ProcessingDecision)
    );
    assert_eq!(session.controller().stats().total_checked(), 1);
}

#[test]
fn test_submitted_inputs_in_one_frame_count_once() {
    let level = test_level(
        "13:45",
        vec![Show::new("Nova", "14:00", 2)],
        StarThresholds::new(1, 2, 3),
    );
    let mut session = session_for(level);
    session.start();

    for _ in 0..50 {
        if session.controller().is_waiting_for_input() {
            break;
        }
        session.tick(TICK);
    }
    assert!(session.controller().is_waiting_for_input());

    session.submit(Decision::Accept);
    session.submit(Decision::Accept);
    session.tick(TICK);

    let results = session.take_decision_results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome, CheckOutcome::CorrectAccept);
    assert_eq!(session.economy().income(), 1);
}

#[test]
fn test_paused_session_does_not_advance() {
    let level = test_level(
        "13:45",
        vec![Show::new("Nova", "14:00", 2)],
        StarThresholds::new(1, 2, 3),
    );
    let mut session = session_for(level);
    session.start();
    let before = session.clock().elapsed_seconds();

    session.time_scale.paused = true;
    for _ in 0..100 {
        session.tick(TICK);
    }
    assert_eq!(session.clock().elapsed_seconds(), before);
    assert!(session.controller().current_ticket().is_none());

    session.time_scale.paused = false;
    for _ in 0..15 {
        session.tick(TICK);
    }
    assert!(session.controller().current_ticket().is_some());
}

#[test]
fn test_restart_resets_progress_within_level() {
    let level = test_level(
        "13:45",
        vec![Show::new("Nova", "14:00", 3)],
        StarThresholds::new(1, 2, 3),
    );
    let mut session = session_for(level);
    session.start();

    for _ in 0..50 {
        session.tick(TICK);
        if session.controller().is_waiting_for_input() {
            session.accept_current_ticket();
            break;
        }
    }
    assert_eq!(session.economy().income(), 1);

    session.restart();
    assert_eq!(session.economy().income(), 0);
    assert_eq!(session.controller().show_index(), 0);
    assert_eq!(session.controller().queue_len(), 3);
    assert_eq!(session.controller().stats().total_checked(), 0);
    assert_eq!(session.clock().current_game_time(), "13:45");
    assert!(!session.is_finished());
}

#[test]
fn test_unparsable_show_time_uses_fallback_delay() {
    let level = test_level(
        "13:45",
        vec![Show::new("Nova", "14:00", 1), Show::new("Midnight", "25:99", 1)],
        StarThresholds::new(1, 2, 3),
    );
    let mut session = session_for(level);
    session.start();

    for _ in 0..300 {
        if session.is_finished() {
            break;
        }
        session.tick(TICK);
        if session.controller().is_waiting_for_input() {
            session.accept_current_ticket();
        }
    }

    assert!(session.is_finished());
    assert_eq!(session.controller().show_index(), 2);
    assert_eq!(session.controller().stats().total_checked(), 2);
}

#[test]
fn test_missing_level_ends_game() {
    let mut session = GameSession::new(
        LevelDatabase::builtin(),
        SessionConfig {
            level_index: 42,
            ..SessionConfig::default()
        },
    );
    session.start();

    assert!(session.is_finished());
    assert_eq!(session.completion().map(|c| c.stars), Some(0));
    assert_eq!(session.completion().map(|c| c.unlocked_levels), Some(1));
    assert!(session.events().history().any(|e| *e == GameEvent::GameOver));

    // A level that does not exist leaves no trace in the store
    assert_eq!(session.progress().get_int(&level_stars_key(42)), None);
    assert_eq!(session.progress().get_int(KEY_COINS), None);
}

#[test]
fn test_countdown_cue_rearms_after_clock_moves_back() {
    let mut clock = ScheduleClock::new();
    let mut economy = Economy::new();
    let mut events = EventBus::with_history(32);
    let level = test_level(
        "13:50",
        vec![Show::new("Nova", "14:00", 2)],
        StarThresholds::new(1, 2, 3),
    );

    let mut controller =
        TicketQueueController::new(TicketFactory::new_with_seed(5), TicketValidator::default());
    {
        let mut ctx = ControllerContext {
            level: Some(&level),
            clock: &mut clock,
            economy: &mut economy,
            events: &mut events,
        };
        controller.start_level(&mut ctx);

        let at = |hhmm: &str| parse_hhmm(hhmm).expect("parsable");

        // Ten minutes out: nothing yet
        controller.check_show_time_and_countdown(&mut ctx);

        ctx.clock.jump_to(at("13:58"));
        controller.check_show_time_and_countdown(&mut ctx);
        // Fires once while inside the last three minutes
        ctx.clock.jump_to(at("13:59"));
        controller.check_show_time_and_countdown(&mut ctx);

        ctx.clock.jump_to(at("13:50"));
        controller.check_show_time_and_countdown(&mut ctx);

        ctx.clock.jump_to(at("13:58") + 30.0);
        controller.check_show_time_and_countdown(&mut ctx);
        assert!(controller.is_show_active());
    }

    let cues: Vec<f32> = events
        .history()
        .filter_map(|e| match e {
            GameEvent::CountdownCue { minutes_left } => Some(*minutes_left),
            _ => None,
        })
        .collect();
    assert_eq!(cues.len(), 2, "cues: {:?}", cues);
    assert!((cues[0] - 2.0).abs() < 1e-3);
    assert!((cues[1] - 1.5).abs() < 1e-3);
}

#[test]
fn test_controller_without_session() {
    let mut clock = ScheduleClock::new();
    let mut economy = Economy::new();
    let mut events = EventBus::with_history(16);
    let level = test_level(
        "13:45",
        vec![Show::new("Nova", "14:00", 2)],
        StarThresholds::new(1, 2, 3),
    );

    let mut controller =
        TicketQueueController::new(TicketFactory::new_with_seed(3), TicketValidator::default());
    {
        let mut ctx = ControllerContext {
            level: Some(&level),
            clock: &mut clock,
            economy: &mut economy,
            events: &mut events,
        };
        controller.start_level(&mut ctx);
        assert_eq!(controller.queue_len(), 2);
        assert!(controller.is_show_active());

        controller.run_due_tasks(&mut ctx, 1.0);
        assert!(controller.current_ticket().is_some());
        assert_eq!(controller.queue_len(), 1);

        controller.run_due_tasks(&mut ctx, 0.5);
        assert!(controller.is_waiting_for_input());
        let result = controller.accept_current_ticket(&mut ctx).expect("decision taken");
        assert_eq!(result.outcome, CheckOutcome::CorrectAccept);
    }
    assert_eq!(clock.target_film(), "Nova");
    assert_eq!(economy.income(), 1);

    let mut ctx = ControllerContext {
        level: None,
        clock: &mut clock,
        economy: &mut economy,
        events: &mut events,
    };
    controller.start_level(&mut ctx);
    assert!(controller.is_level_complete());
    assert!(events.history().any(|e| *e == GameEvent::GameOver));
}
