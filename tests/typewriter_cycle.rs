use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use calloop::EventLoop;
use typewriter::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn record(typewriter: &Typewriter<ManualScheduler>) -> Rc<RefCell<Vec<Snapshot>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    typewriter.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.clone()));
    events
}

#[test]
fn test_hi_timeline() {
    init_logging();
    let scheduler = Rc::new(ManualScheduler::new());
    let typewriter = Typewriter::new(
        AnimationConfig::new("Hi")
            .typing_delay(ms(100))
            .loop_delay(ms(2000)),
        scheduler.clone(),
    );

    assert_eq!(typewriter.display_text(), "");

    scheduler.advance(ms(100));
    assert_eq!(typewriter.display_text(), "H");

    scheduler.advance(ms(100));
    assert_eq!(typewriter.display_text(), "Hi");
    assert_eq!(typewriter.phase(), Phase::PausingAfterType);

    scheduler.advance(ms(2000));
    assert_eq!(typewriter.phase(), Phase::Deleting);
    assert_eq!(typewriter.display_text(), "Hi");

    scheduler.advance(ms(50));
    assert_eq!(typewriter.display_text(), "H");

    scheduler.advance(ms(50));
    assert_eq!(typewriter.display_text(), "");
    assert_eq!(typewriter.phase(), Phase::PausingAfterDelete);

    // Settle delay is five typing delays
    scheduler.advance(ms(499));
    assert_eq!(typewriter.phase(), Phase::PausingAfterDelete);
    scheduler.advance(ms(1));
    assert_eq!(typewriter.phase(), Phase::Typing);
    assert_eq!(typewriter.display_text(), "");

    scheduler.advance(ms(100));
    assert_eq!(typewriter.display_text(), "H");
}

#[test]
fn test_empty_text_never_shows_anything() {
    init_logging();
    let scheduler = Rc::new(ManualScheduler::new());
    let typewriter = Typewriter::new(AnimationConfig::new(""), scheduler.clone());
    let events = record(&typewriter);

    assert_eq!(typewriter.phase(), Phase::PausingAfterType);
    for _ in 0..40 {
        scheduler.advance(ms(250));
        assert_eq!(typewriter.display_text(), "");
    }

    let events = events.borrow();
    assert!(events.iter().all(|e| e.text.is_empty() && e.cursor == 0));
    let phases: Vec<Phase> = events.iter().take(4).map(|e| e.phase).collect();
    assert_eq!(
        phases,
        vec![
            Phase::Deleting,
            Phase::PausingAfterDelete,
            Phase::Typing,
            Phase::PausingAfterType,
        ]
    );
}

#[test]
fn test_phases_never_skip() {
    init_logging();
    for text in ["", "a", "hello"] {
        let scheduler = Rc::new(ManualScheduler::new());
        let typewriter = Typewriter::new(AnimationConfig::new(text), scheduler.clone());
        let events = record(&typewriter);

        for _ in 0..500 {
            assert!(scheduler.fire_next());
        }

        let mut phases = vec![Phase::Typing];
        if text.is_empty() {
            phases.push(Phase::PausingAfterType);
        }
        for event in events.borrow().iter() {
            if phases.last() != Some(&event.phase) {
                phases.push(event.phase);
            }
        }

        assert!(phases.len() > 8, "cycle stalled for {:?}", text);
        for pair in phases.windows(2) {
            assert_eq!(pair[1], pair[0].next(), "skipped a phase for {:?}", text);
        }
    }
}

#[test]
fn test_type_then_delete_round_trip() {
    init_logging();
    let texts = ["", "x", "Hi, there", "naïve café", "日本語"];
    let timings = [(100, 50, 2000), (0, 0, 0), (1, 7, 3)];

    for text in texts {
        for (typing, deleting, pause) in timings {
            let scheduler = Rc::new(ManualScheduler::new());
            let typewriter = Typewriter::new(
                AnimationConfig::new(text)
                    .typing_delay(ms(typing))
                    .deleting_delay(ms(deleting))
                    .loop_delay(ms(pause)),
                scheduler.clone(),
            );

            let mut cursors = vec![typewriter.cursor()];
            while typewriter.phase() == Phase::Typing {
                assert!(scheduler.fire_next());
                cursors.push(typewriter.cursor());
            }
            assert_eq!(typewriter.display_text(), text);
            assert_eq!(typewriter.phase(), Phase::PausingAfterType);
            let expected: Vec<usize> = (0..=text.chars().count()).collect();
            assert_eq!(cursors, expected);

            assert!(scheduler.fire_next());
            let mut cursors = vec![typewriter.cursor()];
            while typewriter.phase() == Phase::Deleting {
                assert!(scheduler.fire_next());
                cursors.push(typewriter.cursor());
            }
            assert_eq!(typewriter.display_text(), "");
            assert_eq!(typewriter.phase(), Phase::PausingAfterDelete);
            let expected: Vec<usize> = (0..=text.chars().count()).rev().collect();
            assert_eq!(cursors, expected);
        }
    }
}

#[test]
fn test_destroy_before_tick_freezes_display() {
    init_logging();
    let scheduler = Rc::new(ManualScheduler::new());
    let typewriter = Typewriter::new(AnimationConfig::new("Hi"), scheduler.clone());
    let events = record(&typewriter);

    scheduler.advance(ms(150));
    assert_eq!(typewriter.display_text(), "H");
    let before = events.borrow().len();

    typewriter.destroy();
    scheduler.advance(ms(10_000));

    assert_eq!(typewriter.display_text(), "H");
    assert_eq!(typewriter.phase(), Phase::Typing);
    assert_eq!(events.borrow().len(), before);
    assert_eq!(scheduler.pending(), 0);
    assert!(!typewriter.has_pending_tick());

    typewriter.destroy();
    typewriter.reset();
    typewriter.set_text("something else");
    assert_eq!(typewriter.display_text(), "H");
    assert_eq!(scheduler.pending(), 0);
}

fn destroy_on_first_event(
    typewriter: &Rc<Typewriter<ManualScheduler>>,
) -> Rc<RefCell<Vec<(Phase, bool)>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let weak = Rc::downgrade(typewriter);
    typewriter.subscribe(move |snapshot| {
        if let Some(typewriter) = weak.upgrade() {
            sink.borrow_mut()
                .push((snapshot.phase, typewriter.is_active()));
            typewriter.destroy();
        }
    });
    seen
}

#[test]
fn test_no_notifications_after_destroy_mid_tick() {
    init_logging();
    let scheduler = Rc::new(ManualScheduler::new());
    // One tick on an empty text passes through Deleting into PausingAfterDelete
    let typewriter = Rc::new(Typewriter::new(AnimationConfig::new(""), scheduler.clone()));
    let seen = destroy_on_first_event(&typewriter);

    scheduler.advance(ms(2000));

    assert_eq!(*seen.borrow(), vec![(Phase::Deleting, true)]);
    assert!(!typewriter.is_active());
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn test_no_notifications_after_destroy_mid_reset() {
    init_logging();
    let scheduler = Rc::new(ManualScheduler::new());
    let typewriter = Rc::new(Typewriter::new(AnimationConfig::new(""), scheduler.clone()));
    let seen = destroy_on_first_event(&typewriter);

    typewriter.reset();

    assert_eq!(*seen.borrow(), vec![(Phase::Typing, true)]);
    assert!(!typewriter.is_active());
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn test_unbounded_loop_delay_never_fires() {
    init_logging();
    let scheduler = Rc::new(ManualScheduler::new());
    let typewriter = Typewriter::new(
        AnimationConfig::new("Hi").loop_delay(Duration::MAX),
        scheduler.clone(),
    );

    scheduler.advance(ms(200));
    assert_eq!(typewriter.display_text(), "Hi");
    assert_eq!(typewriter.phase(), Phase::PausingAfterType);

    scheduler.advance(Duration::from_secs(365 * 24 * 3600));
    assert_eq!(typewriter.phase(), Phase::PausingAfterType);
    assert_eq!(scheduler.next_deadline(), Some(Duration::MAX));
}

#[test]
fn test_zero_settle_resumes_after_one_typing_delay() {
    init_logging();
    let scheduler = Rc::new(ManualScheduler::new());
    let typewriter = Typewriter::new(
        AnimationConfig::new("Hi").settle_factor(0),
        scheduler.clone(),
    );

    // Empty again at 2300ms; the zero-length settle tick fires at once
    scheduler.advance(ms(2300));
    assert_eq!(typewriter.display_text(), "");
    assert_eq!(typewriter.phase(), Phase::Typing);
    assert_eq!(scheduler.next_deadline(), Some(ms(2400)));

    scheduler.advance(ms(100));
    assert_eq!(typewriter.display_text(), "H");
}

#[test]
fn test_new_text_restarts_from_empty() {
    init_logging();
    let scheduler = Rc::new(ManualScheduler::new());
    let typewriter = Typewriter::new(AnimationConfig::new("Hello"), scheduler.clone());
    scheduler.advance(ms(300));
    assert_eq!(typewriter.display_text(), "Hel");

    typewriter.set_text("Bye");
    assert_eq!(typewriter.display_text(), "");
    assert_eq!(typewriter.phase(), Phase::Typing);
    assert_eq!(scheduler.pending(), 1);

    scheduler.advance(ms(300));
    assert_eq!(typewriter.display_text(), "Bye");
    assert_eq!(typewriter.phase(), Phase::PausingAfterType);
}

#[test]
fn test_timing_change_mid_pause_restarts() {
    init_logging();
    let scheduler = Rc::new(ManualScheduler::new());
    let typewriter = Typewriter::new(AnimationConfig::new("ab"), scheduler.clone());
    scheduler.advance(ms(1000));
    assert_eq!(typewriter.phase(), Phase::PausingAfterType);

    typewriter.set_config(typewriter.config().typing_delay(ms(10)));
    assert_eq!(typewriter.cursor(), 0);
    assert_eq!(scheduler.pending(), 1);

    scheduler.advance(ms(20));
    assert_eq!(typewriter.display_text(), "ab");
}

#[test]
fn test_independent_instances_share_a_scheduler() {
    init_logging();
    let scheduler = Rc::new(ManualScheduler::new());
    let fast = Typewriter::new(
        AnimationConfig::new("abcd").typing_delay(ms(10)),
        scheduler.clone(),
    );
    let slow = Typewriter::new(
        AnimationConfig::new("abcd").typing_delay(ms(20)),
        scheduler.clone(),
    );
    assert_eq!(scheduler.pending(), 2);

    scheduler.advance(ms(40));
    assert_eq!(fast.display_text(), "abcd");
    assert_eq!(slow.display_text(), "ab");

    fast.destroy();
    assert_eq!(scheduler.pending(), 1);
    scheduler.advance(ms(40));
    assert_eq!(fast.display_text(), "abcd");
    assert_eq!(slow.display_text(), "abcd");
}

#[test]
fn test_runs_on_calloop_event_loop() {
    init_logging();
    let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let scheduler = Rc::new(LoopScheduler::new(event_loop.handle()));
    let typewriter = Typewriter::new(
        AnimationConfig::new("ab")
            .typing_delay(ms(1))
            .deleting_delay(ms(1))
            .loop_delay(ms(5)),
        scheduler.clone(),
    );

    let texts = Rc::new(RefCell::new(Vec::new()));
    let sink = texts.clone();
    typewriter.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.text.clone()));

    let deadline = Instant::now() + Duration::from_secs(5);
    while typewriter.phase() != Phase::PausingAfterDelete && Instant::now() < deadline {
        event_loop
            .dispatch(Some(ms(10)), &mut ())
            .unwrap();
    }

    assert_eq!(typewriter.phase(), Phase::PausingAfterDelete);
    let texts = texts.borrow();
    assert_eq!(texts[..5], ["a", "ab", "ab", "a", ""]);
    assert_eq!(scheduler.pending(), 1);

    typewriter.destroy();
    assert_eq!(scheduler.pending(), 0);
}
