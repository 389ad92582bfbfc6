//! Unit tests for announcement queue scheduling.
//!
//! Debounce, max-delay override, ordering, predicate suppression and
//! sequence retention.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use utterance_queue::accessibility::{
    Alertable, AnnouncementQueue, RecordingSink, TextSequence, Utterance, UtteranceOptions,
};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn new_queue() -> (AnnouncementQueue<RecordingSink>, RecordingSink) {
    let sink = RecordingSink::new();
    (AnnouncementQueue::new(sink.clone()), sink)
}

fn with_delay(text: &str, stability_ms: u64) -> Utterance {
    Utterance::with_options(
        text,
        UtteranceOptions::default().with_stability_delay(ms(stability_ms)),
    )
    .unwrap()
}

/// Re-inserting faster than the stability delay holds delivery back until
/// the source goes quiet.
#[test]
fn test_debounce_until_quiet() {
    let (mut queue, sink) = new_queue();
    let utterance = with_delay("Voltage changing", 200);

    queue.add_to_back(&utterance);
    for _ in 0..20 {
        queue.tick(ms(50));
        queue.add_to_back(&utterance);
    }
    assert!(sink.is_empty());
    assert_eq!(queue.len(), 1);

    for _ in 0..3 {
        queue.tick(ms(50));
    }
    assert!(sink.is_empty());

    queue.tick(ms(50));
    assert_eq!(sink.announcements(), vec!["Voltage changing"]);
    assert!(queue.is_empty());
}

/// Continuous re-insertion still delivers once the maximum delay is reached.
#[test]
fn test_max_delay_overrides_debounce() {
    let (mut queue, sink) = new_queue();
    let utterance = Utterance::with_options(
        "Charge building",
        UtteranceOptions::default()
            .with_stability_delay(ms(200))
            .with_max_delay(ms(120)),
    )
    .unwrap();

    queue.add_to_back(&utterance);
    queue.tick(ms(50));
    queue.add_to_back(&utterance);
    queue.tick(ms(50));
    queue.add_to_back(&utterance);
    assert!(sink.is_empty());

    queue.tick(ms(50));
    assert_eq!(sink.announcements(), vec!["Charge building"]);
}

/// Two stable entries are delivered in insertion order, one per tick.
#[test]
fn test_fifo_among_stable_entries() {
    let (mut queue, sink) = new_queue();
    queue.add_to_back(with_delay("A", 0));
    queue.add_to_back(with_delay("B", 0));

    assert_eq!(queue.tick(ms(10)).as_deref(), Some("A"));
    assert_eq!(sink.announcements(), vec!["A"]);
    assert_eq!(queue.tick(ms(10)).as_deref(), Some("B"));
    assert_eq!(sink.announcements(), vec!["A", "B"]);
}

/// An unsettled head does not block a stable entry behind it.
#[test]
fn test_ineligible_head_does_not_block() {
    let (mut queue, sink) = new_queue();
    let slow = with_delay("slow", 1_000);
    queue.add_to_back(&slow);
    queue.add_to_back(with_delay("fast", 0));

    assert_eq!(queue.tick(ms(10)).as_deref(), Some("fast"));
    assert_eq!(sink.announcements(), vec!["fast"]);
    assert!(queue.has_entry(&slow));
}

/// Looping content wraps around and stays queued.
#[test]
fn test_looping_sequence_cycles() {
    let (mut queue, sink) = new_queue();
    let looping = Utterance::with_options(
        vec!["1", "2", "3"],
        UtteranceOptions::default()
            .with_looping(true)
            .with_stability_delay(Duration::ZERO),
    )
    .unwrap();
    queue.add_to_back(&looping);

    for _ in 0..7 {
        queue.tick(ms(10));
        assert!(queue.has_entry(&looping));
    }
    assert_eq!(
        sink.announcements(),
        vec!["1", "2", "3", "1", "2", "3", "1"]
    );
}

/// Non-looping content clamps on its final text and leaves the queue once
/// exhausted; re-inserting keeps repeating the final text.
#[test]
fn test_non_looping_sequence_clamps() {
    let (mut queue, sink) = new_queue();
    let clamped = Utterance::with_options(
        vec!["1", "2", "3"],
        UtteranceOptions::default().with_stability_delay(Duration::ZERO),
    )
    .unwrap();
    queue.add_to_back(&clamped);

    for _ in 0..4 {
        queue.tick(ms(10));
    }
    assert_eq!(sink.announcements(), vec!["1", "2", "3", "3"]);
    assert!(!queue.has_entry(&clamped));

    for _ in 0..3 {
        queue.add_to_back(&clamped);
        queue.tick(ms(10));
        assert!(!queue.has_entry(&clamped));
    }
    assert_eq!(
        sink.announcements(),
        vec!["1", "2", "3", "3", "3", "3", "3"]
    );
}

/// A looping entry keeps its stable time between steps but gets a fresh
/// residency budget after each delivery.
#[test]
fn test_loop_retention_resets_time_in_queue_only() {
    let (mut queue, _sink) = new_queue();
    let looping = Utterance::with_options(
        vec!["on", "off"],
        UtteranceOptions::default()
            .with_looping(true)
            .with_stability_delay(ms(100)),
    )
    .unwrap();
    queue.add_to_back(&looping);

    queue.tick(ms(100));
    assert_eq!(looping.delivery_count(), 1);
    assert_eq!(looping.time_in_queue(), Duration::ZERO);
    assert_eq!(looping.stable_time(), ms(100));

    // Already stable, so the next step follows on the next tick.
    assert_eq!(queue.tick(ms(10)).as_deref(), Some("off"));
}

/// A failing predicate drops its entry and the same tick moves on.
#[test]
fn test_predicate_suppression_continues_scan() {
    let (mut queue, sink) = new_queue();
    let suppressed = Utterance::with_options(
        "stale",
        UtteranceOptions::default()
            .with_stability_delay(Duration::ZERO)
            .with_predicate(|| false),
    )
    .unwrap();
    queue.add_to_back(&suppressed);
    queue.add_to_back(with_delay("fresh", 0));

    assert_eq!(queue.tick(ms(10)).as_deref(), Some("fresh"));
    assert_eq!(sink.announcements(), vec!["fresh"]);
    assert!(!queue.has_entry(&suppressed));
    assert!(queue.is_empty());
}

/// The predicate is read at delivery time, not at insertion.
#[test]
fn test_predicate_evaluated_at_delivery() {
    let (mut queue, sink) = new_queue();
    let visible = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&visible);
    let gated = Utterance::with_options(
        "Bulb lit",
        UtteranceOptions::default()
            .with_stability_delay(ms(100))
            .with_predicate(move || flag.load(Ordering::SeqCst)),
    )
    .unwrap();

    queue.add_to_back(&gated);
    queue.tick(ms(50));
    visible.store(true, Ordering::SeqCst);
    queue.tick(ms(50));

    assert_eq!(sink.announcements(), vec!["Bulb lit"]);
}

/// A panicking predicate propagates out of tick.
#[test]
#[should_panic(expected = "predicate failed")]
fn test_predicate_panic_propagates() {
    let (mut queue, _sink) = new_queue();
    let broken = Utterance::with_options(
        "boom",
        UtteranceOptions::default()
            .with_stability_delay(Duration::ZERO)
            .with_predicate(|| -> bool { panic!("predicate failed") }),
    )
    .unwrap();
    queue.add_to_back(&broken);
    queue.tick(ms(10));
}

#[test]
fn test_clear_is_idempotent() {
    let (mut queue, sink) = new_queue();
    queue.clear();
    assert!(queue.is_empty());

    queue.add_to_back("pending");
    queue.clear();
    queue.clear();
    assert!(queue.is_empty());

    queue.tick(Duration::from_secs(5));
    assert!(sink.is_empty());
}

/// Repeating raw text every 10ms yields exactly one announcement once it
/// has been quiet for the default 200ms.
#[test]
fn test_repeated_text_scenario() {
    let (mut queue, sink) = new_queue();

    for _ in 0..3 {
        queue.add_to_back("hi");
        queue.tick(ms(10));
    }
    queue.add_to_back("hi");
    assert_eq!(queue.len(), 1);

    for _ in 0..19 {
        queue.tick(ms(10));
    }
    assert!(sink.is_empty());

    queue.tick(ms(10));
    assert_eq!(sink.announcements(), vec!["hi"]);
    assert!(queue.is_empty());

    for _ in 0..50 {
        queue.tick(ms(10));
    }
    assert_eq!(sink.len(), 1);
}

/// A raw sequence repeated after a partial delivery starts from its first
/// text again.
#[test]
fn test_repeated_raw_sequence_restarts() {
    let sink = RecordingSink::new();
    let mut queue = AnnouncementQueue::with_defaults(
        sink.clone(),
        UtteranceOptions::default().with_stability_delay(Duration::ZERO),
    );

    queue.add_to_back(Alertable::sequence(["a", "b", "c"]).unwrap());
    queue.tick(ms(10));
    queue.add_to_back(Alertable::sequence(["a", "b", "c"]).unwrap());
    assert_eq!(queue.len(), 1);
    queue.tick(ms(10));

    assert_eq!(sink.announcements(), vec!["a", "a"]);
}

/// Front insertion changes order, not timing: the entry still waits out its
/// own stability delay while stable entries behind it are delivered.
#[test]
fn test_add_to_front_waits_for_stability() {
    let (mut queue, sink) = new_queue();
    queue.add_to_back(with_delay("later", 0));
    queue.add_to_front(with_delay("urgent", 200));

    queue.tick(ms(100));
    assert_eq!(sink.announcements(), vec!["later"]);

    queue.tick(ms(100));
    assert_eq!(sink.announcements(), vec!["later", "urgent"]);
}

/// Moving a queued instance to the front keeps its residency and restarts
/// only its stability clock.
#[test]
fn test_add_to_front_moves_queued_instance() {
    let (mut queue, sink) = new_queue();
    let first = with_delay("first", 200);
    let second = with_delay("second", 200);
    queue.add_to_back(&first);
    queue.add_to_back(&second);
    queue.tick(ms(100));

    queue.add_to_front(&second);
    assert_eq!(queue.len(), 2);
    assert!(queue.iter().next().unwrap().same_as(&second));
    assert_eq!(second.stable_time(), Duration::ZERO);
    assert_eq!(second.time_in_queue(), ms(100));
    assert_eq!(first.stable_time(), ms(100));

    queue.tick(ms(100));
    assert_eq!(sink.announcements(), vec!["first"]);
    queue.tick(ms(100));
    assert_eq!(sink.announcements(), vec!["first", "second"]);
}

/// Sequences collected at runtime go through `TextSequence`.
#[test]
fn test_runtime_sequence_is_clamped() {
    let (mut queue, sink) = new_queue();
    let parts: Vec<String> = vec!["open".to_string(), "closed".to_string()];
    queue.add_to_back(TextSequence::new(parts).unwrap());

    for _ in 0..3 {
        queue.tick(ms(100));
    }
    assert_eq!(sink.announcements(), vec!["open", "closed"]);
    assert!(!queue.is_empty());

    queue.tick(ms(100));
    assert_eq!(sink.announcements(), vec!["open", "closed", "closed"]);
    assert!(queue.is_empty());
}
