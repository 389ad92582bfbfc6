//! Unit tests for alert construction and text resolution.

use std::time::Duration;
use utterance_queue::accessibility::{
    AccessibilityError, Alertable, DeliveryPolicy, Utterance, UtteranceOptions,
    DEFAULT_STABILITY_DELAY,
};

/// Looping a single text is a configuration error.
#[test]
fn test_loop_with_single_text_is_invalid() {
    let err = Utterance::with_options(
        "Wall hit",
        UtteranceOptions::default().with_looping(true),
    )
    .unwrap_err();
    assert_eq!(
        err,
        AccessibilityError::InvalidConfiguration("looping requires a sequence of alerts".to_string())
    );
}

#[test]
fn test_empty_sequence_is_invalid() {
    let result = Utterance::with_options(Vec::<String>::new(), UtteranceOptions::default());
    assert!(matches!(
        result,
        Err(AccessibilityError::InvalidConfiguration(_))
    ));
    assert!(Alertable::cycle(Vec::<&str>::new()).is_err());
}

#[test]
fn test_policy_follows_options() {
    let clamped = Utterance::with_options(["a", "b"], UtteranceOptions::default()).unwrap();
    assert_eq!(clamped.policy(), DeliveryPolicy::ClampRepeat);
    assert!(!clamped.is_looping());

    let looping = Utterance::with_options(
        ["a", "b"],
        UtteranceOptions::default().with_looping(true),
    )
    .unwrap();
    assert_eq!(looping.policy(), DeliveryPolicy::Cycle);
    assert!(looping.is_looping());

    assert_eq!(Utterance::new("one").policy(), DeliveryPolicy::OneShot);
}

#[test]
fn test_single_text_always_resolves_the_same() {
    let utterance = Utterance::new("Positive charge");
    for _ in 0..3 {
        assert_eq!(utterance.resolve_next_text(), "Positive charge");
    }
    assert_eq!(utterance.delivery_count(), 3);
}

#[test]
fn test_reset_delivery_state_restarts_sequence() {
    let utterance = Utterance::new(Alertable::sequence(["first", "second"]).unwrap());
    assert_eq!(utterance.resolve_next_text(), "first");
    assert_eq!(utterance.resolve_next_text(), "second");
    assert_eq!(utterance.resolve_next_text(), "second");

    utterance.reset_delivery_state();
    assert_eq!(utterance.delivery_count(), 0);
    assert_eq!(utterance.resolve_next_text(), "first");
}

#[test]
fn test_fresh_utterance_is_not_eligible() {
    let utterance = Utterance::new("waiting");
    assert_eq!(utterance.stability_delay(), DEFAULT_STABILITY_DELAY);
    assert!(!utterance.is_stable());
    assert!(!utterance.is_overdue());
    assert!(!utterance.is_eligible());

    let instant = Utterance::with_options(
        "instant",
        UtteranceOptions::default().with_stability_delay(Duration::ZERO),
    )
    .unwrap();
    assert!(instant.is_eligible());
}

#[test]
fn test_alertable_display() {
    assert_eq!(Alertable::text("Hello").to_string(), "Hello");
    assert_eq!(
        Alertable::cycle(["a", "b"]).unwrap().to_string(),
        "[a | b] (cycle)"
    );
}
