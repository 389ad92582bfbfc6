//! Integration tests for the narrator, its sinks and the clock driver.

use std::sync::Arc;
use std::time::Duration;
use utterance_queue::accessibility::{
    shared, ChannelSink, ClockDriver, LiveRegionAnnouncer, Narrator, Politeness, QueueEvent,
    RegionUpdate, Utterance,
};
use utterance_queue::audio::{DefaultTtsProvider, VoicingAnnouncer};
use utterance_queue::storage::NarrationConfig;

type TestNarrator = Narrator<LiveRegionAnnouncer, VoicingAnnouncer<DefaultTtsProvider>>;

fn build(config: &NarrationConfig) -> (TestNarrator, Arc<DefaultTtsProvider>) {
    let provider = Arc::new(DefaultTtsProvider::new());
    let voicing = VoicingAnnouncer::with_settings(Arc::clone(&provider), &config.voicing);
    let description = LiveRegionAnnouncer::with_settings(&config.description);
    (Narrator::from_config(config, description, voicing), provider)
}

/// Descriptions land in rotating live regions; voicing reaches the speech
/// provider.
#[test]
fn test_end_to_end_narration() {
    let (mut narrator, provider) = build(&NarrationConfig::default());

    narrator.alert_description("Lid open");
    narrator.alert_description("Lid open");
    narrator.alert_voicing("Light bulb on");

    narrator.tick(Duration::from_millis(100));
    assert!(provider.spoken().is_empty());

    let outcome = narrator.tick(Duration::from_millis(100));
    assert_eq!(outcome.description.as_deref(), Some("Lid open"));
    assert_eq!(outcome.voicing.as_deref(), Some("Light bulb on"));
    assert_eq!(provider.spoken(), vec!["Light bulb on"]);

    let updates = narrator.description_mut().sink_mut().drain_updates();
    assert_eq!(
        updates,
        vec![RegionUpdate {
            politeness: Politeness::Polite,
            index: 0,
            content: "Lid open".to_string(),
        }]
    );
    assert!(narrator.is_idle());
}

/// The same text announced twice is written to a different region each time.
#[test]
fn test_repeated_description_rotates_regions() {
    let (mut narrator, _provider) = build(&NarrationConfig::default());

    narrator.alert_description("Plates touching");
    narrator.tick(Duration::from_millis(200));
    narrator.alert_description("Plates touching");
    narrator.tick(Duration::from_millis(200));

    let sink = narrator.description().sink();
    let polite = sink.regions(Politeness::Polite);
    assert_eq!(polite[0].content(), "");
    assert_eq!(polite[1].content(), "Plates touching");
}

/// Muted narration ages and consumes alerts without speaking.
#[test]
fn test_muted_config() {
    let mut config = NarrationConfig::default();
    config.queue.muted = true;
    let (mut narrator, provider) = build(&config);
    let mut events = narrator.voicing().subscribe();

    narrator.alert_voicing("Hidden");
    narrator.tick(Duration::from_millis(200));

    assert!(provider.spoken().is_empty());
    assert!(narrator.is_idle());
    match events.try_recv().unwrap() {
        QueueEvent::Announced { text, muted, .. } => {
            assert_eq!(text, "Hidden");
            assert!(muted);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

/// Custom utterances built from the narrator's options obey its defaults.
#[test]
fn test_utterance_options_from_config() {
    let mut config = NarrationConfig::default();
    config.queue.stability_delay_ms = 50;
    config.queue.max_delay_ms = Some(400);
    let (mut narrator, provider) = build(&config);

    let options = narrator.utterance_options().with_looping(true);
    let looping = Utterance::with_options(["up", "down"], options).unwrap();
    narrator.alert_voicing(&looping);

    narrator.tick(Duration::from_millis(50));
    narrator.tick(Duration::from_millis(50));
    assert_eq!(provider.spoken(), vec!["up", "down"]);
    assert!(narrator.voicing().has_entry(&looping));

    narrator.clear();
    assert!(!narrator.voicing().has_entry(&looping));
}

/// The clock driver ticks a shared narrator from a tokio task.
#[tokio::test(start_paused = true)]
async fn test_clock_driver_delivers() {
    let (tx, rx) = crossbeam::channel::unbounded();
    let provider = Arc::new(DefaultTtsProvider::new());
    let narrator = shared(Narrator::new(
        ChannelSink::new(tx),
        VoicingAnnouncer::new(Arc::clone(&provider)),
    ));

    narrator.lock().alert_description("Field lines shown");
    let clock = ClockDriver::new(Duration::from_millis(100)).spawn(Arc::clone(&narrator));

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(rx.try_recv().unwrap(), "Field lines shown");

    // Disabled narration ignores new alerts while the clock keeps running.
    narrator.lock().set_enabled(false);
    narrator.lock().alert_voicing("ignored");
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(provider.spoken().is_empty());

    clock.stop().await;
}
