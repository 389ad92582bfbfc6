//! utterance-queue demo
//!
//! Reads alerts from stdin, one per line, and narrates them through the
//! description and voicing channels. Lines starting with `!` go to voicing
//! only; everything else is described. Live-region writes are printed as
//! a host page would apply them.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utterance_queue::accessibility::{shared, ClockDriver, LiveRegionAnnouncer, Narrator};
use utterance_queue::audio::{DefaultTtsProvider, VoicingAnnouncer};
use utterance_queue::storage::load_config;

/// Longest wait for pending alerts after stdin closes.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting utterance-queue v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    let provider = Arc::new(DefaultTtsProvider::new());
    let voicing = VoicingAnnouncer::with_settings(provider, &config.voicing);
    let description = LiveRegionAnnouncer::with_settings(&config.description);

    let narrator = shared(Narrator::from_config(&config, description, voicing));
    let interval = config.queue.tick_interval();
    let clock = ClockDriver::new(interval).spawn(Arc::clone(&narrator));

    let input = Arc::clone(&narrator);
    let reader = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        for line in std::io::stdin().lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.strip_prefix('!') {
                Some(spoken) => input.lock().alert_voicing(spoken.trim()),
                None => input.lock().alert_description(line),
            }
        }
        Ok(())
    });

    let mut deadline = None;
    loop {
        tokio::time::sleep(interval).await;

        let idle = {
            let mut narrator = narrator.lock();
            for update in narrator.description_mut().sink_mut().drain_updates() {
                println!(
                    "[{:?} region {}] {}",
                    update.politeness, update.index, update.content
                );
            }
            narrator.is_idle()
        };

        if deadline.is_none() && reader.is_finished() {
            deadline = Some(tokio::time::Instant::now() + DRAIN_TIMEOUT);
        }
        match deadline {
            Some(deadline) if idle || tokio::time::Instant::now() >= deadline => break,
            _ => {}
        }
    }

    reader.await??;
    clock.stop().await;
    tracing::info!("Narration finished");
    Ok(())
}
