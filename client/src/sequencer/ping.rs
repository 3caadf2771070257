//! Interval-driven ping sequencer

use super::{commit, lock, started_session, PingProbe, PingSample, ProbeTask, SharedSession};
use crate::config::PingConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingSettings {
    /// Time between probes
    pub interval: Duration,
    /// Run stops automatically once this many samples were recorded
    pub max_samples: usize,
}

impl Default for PingSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_samples: 10,
        }
    }
}

impl From<&PingConfig> for PingSettings {
    fn from(config: &PingConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            max_samples: config.max_samples,
        }
    }
}

/// Start pinging `target` from `location` on a new task
pub fn start_ping<P: PingProbe>(
    probe: Arc<P>,
    target: &str,
    location: &str,
    settings: PingSettings,
) -> ProbeTask<PingSample> {
    let session = started_session(target, location);
    let (samples_tx, samples_rx) = mpsc::unbounded_channel();

    info!(
        "Pinging {} from {} ({} samples, every {:?})",
        target, location, settings.max_samples, settings.interval
    );

    let handle = tokio::spawn(run(
        probe,
        session.clone(),
        target.to_string(),
        location.to_string(),
        settings,
        samples_tx,
    ));

    ProbeTask::new(session, samples_rx, handle)
}

async fn run<P: PingProbe>(
    probe: Arc<P>,
    session: SharedSession<PingSample>,
    target: String,
    location: String,
    settings: PingSettings,
    samples_tx: mpsc::UnboundedSender<PingSample>,
) {
    let period = settings.interval.max(Duration::from_millis(1));
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    // A slow probe pushes the schedule back instead of queueing a burst
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut seq: u32 = 0;

    loop {
        interval.tick().await;

        {
            let mut session = lock(&session);
            if !session.is_started() {
                return;
            }
            if session.samples().len() >= settings.max_samples {
                let _ = session.stop();
                return;
            }
        }

        seq += 1;
        let result = probe.ping(&target, &location).await;

        match result {
            Ok(response) => {
                let sample = PingSample::from_response(seq, response);
                match &sample.latency {
                    Some(ms) => debug!("ping {} #{} -> {:.3}ms", target, seq, ms),
                    None => debug!("ping {} #{} -> lost ({:?})", target, seq, sample.error),
                }

                match commit(&session, sample, &samples_tx) {
                    Some(count) if count >= settings.max_samples => {
                        if lock(&session).stop().is_ok() {
                            info!("Ping {} finished after {} samples", target, count);
                        }
                        return;
                    }
                    Some(_) => {}
                    None => return,
                }
            }
            Err(e) => {
                warn!("Ping {} failed: {}", target, e);
                let _ = lock(&session).fail(e.to_string());
                return;
            }
        }
    }
}
