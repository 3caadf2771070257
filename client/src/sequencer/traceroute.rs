//! Chained traceroute sequencer

use super::{commit, lock, started_session, HopProbe, HopSample, ProbeTask, SharedSession};
use crate::config::TracerouteConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How each hop picks the address it probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HopTarget {
    /// Always probe the host the user entered, varying only the hop count
    Original,
    /// Probe the destination address reported by the previous hop's response
    #[default]
    ResolvedDestination,
    /// Probe the address that answered the previous hop
    LastHop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracerouteSettings {
    /// Hop ceiling; the run stops after this many hops
    pub max_hops: u32,
    pub hop_target: HopTarget,
}

impl Default for TracerouteSettings {
    fn default() -> Self {
        Self {
            max_hops: 64,
            hop_target: HopTarget::default(),
        }
    }
}

impl From<&TracerouteConfig> for TracerouteSettings {
    fn from(config: &TracerouteConfig) -> Self {
        Self {
            max_hops: config.max_hops,
            hop_target: config.hop_target,
        }
    }
}

/// Address to probe for the hop after `hops`
pub fn next_hop_target<'a>(policy: HopTarget, target: &'a str, hops: &'a [HopSample]) -> &'a str {
    let Some(last) = hops.last() else {
        return target;
    };

    match policy {
        HopTarget::Original => target,
        HopTarget::ResolvedDestination if !last.destination_ip.is_empty() => &last.destination_ip,
        HopTarget::ResolvedDestination => target,
        HopTarget::LastHop => last.ip_address.as_deref().unwrap_or(target),
    }
}

/// Start tracing the route to `target` from `location` on a new task
pub fn start_traceroute<P: HopProbe>(
    probe: Arc<P>,
    target: &str,
    location: &str,
    settings: TracerouteSettings,
) -> ProbeTask<HopSample> {
    let session = started_session(target, location);
    let (samples_tx, samples_rx) = mpsc::unbounded_channel();

    info!(
        "Tracing route to {} from {} (max {} hops, {:?})",
        target, location, settings.max_hops, settings.hop_target
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

async fn run<P: HopProbe>(
    probe: Arc<P>,
    session: SharedSession<HopSample>,
    target: String,
    location: String,
    settings: TracerouteSettings,
    samples_tx: mpsc::UnboundedSender<HopSample>,
) {
    loop {
        let (hop, destination) = {
            let mut session = lock(&session);
            if !session.is_started() {
                return;
            }
            let hops = session.samples();
            if hops.len() >= settings.max_hops as usize {
                let _ = session.stop();
                return;
            }
            let destination = next_hop_target(settings.hop_target, &target, hops).to_string();
            (hops.len() as u32 + 1, destination)
        };

        debug!("traceroute {} hop {} via {}", target, hop, destination);

        let response = match probe.hop(&destination, hop, &location).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Traceroute {} hop {} failed: {}", target, hop, e);
                let _ = lock(&session).fail(e.to_string());
                return;
            }
        };

        let sample = HopSample::from_response(hop, response);
        let reached = sample.reached_destination();

        match commit(&session, sample, &samples_tx) {
            Some(_) if reached => {
                if lock(&session).stop().is_ok() {
                    info!("Reached {} after {} hops", target, hop);
                }
                return;
            }
            Some(count) if count >= settings.max_hops as usize => {
                if lock(&session).stop().is_ok() {
                    info!("Gave up on {} after {} hops", target, count);
                }
                return;
            }
            Some(_) => {}
            None => return,
        }
    }
}
