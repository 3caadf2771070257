//! Bounded probe sequencers
//!
//! A sequencer drives a [`Session`] forward by issuing probes to the backend:
//! - ping: one probe per interval until the sample cap is reached
//! - traceroute: one probe per hop, each issued after the previous one is recorded
//!
//! Each run lives on its own tokio task, owned by a [`ProbeTask`] handle.

mod ping;
mod sample;
mod traceroute;

pub use ping::{start_ping, PingSettings};
pub use sample::{HopSample, PingSample};
pub use traceroute::{start_traceroute, HopTarget, TracerouteSettings};

use crate::request::{ApiClient, RequestError};
use crate::session::Session;
use api::types::{PingResponse, TracerouteResponse};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Issues a single ping through the backend
pub trait PingProbe: Send + Sync + 'static {
    fn ping(
        &self,
        host: &str,
        location: &str,
    ) -> impl Future<Output = Result<PingResponse, RequestError>> + Send;
}

/// Issues a single traceroute hop through the backend
pub trait HopProbe: Send + Sync + 'static {
    fn hop(
        &self,
        host: &str,
        hop: u32,
        location: &str,
    ) -> impl Future<Output = Result<TracerouteResponse, RequestError>> + Send;
}

impl PingProbe for ApiClient {
    async fn ping(&self, host: &str, location: &str) -> Result<PingResponse, RequestError> {
        self.get_json("/ping/:host", &[("host", host.into())], Some(location))
            .await
    }
}

impl HopProbe for ApiClient {
    async fn hop(
        &self,
        host: &str,
        hop: u32,
        location: &str,
    ) -> Result<TracerouteResponse, RequestError> {
        self.get_json(
            "/traceroute/:host",
            &[("host", host.into()), ("hop", hop.into())],
            Some(location),
        )
        .await
    }
}

pub type SharedSession<S> = Arc<Mutex<Session<S>>>;

/// Lock a session, recovering the state if a previous holder panicked
pub(crate) fn lock<S>(session: &SharedSession<S>) -> MutexGuard<'_, Session<S>> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Create a shared session already in the `Started` state
pub(crate) fn started_session<S>(target: &str, location: &str) -> SharedSession<S> {
    let mut session = Session::Initial;
    // A fresh session always accepts start()
    let _ = session.start(target, location);
    Arc::new(Mutex::new(session))
}

/// Handle to a running sequencer.
///
/// `cancel()` stops the session and aborts the task. Dropping the handle
/// aborts the task as well.
pub struct ProbeTask<S> {
    session: SharedSession<S>,
    samples: mpsc::UnboundedReceiver<S>,
    handle: Option<JoinHandle<()>>,
}

impl<S: Clone> ProbeTask<S> {
    pub(crate) fn new(
        session: SharedSession<S>,
        samples: mpsc::UnboundedReceiver<S>,
        handle: JoinHandle<()>,
    ) -> Self {
        Self {
            session,
            samples,
            handle: Some(handle),
        }
    }

    /// Snapshot of the current session state
    pub fn session(&self) -> Session<S> {
        lock(&self.session).clone()
    }

    /// Next committed sample, or None once the run is over and all samples
    /// were delivered
    pub async fn next_sample(&mut self) -> Option<S> {
        self.samples.recv().await
    }

    #[allow(dead_code)]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Stop the run. A response still in flight is discarded.
    pub fn cancel(&mut self) {
        if lock(&self.session).stop().is_ok() {
            debug!("Sequencer cancelled");
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Wait for the run to end on its own and return the final state
    pub async fn join(mut self) -> Session<S> {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Sequencer task failed: {}", e);
                    let _ = lock(&self.session).fail(format!("sequencer task failed: {}", e));
                }
            }
        }
        self.session()
    }
}

impl<S> Drop for ProbeTask<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Record `sample` unless the session already left `Started`.
///
/// Returns the number of samples after the commit, or None if the sample
/// was discarded.
pub(crate) fn commit<S: Clone>(
    session: &SharedSession<S>,
    sample: S,
    samples_tx: &mpsc::UnboundedSender<S>,
) -> Option<usize> {
    let mut session = lock(session);
    if !session.is_started() {
        debug!("Discarding response received after {}", session.status());
        return None;
    }
    session.record_sample(sample.clone()).ok()?;
    let count = session.samples().len();
    drop(session);

    // The receiver may be gone if the caller only wants the final state
    let _ = samples_tx.send(sample);
    Some(count)
}
