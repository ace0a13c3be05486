//! Concurrent latency probing
//!
//! Every candidate gets its own probe future; all of them run at once and
//! [`probe_all`] returns only after the last one finishes. Each future holds the exclusive
//! borrow of one candidate and is the only writer of its `latency`, so no locking is needed.
//!
//! A candidate's latency is overwritten only when every echo of its probe sequence returned
//! within [`ProbeOptions::timeout`]. Errors, timeouts, partial loss and panics inside a
//! [`Prober`] all leave the sentinel in place and never affect other candidates.

use crate::EndpointCandidate;
use crate::constants::probe::{PROBE_COUNT, PROBE_TIMEOUT};
use crate::error::{Result, SelectorError};
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::join_all;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Outcome of one probe sequence against one host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    /// Echo requests sent
    pub sent: u32,
    /// Echo replies received
    pub received: u32,
    /// Mean round trip over the received replies
    pub average_rtt: Option<Duration>,
}

impl ProbeReport {
    /// Builds a report from the round trips that completed out of `sent` attempts.
    pub fn from_round_trips(sent: u32, round_trips: &[Duration]) -> Self {
        let received = u32::try_from(round_trips.len()).unwrap_or(u32::MAX);
        let average_rtt = (received > 0).then(|| round_trips.iter().sum::<Duration>() / received);
        ProbeReport {
            sent,
            received,
            average_rtt,
        }
    }
}

/// Network probe primitive: send `count` echoes to a host and report what came back.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probes `address`, returning how many echoes returned and their mean round trip.
    ///
    /// # Errors
    ///
    /// Returns `ProbeFailure` if the probe could not be issued at all (e.g. name resolution).
    async fn probe(&self, address: &str, port: u16, count: u32) -> Result<ProbeReport>;
}

/// Measures TCP handshake round trips, one connection per echo.
///
/// Needs no raw-socket privileges, and measures the path the proxy client will actually use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, address: &str, port: u16, count: u32) -> Result<ProbeReport> {
        let target = tokio::net::lookup_host((address, port))
            .await
            .map_err(|e| SelectorError::ProbeFailure(format!("cannot resolve {}: {}", address, e)))?
            .next()
            .ok_or_else(|| {
                SelectorError::ProbeFailure(format!("{} resolved to no addresses", address))
            })?;

        let mut round_trips = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let started = Instant::now();
            match TcpStream::connect(target).await {
                Ok(stream) => {
                    round_trips.push(started.elapsed());
                    drop(stream);
                }
                Err(e) => debug!(%target, error = %e, "echo lost"),
            }
        }
        Ok(ProbeReport::from_round_trips(count, &round_trips))
    }
}

/// Observer notified once per finished candidate.
pub trait ProgressSink: Send + Sync {
    /// Records one unit of work done.
    fn increment(&self);
}

/// Progress sink that discards updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn increment(&self) {}
}

/// Atomic progress counter that logs every step at `debug`.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    done: AtomicUsize,
    total: usize,
}

impl ProgressCounter {
    /// Creates a counter expecting `total` increments.
    pub fn new(total: usize) -> Self {
        ProgressCounter {
            done: AtomicUsize::new(0),
            total,
        }
    }

    /// Increments recorded so far.
    pub fn done(&self) -> usize {
        self.done.load(Ordering::Acquire)
    }

    /// Expected number of increments.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl ProgressSink for ProgressCounter {
    fn increment(&self) {
        let done = self.done.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(done, total = self.total, "probe finished");
    }
}

/// Probe parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Echoes per candidate; all must return for the candidate to be measured
    pub count: u32,
    /// Budget for one candidate's whole probe sequence
    pub timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        ProbeOptions {
            count: PROBE_COUNT,
            timeout: PROBE_TIMEOUT,
        }
    }
}

/// Probes every candidate concurrently and waits for all of them.
///
/// On return, each candidate's `latency` is either its measured average round trip or the
/// unreachable sentinel it was created with.
pub async fn probe_all(
    candidates: &mut [EndpointCandidate],
    prober: &dyn Prober,
    progress: &dyn ProgressSink,
    options: &ProbeOptions,
) {
    let probes = candidates.iter_mut().map(|candidate| async move {
        let outcome = AssertUnwindSafe(measure(prober, candidate, options))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(SelectorError::ProbeFailure("prober panicked".to_string())));

        match outcome {
            Ok(latency) => {
                debug!(address = %candidate.address, ?latency, "endpoint reachable");
                candidate.latency = latency;
            }
            Err(e) => warn!(address = %candidate.address, error = %e, "endpoint unreachable"),
        }
        progress.increment();
    });

    join_all(probes).await;
}

async fn measure(
    prober: &dyn Prober,
    candidate: &EndpointCandidate,
    options: &ProbeOptions,
) -> Result<Duration> {
    let report = tokio::time::timeout(
        options.timeout,
        prober.probe(&candidate.address, candidate.port, options.count),
    )
    .await
    .map_err(|_| {
        SelectorError::ProbeFailure(format!("no complete reply within {:?}", options.timeout))
    })??;

    if report.received < options.count {
        return Err(SelectorError::ProbeFailure(format!(
            "{}/{} echoes returned",
            report.received, options.count
        )));
    }
    report
        .average_rtt
        .ok_or_else(|| SelectorError::ProbeFailure("no round-trip time reported".to_string()))
}
