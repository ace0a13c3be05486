//! # SSR Selector
//!
//! Picks the lowest-latency ShadowsocksR endpoint from a subscription feed and renders it as a
//! proxy client configuration.
//!
//! ## Pipeline
//!
//! 1. **Feed decoding** ([`decode_feed`]): base64 payload → `ssr://` lines → descriptor strings
//! 2. **Descriptor parsing** ([`EndpointCandidate::parse`]): one descriptor → one candidate
//! 3. **Probing** ([`probe_all`]): every candidate probed concurrently, all joined before ranking
//! 4. **Ranking** ([`Ranking::rank`]): stable sort by latency, unreachable candidates last
//!
//! [`parse_feed`] and [`select_fastest`] wire the stages together.
//!
//! ## Descriptor format and parsing rules
//!
//! - **Feed**: base64 of newline-separated links; only `ssr://` (case-insensitive) is used.
//! - **Descriptor**: `address:port:protocol:method:obfs:base64(password)[?remarks=...]`.
//! - **Port**: base-10 `u16`.
//! - **Base64**: padding optional everywhere; `remarks` uses the URL-safe alphabet.
//! - **Errors**: unusable feed → `FeedFetch` / `FeedDecode` (fatal); malformed descriptor →
//!   `InvalidFormat` / `InvalidField` / `Base64DecodeError` (line dropped); nothing parsed →
//!   `NoCandidates`.
//!
//! ## Latency
//!
//! Each candidate starts at [`constants::probe::UNREACHABLE_LATENCY`] (one hour). Only a probe
//! sequence in which all echoes return overwrites it.
//!
//! ## Example
//!
//! ```rust
//! use ssr_selector::{EndpointCandidate, NoProgress, ProbeOptions, ProbeReport, Prober, Result};
//! use std::time::Duration;
//!
//! struct Fixed;
//!
//! #[async_trait::async_trait]
//! impl Prober for Fixed {
//!     async fn probe(&self, _address: &str, _port: u16, count: u32) -> Result<ProbeReport> {
//!         Ok(ProbeReport::from_round_trips(count, &vec![Duration::from_millis(40); count as usize]))
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let payload = EndpointCandidate::new("1.2.3.4", 8388, "aes-256-cfb", "password").to_link();
//! let feed = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, payload);
//!
//! let candidates = ssr_selector::parse_feed(feed.as_bytes())?;
//! let ranking = ssr_selector::select_fastest(candidates, &Fixed, &NoProgress, &ProbeOptions::default()).await?;
//! assert_eq!(ranking.best()?.latency, Duration::from_millis(40));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod client_config;
pub mod constants;
mod descriptor;
mod encoding;
mod error;
mod feed;
pub mod latency;
mod probe;
mod ranking;


pub use client_config::ClientConfig;
pub use descriptor::EndpointCandidate;
pub use error::{Result, SelectorError};
pub use feed::{FeedDescriptors, decode_feed, fetch_feed};
pub use latency::{format_latency, parse_latency};
pub use probe::{
    NoProgress, ProbeOptions, ProbeReport, Prober, ProgressCounter, ProgressSink, TcpProber,
    probe_all,
};
pub use ranking::Ranking;

use tracing::{info, warn};

/// Decodes a feed payload and parses every descriptor in it.
///
/// Malformed descriptors are logged and dropped. The result may be empty.
///
/// # Errors
///
/// Returns `FeedDecode` if the payload framing is unusable.
pub fn parse_feed(payload: &[u8]) -> Result<Vec<EndpointCandidate>> {
    let mut candidates = Vec::new();
    let mut dropped = 0usize;

    for (index, descriptor) in decode_feed(payload)?.enumerate() {
        match descriptor.and_then(|d| EndpointCandidate::parse(&d)) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => {
                dropped += 1;
                warn!(index, error = %e, "dropping malformed descriptor");
            }
        }
    }

    info!(candidates = candidates.len(), dropped, "subscription feed parsed");
    Ok(candidates)
}

/// Probes all candidates and ranks them, best first.
///
/// # Errors
///
/// Returns `NoCandidates` if `candidates` is empty; probing itself never fails the run.
pub async fn select_fastest(
    mut candidates: Vec<EndpointCandidate>,
    prober: &dyn Prober,
    progress: &dyn ProgressSink,
    options: &ProbeOptions,
) -> Result<Ranking> {
    if candidates.is_empty() {
        return Err(SelectorError::NoCandidates);
    }

    info!(candidates = candidates.len(), "probing endpoints");
    probe_all(&mut candidates, prober, progress, options).await;

    let ranking = Ranking::rank(candidates);
    info!(
        reachable = ranking.reachable_count(),
        total = ranking.len(),
        "endpoints ranked"
    );
    Ok(ranking)
}
