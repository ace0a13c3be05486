//! Subscription feed retrieval and decoding
//!
//! A feed is base64 of a newline-separated list of links. Only `ssr://` links are used; each
//! link body is itself base64 of one descriptor (see [`crate::EndpointCandidate::parse`]).
//!
//! ## Decoding rules
//!
//! 1. The whole payload is base64 (standard alphabet, padding optional, whitespace ignored).
//!    An empty payload, invalid base64, or non-UTF-8 text is a fatal `FeedDecode` error.
//! 2. Lines are split on `\n`; a trailing `\r` is tolerated.
//! 3. The `ssr://` prefix is matched case-insensitively; other lines are skipped.
//! 4. Each link body is decoded lazily. Failures surface as per-line `Err` items.

use crate::constants::{error_msg, scheme};
use crate::encoding;
use crate::error::{Result, SelectorError};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fetches the raw subscription payload with a single HTTP GET.
///
/// # Errors
///
/// Returns `FeedFetch` for an unparsable URL, a transport failure, or a non-success status.
pub async fn fetch_feed(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let url = Url::parse(url)
        .map_err(|e| SelectorError::FeedFetch(format!("Invalid subscription URL {:?}: {}", url, e)))?;

    let client = reqwest::Client::builder().timeout(timeout).build()?;
    debug!(%url, "fetching subscription feed");
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.bytes().await?;
    debug!(bytes = body.len(), "subscription feed received");
    Ok(body.to_vec())
}

/// Decodes the outer base64 framing of a feed.
///
/// # Errors
///
/// Returns `FeedDecode` with the raw payload attached if the payload is empty, not base64,
/// or not UTF-8 once decoded.
///
/// # Example
///
/// ```rust
/// use ssr_selector::decode_feed;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // base64("ssr://" + base64("1.2.3.4:443:origin:chacha20:plain:c2VjcmV0"))
/// let payload = "c3NyOi8vTVM0eUxqTXVORG8wTkRNNmIzSnBaMmx1T21Ob1lXTm9ZVEl3T25Cc1lXbHVPbU15Vm1wamJWWXc";
/// let descriptors: Vec<String> = decode_feed(payload.as_bytes())?.filter_map(Result::ok).collect();
/// assert_eq!(descriptors, vec!["1.2.3.4:443:origin:chacha20:plain:c2VjcmV0".to_string()]);
/// # Ok(())
/// # }
/// ```
pub fn decode_feed(payload: &[u8]) -> Result<FeedDescriptors> {
    let raw = String::from_utf8_lossy(payload);
    let decode_error = |reason: String| SelectorError::FeedDecode {
        payload: raw.to_string(),
        reason,
    };

    if raw.trim().is_empty() {
        return Err(decode_error(error_msg::EMPTY_PAYLOAD.to_string()));
    }
    let decoded = encoding::decode_standard(&raw).map_err(|e| decode_error(e.to_string()))?;
    let text = String::from_utf8(decoded)
        .map_err(|e| decode_error(format!("Invalid UTF-8: {}", e)))?;

    let lines: Vec<String> = text
        .split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect();
    debug!(lines = lines.len(), "subscription feed decoded");

    Ok(FeedDescriptors {
        lines: lines.into_iter(),
    })
}

/// Lazily decoded descriptor strings, in feed order.
///
/// Yields `Ok(descriptor)` for every `ssr://` line whose body decodes, and a record-level
/// `Err` for every `ssr://` line whose body does not.
#[derive(Debug)]
pub struct FeedDescriptors {
    lines: std::vec::IntoIter<String>,
}

impl Iterator for FeedDescriptors {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            let Some(body) = strip_scheme(&line) else {
                if !line.trim().is_empty() {
                    debug!(line = %line, "skipping non-ssr feed line");
                }
                continue;
            };
            return Some(decode_link_body(body));
        }
        None
    }
}

fn strip_scheme(line: &str) -> Option<&str> {
    let prefix = line.get(..scheme::SSR.len())?;
    prefix
        .eq_ignore_ascii_case(scheme::SSR)
        .then(|| &line[scheme::SSR.len()..])
}

fn decode_link_body(body: &str) -> Result<String> {
    let bytes = encoding::decode_standard(body)?;
    String::from_utf8(bytes)
        .map_err(|e| SelectorError::InvalidFormat(format!("Invalid UTF-8 in descriptor: {}", e)))
}
