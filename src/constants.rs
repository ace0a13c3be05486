//! Shared constants for the feed scheme, client defaults and probing.

use std::time::Duration;

/// Feed line scheme prefixes (lowercase, with `://`).
pub mod scheme {
    /// ShadowsocksR: `ssr://`
    pub const SSR: &str = "ssr://";
}

/// Values attached to every candidate at parse time; never negotiated.
pub mod client_defaults {
    /// Address the local proxy client listens on.
    pub const LOCAL_ADDRESS: &str = "127.0.0.1";
    /// Port the local proxy client listens on.
    pub const LOCAL_PORT: u16 = 1080;
    /// Connection timeout handed to the proxy client, in seconds.
    pub const TIMEOUT_SECS: u64 = 300;
}

/// Latency probing parameters.
pub mod probe {
    use super::Duration;

    /// Echo probes sent per candidate. A candidate is measured only if all of them return.
    pub const PROBE_COUNT: u32 = 3;
    /// Budget for the whole probe sequence of one candidate.
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
    /// Latency of a candidate that was never successfully measured.
    pub const UNREACHABLE_LATENCY: Duration = Duration::from_secs(60 * 60);
}

/// Extension keys recognized after the `?` of a descriptor.
pub mod extension {
    /// Human-readable label, URL-safe base64.
    pub const REMARKS: &str = "remarks";
}

/// Common error message fragments for descriptor parsing.
pub mod error_msg {
    /// Descriptor has fewer than six colon-delimited fields.
    pub const TOO_FEW_FIELDS: &str = "Expected at least 6 ':'-delimited fields";
    /// Address field is empty.
    pub const EMPTY_ADDRESS: &str = "Empty server address";
    /// Invalid port value.
    pub const INVALID_PORT: &str = "Invalid port";
    /// Feed payload is empty.
    pub const EMPTY_PAYLOAD: &str = "Empty subscription payload";
}
