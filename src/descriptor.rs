//! ShadowsocksR endpoint descriptor parser
//!
//! Descriptor format (the payload of an `ssr://` line after base64 decoding):
//!
//! `address:port:protocol:method:obfs:base64(password)[?key=value&...]`
//!
//! **Required**: all six colon-delimited fields. `port` is a base-10 `u16`.
//!
//! **Extensions** (optional, after `?`, `&`-separated): `remarks` is URL-safe base64 of a
//! human-readable label. Other keys are ignored.
//!
//! ## Parsing rules
//!
//! 1. The descriptor is split at the first `?` into a base segment and an extension segment;
//!    a `/` directly before the `?` is dropped.
//! 2. The base segment is split on `:` left to right: field 0 is the address, 1 the port,
//!    3 the method, 5 the password. Fields past the sixth are ignored. An IPv6 address must
//!    be bracketed (`[2001:db8::1]:8388:...`); the brackets are not kept.
//! 3. Fewer than six fields, an empty address, or a bad port → `InvalidFormat`/`InvalidField`;
//!    the caller drops the line.
//! 4. A password that is not valid base64 yields an empty secret; the candidate is kept.
//! 5. A `remarks` value that fails to decode leaves the remark empty.

use crate::constants::{client_defaults, error_msg, extension, probe};
use crate::encoding;
use crate::error::{Result, SelectorError};
use std::time::Duration;
use tracing::warn;

/// One parsed endpoint from a subscription feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    /// Server address to probe and connect to
    pub address: String,
    /// Server port
    pub port: u16,
    /// SSR protocol plugin name (field 2), not interpreted
    pub protocol: String,
    /// Cipher / transport method (field 3), not validated
    pub transport_method: String,
    /// SSR obfuscation plugin name (field 4), not interpreted
    pub obfuscation: String,
    /// Decoded password bytes; empty if the field did not decode
    pub secret: Vec<u8>,
    /// Human-readable label; empty if absent
    pub remark: String,
    /// Measured average round trip, or [`probe::UNREACHABLE_LATENCY`]
    pub latency: Duration,
    /// Local listen address for the proxy client
    pub local_address: String,
    /// Local listen port for the proxy client
    pub local_port: u16,
    /// Proxy client timeout in seconds
    pub timeout_secs: u64,
}

impl EndpointCandidate {
    /// Creates a candidate with the fixed client defaults and unreachable latency.
    pub fn new(
        address: impl Into<String>,
        port: u16,
        transport_method: impl Into<String>,
        secret: impl Into<Vec<u8>>,
    ) -> Self {
        EndpointCandidate {
            address: address.into(),
            port,
            protocol: "origin".to_string(),
            transport_method: transport_method.into(),
            obfuscation: "plain".to_string(),
            secret: secret.into(),
            remark: String::new(),
            latency: probe::UNREACHABLE_LATENCY,
            local_address: client_defaults::LOCAL_ADDRESS.to_string(),
            local_port: client_defaults::LOCAL_PORT,
            timeout_secs: client_defaults::TIMEOUT_SECS,
        }
    }

    /// Parses one decoded descriptor string.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if there are fewer than six fields or the address is empty
    /// - `InvalidField` if the port is not a valid `u16`
    ///
    /// # Example
    ///
    /// ```rust
    /// use ssr_selector::EndpointCandidate;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let c = EndpointCandidate::parse("1.2.3.4:8388:origin:aes-256-cfb:plain:cGFzc3dvcmQ?remarks=dGVzdA")?;
    /// assert_eq!(c.port, 8388);
    /// assert_eq!(c.secret, b"password");
    /// assert_eq!(c.remark, "test");
    /// # Ok(())
    /// # }
    /// ```
    pub fn parse(descriptor: &str) -> Result<Self> {
        let (base, extensions) = match descriptor.split_once('?') {
            // `.../?k=v` is the usual published form; the slash is not part of the password.
            Some((base, ext)) => (base.strip_suffix('/').unwrap_or(base), Some(ext)),
            None => (descriptor, None),
        };

        let (address, rest) = split_address(base)?;
        let fields: Vec<&str> = rest.split(':').collect();
        if fields.len() < 5 {
            return Err(SelectorError::InvalidFormat(format!(
                "{}: {:?}",
                error_msg::TOO_FEW_FIELDS,
                base
            )));
        }
        let (port_str, protocol, transport_method, obfuscation, secret_b64) =
            (fields[0], fields[1], fields[2], fields[3], fields[4]);

        if address.is_empty() {
            return Err(SelectorError::InvalidFormat(
                error_msg::EMPTY_ADDRESS.to_string(),
            ));
        }
        let port: u16 = port_str.parse().map_err(|e| {
            SelectorError::InvalidField(format!("{} {:?}: {}", error_msg::INVALID_PORT, port_str, e))
        })?;

        let secret = encoding::decode_standard(secret_b64).unwrap_or_else(|e| {
            warn!(address, port, error = %e, "password field is not valid base64, using empty secret");
            Vec::new()
        });

        let remark = extensions.map(parse_remark).unwrap_or_default();

        let mut candidate = EndpointCandidate::new(address, port, transport_method, secret);
        candidate.protocol = protocol.to_string();
        candidate.obfuscation = obfuscation.to_string();
        candidate.remark = remark;
        Ok(candidate)
    }

    /// Re-encodes the candidate as a descriptor string (the inverse of [`parse`](Self::parse)).
    ///
    /// The password is unpadded standard base64; a non-empty remark is appended as a
    /// URL-safe `remarks` extension.
    pub fn to_descriptor(&self) -> String {
        let address = if self.address.contains(':') {
            format!("[{}]", self.address)
        } else {
            self.address.clone()
        };
        let mut descriptor = format!(
            "{}:{}:{}:{}:{}:{}",
            address,
            self.port,
            self.protocol,
            self.transport_method,
            self.obfuscation,
            encoding::encode_standard(&self.secret)
        );
        if !self.remark.is_empty() {
            descriptor.push_str(&format!(
                "?{}={}",
                extension::REMARKS,
                encoding::encode_url_safe(self.remark.as_bytes())
            ));
        }
        descriptor
    }

    /// Encodes the candidate as a complete `ssr://` feed line.
    pub fn to_link(&self) -> String {
        format!(
            "{}{}",
            crate::constants::scheme::SSR,
            encoding::encode_standard(self.to_descriptor().as_bytes())
        )
    }

    /// Whether a probe has overwritten the sentinel latency.
    pub fn is_reachable(&self) -> bool {
        self.latency < probe::UNREACHABLE_LATENCY
    }
}

/// Splits the address off the base segment. A bracketed `[v6]` address may contain colons;
/// otherwise the address is everything before the first `:`.
fn split_address(base: &str) -> Result<(&str, &str)> {
    if let Some(bracketed) = base.strip_prefix('[') {
        let (address, rest) = bracketed.split_once("]:").ok_or_else(|| {
            SelectorError::InvalidFormat(format!("Unterminated '[' address: {:?}", base))
        })?;
        return Ok((address, rest));
    }
    let (address, rest) = base.split_once(':').ok_or_else(|| {
        SelectorError::InvalidFormat(format!("{}: {:?}", error_msg::TOO_FEW_FIELDS, base))
    })?;
    Ok((address, rest))
}

/// Extracts the last `remarks` value from an extension segment.
fn parse_remark(extensions: &str) -> String {
    let mut remark = String::new();
    for pair in extensions.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key != extension::REMARKS || value.is_empty() {
            continue;
        }
        let value = urlencoding::decode(value)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.to_string());
        match encoding::decode_url_safe(&value) {
            Ok(bytes) => remark = String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => warn!(error = %e, "remarks extension is not valid base64, ignoring"),
        }
    }
    remark
}
