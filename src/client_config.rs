//! Proxy client configuration record
//!
//! The selected endpoint is handed to the local proxy client as a flat JSON object:
//!
//! ```json
//! {"server":"1.2.3.4","server_port":8388,"method":"aes-256-cfb","password":"password",
//!  "delay":"40ms","local_address":"127.0.0.1","local_port":1080,"timeout":300,"remark":"test"}
//! ```
//!
//! `delay` is the measured latency in human-readable form (see [`crate::latency`]);
//! `remark` is omitted when the endpoint has none.

use crate::EndpointCandidate;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Flat record consumed by the proxy client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server address
    #[serde(rename = "server")]
    pub server_address: String,
    /// Server port
    pub server_port: u16,
    /// Cipher / transport method
    pub method: String,
    /// Password as text
    pub password: String,
    /// Measured latency
    #[serde(rename = "delay", with = "crate::latency::human")]
    pub latency: Duration,
    /// Local listen address
    pub local_address: String,
    /// Local listen port
    pub local_port: u16,
    /// Timeout in seconds
    pub timeout: u64,
    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl From<&EndpointCandidate> for ClientConfig {
    fn from(candidate: &EndpointCandidate) -> Self {
        ClientConfig {
            server_address: candidate.address.clone(),
            server_port: candidate.port,
            method: candidate.transport_method.clone(),
            password: String::from_utf8_lossy(&candidate.secret).into_owned(),
            latency: candidate.latency,
            local_address: candidate.local_address.clone(),
            local_port: candidate.local_port,
            timeout: candidate.timeout_secs,
            remark: (!candidate.remark.is_empty()).then(|| candidate.remark.clone()),
        }
    }
}

impl ClientConfig {
    /// Serializes to JSON, indented if `pretty`.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Reads a record back from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the record to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns `JsonError` or `IoError`.
    pub fn write_to(&self, path: impl AsRef<Path>, pretty: bool) -> Result<()> {
        let json = self.to_json(pretty)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
