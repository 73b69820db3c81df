//! Per-peer metadata book.
//!
//! Metadata is an untyped `key -> bytes` map. The well-known keys below
//! carry JSON-encoded values produced by the types in this module.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw metadata entries for one peer.
pub type Metadata = HashMap<String, Vec<u8>>;

/// Well-known metadata keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    AgentVersion,
    ProtocolVersion,
    Latency,
    LastHandshake,
    ObservedAddress,
    Prunable,
}

impl MetadataKey {
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::AgentVersion => "agentVersion",
            MetadataKey::ProtocolVersion => "protocolVersion",
            MetadataKey::Latency => "latency",
            MetadataKey::LastHandshake => "lastHandshake",
            MetadataKey::ObservedAddress => "observedAddress",
            MetadataKey::Prunable => "prunable",
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which latency average a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyKind {
    Stream,
    Connection,
}

/// Running latency averages, in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyMetadata {
    pub stream_latency: u64,
    pub connection_latency: u64,
    pub stream_count: u64,
    pub connection_count: u64,
}

/// Fold `sample` into a mean over `count` previous samples.
fn running_mean(avg: u64, count: u64, sample: u64) -> u64 {
    let total = avg as u128 * count as u128 + sample as u128;
    (total / (count as u128 + 1)) as u64
}

impl LatencyMetadata {
    pub fn record(&mut self, kind: LatencyKind, sample: u64) {
        match kind {
            LatencyKind::Stream => self.record_stream_latency(sample),
            LatencyKind::Connection => self.record_connection_latency(sample),
        }
    }

    pub fn record_stream_latency(&mut self, sample: u64) {
        self.stream_latency = running_mean(self.stream_latency, self.stream_count, sample);
        self.stream_count += 1;
    }

    pub fn record_connection_latency(&mut self, sample: u64) {
        self.connection_latency = running_mean(self.connection_latency, self.connection_count, sample);
        self.connection_count += 1;
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

fn pings(n: u64) -> &'static str {
    if n == 1 { "ping" } else { "pings" }
}

impl fmt::Display for LatencyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Connections: {}us averaged over {} {}",
            self.connection_latency / 1_000,
            self.connection_count,
            pings(self.connection_count)
        )?;
        write!(
            f,
            "Streams: {}us averaged over {} {}",
            self.stream_latency / 1_000,
            self.stream_count,
            pings(self.stream_count)
        )
    }
}

/// How reluctant we are to drop a connection to this peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prunable {
    #[default]
    Prunable,
    Preferred,
    Necessary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrunableMetadata {
    pub prunable: Prunable,
}

impl PrunableMetadata {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
