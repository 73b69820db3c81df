//! The per-peer aggregate: addresses, protocols, metadata, and signed records.
//!
//! Each of the four fields sits behind its own lock, so an address update
//! never waits on a metadata update and vice versa. Readers get a snapshot
//! of one field at a time; there is no cross-field atomicity.

use multiaddr::Multiaddr;
use parking_lot::RwLock;
use tracing::debug;

use lpc_crypto::PeerId;

use crate::config::RecordsConfig;
use crate::envelope::SealedEnvelope;
use crate::errors::{PeerError, RecordError};
use crate::metadata::{LatencyKind, LatencyMetadata, Metadata, MetadataKey};
use crate::protocol::SemVerProtocol;
use crate::record::{PeerRecord, Record};

/// A peer id with the addresses it can be dialed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub peer: PeerId,
    pub addresses: Vec<Multiaddr>,
}

impl PeerInfo {
    pub fn new(peer: PeerId, addresses: Vec<Multiaddr>) -> Self {
        Self { peer, addresses }
    }
}

/// Everything known about one remote peer.
#[derive(Debug)]
pub struct ComprehensivePeer {
    id: PeerId,
    max_records: usize,
    addresses: RwLock<Vec<Multiaddr>>,
    protocols: RwLock<Vec<SemVerProtocol>>,
    metadata: RwLock<Metadata>,
    /// Sorted by ascending sequence number.
    records: RwLock<Vec<PeerRecord>>,
}

impl ComprehensivePeer {
    pub fn new(id: PeerId) -> Self {
        Self::with_config(id, &RecordsConfig::default())
    }

    pub fn with_config(id: PeerId, config: &RecordsConfig) -> Self {
        Self {
            id,
            max_records: config.max_records_per_peer,
            addresses: RwLock::new(Vec::new()),
            protocols: RwLock::new(Vec::new()),
            metadata: RwLock::new(Metadata::new()),
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &PeerId {
        &self.id
    }

    pub fn peer_info(&self) -> PeerInfo {
        PeerInfo::new(self.id.clone(), self.addresses())
    }

    // ------------------------------------------------------------------------
    // Addresses
    // ------------------------------------------------------------------------

    /// Returns false if the address was already known.
    pub fn add_address(&self, addr: Multiaddr) -> bool {
        let mut addresses = self.addresses.write();
        if addresses.contains(&addr) {
            return false;
        }
        addresses.push(addr);
        true
    }

    pub fn add_addresses(&self, addrs: impl IntoIterator<Item = Multiaddr>) {
        let mut addresses = self.addresses.write();
        for addr in addrs {
            if !addresses.contains(&addr) {
                addresses.push(addr);
            }
        }
    }

    pub fn remove_address(&self, addr: &Multiaddr) -> bool {
        let mut addresses = self.addresses.write();
        let before = addresses.len();
        addresses.retain(|a| a != addr);
        addresses.len() != before
    }

    pub fn remove_all_addresses(&self) {
        self.addresses.write().clear();
    }

    pub fn addresses(&self) -> Vec<Multiaddr> {
        self.addresses.read().clone()
    }

    // ------------------------------------------------------------------------
    // Protocols
    // ------------------------------------------------------------------------

    pub fn add_protocol(&self, protocol: SemVerProtocol) -> bool {
        let mut protocols = self.protocols.write();
        if protocols.contains(&protocol) {
            return false;
        }
        protocols.push(protocol);
        true
    }

    pub fn add_protocols(&self, protos: impl IntoIterator<Item = SemVerProtocol>) {
        let mut protocols = self.protocols.write();
        for protocol in protos {
            if !protocols.contains(&protocol) {
                protocols.push(protocol);
            }
        }
    }

    pub fn remove_protocol(&self, protocol: &SemVerProtocol) -> bool {
        let mut protocols = self.protocols.write();
        let before = protocols.len();
        protocols.retain(|p| p != protocol);
        protocols.len() != before
    }

    pub fn remove_protocols(&self, protos: &[SemVerProtocol]) {
        self.protocols.write().retain(|p| !protos.contains(p));
    }

    pub fn remove_all_protocols(&self) {
        self.protocols.write().clear();
    }

    pub fn protocols(&self) -> Vec<SemVerProtocol> {
        self.protocols.read().clone()
    }

    /// Whether any registered protocol is compatible with `protocol`.
    pub fn supports(&self, protocol: &SemVerProtocol) -> bool {
        self.protocols.read().iter().any(|p| p.matches(protocol))
    }

    // ------------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------------

    pub fn set_metadata(&self, key: impl Into<String>, data: Vec<u8>) {
        self.metadata.write().insert(key.into(), data);
    }

    pub fn set_metadata_key(&self, key: MetadataKey, data: Vec<u8>) {
        self.set_metadata(key.as_str(), data);
    }

    pub fn remove_metadata(&self, key: &str) -> Option<Vec<u8>> {
        self.metadata.write().remove(key)
    }

    pub fn remove_all_metadata(&self) {
        self.metadata.write().clear();
    }

    pub fn metadata_value(&self, key: &str) -> Option<Vec<u8>> {
        self.metadata.read().get(key).cloned()
    }

    pub fn metadata(&self) -> Metadata {
        self.metadata.read().clone()
    }

    /// Fold a latency sample into the stored averages and return the result.
    pub fn record_latency(&self, kind: LatencyKind, sample: u64) -> Result<LatencyMetadata, PeerError> {
        let key = MetadataKey::Latency.as_str();
        let mut metadata = self.metadata.write();

        let mut latency = match metadata.get(key) {
            Some(bytes) => LatencyMetadata::from_bytes(bytes).map_err(|e| PeerError::Metadata {
                key: key.to_string(),
                reason: e.to_string(),
            })?,
            None => LatencyMetadata::default(),
        };
        latency.record(kind, sample);

        let encoded = latency.to_bytes().map_err(|e| PeerError::Metadata {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        metadata.insert(key.to_string(), encoded);
        Ok(latency)
    }

    pub fn latency(&self) -> Option<LatencyMetadata> {
        let metadata = self.metadata.read();
        let bytes = metadata.get(MetadataKey::Latency.as_str())?;
        LatencyMetadata::from_bytes(bytes).ok()
    }

    // ------------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------------

    /// Add a signed record to this peer's history.
    ///
    /// Returns `Ok(false)` when an identical record is already stored.
    pub fn add_record(&self, record: PeerRecord) -> Result<bool, PeerError> {
        if record.peer_id() != &self.id {
            return Err(PeerError::ForeignRecord {
                expected: self.id.to_string(),
                found: record.peer_id().to_string(),
            });
        }
        let mut records = self.records.write();
        if records.iter().any(|r| r == &record) {
            return Ok(false);
        }
        let at = records.partition_point(|r| r.sequence_number() <= record.sequence_number());
        records.insert(at, record);
        Ok(true)
    }

    /// Add the record carried by an opened envelope.
    pub fn add_envelope(&self, envelope: &SealedEnvelope) -> Result<bool, RecordError> {
        let record = envelope.peer_record()?.clone();
        Ok(self.add_record(record)?)
    }

    pub fn records(&self) -> Vec<PeerRecord> {
        self.records.read().clone()
    }

    pub fn most_recent_record(&self) -> Option<PeerRecord> {
        self.records.read().last().cloned()
    }

    /// Drop the oldest records beyond the configured history size.
    ///
    /// Returns how many records were removed.
    pub fn trim_records(&self) -> usize {
        let mut records = self.records.write();
        let excess = records.len().saturating_sub(self.max_records);
        if excess > 0 {
            records.drain(..excess);
            debug!(peer = %self.id, removed = excess, "trimmed peer record history");
        }
        excess
    }

    pub fn remove_records(&self) {
        self.records.write().clear();
    }
}
