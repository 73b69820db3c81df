//! Records: self-describing, peer-signed payloads.
//!
//! A [`Record`] knows its signing domain and payload type tag, how to
//! marshal itself, and how to build the pre-image it is signed over.
//! [`PeerRecord`] is the concrete record a peer publishes to advertise the
//! addresses it can be reached at.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use multiaddr::Multiaddr;
use prost::Message;
use tracing::warn;

use lpc_crypto::payload::unsigned_payload;
use lpc_crypto::{IdentityError, PeerId, PeerIdentity, PublicKey};
use lpc_proto::v1::{AddressInfo, PeerRecordMessage};

use crate::envelope::SealedEnvelope;
use crate::errors::RecordError;

/// Signing domain of peer records.
pub const PEER_RECORD_DOMAIN: &str = "libp2p-peer-record";

/// Payload type tag of peer records.
///
/// The multicodec for peer records is 0x0301, whose varint form would be
/// `[0x81, 0x06]`. Deployed peers sign over these two raw bytes instead, so
/// they are kept as-is for interop.
pub const PEER_RECORD_PAYLOAD_TYPE: [u8; 2] = [0x03, 0x01];

/// Contract shared by every record type that can travel in an envelope.
pub trait Record: Sized {
    /// Domain separation string mixed into the signature pre-image.
    const DOMAIN: &'static str;
    /// Tag identifying the record type inside an envelope.
    const PAYLOAD_TYPE: &'static [u8];

    fn peer_id(&self) -> &PeerId;
    fn addresses(&self) -> &[Multiaddr];
    fn sequence_number(&self) -> u64;

    /// Serialize to the canonical wire message.
    fn marshal(&self) -> Vec<u8>;

    /// Structural equality over peer id, ordered addresses, and sequence number.
    fn equals<R: Record>(&self, other: &R) -> bool {
        self.peer_id() == other.peer_id()
            && self.addresses() == other.addresses()
            && self.sequence_number() == other.sequence_number()
    }

    /// `uvarint-len(domain) || domain || uvarint-len(type) || type || uvarint-len(record) || record`
    fn unsigned_payload(&self) -> Vec<u8> {
        unsigned_payload(Self::DOMAIN, Self::PAYLOAD_TYPE, &self.marshal())
    }

    /// Sign this record with `identity`, which must hold a private key.
    fn seal(&self, identity: &PeerIdentity) -> Result<SealedEnvelope, RecordError> {
        SealedEnvelope::seal(self, identity)
    }
}

static LAST_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Wall-clock milliseconds, never lower than a value handed out before.
fn next_sequence_number() -> u64 {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let previous = LAST_SEQUENCE.fetch_max(now, Ordering::SeqCst);
    previous.max(now)
}

/// A peer's identity, reachable addresses, and a sequence number.
///
/// Immutable once constructed. A fresh record is built whenever the local
/// listen addresses change; a higher sequence number supersedes a lower one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    peer_id: PeerId,
    addresses: Vec<Multiaddr>,
    seq: u64,
}

impl PeerRecord {
    pub fn new(peer_id: PeerId, addresses: Vec<Multiaddr>, seq: u64) -> Self {
        Self { peer_id, addresses, seq }
    }

    /// Build a record whose sequence number is the current time in milliseconds.
    pub fn now(peer_id: PeerId, addresses: Vec<Multiaddr>) -> Self {
        Self::new(peer_id, addresses, next_sequence_number())
    }

    /// Decode a record received from a remote peer, trusting its embedded peer id.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let msg = PeerRecordMessage::decode(bytes)?;
        let peer_id = PeerId::from_bytes(&msg.peer_id).map_err(IdentityError::from)?;
        Self::from_message(peer_id, &msg)
    }

    /// Decode a record and require its peer id to be derived from `public_key`.
    pub fn from_bytes_with_public_key(bytes: &[u8], public_key: &PublicKey) -> Result<Self, RecordError> {
        let msg = PeerRecordMessage::decode(bytes)?;
        let expected = public_key.to_peer_id();
        if msg.peer_id != expected.to_bytes() {
            return Err(RecordError::PublicKeyMismatch);
        }
        Self::from_message(expected, &msg)
    }

    fn from_message(peer_id: PeerId, msg: &PeerRecordMessage) -> Result<Self, RecordError> {
        let mut addresses = Vec::with_capacity(msg.addresses.len());
        for (index, raw) in msg.address_bytes().enumerate() {
            match Multiaddr::try_from(raw.to_vec()) {
                Ok(addr) => addresses.push(addr),
                Err(e) => warn!(
                    peer = %peer_id,
                    index,
                    error = %e,
                    "dropping undecodable address from peer record"
                ),
            }
        }
        if addresses.is_empty() && !msg.addresses.is_empty() {
            return Err(RecordError::AddressDecodeFailure { count: msg.addresses.len() });
        }

        Ok(Self { peer_id, addresses, seq: msg.seq })
    }

    pub fn to_message(&self) -> PeerRecordMessage {
        PeerRecordMessage {
            peer_id: self.peer_id.to_bytes(),
            seq: self.seq,
            addresses: self
                .addresses
                .iter()
                .map(|a| AddressInfo::from(a.to_vec()))
                .collect(),
        }
    }
}

impl Record for PeerRecord {
    const DOMAIN: &'static str = PEER_RECORD_DOMAIN;
    const PAYLOAD_TYPE: &'static [u8] = &PEER_RECORD_PAYLOAD_TYPE;

    fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    fn addresses(&self) -> &[Multiaddr] {
        &self.addresses
    }

    fn sequence_number(&self) -> u64 {
        self.seq
    }

    fn marshal(&self) -> Vec<u8> {
        self.to_message().encode_to_vec()
    }
}

impl fmt::Display for PeerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Peer Record ({})", PEER_RECORD_DOMAIN)?;
        writeln!(f, "  peer id: {}", self.peer_id)?;
        writeln!(f, "  addresses:")?;
        for addr in &self.addresses {
            writeln!(f, "  - {}", addr)?;
        }
        write!(f, "  sequence number: {}", self.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpc_crypto::Keypair;

    fn key(byte: u8) -> PublicKey {
        Keypair::from_seed(&[byte; 32]).unwrap().public()
    }

    fn addrs() -> Vec<Multiaddr> {
        vec![
            "/ip4/127.0.0.1/tcp/4001".parse().unwrap(),
            "/ip4/10.0.0.7/udp/4001/quic-v1".parse().unwrap(),
            "/dns4/bootstrap.example.org/tcp/443/wss".parse().unwrap(),
        ]
    }

    #[test]
    fn test_marshal_round_trip() {
        let record = PeerRecord::new(key(1).to_peer_id(), addrs(), 42);
        let decoded = PeerRecord::from_bytes(&record.marshal()).unwrap();

        assert!(record.equals(&decoded));
        assert_eq!(decoded, record);
        assert_eq!(decoded.addresses(), addrs().as_slice());
        assert_eq!(decoded.sequence_number(), 42);
    }

    #[test]
    fn test_round_trip_with_matching_key() {
        let k = key(2);
        let record = PeerRecord::new(k.to_peer_id(), addrs(), 7);
        let decoded = PeerRecord::from_bytes_with_public_key(&record.marshal(), &k).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_mismatched_key_is_fatal() {
        let record = PeerRecord::new(key(3).to_peer_id(), addrs(), 7);
        let err = PeerRecord::from_bytes_with_public_key(&record.marshal(), &key(4)).unwrap_err();
        assert!(matches!(err, RecordError::PublicKeyMismatch));
    }

    #[test]
    fn test_partial_address_corruption_keeps_valid_entries() {
        let mut msg = PeerRecord::new(key(5).to_peer_id(), addrs(), 9).to_message();
        // ip4 code followed by only two octets
        msg.addresses[1] = AddressInfo::from(vec![0x04, 10, 0]);

        let decoded = PeerRecord::from_bytes(&msg.encode_to_vec()).unwrap();
        assert_eq!(decoded.addresses().len(), 2);
        assert_eq!(decoded.addresses()[0], addrs()[0]);
        assert_eq!(decoded.addresses()[1], addrs()[2]);
    }

    #[test]
    fn test_all_addresses_corrupt_fails() {
        let mut msg = PeerRecord::new(key(6).to_peer_id(), addrs(), 9).to_message();
        for info in &mut msg.addresses {
            *info = AddressInfo::from(vec![0x04, 1]);
        }
        let err = PeerRecord::from_bytes(&msg.encode_to_vec()).unwrap_err();
        assert!(matches!(err, RecordError::AddressDecodeFailure { count: 3 }));
    }

    #[test]
    fn test_no_addresses_is_valid() {
        let record = PeerRecord::new(key(7).to_peer_id(), vec![], 1);
        let decoded = PeerRecord::from_bytes(&record.marshal()).unwrap();
        assert!(decoded.addresses().is_empty());
    }

    #[test]
    fn test_invalid_peer_id_rejected() {
        let msg = PeerRecordMessage { peer_id: vec![0x99, 0x01], seq: 1, addresses: vec![] };
        let err = PeerRecord::from_bytes(&msg.encode_to_vec()).unwrap_err();
        assert!(matches!(err, RecordError::InvalidPeerId(_)));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = PeerRecord::from_bytes(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, RecordError::Decode(_)));
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let id = key(8).to_peer_id();
        let mut reversed = addrs();
        reversed.reverse();
        let a = PeerRecord::new(id.clone(), addrs(), 1);
        let b = PeerRecord::new(id.clone(), reversed, 1);
        let c = PeerRecord::new(id, addrs(), 2);
        assert!(!a.equals(&b));
        assert!(!a.equals(&c));
    }

    #[test]
    fn test_unsigned_payload_layout() {
        let record = PeerRecord::new(key(9).to_peer_id(), addrs(), 3);
        let payload = record.unsigned_payload();
        let marshaled = record.marshal();

        assert_eq!(payload[0], 18);
        assert_eq!(&payload[1..19], b"libp2p-peer-record");
        assert_eq!(&payload[19..22], &[0x02, 0x03, 0x01]);
        assert!(payload.ends_with(&marshaled));
    }

    #[test]
    fn test_sequence_numbers_do_not_decrease() {
        let id = key(10).to_peer_id();
        let first = PeerRecord::now(id.clone(), addrs());
        let second = PeerRecord::now(id, addrs());
        assert!(second.sequence_number() >= first.sequence_number());
        assert!(first.sequence_number() > 0);
    }

    #[test]
    fn test_display_lists_addresses() {
        let record = PeerRecord::new(key(11).to_peer_id(), addrs(), 5);
        let text = record.to_string();
        assert!(text.contains("/ip4/127.0.0.1/tcp/4001"));
        assert!(text.contains("sequence number: 5"));
    }
}
