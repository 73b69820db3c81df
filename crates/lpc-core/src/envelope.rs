//! Sealed envelopes.
//!
//! An envelope carries a marshaled record, the record's payload type tag,
//! the signer's public key, and a signature over the record's
//! domain-separated pre-image. There is no unverified envelope: the only
//! ways to obtain one are [`SealedEnvelope::seal`] and
//! [`SealedEnvelope::open`], and `open` fails unless the signature checks out.

use std::fmt;
use std::sync::OnceLock;

use prost::Message;
use tracing::debug;

use lpc_crypto::{PeerId, PeerIdExt, PeerIdentity, PublicKey};
use lpc_proto::v1::EnvelopeMessage;

use crate::config::EnvelopeConfig;
use crate::errors::RecordError;
use crate::record::{PeerRecord, Record, PEER_RECORD_PAYLOAD_TYPE};

/// Record types an envelope can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    PeerRecord,
}

impl PayloadKind {
    pub fn from_tag(tag: &[u8]) -> Result<Self, RecordError> {
        if tag.is_empty() {
            return Err(RecordError::EmptyPayloadType);
        }
        match tag {
            t if t == &PEER_RECORD_PAYLOAD_TYPE[..] => Ok(PayloadKind::PeerRecord),
            other => Err(RecordError::UnsupportedPayloadType(other.to_vec())),
        }
    }

    pub fn tag(self) -> &'static [u8] {
        match self {
            PayloadKind::PeerRecord => PeerRecord::PAYLOAD_TYPE,
        }
    }

    pub fn domain(self) -> &'static str {
        match self {
            PayloadKind::PeerRecord => PeerRecord::DOMAIN,
        }
    }

    fn decode(self, raw: &[u8]) -> Result<DecodedRecord, RecordError> {
        match self {
            PayloadKind::PeerRecord => PeerRecord::from_bytes(raw).map(DecodedRecord::Peer),
        }
    }
}

/// A record decoded from an envelope payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedRecord {
    Peer(PeerRecord),
}

impl DecodedRecord {
    pub fn kind(&self) -> PayloadKind {
        match self {
            DecodedRecord::Peer(_) => PayloadKind::PeerRecord,
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        match self {
            DecodedRecord::Peer(r) => r.peer_id(),
        }
    }

    pub fn unsigned_payload(&self) -> Vec<u8> {
        match self {
            DecodedRecord::Peer(r) => r.unsigned_payload(),
        }
    }
}

/// A signed, typed record container.
#[derive(Debug)]
pub struct SealedEnvelope {
    public_key: PublicKey,
    payload_type: Vec<u8>,
    raw_payload: Vec<u8>,
    signature: Vec<u8>,
    /// Decoded payload, filled on first access (or during `open`).
    cached: OnceLock<DecodedRecord>,
}

impl SealedEnvelope {
    /// Sign `record` with `identity` and wrap it.
    pub fn seal<R: Record>(record: &R, identity: &PeerIdentity) -> Result<Self, RecordError> {
        if R::DOMAIN.is_empty() {
            return Err(RecordError::EmptyDomain);
        }
        if R::PAYLOAD_TYPE.is_empty() {
            return Err(RecordError::EmptyPayloadType);
        }
        if !identity.has_private_key() {
            return Err(RecordError::NoPrivateKey);
        }
        let public_key = identity.public_key().ok_or(RecordError::NoPublicKey)?.clone();
        if !record.peer_id().is_derived_from(&public_key) {
            return Err(RecordError::PublicKeyMismatch);
        }

        let signature = identity.sign(&record.unsigned_payload())?;
        debug!(
            peer = %identity.peer_id(),
            seq = record.sequence_number(),
            "sealed {} record",
            R::DOMAIN
        );

        Ok(Self {
            public_key,
            payload_type: R::PAYLOAD_TYPE.to_vec(),
            raw_payload: record.marshal(),
            signature,
            cached: OnceLock::new(),
        })
    }

    /// Reconstruct and verify an envelope from wire bytes.
    ///
    /// When `expected_key` is given the signature is checked against it;
    /// otherwise against the key embedded in the envelope.
    pub fn open(bytes: &[u8], expected_key: Option<&PublicKey>) -> Result<Self, RecordError> {
        Self::verify_and_decode(bytes, expected_key)
    }

    /// [`SealedEnvelope::open`] for untrusted input, refusing envelopes
    /// larger than `config.max_size` before decoding them.
    pub fn open_with_config(
        bytes: &[u8],
        expected_key: Option<&PublicKey>,
        config: &EnvelopeConfig,
    ) -> Result<Self, RecordError> {
        if bytes.len() > config.max_size {
            return Err(RecordError::EnvelopeTooLarge { size: bytes.len(), max: config.max_size });
        }
        Self::verify_and_decode(bytes, expected_key)
    }

    fn verify_and_decode(bytes: &[u8], expected_key: Option<&PublicKey>) -> Result<Self, RecordError> {
        let msg = EnvelopeMessage::decode(bytes)?;

        let public_key = match expected_key {
            Some(key) => key.clone(),
            None => {
                let embedded = msg.public_key.as_ref().ok_or(RecordError::NoPublicKey)?;
                PublicKey::from_protobuf(embedded)?
            }
        };

        let kind = PayloadKind::from_tag(&msg.payload_type)?;
        let record = kind.decode(&msg.payload).map_err(|e| {
            debug!(error = %e, "envelope payload does not decode as {:?}", kind);
            RecordError::InvalidSignature
        })?;

        if !public_key.verify(&record.unsigned_payload(), &msg.signature) {
            debug!(peer = %record.peer_id(), "envelope signature verification failed");
            return Err(RecordError::InvalidSignature);
        }
        if !record.peer_id().is_derived_from(&public_key) {
            debug!(
                peer = %record.peer_id(),
                signer = %public_key.to_peer_id(),
                "envelope signed by a key other than the record's peer"
            );
            return Err(RecordError::PublicKeyMismatch);
        }

        let cached = OnceLock::new();
        let _ = cached.set(record);

        Ok(Self {
            public_key,
            payload_type: msg.payload_type,
            raw_payload: msg.payload,
            signature: msg.signature,
            cached,
        })
    }

    /// Encode as the wire `Envelope` message.
    pub fn marshal(&self) -> Vec<u8> {
        EnvelopeMessage {
            public_key: Some(self.public_key.to_protobuf()),
            payload_type: self.payload_type.clone(),
            payload: self.raw_payload.clone(),
            signature: self.signature.clone(),
        }
        .encode_to_vec()
    }

    /// The decoded payload, computed once and cached.
    pub fn record(&self) -> Result<&DecodedRecord, RecordError> {
        if let Some(record) = self.cached.get() {
            return Ok(record);
        }
        let decoded = PayloadKind::from_tag(&self.payload_type)?.decode(&self.raw_payload)?;
        Ok(self.cached.get_or_init(|| decoded))
    }

    pub fn peer_record(&self) -> Result<&PeerRecord, RecordError> {
        match self.record()? {
            DecodedRecord::Peer(record) => Ok(record),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn payload_type(&self) -> &[u8] {
        &self.payload_type
    }

    pub fn raw_payload(&self) -> &[u8] {
        &self.raw_payload
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

impl fmt::Display for SealedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload_type = match PayloadKind::from_tag(&self.payload_type) {
            Ok(kind) => kind.domain().to_string(),
            Err(_) => hex::encode(&self.payload_type),
        };
        writeln!(f, "Sealed Envelope")?;
        writeln!(f, "  signer: {}", self.public_key.to_peer_id())?;
        writeln!(f, "  payload type: {}", payload_type)?;
        writeln!(f, "  raw payload: {}", hex::encode(&self.raw_payload))?;
        write!(f, "  signature: {}", hex::encode(&self.signature))
    }
}
