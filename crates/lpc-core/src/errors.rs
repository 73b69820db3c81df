//! Error types for LPC Core.
//!
//! Every error here is terminal at this layer: it is returned to the
//! immediate caller and nothing is retried or downgraded internally.

use lpc_crypto::IdentityError;
use thiserror::Error;

/// Errors from building, sealing, or opening records and envelopes.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Signing attempted with an identity lacking a private key
    #[error("the identity provided doesn't contain a private key")]
    NoPrivateKey,

    /// No public key could be resolved for verification
    #[error("the identity provided doesn't contain a public key")]
    NoPublicKey,

    #[error("envelope domain must not be empty")]
    EmptyDomain,

    #[error("payload type must not be empty")]
    EmptyPayloadType,

    /// Signature verification failed
    #[error("invalid signature or incorrect domain")]
    InvalidSignature,

    /// The envelope declares a payload type with no known decoder
    #[error("unsupported payload type: {}", hex::encode(.0))]
    UnsupportedPayloadType(Vec<u8>),

    /// An expected public key does not match the record's peer id
    #[error("public key does not match the record's peer id")]
    PublicKeyMismatch,

    /// Every address in a record failed to decode
    #[error("all {count} addresses in the record failed to decode")]
    AddressDecodeFailure { count: usize },

    #[error("invalid peer id: {0}")]
    InvalidPeerId(#[source] IdentityError),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(#[source] IdentityError),

    #[error("malformed wire message: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("envelope of {size} bytes exceeds the {max} byte limit")]
    EnvelopeTooLarge { size: usize, max: usize },

    /// The record could not be added to a peer aggregate
    #[error(transparent)]
    Peer(#[from] PeerError),
}

impl From<IdentityError> for RecordError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NoPrivateKey => RecordError::NoPrivateKey,
            IdentityError::InvalidPeerId(_) => RecordError::InvalidPeerId(err),
            other => RecordError::InvalidPublicKey(other),
        }
    }
}

/// Errors from updating a peer aggregate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeerError {
    #[error("record belongs to peer {found}, not {expected}")]
    ForeignRecord { expected: String, found: String },

    #[error("metadata entry '{key}' could not be encoded: {reason}")]
    Metadata { key: String, reason: String },
}
