//! LPC Core - signed peer records and protocol matching.
//!
//! This crate implements:
//! - Protocol version parsing and compatibility matching
//! - The `Record` contract and the concrete `PeerRecord`
//! - Sealed envelopes: signing and verified reconstruction
//! - Per-peer metadata (latency running averages, prunability)
//! - The per-peer aggregate with independently locked fields
//!
//! Everything here is synchronous and CPU-bound; records and envelopes are
//! immutable once built and can be shared across threads freely.

#![forbid(unsafe_code)]

// Protocol negotiation
pub mod protocol;

// Records
pub mod record;
pub mod envelope;

// Peer state
pub mod metadata;
pub mod peer;

// Supporting modules
pub mod config;
pub mod errors;

#[cfg(test)]
mod proptests;

pub use config::CoreConfig;
pub use envelope::{DecodedRecord, PayloadKind, SealedEnvelope};
pub use errors::{PeerError, RecordError};
pub use peer::{ComprehensivePeer, PeerInfo};
pub use protocol::{ProtocolParseError, ProtocolVersion, SemVerProtocol, VersionConstraint};
pub use record::{PeerRecord, Record};

pub use lpc_crypto::{Keypair, PeerId, PeerIdExt, PeerIdentity, PublicKey};
pub use multiaddr::Multiaddr;
