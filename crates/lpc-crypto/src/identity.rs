//! Identity module for peer keypairs and public keys.
//!
//! Wraps the libp2p Ed25519 identity types and adds [`PeerIdentity`], the
//! capability handed to record sealing: a peer id plus whatever key
//! material is known for it.

use libp2p_identity::ed25519;
use prost::Message;

use lpc_proto::v1::{KeyType, PublicKeyMessage};

use crate::peer_id::{PeerId, PeerIdExt};

/// Error type for identity operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(i32),
    #[error("malformed key: {0}")]
    KeyDecode(#[from] libp2p_identity::DecodingError),
    #[error("invalid peer id: {0}")]
    InvalidPeerId(#[from] libp2p_identity::ParseError),
    #[error("the identity doesn't contain a private key")]
    NoPrivateKey,
}

/// An Ed25519 keypair.
///
/// The secret half is zeroized by the underlying key type when dropped.
#[derive(Clone, Debug)]
pub struct Keypair(ed25519::Keypair);

impl Keypair {
    /// Build a keypair from a 32-byte Ed25519 private key seed.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, IdentityError> {
        let secret = ed25519::SecretKey::try_from_bytes(*seed)?;
        Ok(Self(ed25519::Keypair::from(secret)))
    }

    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.public())
    }

    /// Sign a message, returning the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.0.sign(message)
    }
}

/// An Ed25519 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(ed25519::PublicKey);

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bytes().hash(state);
    }
}

impl PublicKey {
    /// Parse raw 32-byte Ed25519 key material.
    pub fn from_ed25519_bytes(bytes: &[u8]) -> Result<Self, IdentityError> {
        if bytes.len() != 32 {
            return Err(IdentityError::InvalidKeyLength { expected: 32, got: bytes.len() });
        }
        let key = ed25519::PublicKey::try_from_bytes(bytes)?;
        Ok(Self(key))
    }

    pub fn to_ed25519_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// The key as the envelope's embedded key message.
    pub fn to_protobuf(&self) -> PublicKeyMessage {
        PublicKeyMessage::new(KeyType::Ed25519, self.to_ed25519_bytes().to_vec())
    }

    pub fn from_protobuf(msg: &PublicKeyMessage) -> Result<Self, IdentityError> {
        match msg.declared_key_type() {
            Some(KeyType::Ed25519) => Self::from_ed25519_bytes(&msg.data),
            _ => Err(IdentityError::UnsupportedKeyType(msg.key_type)),
        }
    }

    /// Encode as the libp2p `PublicKey` protobuf message.
    pub fn marshal(&self) -> Vec<u8> {
        self.as_libp2p().encode_protobuf()
    }

    /// Decode a libp2p `PublicKey` protobuf message.
    pub fn unmarshal(bytes: &[u8]) -> Result<Self, IdentityError> {
        let msg = PublicKeyMessage::decode(bytes).map_err(|_| IdentityError::InvalidPublicKey)?;
        if msg.declared_key_type() != Some(KeyType::Ed25519) {
            return Err(IdentityError::UnsupportedKeyType(msg.key_type));
        }
        let key = libp2p_identity::PublicKey::try_decode_protobuf(bytes)?;
        let key = key.try_into_ed25519().map_err(|_| IdentityError::InvalidPublicKey)?;
        Ok(Self(key))
    }

    /// Verify an Ed25519 signature over `message`.
    ///
    /// Malformed signatures are reported as a failed verification.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        self.0.verify(message, signature)
    }

    pub fn to_peer_id(&self) -> PeerId {
        self.as_libp2p().to_peer_id()
    }

    fn as_libp2p(&self) -> libp2p_identity::PublicKey {
        libp2p_identity::PublicKey::from(self.0.clone())
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey(ed25519:{})", hex::encode(self.to_ed25519_bytes()))
    }
}

/// A peer as known locally: its id, and optionally its public and private keys.
///
/// Remote peers usually carry only an id (and the public key recovered from
/// it); the local peer carries a full keypair and is the only kind that can
/// seal records.
#[derive(Clone, Debug)]
pub struct PeerIdentity {
    peer_id: PeerId,
    public_key: Option<PublicKey>,
    keypair: Option<Keypair>,
}

impl PeerIdentity {
    pub fn from_keypair(keypair: Keypair) -> Self {
        let public = keypair.public();
        Self {
            peer_id: public.to_peer_id(),
            public_key: Some(public),
            keypair: Some(keypair),
        }
    }

    pub fn from_public_key(public_key: PublicKey) -> Self {
        Self {
            peer_id: public_key.to_peer_id(),
            public_key: Some(public_key),
            keypair: None,
        }
    }

    /// Wrap a bare peer id, recovering the public key when it is inlined.
    pub fn from_peer_id(peer_id: PeerId) -> Self {
        let public_key = peer_id.inline_public_key();
        Self { peer_id, public_key, keypair: None }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    pub fn has_private_key(&self) -> bool {
        self.keypair.is_some()
    }

    /// Sign `message` with this identity's private key.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError> {
        let keypair = self.keypair.as_ref().ok_or(IdentityError::NoPrivateKey)?;
        Ok(keypair.sign(message))
    }
}
