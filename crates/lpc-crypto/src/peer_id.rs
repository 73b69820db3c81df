//! Peer ids are libp2p multihashes of the marshaled public key.
//!
//! Ed25519 keys marshal to 36 bytes, under the 42-byte inline limit, so
//! their ids use the identity multihash and carry the key itself.

pub use libp2p_identity::PeerId;

use crate::identity::PublicKey;

const IDENTITY_CODE: u8 = 0x00;

/// Key-related queries on a [`PeerId`].
pub trait PeerIdExt {
    /// The public key embedded in an identity-multihash id.
    fn inline_public_key(&self) -> Option<PublicKey>;

    /// Whether `key` is the key this id was derived from.
    fn is_derived_from(&self, key: &PublicKey) -> bool;
}

impl PeerIdExt for PeerId {
    fn inline_public_key(&self) -> Option<PublicKey> {
        let bytes = self.to_bytes();
        match bytes.as_slice() {
            [IDENTITY_CODE, len, key @ ..] if usize::from(*len) == key.len() => {
                PublicKey::unmarshal(key).ok()
            }
            _ => None,
        }
    }

    fn is_derived_from(&self, key: &PublicKey) -> bool {
        *self == key.to_peer_id()
    }
}
