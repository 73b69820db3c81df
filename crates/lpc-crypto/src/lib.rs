#![forbid(unsafe_code)]

pub mod payload;
pub mod identity;
pub mod peer_id;

pub use identity::{IdentityError, Keypair, PeerIdentity, PublicKey};
pub use peer_id::{PeerId, PeerIdExt};

#[cfg(test)]
mod proptests;
