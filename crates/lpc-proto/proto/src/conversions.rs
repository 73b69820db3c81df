//! Conversion traits between wire messages and plain byte containers.

use crate::v1::*;

// ============================================================================
// Address conversions
// ============================================================================

impl From<Vec<u8>> for AddressInfo {
    fn from(multiaddr: Vec<u8>) -> Self {
        Self { multiaddr }
    }
}


// ============================================================================
// Key conversions
// ============================================================================

impl PublicKeyMessage {
    /// Build a key message for the given algorithm and raw key bytes.
    pub fn new(key_type: KeyType, data: impl Into<Vec<u8>>) -> Self {
        Self {
            key_type: key_type as i32,
            data: data.into(),
        }
    }

    /// The declared key algorithm, if it is one this schema knows.
    pub fn declared_key_type(&self) -> Option<KeyType> {
        KeyType::try_from(self.key_type).ok()
    }
}

// ============================================================================
// Peer record helpers
// ============================================================================

impl PeerRecordMessage {
    /// Raw address payloads in wire order.
    pub fn address_bytes(&self) -> impl Iterator<Item = &[u8]> {
        self.addresses.iter().map(|a| a.multiaddr.as_slice())
    }
}
