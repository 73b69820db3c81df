
#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use crate::identity::{Keypair, PeerIdentity};
    use crate::payload::{length_prefixed, unsigned_payload};
    use crate::peer_id::{PeerId, PeerIdExt};

    proptest! {
        // Signature round-trip for arbitrary seeds and messages
        #[test]
        fn test_identity_signature_round_trip(
            seed in any::<[u8; 32]>(),
            message in any::<Vec<u8>>()
        ) {
            let identity = PeerIdentity::from_keypair(Keypair::from_seed(&seed).unwrap());
            let sig = identity.sign(&message).unwrap();
            prop_assert!(identity.public_key().unwrap().verify(&message, &sig));
        }

        // Any single bit flip in the signature invalidates it
        #[test]
        fn test_signature_bit_flip(
            seed in any::<[u8; 32]>(),
            message in any::<Vec<u8>>(),
            bit in 0usize..512
        ) {
            let kp = Keypair::from_seed(&seed).unwrap();
            let mut sig = kp.sign(&message);
            sig[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(!kp.public().verify(&message, &sig));
        }

        // Peer ids parse back from their own bytes and keep the key
        #[test]
        fn test_peer_id_bytes_round_trip(seed in any::<[u8; 32]>()) {
            let key = Keypair::from_seed(&seed).unwrap().public();
            let id = PeerId::from_bytes(&key.to_peer_id().to_bytes()).unwrap();
            prop_assert!(id.is_derived_from(&key));
            prop_assert_eq!(id.inline_public_key(), Some(key));
        }

        // The pre-image is the concatenation of its length-prefixed fields
        #[test]
        fn test_preimage_concatenation(
            domain in "[a-z-]{1,40}",
            payload_type in proptest::collection::vec(any::<u8>(), 0..8),
            payload in proptest::collection::vec(any::<u8>(), 0..300)
        ) {
            let mut expected = length_prefixed(domain.as_bytes());
            expected.extend(length_prefixed(&payload_type));
            expected.extend(length_prefixed(&payload));
            prop_assert_eq!(unsigned_payload(&domain, &payload_type, &payload), expected);
        }
    }
}
