
#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use prost::Message;
    use crate::v1::{AddressInfo, EnvelopeMessage, KeyType, PeerRecordMessage, PublicKeyMessage};

    prop_compose! {
        fn any_peer_record()(
            peer_id in proptest::collection::vec(any::<u8>(), 0..48),
            seq in any::<u64>(),
            addrs in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..24), 0..5)
        ) -> PeerRecordMessage {
            PeerRecordMessage {
                peer_id,
                seq,
                addresses: addrs.into_iter().map(AddressInfo::from).collect(),
            }
        }
    }

    prop_compose! {
        fn any_envelope()(
            key in proptest::collection::vec(any::<u8>(), 32),
            payload_type in proptest::collection::vec(any::<u8>(), 0..4),
            record in any_peer_record(),
            signature in proptest::collection::vec(any::<u8>(), 0..80)
        ) -> EnvelopeMessage {
            EnvelopeMessage {
                public_key: Some(PublicKeyMessage::new(KeyType::Ed25519, key)),
                payload_type,
                payload: record.encode_to_vec(),
                signature,
            }
        }
    }

    proptest! {
        // Nested payload survives envelope framing byte for byte
        #[test]
        fn prop_envelope_preserves_payload(env in any_envelope()) {
            let bytes = env.encode_to_vec();
            let decoded = EnvelopeMessage::decode(bytes.as_slice()).unwrap();
            prop_assert_eq!(&decoded.payload, &env.payload);
            let inner = PeerRecordMessage::decode(decoded.payload.as_slice()).unwrap();
            prop_assert_eq!(inner.addresses.len(), PeerRecordMessage::decode(env.payload.as_slice()).unwrap().addresses.len());
        }

        // Decoding arbitrary bytes fails cleanly instead of panicking
        #[test]
        fn prop_decode_garbage_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = EnvelopeMessage::decode(data.as_slice());
            let _ = PeerRecordMessage::decode(data.as_slice());
        }

        // Address entries keep their bytes and order through a record round trip
        #[test]
        fn prop_record_addresses_round_trip(record in any_peer_record()) {
            let decoded = PeerRecordMessage::decode(record.encode_to_vec().as_slice()).unwrap();
            let before: Vec<&[u8]> = record.address_bytes().collect();
            let after: Vec<&[u8]> = decoded.address_bytes().collect();
            prop_assert_eq!(before, after);
            prop_assert_eq!(decoded.seq, record.seq);
        }
    }
}
