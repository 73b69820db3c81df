
#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use prost::Message;

    use lpc_crypto::{Keypair, PeerIdentity};
    use lpc_proto::v1::EnvelopeMessage;
    use multiaddr::Multiaddr;

    use crate::envelope::SealedEnvelope;
    use crate::errors::RecordError;
    use crate::protocol::{ProtocolVersion, SemVerProtocol, VersionConstraint};
    use crate::record::{PeerRecord, Record};

    prop_compose! {
        fn any_version()(major in 0u64..4, minor in 0u64..4, patch in 0u64..4) -> ProtocolVersion {
            ProtocolVersion::new(major, minor, patch)
        }
    }

    fn any_constraint() -> impl Strategy<Value = VersionConstraint> {
        prop_oneof![
            any_version().prop_map(VersionConstraint::Exact),
            any_version().prop_map(VersionConstraint::From),
            any_version().prop_map(VersionConstraint::UpToNextMinor),
            any_version().prop_map(VersionConstraint::UpToNextMajor),
        ]
    }

    prop_compose! {
        fn any_protocol()(
            name in prop_oneof![Just("/echo"), Just("/ipfs/ping"), Just("/meshsub")],
            version in proptest::option::of(any_constraint())
        ) -> SemVerProtocol {
            SemVerProtocol::new(name, version)
        }
    }

    prop_compose! {
        fn any_addresses()(
            ports in proptest::collection::vec((any::<[u8; 4]>(), any::<u16>()), 0..5)
        ) -> Vec<Multiaddr> {
            ports
                .into_iter()
                .map(|(ip, port)| {
                    format!("/ip4/{}.{}.{}.{}/tcp/{}", ip[0], ip[1], ip[2], ip[3], port)
                        .parse()
                        .unwrap()
                })
                .collect()
        }
    }

    proptest! {
        // Compatibility is symmetric because either side's constraint may accept
        #[test]
        fn prop_matching_is_symmetric(a in any_protocol(), b in any_protocol()) {
            prop_assert_eq!(a.matches(&b), b.matches(&a));
        }

        // Every versioned protocol matches itself
        #[test]
        fn prop_matching_is_reflexive(a in any_protocol()) {
            prop_assert!(a.matches(&a));
        }

        // Rendered exact protocols parse back unchanged
        #[test]
        fn prop_exact_display_parses_back(name in "[a-z]{1,8}(/[a-z]{1,8}){0,2}", v in any_version()) {
            let proto = SemVerProtocol::exact(name, v);
            let parsed: SemVerProtocol = proto.to_string().parse().unwrap();
            prop_assert_eq!(parsed, proto);
        }

        // Records survive marshal and decode with order and sequence intact
        #[test]
        fn prop_record_round_trip(seed in any::<[u8; 32]>(), addrs in any_addresses(), seq in any::<u64>()) {
            let id = Keypair::from_seed(&seed).unwrap().public().to_peer_id();
            let record = PeerRecord::new(id, addrs, seq);
            let decoded = PeerRecord::from_bytes(&record.marshal()).unwrap();
            prop_assert!(record.equals(&decoded));
        }

        // Flipping any bit of the signature or payload field breaks verification
        #[test]
        fn prop_tamper_detected(
            seed in any::<[u8; 32]>(),
            addrs in any_addresses(),
            seq in any::<u64>(),
            in_signature in any::<bool>(),
            position in any::<prop::sample::Index>(),
            bit in 0u8..8
        ) {
            let identity = PeerIdentity::from_keypair(Keypair::from_seed(&seed).unwrap());
            let record = PeerRecord::new(identity.peer_id().clone(), addrs, seq);
            let bytes = record.seal(&identity).unwrap().marshal();

            let mut msg = EnvelopeMessage::decode(bytes.as_slice()).unwrap();
            let field = if in_signature { &mut msg.signature } else { &mut msg.payload };
            let i = position.index(field.len());
            field[i] ^= 1 << bit;

            let err = SealedEnvelope::open(&msg.encode_to_vec(), None).unwrap_err();
            prop_assert!(matches!(err, RecordError::InvalidSignature), "unexpected error: {:?}", err);
        }
    }
}
