//! Wire messages for signed peer records.
//!
//! The message layout is byte-compatible with the libp2p schemas:
//!
//! ```text
//! message PublicKey {
//!   required KeyType Type = 1;
//!   required bytes Data = 2;
//! }
//!
//! message PeerRecord {
//!   message AddressInfo { bytes multiaddr = 1; }
//!   bytes peer_id = 1;
//!   uint64 seq = 2;
//!   repeated AddressInfo addresses = 3;
//! }
//!
//! message Envelope {
//!   PublicKey public_key = 1;
//!   bytes payload_type = 2;
//!   bytes payload = 3;
//!   bytes signature = 5;
//! }
//! ```

#![forbid(unsafe_code)]

pub mod v1 {
    /// Key algorithms understood by the `PublicKey` message.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum KeyType {
        Rsa = 0,
        Ed25519 = 1,
        Secp256k1 = 2,
        Ecdsa = 3,
    }

    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PublicKeyMessage {
        #[prost(enumeration = "KeyType", required, tag = "1")]
        pub key_type: i32,
        #[prost(bytes = "vec", required, tag = "2")]
        pub data: Vec<u8>,
    }

    /// One binary-packed multiaddr inside a peer record.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct AddressInfo {
        #[prost(bytes = "vec", tag = "1")]
        pub multiaddr: Vec<u8>,
    }

    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PeerRecordMessage {
        #[prost(bytes = "vec", tag = "1")]
        pub peer_id: Vec<u8>,
        #[prost(uint64, tag = "2")]
        pub seq: u64,
        #[prost(message, repeated, tag = "3")]
        pub addresses: Vec<AddressInfo>,
    }

    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EnvelopeMessage {
        #[prost(message, optional, tag = "1")]
        pub public_key: Option<PublicKeyMessage>,
        #[prost(bytes = "vec", tag = "2")]
        pub payload_type: Vec<u8>,
        #[prost(bytes = "vec", tag = "3")]
        pub payload: Vec<u8>,
        #[prost(bytes = "vec", tag = "5")]
        pub signature: Vec<u8>,
    }
}

pub mod conversions;

#[cfg(test)]
mod proptests;
