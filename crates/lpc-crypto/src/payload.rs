//! Domain-separated signing pre-images.
//!
//! A pre-image is a sequence of `uvarint(len) || bytes` fields. The first
//! field is normally the domain string so a signature made for one record
//! type can never be replayed as another.

use bytes::{BufMut, BytesMut};
use prost::encoding::encode_varint;

/// Builder for uvarint length-prefixed byte sequences.
#[derive(Clone, Debug, Default)]
pub struct SignedPayload {
    buf: BytesMut,
}

impl SignedPayload {
    /// Start a pre-image with the given domain separator as its first field.
    pub fn new(domain: &str) -> Self {
        let mut p = Self::empty();
        p.append(domain.as_bytes());
        p
    }

    /// Start a pre-image with no domain field.
    pub fn empty() -> Self {
        Self { buf: BytesMut::with_capacity(256) }
    }

    /// Append `uvarint(data.len()) || data`.
    pub fn append(&mut self, data: &[u8]) -> &mut Self {
        encode_varint(data.len() as u64, &mut self.buf);
        self.buf.put_slice(data);
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// `uvarint(data.len()) || data` as a standalone buffer.
pub fn length_prefixed(data: &[u8]) -> Vec<u8> {
    let mut p = SignedPayload::empty();
    p.append(data);
    p.into_vec()
}

/// The envelope signing pre-image:
/// `uvarint-len(domain) || domain || uvarint-len(type) || type || uvarint-len(payload) || payload`.
pub fn unsigned_payload(domain: &str, payload_type: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut p = SignedPayload::new(domain);
    p.append(payload_type).append(payload);
    p.into_vec()
}
