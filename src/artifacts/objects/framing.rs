//! Object framing and hashing
//!
//! Every object is stored and hashed in exactly one encoding:
//!
//! ```text
//! <kind> <decimal-payload-length>\0<payload>
//! ```
//!
//! The header is short ASCII, followed by a single NUL and the raw payload.
//! The object id is the SHA-1 of the whole frame.

use crate::artifacts::objects::object::DecodeError;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::{BufMut, Bytes, BytesMut};
use sha1::{Digest, Sha1};
use std::io::{BufRead, Read};

/// Longest header we accept: "commit " plus a 20-digit length.
const MAX_HEADER_SIZE: usize = 32;

/// Parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub kind: ObjectType,
    pub payload_len: usize,
}

pub fn frame(kind: ObjectType, payload: &[u8]) -> Bytes {
    let header = format!("{} {}\0", kind.as_str(), payload.len());

    let mut framed = BytesMut::with_capacity(header.len() + payload.len());
    framed.put_slice(header.as_bytes());
    framed.put_slice(payload);
    framed.freeze()
}

pub fn hash(framed: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(framed);
    ObjectId::from_digest(&hasher.finalize())
}

/// Id an object would be stored under, without storing it.
pub fn hash_object(kind: ObjectType, payload: &[u8]) -> ObjectId {
    hash(&frame(kind, payload))
}

/// Split a stored frame into its kind and payload, validating the header
/// and the declared length.
pub fn unframe(framed: Bytes) -> Result<(ObjectType, Bytes), DecodeError> {
    let nul = framed
        .iter()
        .take(MAX_HEADER_SIZE)
        .position(|&b| b == 0)
        .ok_or_else(|| DecodeError::new("missing NUL after object header"))?;

    let header = parse_header(&framed[..nul])?;
    let payload = framed.slice(nul + 1..);

    if payload.len() != header.payload_len {
        return Err(DecodeError::new(format!(
            "declared length {} but payload has {} bytes",
            header.payload_len,
            payload.len()
        )));
    }

    Ok((header.kind, payload))
}

/// Read only the header of a frame from a stream.
pub fn read_header(reader: impl BufRead) -> Result<FrameHeader, DecodeError> {
    let mut header = Vec::with_capacity(MAX_HEADER_SIZE);
    reader
        .take(MAX_HEADER_SIZE as u64)
        .read_until(b'\0', &mut header)
        .map_err(|e| DecodeError::new(format!("unable to read object header: {e}")))?;

    match header.pop() {
        Some(0) => parse_header(&header),
        _ => Err(DecodeError::new("missing NUL after object header")),
    }
}

fn parse_header(header: &[u8]) -> Result<FrameHeader, DecodeError> {
    let header = std::str::from_utf8(header)
        .map_err(|_| DecodeError::new("object header is not ASCII"))?;
    let (kind, len) = header
        .split_once(' ')
        .ok_or_else(|| DecodeError::new(format!("malformed object header '{header}'")))?;

    let kind = ObjectType::try_from(kind).map_err(DecodeError::new)?;

    if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::new(format!("malformed object length '{len}'")));
    }
    let payload_len = len
        .parse::<usize>()
        .map_err(|_| DecodeError::new(format!("object length '{len}' out of range")))?;

    Ok(FrameHeader { kind, payload_len })
}
