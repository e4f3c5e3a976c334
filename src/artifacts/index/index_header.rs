use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::DecodeError;
use byteorder::{ByteOrder, NetworkEndian, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub marker: String,
    pub version: u32,
    pub entries_count: u32,
}

impl IndexHeader {
    pub fn for_entries(entries_count: u32) -> Self {
        IndexHeader {
            marker: String::from(SIGNATURE),
            version: VERSION,
            entries_count,
        }
    }

    pub fn serialize(&self) -> std::io::Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.write_all(self.marker.as_bytes())?;
        bytes.write_u32::<NetworkEndian>(self.version)?;
        bytes.write_u32::<NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }

    /// Parse and validate signature and version.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < HEADER_SIZE {
            return Err(DecodeError::new("index header is too short"));
        }

        let marker = String::from_utf8(bytes[0..4].to_vec())
            .map_err(|_| DecodeError::new("invalid marker in index header"))?;
        if marker != SIGNATURE {
            return Err(DecodeError::new(format!("unknown index signature '{marker}'")));
        }

        let version = NetworkEndian::read_u32(&bytes[4..8]);
        if version != VERSION {
            return Err(DecodeError::new(format!("unsupported index version {version}")));
        }

        let entries_count = NetworkEndian::read_u32(&bytes[8..12]);

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_layout() {
        let bytes = IndexHeader::for_entries(3).serialize().unwrap();

        assert_eq!(&bytes[..], b"GIDX\0\0\0\x01\0\0\0\x03");
        assert_eq!(IndexHeader::deserialize(&bytes).unwrap().entries_count, 3);
    }

    #[test]
    fn rejects_foreign_files() {
        assert!(IndexHeader::deserialize(b"DIRC\0\0\0\x02\0\0\0\0").is_err());
        assert!(IndexHeader::deserialize(b"GIDX\0\0\0\x09\0\0\0\0").is_err());
        assert!(IndexHeader::deserialize(b"GIDX").is_err());
    }
}
