//! Index entry representation
//!
//! Each entry in the index is the planned content for one path of the next
//! tree: the path, the blob id, the mode and when it was staged.
//!
//! ## Entry Format
//!
//! ```text
//! staged-at seconds      i64
//! staged-at nanoseconds  u32
//! mode                   u32
//! blob id                20 bytes
//! flags                  u16 (path length, capped at 0xFFF)
//! path                   UTF-8, NUL padded to an 8-byte boundary
//! ```

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::DecodeError;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::{Error, Result};
use byteorder::{ByteOrder, NetworkEndian, WriteBytesExt};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use derive_new::new;
use std::cmp::min;
use std::io::Write;
use std::path::{Component, Path};

/// Maximum path length recorded in the flags field
const MAX_PATH_SIZE: usize = 0xFFF;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Fixed-width prefix of an entry before the path
const ENTRY_FIXED_SIZE: usize = 8 + 4 + 4 + 20 + 2;

/// Smallest possible entry: fixed part, one path byte, one NUL, aligned
pub const ENTRY_MIN_SIZE: usize = 40;

/// Name of the metadata directory, never stageable
pub const METADATA_DIR: &str = ".grove";

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Repository-relative, `/`-separated path
    pub name: String,
    /// Id of the staged blob
    pub oid: ObjectId,
    pub mode: EntryMode,
    pub staged_at: DateTime<Utc>,
}

impl IndexEntry {
    pub fn basename(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Every directory prefix of the entry's path, outermost first.
    pub fn parent_dirs(&self) -> Vec<&str> {
        self.name
            .match_indices('/')
            .map(|(idx, _)| &self.name[..idx])
            .collect()
    }

    pub fn serialize(&self) -> std::io::Result<Bytes> {
        let mut entry_bytes = Vec::with_capacity(ENTRY_MIN_SIZE + self.name.len());
        entry_bytes.write_i64::<NetworkEndian>(self.staged_at.timestamp())?;
        entry_bytes.write_u32::<NetworkEndian>(self.staged_at.timestamp_subsec_nanos())?;
        entry_bytes.write_u32::<NetworkEndian>(self.mode.as_u32())?;
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<NetworkEndian>(min(self.name.len(), MAX_PATH_SIZE) as u16)?;
        entry_bytes.write_all(self.name.as_bytes())?;

        // There must be at least one NUL after the path
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }

    pub fn deserialize(bytes: &[u8]) -> std::result::Result<Self, DecodeError> {
        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(DecodeError::new("index entry is too short"));
        }

        let seconds = NetworkEndian::read_i64(&bytes[0..8]);
        let nanos = NetworkEndian::read_u32(&bytes[8..12]);
        let mode = EntryMode::try_from(NetworkEndian::read_u32(&bytes[12..16]))?;
        let oid = ObjectId::read_h40_from(&mut &bytes[16..36])
            .map_err(|_| DecodeError::new("truncated object id in index entry"))?;

        let path_bytes = &bytes[ENTRY_FIXED_SIZE..];
        let path_end = path_bytes
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| DecodeError::new("missing NUL terminator in entry path"))?;
        let name = std::str::from_utf8(&path_bytes[..path_end])
            .map_err(|_| DecodeError::new("entry path is not UTF-8"))?
            .to_string();

        let staged_at = DateTime::from_timestamp(seconds, nanos)
            .ok_or_else(|| DecodeError::new("staged-at timestamp out of range"))?;

        Ok(IndexEntry {
            name,
            oid,
            mode,
            staged_at,
        })
    }
}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Validate a repository-relative path and render it `/`-separated.
///
/// Rejects empty paths, absolute paths, `.`/`..` components, non UTF-8
/// names and anything under the metadata directory.
pub fn normalize_path(path: &Path) -> Result<String> {
    let display = path.to_string_lossy().to_string();
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Normal(name) => {
                let name = name
                    .to_str()
                    .ok_or_else(|| Error::invalid_path(&display, "path is not valid UTF-8"))?;
                components.push(name);
            }
            Component::CurDir => {
                return Err(Error::invalid_path(&display, "'.' components are not allowed"));
            }
            Component::ParentDir => {
                return Err(Error::invalid_path(&display, "path escapes the repository"));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::invalid_path(&display, "path must be relative"));
            }
        }
    }

    if components.is_empty() {
        return Err(Error::invalid_path(&display, "path is empty"));
    }
    if components[0] == METADATA_DIR {
        return Err(Error::invalid_path(
            &display,
            "the metadata directory cannot be staged",
        ));
    }
    if components.iter().any(|name| name.contains('\0') || name.contains('\\')) {
        return Err(Error::invalid_path(&display, "path contains a reserved character"));
    }

    Ok(components.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use crate::artifacts::objects::framing;
    use crate::artifacts::objects::object_type::ObjectType;
    use crate::error::ErrorKind;
    use rstest::{fixture, rstest};

    #[fixture]
    fn oid() -> ObjectId {
        framing::hash_object(ObjectType::Blob, b"test data")
    }

    #[fixture]
    fn staged_at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap()
    }

    #[rstest]
    fn test_entry_parent_dirs(oid: ObjectId, staged_at: DateTime<Utc>) {
        let entry = IndexEntry::new("a/b/c".into(), oid, EntryMode::default(), staged_at);

        pretty_assertions::assert_eq!(entry.parent_dirs(), vec!["a", "a/b"]);
        pretty_assertions::assert_eq!(entry.basename(), "c");
    }

    #[rstest]
    fn test_entry_parent_dirs_root(oid: ObjectId, staged_at: DateTime<Utc>) {
        let entry = IndexEntry::new("a".into(), oid, EntryMode::default(), staged_at);

        pretty_assertions::assert_eq!(entry.parent_dirs(), Vec::<&str>::new());
    }

    #[rstest]
    #[case("a")]
    #[case("ab")]
    #[case("exactly-eight")]
    #[case("dir/nested/file.txt")]
    fn entries_are_padded_to_the_block_size(
        oid: ObjectId,
        staged_at: DateTime<Utc>,
        #[case] name: &str,
    ) {
        let entry = IndexEntry::new(
            name.into(),
            oid,
            FileMode::Executable.into(),
            staged_at,
        );
        let bytes = entry.serialize().unwrap();

        assert_eq!(bytes.len() % ENTRY_BLOCK, 0);
        assert!(bytes.len() >= ENTRY_MIN_SIZE);
        assert_eq!(bytes[bytes.len() - 1], 0);
        pretty_assertions::assert_eq!(IndexEntry::deserialize(&bytes).unwrap(), entry);
    }

    #[rstest]
    #[case("a.txt", "a.txt")]
    #[case("dir/b.txt", "dir/b.txt")]
    #[case("dir//b.txt", "dir/b.txt")]
    fn normalizes_relative_paths(#[case] input: &str, #[case] expected: &str) {
        pretty_assertions::assert_eq!(normalize_path(Path::new(input)).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("/etc/passwd")]
    #[case("../outside")]
    #[case("dir/../../outside")]
    #[case("./a.txt")]
    #[case(".grove/HEAD")]
    fn rejects_paths_outside_the_worktree(#[case] input: &str) {
        let err = normalize_path(Path::new(input)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
    }
}
