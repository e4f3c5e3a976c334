//! Staging index
//!
//! Tracks which blob each path will have in the next commit. The index is
//! written through on every change: callers take the lock, rehydrate, apply
//! their change and write the whole file back before releasing the lock.
//!
//! ## Index File Format
//!
//! The index file contains:
//! - Header: signature, version and entry count
//! - Entries: sorted by path
//! - Checksum: SHA-1 of everything before it
//!
//! ## Data Structures
//!
//! - `entries`: maps paths to their index entries
//! - `children`: maps directory prefixes to the staged paths below them, so
//!   staging a file over a directory (or the reverse) can drop the losers

use crate::artifacts::core::lockfile::Lockfile;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::HEADER_SIZE;
use crate::error::{Error, IoResultExt, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (`.grove/index`)
    path: Box<Path>,
    entries: BTreeMap<String, IndexEntry>,
    children: BTreeMap<String, BTreeSet<String>>,
    /// Set when the in-memory entries differ from what was loaded
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Take the index lock; hold it across rehydrate, change and write.
    pub fn lock(&self) -> Result<Lockfile> {
        Lockfile::acquire(&self.path)
    }

    /// Reload the index from disk, verifying its checksum.
    ///
    /// A missing or empty file is an empty index.
    pub fn rehydrate(&mut self) -> Result<()> {
        self.entries.clear();
        self.children.clear();
        self.changed = false;

        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e).at_path(&self.path),
        };
        if content.is_empty() {
            return Ok(());
        }

        let mut reader = Checksum::new(Cursor::new(content));
        let entries_count = Self::parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;

        if !reader.verify().map_err(truncated)? {
            return Err(Error::CorruptIndex(
                "checksum does not match value stored on disk".to_string(),
            ));
        }

        Ok(())
    }

    fn parse_header(reader: &mut Checksum<Cursor<Vec<u8>>>) -> Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE).map_err(truncated)?;
        let header = IndexHeader::deserialize(&header_bytes)
            .map_err(|e| Error::CorruptIndex(e.to_string()))?;

        Ok(header.entries_count)
    }

    /// Each entry is at least `ENTRY_MIN_SIZE` bytes and ends on the block
    /// whose last byte is NUL.
    fn parse_entries(
        &mut self,
        entries_count: u32,
        reader: &mut Checksum<Cursor<Vec<u8>>>,
    ) -> Result<()> {
        for _ in 0..entries_count {
            let mut entry_bytes = reader.read(ENTRY_MIN_SIZE).map_err(truncated)?.to_vec();

            while entry_bytes.last() != Some(&0) {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK).map_err(truncated)?);
            }

            let entry = IndexEntry::deserialize(&entry_bytes)
                .map_err(|e| Error::CorruptIndex(e.to_string()))?;
            if self.entries.contains_key(&entry.name) {
                return Err(Error::CorruptIndex(format!(
                    "path '{}' is recorded twice",
                    entry.name
                )));
            }

            self.store_entry(entry);
        }

        Ok(())
    }

    /// Drop staged files that sit where the new entry's parent directories
    /// go, and everything staged below the new entry's path.
    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.name);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_string())
                .or_default()
                .insert(entry.name.clone());
        }

        self.entries.insert(entry.name.clone(), entry);
    }

    fn remove_children(&mut self, path: &str) {
        if let Some(children) = self.children.remove(path) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, path: &str) -> bool {
        let Some(entry) = self.entries.remove(path) else {
            return false;
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(path);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }

        true
    }

    /// Stage an entry, replacing any previous entry for its path.
    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(entry);
        self.changed = true;
    }

    /// Unstage a path, or everything below it if it names a directory.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, path: &str) -> bool {
        let had_children = self.children.contains_key(path);
        let removed = self.remove_entry(path);
        self.remove_children(path);

        let changed = removed || had_children;
        self.changed |= changed;
        changed
    }

    pub fn clear(&mut self) {
        self.changed |= !self.entries.is_empty();
        self.entries.clear();
        self.children.clear();
    }

    /// Serialize the index into the held lock and commit it.
    pub fn write_updates(&mut self, mut lock: Lockfile) -> Result<()> {
        let mut writer = Checksum::new(Vec::new());
        let encode = |e: std::io::Error| Error::CorruptIndex(e.to_string());

        let header = IndexHeader::for_entries(self.entries.len() as u32);
        writer.write(&header.serialize().map_err(encode)?).map_err(encode)?;

        for entry in self.entries.values() {
            writer.write(&entry.serialize().map_err(encode)?).map_err(encode)?;
        }
        writer.write_checksum().map_err(encode)?;

        lock.write_all(&writer.into_inner())?;
        lock.commit()?;
        self.changed = false;

        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn into_entries(self) -> impl Iterator<Item = IndexEntry> {
        self.entries.into_values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn truncated(_: std::io::Error) -> Error {
    Error::CorruptIndex("unexpected end-of-file while reading index".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
    use crate::artifacts::objects::framing;
    use crate::artifacts::objects::object_type::ObjectType;
    use crate::error::ErrorKind;
    use assert_fs::TempDir;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct Staging {
        dir: TempDir,
        index: Index,
    }

    #[fixture]
    fn staging() -> Staging {
        let dir = TempDir::new().unwrap();
        let index = Index::new(dir.path().join("index").into_boxed_path());
        Staging { dir, index }
    }

    fn entry(name: &str, content: &str) -> IndexEntry {
        IndexEntry::new(
            name.to_string(),
            framing::hash_object(ObjectType::Blob, content.as_bytes()),
            EntryMode::default(),
            DateTime::<Utc>::from_timestamp(1_700_000_000, 42).unwrap(),
        )
    }

    fn names(index: &Index) -> Vec<&str> {
        index.entries().map(|e| e.name.as_str()).collect()
    }

    fn save(index: &mut Index) {
        let lock = index.lock().unwrap();
        index.write_updates(lock).unwrap();
    }

    #[rstest]
    fn add_a_single_file(mut staging: Staging) {
        staging.index.add(entry("alice.txt", "a"));

        assert_eq!(names(&staging.index), vec!["alice.txt"]);
        assert!(staging.index.is_changed());
    }

    #[rstest]
    fn replace_a_file_with_a_directory(mut staging: Staging) {
        staging.index.add(entry("alice.txt", "a"));
        staging.index.add(entry("bob.txt", "b"));

        staging.index.add(entry("alice.txt/nested.txt", "c"));

        assert_eq!(names(&staging.index), vec!["alice.txt/nested.txt", "bob.txt"]);
    }

    #[rstest]
    fn replace_a_directory_with_a_file(mut staging: Staging) {
        staging.index.add(entry("alice.txt", "a"));
        staging.index.add(entry("nested/bob.txt", "b"));
        staging.index.add(entry("nested/inner/claire.txt", "c"));

        staging.index.add(entry("nested", "d"));

        assert_eq!(names(&staging.index), vec!["alice.txt", "nested"]);
    }

    #[rstest]
    fn restaging_a_path_replaces_its_blob(mut staging: Staging) {
        staging.index.add(entry("a.txt", "old"));
        staging.index.add(entry("a.txt", "new"));

        assert_eq!(staging.index.len(), 1);
        assert_eq!(
            staging.index.entry_by_path("a.txt").unwrap().oid,
            framing::hash_object(ObjectType::Blob, b"new")
        );
    }

    #[rstest]
    fn removing_an_absent_path_is_a_no_op(mut staging: Staging) {
        staging.index.add(entry("a.txt", "a"));
        save(&mut staging.index);

        assert!(!staging.index.remove("missing.txt"));
        assert!(!staging.index.is_changed());
        assert_eq!(staging.index.len(), 1);
    }

    #[rstest]
    fn removing_a_directory_unstages_its_contents(mut staging: Staging) {
        staging.index.add(entry("dir/a.txt", "a"));
        staging.index.add(entry("dir/sub/b.txt", "b"));
        staging.index.add(entry("other.txt", "c"));

        assert!(staging.index.remove("dir"));
        assert_eq!(names(&staging.index), vec!["other.txt"]);
    }

    #[rstest]
    fn survives_a_reload(mut staging: Staging) {
        staging.index.add(entry("a.txt", "a"));
        staging.index.add(IndexEntry {
            mode: FileMode::Executable.into(),
            ..entry("bin/run.sh", "#!/bin/sh")
        });
        save(&mut staging.index);

        let mut reloaded = Index::new(staging.index.path().into());
        reloaded.rehydrate().unwrap();

        assert_eq!(
            reloaded.entries().collect::<Vec<_>>(),
            staging.index.entries().collect::<Vec<_>>()
        );
        assert!(!staging.dir.path().join("index.lock").exists());
    }

    #[rstest]
    fn missing_file_is_an_empty_index(mut staging: Staging) {
        staging.index.rehydrate().unwrap();
        assert!(staging.index.is_empty());
    }

    #[rstest]
    fn detects_a_corrupted_file(mut staging: Staging) {
        staging.index.add(entry("a.txt", "a"));
        save(&mut staging.index);

        let mut bytes = std::fs::read(staging.index.path()).unwrap();
        bytes[HEADER_SIZE + 2] ^= 0xff;
        std::fs::write(staging.index.path(), bytes).unwrap();

        let err = staging.index.rehydrate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptObject);
    }

    #[rstest]
    fn detects_a_truncated_file(mut staging: Staging) {
        staging.index.add(entry("a.txt", "a"));
        save(&mut staging.index);

        let bytes = std::fs::read(staging.index.path()).unwrap();
        std::fs::write(staging.index.path(), &bytes[..bytes.len() - 30]).unwrap();

        assert!(matches!(
            staging.index.rehydrate().unwrap_err(),
            Error::CorruptIndex(_)
        ));
    }
}
