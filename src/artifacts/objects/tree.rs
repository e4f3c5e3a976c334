//! Tree object
//!
//! Trees represent directory snapshots. They contain entries for files
//! (blobs) and subdirectories (other trees), with their names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<octal-mode> <name>\0<20-byte-digest>`
//!
//! Entries are kept sorted so that the same directory contents always
//! encode, and therefore hash, identically. Directory names sort as if they
//! carried a trailing `/`, which keeps the encoding byte-compatible with git.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::{DecodeError, Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Cursor};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub name: String,
    pub mode: EntryMode,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn object_type(&self) -> ObjectType {
        self.mode.object_type()
    }

    fn sort_key(&self) -> String {
        match self.mode {
            EntryMode::Directory => format!("{}/", self.name),
            EntryMode::File(_) => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    /// Entries keyed by their sort key
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    /// Add an entry, refusing a second entry with the same name.
    pub fn insert(&mut self, entry: TreeEntry) -> Result<(), DecodeError> {
        if self.get(&entry.name).is_some() {
            return Err(DecodeError::new(format!(
                "duplicate tree entry '{}'",
                entry.name
            )));
        }
        self.entries.insert(entry.sort_key(), entry);

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .get(name)
            .or_else(|| self.entries.get(&format!("{name}/")))
    }

    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.values()
    }

    pub fn into_entries(self) -> impl Iterator<Item = TreeEntry> {
        self.entries.into_values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per entry, `<mode> <kind> <oid>\t<name>`.
    pub fn display(&self) -> String {
        self.entries()
            .map(|entry| {
                format!(
                    "{:0>6} {} {}\t{}",
                    entry.mode.as_str(),
                    entry.object_type(),
                    entry.oid,
                    entry.name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Bytes {
        let mut content = Vec::new();

        for entry in self.entries() {
            content.extend_from_slice(format!("{:o} {}", entry.mode.as_u32(), entry.name).as_bytes());
            content.push(0);
            content.extend_from_slice(&entry.oid.digest());
        }

        Bytes::from(content)
    }
}

impl Unpackable for Tree {
    fn deserialize(payload: Bytes) -> Result<Self, DecodeError> {
        let mut tree = Tree::default();
        let mut reader = Cursor::new(payload);

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader
                .read_until(b' ', &mut mode_bytes)
                .map_err(|e| DecodeError::new(e.to_string()))?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(DecodeError::new("unexpected end of tree in entry mode"));
            }

            let mode = std::str::from_utf8(&mode_bytes)
                .map_err(|_| DecodeError::new("tree entry mode is not ASCII"))?;
            let mode = EntryMode::from_octal_str(mode)?;

            name_bytes.clear();
            reader
                .read_until(b'\0', &mut name_bytes)
                .map_err(|e| DecodeError::new(e.to_string()))?;
            if name_bytes.pop() != Some(0) {
                return Err(DecodeError::new("unexpected end of tree in entry name"));
            }
            let name = std::str::from_utf8(&name_bytes)
                .map_err(|_| DecodeError::new("tree entry name is not UTF-8"))?
                .to_owned();
            if name.is_empty() || name == "." || name == ".." || name.contains('/') {
                return Err(DecodeError::new(format!("invalid tree entry name '{name}'")));
            }

            let oid = ObjectId::read_h40_from(&mut reader)
                .map_err(|_| DecodeError::new("unexpected end of tree in object id"))?;

            tree.insert(TreeEntry::new(name, mode, oid))?;
        }

        Ok(tree)
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}
