//! Tree materialization
//!
//! Turns the flat list of staged entries into a hierarchy of tree objects.
//! Subtrees are written before the trees that point at them, so every
//! stored tree only ever references objects already in the store.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingEntry {
    File { mode: FileMode, oid: ObjectId },
    Directory(PendingTree),
}

/// A directory level that has not been written yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTree {
    children: BTreeMap<String, PendingEntry>,
}

impl PendingTree {
    /// Group staged entries by path component.
    ///
    /// A path used both as a file and as a directory prefix, or staged
    /// twice, is rejected with `InvalidPath`.
    pub fn build<'e>(entries: impl IntoIterator<Item = &'e IndexEntry>) -> Result<Self> {
        let mut root = PendingTree::default();

        for entry in entries {
            let mode = match entry.mode {
                EntryMode::File(mode) => mode,
                EntryMode::Directory => {
                    return Err(Error::invalid_path(
                        &entry.name,
                        "staged entries must be files",
                    ));
                }
            };

            let components = entry.name.split('/').collect::<Vec<_>>();
            if components.iter().any(|c| c.is_empty() || *c == "." || *c == "..") {
                return Err(Error::invalid_path(&entry.name, "malformed path component"));
            }

            root.insert(&entry.name, &components, mode, entry.oid.clone())?;
        }

        Ok(root)
    }

    fn insert(
        &mut self,
        path: &str,
        components: &[&str],
        mode: FileMode,
        oid: ObjectId,
    ) -> Result<()> {
        let Some((name, rest)) = components.split_first() else {
            return Err(Error::invalid_path(path, "path is empty"));
        };

        if rest.is_empty() {
            return match self.children.get(*name) {
                Some(PendingEntry::File { .. }) => {
                    Err(Error::invalid_path(path, "path is staged more than once"))
                }
                Some(PendingEntry::Directory(_)) => Err(Error::invalid_path(
                    path,
                    "path is staged as both a file and a directory",
                )),
                None => {
                    self.children
                        .insert(name.to_string(), PendingEntry::File { mode, oid });
                    Ok(())
                }
            };
        }

        let child = self
            .children
            .entry(name.to_string())
            .or_insert_with(|| PendingEntry::Directory(PendingTree::default()));

        match child {
            PendingEntry::Directory(subtree) => subtree.insert(path, rest, mode, oid),
            PendingEntry::File { .. } => Err(Error::invalid_path(
                path,
                "path is staged as both a file and a directory",
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Write this tree and all subtrees, children first, returning the id
    /// of the root tree.
    pub fn write<F>(&self, store: &mut F) -> Result<ObjectId>
    where
        F: FnMut(&Tree) -> Result<ObjectId>,
    {
        let mut tree = Tree::default();

        for (name, child) in &self.children {
            let entry = match child {
                PendingEntry::File { mode, oid } => {
                    TreeEntry::new(name.clone(), EntryMode::File(*mode), oid.clone())
                }
                PendingEntry::Directory(subtree) => {
                    let oid = subtree.write(store)?;
                    TreeEntry::new(name.clone(), EntryMode::Directory, oid)
                }
            };

            tree.insert(entry)
                .map_err(|e| Error::invalid_path(name, e.to_string()))?;
        }

        store(&tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::framing;
    use crate::artifacts::objects::object::Object;
    use crate::artifacts::objects::object_type::ObjectType;
    use crate::error::ErrorKind;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn staged_at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn entry(name: &str, content: &[u8], staged_at: DateTime<Utc>) -> IndexEntry {
        IndexEntry::new(
            name.to_string(),
            framing::hash_object(ObjectType::Blob, content),
            EntryMode::default(),
            staged_at,
        )
    }

    /// Collects every written tree so the tests can inspect them.
    fn write_all(pending: &PendingTree) -> (ObjectId, Vec<Tree>) {
        let mut written = Vec::new();
        let oid = pending
            .write(&mut |tree: &Tree| {
                written.push(tree.clone());
                Ok(tree.object_id())
            })
            .unwrap();
        (oid, written)
    }

    #[rstest]
    fn nested_directories_become_subtrees(staged_at: DateTime<Utc>) {
        let entries = vec![
            entry("a.txt", b"x", staged_at),
            entry("dir/b.txt", b"y", staged_at),
        ];

        let (root_oid, written) = write_all(&PendingTree::build(&entries).unwrap());

        // children are written before their parents
        assert_eq!(written.len(), 2);
        let root = written.last().unwrap();
        assert_eq!(root.object_id(), root_oid);
        assert_eq!(root.len(), 2);
        assert_eq!(root.get("a.txt").unwrap().object_type(), ObjectType::Blob);

        let dir = root.get("dir").unwrap();
        assert_eq!(dir.object_type(), ObjectType::Tree);
        assert_eq!(dir.oid, written[0].object_id());
    }

    #[rstest]
    fn staging_order_does_not_change_the_tree(staged_at: DateTime<Utc>) {
        let forward = vec![
            entry("a", b"X", staged_at),
            entry("b", b"Y", staged_at),
            entry("nested/deep/c", b"Z", staged_at),
        ];
        let backward = forward.iter().rev().cloned().collect::<Vec<_>>();

        let (forward_oid, _) = write_all(&PendingTree::build(&forward).unwrap());
        let (backward_oid, _) = write_all(&PendingTree::build(&backward).unwrap());

        assert_eq!(forward_oid, backward_oid);
    }

    #[rstest]
    #[case(&["a", "a/b"])]
    #[case(&["a/b", "a"])]
    #[case(&["a", "a"])]
    fn rejects_colliding_paths(staged_at: DateTime<Utc>, #[case] names: &[&str]) {
        let entries = names
            .iter()
            .map(|name| entry(name, b"x", staged_at))
            .collect::<Vec<_>>();

        let err = PendingTree::build(&entries).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
    }

    #[rstest]
    #[case("")]
    #[case("a//b")]
    #[case("a/../b")]
    fn rejects_malformed_paths(staged_at: DateTime<Utc>, #[case] name: &str) {
        let entries = vec![entry(name, b"x", staged_at)];

        let err = PendingTree::build(&entries).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
    }

    #[test]
    fn empty_staging_writes_the_empty_tree() {
        let pending = PendingTree::build(std::iter::empty()).unwrap();
        assert!(pending.is_empty());

        let (oid, written) = write_all(&pending);
        assert_eq!(written.len(), 1);
        assert_eq!(oid.as_ref(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }
}
