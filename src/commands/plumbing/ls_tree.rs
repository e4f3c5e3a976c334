use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::error::{Error, Result};
use std::io::Write;

impl Repository {
    pub fn read_tree(&self, oid: &ObjectId) -> Result<Tree> {
        self.database().parse_object_as_tree(oid)
    }

    /// List a tree, or the tree of a commit. With `recursive`, subtrees are
    /// expanded and only blobs are printed.
    pub fn ls_tree(&self, object: &str, recursive: bool) -> anyhow::Result<()> {
        let oid = self.resolve_object_id(object)?;

        let tree_oid = match self.kind_of(&oid)? {
            ObjectType::Commit => self.read_commit(&oid)?.commit.tree_oid().clone(),
            ObjectType::Tree => oid,
            found @ ObjectType::Blob => {
                return Err(Error::WrongObjectType {
                    oid,
                    expected: ObjectType::Tree,
                    found,
                }
                .into());
            }
        };

        self.print_tree(&tree_oid, "", recursive)
    }

    fn print_tree(&self, oid: &ObjectId, prefix: &str, recursive: bool) -> anyhow::Result<()> {
        for entry in self.read_tree(oid)?.into_entries() {
            let path = format!("{prefix}{}", entry.name);

            if recursive && entry.object_type() == ObjectType::Tree {
                self.print_tree(&entry.oid, &format!("{path}/"), recursive)?;
                continue;
            }

            writeln!(
                self.writer(),
                "{:0>6} {} {}\t{}",
                entry.mode.as_str(),
                entry.object_type(),
                entry.oid,
                path
            )?;
        }

        Ok(())
    }
}
