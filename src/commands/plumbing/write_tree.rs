use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::objects::tree_builder::PendingTree;
use crate::error::Result;
use std::io::Write;

impl Repository {
    /// Materialize the staged snapshot as tree objects, returning the root
    /// tree's id. Every staged blob must already be in the store.
    pub fn build_tree_from_staging(&self) -> Result<ObjectId> {
        let entries = self.staged_entries()?;
        for entry in &entries {
            self.expect_kind(&entry.oid, ObjectType::Blob)?;
        }

        let pending = PendingTree::build(&entries)?;
        pending.write(&mut |tree: &Tree| self.database().store(tree))
    }

    pub fn write_tree(&self) -> anyhow::Result<()> {
        let oid = self.build_tree_from_staging()?;
        tracing::info!(%oid, "wrote tree from staging");
        writeln!(self.writer(), "{oid}")?;

        Ok(())
    }
}
