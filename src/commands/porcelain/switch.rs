use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Attach HEAD to `branch`. Working-tree files are left as they are.
    pub fn switch(&self, branch: &str) -> anyhow::Result<()> {
        self.set_head_to_branch(branch)?;
        tracing::info!(branch, "attached HEAD");
        writeln!(self.writer(), "Switched to branch '{branch}'")?;

        Ok(())
    }

    /// Detach HEAD at the commit `revision` names.
    pub fn switch_detach(&self, revision: &str) -> anyhow::Result<()> {
        let oid = self.resolve_revision(revision)?;
        self.set_head_detached(&oid)?;
        tracing::info!(%oid, "detached HEAD");

        writeln!(self.writer(), "HEAD is now at {}", oid.to_short_oid())?;

        Ok(())
    }
}
