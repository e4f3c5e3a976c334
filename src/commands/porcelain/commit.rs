use crate::areas::repository::Repository;
use crate::artifacts::branch::head_state::HeadState;
use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::Result;
use std::io::Write;

impl Repository {
    /// Commit the staged snapshot on top of HEAD.
    ///
    /// When HEAD is unborn this is a root commit; when attached the branch
    /// advances; when detached only HEAD moves. The index is cleared once
    /// the pointer has moved.
    pub fn commit_staged(&self, author: Author, message: &str) -> Result<ObjectId> {
        let head = self.head_state()?;
        let tree = self.build_tree_from_staging()?;
        let parents = head.oid().cloned().into_iter().collect::<Vec<_>>();

        let oid = self.create_commit(&tree, &parents, author, message)?;
        self.refs().update_head(&oid)?;
        self.clear_staging()?;

        Ok(oid)
    }

    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        let head = self.head_state()?;
        let author = Author::load_from_env()?;
        let message = message.trim();

        let oid = self.commit_staged(author, message)?;
        tracing::info!(%oid, "created commit");
        if head.is_detached() {
            tracing::warn!(%oid, "committed on a detached HEAD, no branch points at it");
        }

        let location = match &head {
            HeadState::Unborn { branch } => format!("{branch} (root-commit)"),
            HeadState::Attached { branch, .. } => branch.to_string(),
            HeadState::Detached(_) => "detached HEAD".to_string(),
        };
        let short_message = message.lines().next().unwrap_or_default();

        writeln!(
            self.writer(),
            "[{location} {}] {short_message}",
            oid.to_short_oid()
        )?;

        Ok(())
    }
}
