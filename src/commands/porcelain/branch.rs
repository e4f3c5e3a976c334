use crate::areas::repository::Repository;
use crate::artifacts::branch::HEAD;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head_state::HeadState;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::Result;
use std::io::Write;

impl Repository {
    /// Create a branch at `start`, or an unborn branch if `start` is `None`.
    pub fn create_branch(&self, name: &str, start: Option<&ObjectId>) -> Result<()> {
        let branch = BranchName::try_parse(name)?;
        if let Some(oid) = start {
            self.expect_kind(oid, ObjectType::Commit)?;
        }

        self.refs().create_branch(&branch, start)
    }

    /// Delete a branch that is not checked out, returning its old tip.
    pub fn delete_branch(&self, name: &str) -> Result<Option<ObjectId>> {
        let branch = BranchName::try_parse(name)?;

        self.refs().delete_branch(&branch)
    }

    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        self.refs().list_branches()
    }

    /// Create `name` at `start` (a revision), defaulting to HEAD's commit.
    pub fn branch(&self, name: &str, start: Option<&str>) -> anyhow::Result<()> {
        let oid = match start {
            Some(revision) => self.resolve_revision(revision)?,
            None => self.resolve_ref(HEAD)?,
        };

        self.create_branch(name, Some(&oid))?;
        tracing::info!(branch = name, start = %oid.to_short_oid(), "created branch");

        Ok(())
    }

    pub fn branch_delete(&self, name: &str) -> anyhow::Result<()> {
        let oid = self.delete_branch(name)?;
        tracing::info!(branch = name, "deleted branch");

        match oid {
            Some(oid) => writeln!(
                self.writer(),
                "Deleted branch {name} (was {}).",
                oid.to_short_oid()
            )?,
            None => writeln!(self.writer(), "Deleted branch {name} (no commits).")?,
        }

        Ok(())
    }

    /// List branches, marking the checked-out one with `*`.
    pub fn branch_list(&self) -> anyhow::Result<()> {
        let head = self.head_state()?;

        if let HeadState::Detached(oid) = &head {
            writeln!(self.writer(), "* (HEAD detached at {})", oid.to_short_oid())?;
        }

        for branch in self.list_branches()? {
            let marker = if head.branch() == Some(&branch) { "*" } else { " " };
            writeln!(self.writer(), "{marker} {branch}")?;
        }

        Ok(())
    }
}
