use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head_state::HeadState;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::{Error, Result};

impl Repository {
    /// Point a branch at a stored commit, creating the branch if needed.
    pub fn update_branch(&self, name: &str, oid: &ObjectId) -> Result<()> {
        let branch = BranchName::try_parse(name)?;
        self.expect_kind(oid, ObjectType::Commit)?;

        self.refs().update_branch(&branch, oid)
    }

    pub fn head_state(&self) -> Result<HeadState> {
        self.refs().head_state()
    }

    /// Attach HEAD to an existing branch. The working tree is not touched.
    pub fn set_head_to_branch(&self, name: &str) -> Result<()> {
        let branch = BranchName::try_parse(name)?;
        if !self.refs().branch_exists(&branch) {
            return Err(Error::RefNotFound(branch.to_string()));
        }

        self.refs().set_head_to_branch(&branch)
    }

    /// Detach HEAD at a stored commit. The working tree is not touched.
    pub fn set_head_detached(&self, oid: &ObjectId) -> Result<()> {
        self.expect_kind(oid, ObjectType::Commit)?;

        self.refs().set_head_detached(oid)
    }
}
