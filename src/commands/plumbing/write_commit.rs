use crate::areas::repository::Repository;
use crate::artifacts::log::history::{self, History};
use crate::artifacts::objects::commit::{Author, Commit, CommitInfo};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::{Error, Result};

impl Repository {
    /// Store a commit of `tree` on top of `parents`.
    ///
    /// The tree must be a stored tree and every parent a stored commit;
    /// otherwise `DanglingReference` is returned and nothing is written.
    /// An author name spanning several lines is rejected with `InvalidAuthor`.
    pub fn create_commit(
        &self,
        tree: &ObjectId,
        parents: &[ObjectId],
        author: Author,
        message: &str,
    ) -> Result<ObjectId> {
        if let Some(reason) = author.line_violation() {
            return Err(Error::InvalidAuthor {
                name: author.name().to_string(),
                reason: reason.to_string(),
            });
        }
        self.expect_kind(tree, ObjectType::Tree)?;
        for parent in parents {
            self.expect_kind(parent, ObjectType::Commit)?;
        }

        let commit = Commit::new(parents.to_vec(), tree.clone(), author, message.to_string());
        self.database().store(&commit)
    }

    pub fn read_commit(&self, oid: &ObjectId) -> Result<CommitInfo> {
        let commit = self.database().parse_object_as_commit(oid)?;

        Ok(CommitInfo::new(oid.clone(), commit))
    }

    /// First-parent history from `start` down to a root, using the
    /// configured history mode.
    pub fn commit_history(&'_ self, start: &ObjectId) -> History<'_> {
        History::new(self.database(), start.clone(), self.config().history)
    }

    /// Every commit reachable from `start` through any parent.
    pub fn reachable_commits(&self, start: &ObjectId) -> Result<Vec<CommitInfo>> {
        history::reachable(self.database(), start.clone(), self.config().history)
    }
}
