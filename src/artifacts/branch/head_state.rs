use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;

/// What `HEAD` currently points at.
///
/// A fresh repository starts `Unborn` on its default branch. The first
/// commit moves it to `Attached`; `set_head_detached` moves it to
/// `Detached`, and committing there only moves `HEAD` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// On a branch that has no commits yet
    Unborn { branch: BranchName },
    /// On a branch pointing at a commit
    Attached { branch: BranchName, oid: ObjectId },
    /// Directly on a commit, no branch moves on commit
    Detached(ObjectId),
}

impl HeadState {
    /// Commit that HEAD resolves to, if any
    pub fn oid(&self) -> Option<&ObjectId> {
        match self {
            HeadState::Unborn { .. } => None,
            HeadState::Attached { oid, .. } | HeadState::Detached(oid) => Some(oid),
        }
    }

    /// Branch that HEAD is on, if not detached
    pub fn branch(&self) -> Option<&BranchName> {
        match self {
            HeadState::Unborn { branch } | HeadState::Attached { branch, .. } => Some(branch),
            HeadState::Detached(_) => None,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, HeadState::Detached(_))
    }
}

impl std::fmt::Display for HeadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeadState::Unborn { branch } => write!(f, "on branch {branch} (no commits yet)"),
            HeadState::Attached { branch, oid } => {
                write!(f, "on branch {branch} at {}", oid.to_short_oid())
            }
            HeadState::Detached(oid) => write!(f, "detached at {}", oid.to_short_oid()),
        }
    }
}
