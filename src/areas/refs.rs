//! References: HEAD and branches
//!
//! References are human-readable names for commits.
//!
//! - HEAD: points at the current branch (symbolic) or directly at a commit
//! - Branches: `refs/heads/<name>`, each pointing at its tip commit
//!
//! ## File Format
//!
//! One reference per file, containing one of:
//! - a 40-character object id (direct reference)
//! - `ref: refs/heads/<name>` (symbolic reference, HEAD only)
//! - nothing, for a branch that has no commits yet
//!
//! Every write goes through `<file>.lock` and an atomic rename.

use crate::artifacts::branch::HEAD;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head_state::HeadState;
use crate::artifacts::core::lockfile::Lockfile;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::{Error, IoResultExt, Result};
use derive_new::new;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (`.grove`)
    path: Box<Path>,
}

/// Parsed content of a reference file
#[derive(Debug, Clone, PartialEq, Eq)]
enum RefContent {
    Symbolic(BranchName),
    Direct(ObjectId),
    Empty,
}

impl RefContent {
    fn read(name: &str, path: &Path) -> Result<Option<RefContent>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).at_path(path),
        };
        let content = content.trim();
        let corrupt = |reason: String| Error::CorruptRef {
            name: name.to_string(),
            reason,
        };

        if content.is_empty() {
            return Ok(Some(RefContent::Empty));
        }

        let symref = regex::Regex::new(SYMREF_REGEX).map_err(|e| corrupt(e.to_string()))?;
        if let Some(symref_match) = symref.captures(content) {
            let branch = BranchName::try_parse_ref_path(&symref_match[1])
                .map_err(|e| corrupt(e.to_string()))?;
            return Ok(Some(RefContent::Symbolic(branch)));
        }

        ObjectId::try_parse(content.to_string())
            .map(|oid| Some(RefContent::Direct(oid)))
            .map_err(|_| corrupt(format!("'{content}' is neither an object id nor a symbolic ref")))
    }

    fn render(&self) -> String {
        match self {
            RefContent::Symbolic(branch) => format!("ref: {}\n", branch.ref_path()),
            RefContent::Direct(oid) => format!("{oid}\n"),
            RefContent::Empty => String::new(),
        }
    }
}

impl Refs {
    /// Create `refs/heads`, an empty default branch and HEAD pointing at it.
    pub fn init(&self, default_branch: &BranchName) -> Result<()> {
        let heads_path = self.heads_path();
        std::fs::create_dir_all(&heads_path).at_path(&heads_path)?;

        self.write_ref(&self.branch_path(default_branch), &RefContent::Empty)?;
        self.write_ref(&self.head_path(), &RefContent::Symbolic(default_branch.clone()))
    }

    /// Where HEAD points, following its indirection one level.
    pub fn head_state(&self) -> Result<HeadState> {
        match RefContent::read(HEAD, &self.head_path())? {
            None => Err(Error::RefNotFound(HEAD.to_string())),
            Some(RefContent::Direct(oid)) => Ok(HeadState::Detached(oid)),
            Some(RefContent::Empty) => Err(Error::CorruptRef {
                name: HEAD.to_string(),
                reason: "HEAD is empty".to_string(),
            }),
            Some(RefContent::Symbolic(branch)) => {
                match RefContent::read(branch.as_ref(), &self.branch_path(&branch))? {
                    None | Some(RefContent::Empty) => Ok(HeadState::Unborn { branch }),
                    Some(RefContent::Direct(oid)) => Ok(HeadState::Attached { branch, oid }),
                    Some(RefContent::Symbolic(_)) => Err(Error::CorruptRef {
                        name: branch.to_string(),
                        reason: "branches cannot be symbolic".to_string(),
                    }),
                }
            }
        }
    }

    /// Tip of a branch; `None` while the branch has no commits.
    pub fn read_branch(&self, branch: &BranchName) -> Result<Option<ObjectId>> {
        match RefContent::read(branch.as_ref(), &self.branch_path(branch))? {
            None => Err(Error::RefNotFound(branch.to_string())),
            Some(RefContent::Empty) => Ok(None),
            Some(RefContent::Direct(oid)) => Ok(Some(oid)),
            Some(RefContent::Symbolic(_)) => Err(Error::CorruptRef {
                name: branch.to_string(),
                reason: "branches cannot be symbolic".to_string(),
            }),
        }
    }

    pub fn branch_exists(&self, branch: &BranchName) -> bool {
        self.branch_path(branch).is_file()
    }

    /// Resolve `HEAD` or a branch name to a commit id.
    pub fn resolve(&self, name: &str) -> Result<ObjectId> {
        if name == HEAD {
            return match self.head_state()? {
                HeadState::Unborn { branch } => Err(Error::UnbornBranch(branch.to_string())),
                HeadState::Attached { oid, .. } | HeadState::Detached(oid) => Ok(oid),
            };
        }

        let branch = BranchName::try_parse(name)?;
        self.read_branch(&branch)?
            .ok_or_else(|| Error::UnbornBranch(branch.to_string()))
    }

    /// Point a branch at a commit, creating the branch if needed.
    pub fn update_branch(&self, branch: &BranchName, oid: &ObjectId) -> Result<()> {
        self.write_ref(&self.branch_path(branch), &RefContent::Direct(oid.clone()))
    }

    /// Create a branch, unborn if `start` is `None`.
    pub fn create_branch(&self, branch: &BranchName, start: Option<&ObjectId>) -> Result<()> {
        if self.branch_exists(branch) {
            return Err(Error::BranchExists(branch.to_string()));
        }

        let content = match start {
            Some(oid) => RefContent::Direct(oid.clone()),
            None => RefContent::Empty,
        };
        self.write_ref(&self.branch_path(branch), &content)
    }

    /// Delete a branch that is not checked out, returning its old tip.
    pub fn delete_branch(&self, branch: &BranchName) -> Result<Option<ObjectId>> {
        if self.head_state()?.branch() == Some(branch) {
            return Err(Error::CurrentBranch(branch.to_string()));
        }

        let oid = self.read_branch(branch)?;
        let branch_path = self.branch_path(branch);
        let lock = Lockfile::acquire(&branch_path)?;

        std::fs::remove_file(&branch_path).at_path(&branch_path)?;
        drop(lock);
        self.prune_branch_empty_parent_dirs(&branch_path)?;

        Ok(oid)
    }

    /// All branch names, sorted.
    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&heads_path).ok()?;
                let name = relative_path.to_str()?.replace(std::path::MAIN_SEPARATOR, "/");
                // in-flight lock files are not valid branch names
                BranchName::try_parse(name).ok()
            })
            .collect::<Vec<_>>();

        branches.sort();
        Ok(branches)
    }

    pub fn set_head_to_branch(&self, branch: &BranchName) -> Result<()> {
        self.write_ref(&self.head_path(), &RefContent::Symbolic(branch.clone()))
    }

    pub fn set_head_detached(&self, oid: &ObjectId) -> Result<()> {
        self.write_ref(&self.head_path(), &RefContent::Direct(oid.clone()))
    }

    /// Move whatever HEAD designates to `oid`: its branch when attached or
    /// unborn, HEAD itself when detached.
    pub fn update_head(&self, oid: &ObjectId) -> Result<()> {
        match self.head_state()? {
            HeadState::Unborn { branch } | HeadState::Attached { branch, .. } => {
                self.update_branch(&branch, oid)
            }
            HeadState::Detached(_) => self.set_head_detached(oid),
        }
    }

    fn write_ref(&self, path: &Path, content: &RefContent) -> Result<()> {
        let mut lock = Lockfile::acquire(path)?;
        lock.write_all(content.render().as_bytes())?;
        lock.commit()
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path()
            && parent.read_dir().at_path(parent)?.next().is_none()
        {
            std::fs::remove_dir(parent).at_path(parent)?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    fn branch_path(&self, branch: &BranchName) -> PathBuf {
        self.heads_path().join(branch.as_ref())
    }
}
