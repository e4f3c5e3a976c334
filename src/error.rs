//! Error taxonomy for every repository operation.
//!
//! Each variant carries the identifier that caused it (object id, ref name
//! or path) so callers can render a message without extra lookups.
//! [`Error::kind`] folds the variants into the coarse categories callers
//! usually branch on.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use std::path::{Path, PathBuf};

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    NotFound,
    CorruptObject,
    DanglingReference,
    CorruptGraph,
    UnbornBranch,
    InvalidPath,
    InvalidInput,
    Locked,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem failure; nothing partial is left at the canonical path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("reference {0} not found")]
    RefNotFound(String),

    #[error("no object matches {0}")]
    UnknownObjectPrefix(String),

    #[error("short object id {prefix} is ambiguous ({} candidates)", .candidates.len())]
    AmbiguousObjectId {
        prefix: String,
        candidates: Vec<ObjectId>,
    },

    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: ObjectId, reason: String },

    #[error("object {oid} is a {found}, expected a {expected}")]
    WrongObjectType {
        oid: ObjectId,
        expected: ObjectType,
        found: ObjectType,
    },

    /// A tree or commit (or a ref) points at an object that is missing or
    /// of the wrong kind.
    #[error("dangling reference to {oid}: expected a {expected}{}", found_suffix(.found))]
    DanglingReference {
        oid: ObjectId,
        expected: ObjectType,
        found: Option<ObjectType>,
    },

    #[error("corrupt commit graph at {oid}: {reason}")]
    CorruptGraph { oid: ObjectId, reason: String },

    #[error("branch {0} does not have any commits yet")]
    UnbornBranch(String),

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid object id '{0}'")]
    InvalidObjectId(String),

    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName { name: String, reason: String },

    #[error("invalid author '{name}': {reason}")]
    InvalidAuthor { name: String, reason: String },

    #[error("branch {0} already exists")]
    BranchExists(String),

    #[error("cannot delete branch {0}: it is checked out")]
    CurrentBranch(String),

    #[error("invalid revision '{0}'")]
    InvalidRevision(String),

    #[error("corrupt reference {name}: {reason}")]
    CorruptRef { name: String, reason: String },

    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// Another writer holds the lock file guarding this path.
    #[error("unable to lock {0}: another process is writing it")]
    Locked(PathBuf),

    #[error("invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("not a grove repository: {0}")]
    NotARepository(PathBuf),
}

fn found_suffix(found: &Option<ObjectType>) -> String {
    match found {
        Some(kind) => format!(", found a {kind}"),
        None => ", but it is missing".to_string(),
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::ObjectNotFound(_)
            | Error::RefNotFound(_)
            | Error::UnknownObjectPrefix(_)
            | Error::NotARepository(_) => ErrorKind::NotFound,
            Error::CorruptObject { .. } | Error::CorruptIndex(_) | Error::CorruptRef { .. } => {
                ErrorKind::CorruptObject
            }
            Error::DanglingReference { .. } => ErrorKind::DanglingReference,
            Error::CorruptGraph { .. } => ErrorKind::CorruptGraph,
            Error::UnbornBranch(_) => ErrorKind::UnbornBranch,
            Error::InvalidPath { .. } => ErrorKind::InvalidPath,
            Error::Locked(_) => ErrorKind::Locked,
            Error::AmbiguousObjectId { .. }
            | Error::WrongObjectType { .. }
            | Error::InvalidObjectId(_)
            | Error::InvalidBranchName { .. }
            | Error::InvalidAuthor { .. }
            | Error::BranchExists(_)
            | Error::CurrentBranch(_)
            | Error::InvalidRevision(_)
            | Error::Config { .. } => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attaches the offending path to a raw I/O result.
pub(crate) trait IoResultExt<T> {
    fn at_path(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at_path(self, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
