//! grove: a content-addressed version-control core
//!
//! An object store with framing and hashing, a commit graph, a staging
//! index with a tree builder, and a reference store with a HEAD state
//! machine, composed by [`Repository`].
//!
//! ```no_run
//! use grove::{Author, ObjectType, Repository};
//! use std::path::Path;
//!
//! # fn main() -> grove::Result<()> {
//! let repository = Repository::new(Path::new("demo"), Box::new(std::io::sink()))?;
//! repository.init()?;
//!
//! repository.stage_path(Path::new("hello.txt"), b"hello")?;
//! let commit = repository.commit_staged(Author::new("alice".into()), "init")?;
//!
//! assert_eq!(repository.resolve_ref("HEAD")?, commit);
//! assert_eq!(repository.kind_of(&commit)?, ObjectType::Commit);
//! # Ok(())
//! # }
//! ```

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod error;

pub use areas::repository::Repository;
pub use artifacts::branch::branch_name::BranchName;
pub use artifacts::branch::head_state::HeadState;
pub use artifacts::index::entry_mode::{EntryMode, FileMode};
pub use artifacts::index::index_entry::IndexEntry;
pub use artifacts::log::history::{History, Step, Truncation};
pub use artifacts::objects::commit::{Author, Commit, CommitInfo};
pub use artifacts::objects::object_id::ObjectId;
pub use artifacts::objects::object_type::ObjectType;
pub use artifacts::objects::tree::{Tree, TreeEntry};
pub use config::{Compression, HistoryMode, RepositoryConfig};
pub use error::{Error, ErrorKind, Result};
