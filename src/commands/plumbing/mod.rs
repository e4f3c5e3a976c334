//! Plumbing commands (low-level operations)
//!
//! The collaborator-facing API over objects, trees, commits and refs, plus
//! the thin CLI bodies that print their results.
//!
//! ## Commands
//!
//! - `hash-object`: Compute an object id and optionally store the blob
//! - `cat-file`: Print an object's kind or content
//! - `ls-files`: List the staged entries
//! - `ls-tree`: List the contents of a tree object
//! - `write-tree`: Build a tree from the staged entries
//! - `rev-parse`: Resolve a revision to a commit id

pub mod cat_file;
mod hash_object;
mod ls_files;
mod ls_tree;
mod rev_parse;
mod update_ref;
mod write_commit;
mod write_tree;
