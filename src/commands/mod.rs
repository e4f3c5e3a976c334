//! Command implementations
//!
//! Every operation is an `impl Repository` block, organized into two
//! categories:
//!
//! - `plumbing`: the object, tree, commit and ref API that collaborators
//!   call, plus the low-level CLI commands over it
//! - `porcelain`: staging, committing, history and branch workflows
//!
//! This is the only layer that logs; the storage components below it
//! return errors and stay silent.

pub mod plumbing;
pub mod porcelain;
