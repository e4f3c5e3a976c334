//! Porcelain commands (user-facing operations)
//!
//! Porcelain commands compose the plumbing into the everyday workflow:
//! stage, commit, inspect history and move between branches.
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository
//! - `add` / `unstage`: Change the staged snapshot
//! - `commit`: Commit the staged snapshot on top of HEAD
//! - `log`: Show first-parent history
//! - `branch`: Create, list, or delete branches
//! - `switch`: Attach or detach HEAD

mod add;
mod branch;
mod commit;
mod init;
pub mod log;
mod switch;
