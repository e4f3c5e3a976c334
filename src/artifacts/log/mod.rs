//! Commit history traversal
//!
//! - `history`: first-parent walk with explicit steps, plus reachability
//!   over all parents

pub mod history;
