//! Data types and algorithms
//!
//! - `branch`: branch names, HEAD state and revision expressions
//! - `core`: lock files
//! - `index`: staging index entries and on-disk encoding
//! - `log`: history traversal
//! - `objects`: object ids, framing, blobs, trees and commits

pub mod branch;
pub mod core;
pub mod index;
pub mod log;
pub mod objects;
