//! Stored object kinds and their encodings
//!
//! Every piece of content is an object identified by the SHA-1 of its frame.
//! There are three kinds:
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: directory listing (names, modes and object ids)
//! - **Commit**: tree snapshot plus parents, author and message
//!
//! All three share one frame: `<kind> <size>\0<payload>`

pub mod blob;
pub mod commit;
pub mod framing;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;
pub mod tree_builder;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
