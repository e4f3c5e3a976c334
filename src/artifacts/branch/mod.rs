//! Branch names, the HEAD state machine and revision expressions

pub mod branch_name;
pub mod head_state;
pub mod revision;

pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
pub const PARENT_REGEX: &str = r"^(.+)\^$";
pub const ANCESTOR_REGEX: &str = r"^(.+)\~(\d+)$";

/// Name of the symbolic reference tracking the current checkout
pub const HEAD: &str = "HEAD";

/// Directory (relative to the metadata root) holding branch files
pub const REF_PREFIX: &str = "refs/heads/";
