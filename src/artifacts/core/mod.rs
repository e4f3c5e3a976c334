//! Shared low-level utilities
//!
//! - `lockfile`: exclusive `<path>.lock` files for atomic ref and index writes

pub mod lockfile;
