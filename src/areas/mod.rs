//! Stateful repository components
//!
//! Each area is bound to a location on disk:
//!
//! - `database`: content-addressed object store
//! - `index`: staging index for the next commit's tree
//! - `refs`: HEAD and branch pointers
//! - `workspace`: read-only view of the working tree
//! - `repository`: composition root wiring the areas together

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
