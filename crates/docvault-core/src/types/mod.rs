//! Core type definitions used across the DocVault workspace.

pub mod id;
pub mod path;
pub mod sorting;

pub use id::*;
pub use path::FolderPath;
pub use sorting::{SortDirection, SortKey, SortSpec};
