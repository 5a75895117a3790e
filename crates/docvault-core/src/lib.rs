//! # docvault-core
//!
//! Core crate for DocVault. Contains the unified error system,
//! configuration schemas, typed identifiers, folder paths, sorting
//! types, and the cache provider trait.
//!
//! This crate has **no** internal dependencies on other DocVault crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
