//! Core traits defined in `docvault-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
