//! # docvault-cache
//!
//! Cache providers for the DocVault read path. Supports two modes:
//!
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka)
//!   with per-entry TTL
//! - **disabled**: every lookup misses, every write is dropped
//!
//! The provider is selected at construction time from configuration.

pub mod keys;
pub mod memory;
pub mod provider;

pub use provider::CacheManager;
