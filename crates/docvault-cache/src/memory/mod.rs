//! In-process cache providers.

pub mod noop;
pub mod store;

pub use noop::NoopCacheProvider;
pub use store::MemoryCacheProvider;
