//! Lock bypass and ownership-gated access decisions.

pub mod flags;
pub mod resolver;

pub use flags::CapabilityFlags;
pub use resolver::{AccessResolver, BypassSource};
