//! The read path: listing, normalization, and the star overlay.

pub mod normalize;
pub mod service;
pub mod star;

pub use service::{FileSystemIndex, ObjectList};
pub use star::{PendingStar, StarOutcome};
