//! File group entities.

pub mod model;

pub use model::{DEFAULT_GROUP_COLOR, Group, is_valid_color};
