//! File domain entities.

pub mod category;
pub mod model;

pub use category::ContentCategory;
pub use model::File;
