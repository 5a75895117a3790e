//! Groups and the merged folder listing.

pub mod aggregator;
pub mod listing;

pub use aggregator::{GroupAggregator, GroupContents, Membership};
pub use listing::FolderListing;
