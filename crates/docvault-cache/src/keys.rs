//! Cache key builders for all DocVault cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use docvault_core::types::{GroupId, UserId};
use docvault_entity::object::{Visibility, VisibilityScope};
use docvault_entity::record::ListingQuery;

/// Prefix applied to all DocVault cache keys.
const PREFIX: &str = "docvault";

fn scope_segment(scope: &VisibilityScope) -> String {
    match (scope.visibility, scope.department_id) {
        (Visibility::Private, _) => "private".to_string(),
        (Visibility::Department, None) => "department:all".to_string(),
        (Visibility::Department, Some(dept)) => format!("department:{dept}"),
    }
}

// ── Listing keys ───────────────────────────────────────────

/// Cache key for a viewer's merged folder listing.
pub fn folder_listing(viewer: UserId, query: &ListingQuery) -> String {
    format!(
        "{PREFIX}:listing:{viewer}:{}:/{}",
        scope_segment(&query.scope),
        query.path.as_str()
    )
}

/// Cache key for a viewer's groups listing at a path.
pub fn group_listing(viewer: UserId, query: &ListingQuery) -> String {
    format!(
        "{PREFIX}:listing:{viewer}:groups:{}:/{}",
        scope_segment(&query.scope),
        query.path.as_str()
    )
}

/// Cache key for a viewer's view of a group's members.
pub fn group_members(viewer: UserId, group_id: GroupId) -> String {
    format!("{PREFIX}:listing:{viewer}:group:{group_id}")
}

/// Pattern to invalidate every listing cached for a viewer.
pub fn listing_viewer_pattern(viewer: UserId) -> String {
    format!("{PREFIX}:listing:{viewer}:*")
}

/// Pattern to invalidate every cached listing.
pub fn listing_pattern() -> String {
    format!("{PREFIX}:listing:*")
}

// ── Star keys ──────────────────────────────────────────────

/// Cache key for a viewer's starred-id set.
pub fn starred_set(viewer: UserId) -> String {
    format!("{PREFIX}:starred:{viewer}")
}
