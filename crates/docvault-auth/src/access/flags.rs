//! Per-object capability flags exposed to the presentation layer.

use serde::{Deserialize, Serialize};

/// What the current principal may do with one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilityFlags {
    pub can_delete: bool,
    pub can_move: bool,
    pub can_share: bool,
    pub can_copy: bool,
    pub can_rename: bool,
    pub can_lock: bool,
    /// Locked and not bypassable by this principal.
    pub is_locked_for_me: bool,
}
