//! Mutation and bulk operation settings.

use serde::{Deserialize, Serialize};

/// Tuning for mutating operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationsConfig {
    /// Maximum number of bulk items in flight at once.
    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,
    /// Maximum number of files a single group may hold.
    #[serde(default = "default_max_files_per_group")]
    pub max_files_per_group: u64,
    /// Minimum role name allowed to move objects across visibility or department.
    #[serde(default = "default_cross_scope_min_role")]
    pub cross_scope_min_role: String,
    /// Highest numeric disambiguator tried when suggesting a free name.
    #[serde(default = "default_conflict_suffix_limit")]
    pub conflict_suffix_limit: u32,
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            bulk_concurrency: default_bulk_concurrency(),
            max_files_per_group: default_max_files_per_group(),
            cross_scope_min_role: default_cross_scope_min_role(),
            conflict_suffix_limit: default_conflict_suffix_limit(),
        }
    }
}

fn default_bulk_concurrency() -> usize {
    4
}

fn default_max_files_per_group() -> u64 {
    20
}

fn default_cross_scope_min_role() -> String {
    "Admin".to_string()
}

fn default_conflict_suffix_limit() -> u32 {
    999
}
