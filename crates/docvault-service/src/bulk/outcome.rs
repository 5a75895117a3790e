//! Aggregated bulk results.

use serde::{Deserialize, Serialize};

use docvault_core::types::ObjectId;

use crate::outcome::OperationFailure;

/// What happened to a single selected item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BulkItemStatus {
    Succeeded,
    /// The destination already holds this name.
    Duplicate { suggested_name: String },
    Failed { failure: OperationFailure },
    /// Filtered out before any call was made.
    Skipped { reason: String },
    /// Not started because the batch was cancelled.
    Cancelled,
}

/// Per-item line of a bulk result, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemReport {
    pub id: ObjectId,
    pub name: String,
    #[serde(flatten)]
    pub status: BulkItemStatus,
}

/// Counts for a whole batch.
///
/// `proceeded` is false when nothing in the selection was eligible; in that
/// case no call was issued and every item is `skipped`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub proceeded: bool,
    pub success: usize,
    pub duplicates: usize,
    pub errors: usize,
    pub skipped: usize,
    pub cancelled: usize,
    pub items: Vec<BulkItemReport>,
}

impl BulkOutcome {
    pub(crate) fn from_reports(proceeded: bool, items: Vec<BulkItemReport>) -> Self {
        let mut outcome = Self {
            proceeded,
            ..Self::default()
        };
        for item in &items {
            match item.status {
                BulkItemStatus::Succeeded => outcome.success += 1,
                BulkItemStatus::Duplicate { .. } => outcome.duplicates += 1,
                BulkItemStatus::Failed { .. } => outcome.errors += 1,
                BulkItemStatus::Skipped { .. } => outcome.skipped += 1,
                BulkItemStatus::Cancelled => outcome.cancelled += 1,
            }
        }
        outcome.items = items;
        outcome
    }

    /// Ids of the items that were applied.
    pub fn succeeded_ids(&self) -> Vec<ObjectId> {
        self.items
            .iter()
            .filter(|item| item.status == BulkItemStatus::Succeeded)
            .map(|item| item.id)
            .collect()
    }

    /// One-line summary such as `3 moved, 1 duplicate, 2 skipped`.
    pub fn summary(&self, verb: &str) -> String {
        let mut parts = vec![format!("{} {verb}", self.success)];
        if self.duplicates > 0 {
            parts.push(format!("{} duplicate", self.duplicates));
        }
        if self.errors > 0 {
            parts.push(format!("{} failed", self.errors));
        }
        if self.skipped > 0 {
            parts.push(format!("{} skipped", self.skipped));
        }
        if self.cancelled > 0 {
            parts.push(format!("{} cancelled", self.cancelled));
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::types::FileId;

    fn report(status: BulkItemStatus) -> BulkItemReport {
        BulkItemReport {
            id: FileId::new().into(),
            name: "x".into(),
            status,
        }
    }

    #[test]
    fn test_counts_and_summary() {
        let outcome = BulkOutcome::from_reports(
            true,
            vec![
                report(BulkItemStatus::Succeeded),
                report(BulkItemStatus::Succeeded),
                report(BulkItemStatus::Duplicate {
                    suggested_name: "x (1)".into(),
                }),
                report(BulkItemStatus::Skipped {
                    reason: "locked".into(),
                }),
            ],
        );
        assert_eq!(outcome.success, 2);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.errors, 0);
        assert_eq!(outcome.succeeded_ids().len(), 2);
        assert_eq!(outcome.summary("moved"), "2 moved, 1 duplicate, 1 skipped");
    }
}
