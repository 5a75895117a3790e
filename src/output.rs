//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use docvault_entity::object::FileSystemObject;
use docvault_service::{BulkItemStatus, BulkOutcome};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One listing row
#[derive(Debug, Serialize, Tabled)]
pub struct ObjectRow {
    /// Kind
    kind: String,
    /// Name
    name: String,
    /// Size or member total
    size: u64,
    /// Owner
    owner: String,
    /// Lock state
    locked: String,
    /// Starred
    starred: String,
    /// Modified at
    modified: String,
    /// Object ID
    id: String,
}

impl From<&FileSystemObject> for ObjectRow {
    fn from(object: &FileSystemObject) -> Self {
        let meta = object.meta();
        let locked = match object.lock() {
            Some(lock) => format!("yes ({})", lock.effective_required_role()),
            None => String::new(),
        };
        Self {
            kind: object.kind().to_string(),
            name: object.name().to_string(),
            size: object.size_bytes(),
            owner: meta.owner_display_name.clone(),
            locked,
            starred: if meta.is_starred { "*".into() } else { String::new() },
            modified: meta.modified_at.format("%Y-%m-%d %H:%M").to_string(),
            id: object.id().to_string(),
        }
    }
}

/// One bulk result row
#[derive(Debug, Serialize, Tabled)]
struct BulkRow {
    /// Name
    name: String,
    /// Result
    status: String,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("Nothing here.");
            } else {
                let table = Table::new(items).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{:#?}", item);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print a bulk result: the summary line, then any item that did not go
/// through.
pub fn print_bulk(outcome: &BulkOutcome, verb: &str, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_item(outcome, format);
        return;
    }
    if !outcome.proceeded {
        print_warning("Nothing in the selection is eligible; no changes made");
    } else if outcome.success > 0 {
        print_success(&outcome.summary(verb));
    } else {
        print_warning(&outcome.summary(verb));
    }
    let rows: Vec<BulkRow> = outcome
        .items
        .iter()
        .filter_map(|item| {
            let status = match &item.status {
                BulkItemStatus::Succeeded => return None,
                BulkItemStatus::Duplicate { suggested_name } => {
                    format!("name taken, try '{suggested_name}'")
                }
                BulkItemStatus::Failed { failure } => failure.message.clone(),
                BulkItemStatus::Skipped { reason } => format!("skipped: {reason}"),
                BulkItemStatus::Cancelled => "cancelled".to_string(),
            };
            Some(BulkRow {
                name: item.name.clone(),
                status,
            })
        })
        .collect();
    if !rows.is_empty() {
        println!("{}", Table::new(&rows));
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}
