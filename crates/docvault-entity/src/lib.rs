//! # docvault-entity
//!
//! Domain entity models for DocVault. The file-system object model
//! (`File`, `Folder`, `Group` and their sum type), the acting `Principal`,
//! lock and visibility value objects, and the wire records and request
//! bodies exchanged with the document API. All entities derive `Debug`,
//! `Clone`, `Serialize`, and `Deserialize`.

pub mod file;
pub mod folder;
pub mod group;
pub mod object;
pub mod principal;
pub mod record;
