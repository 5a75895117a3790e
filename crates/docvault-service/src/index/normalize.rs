//! Record normalization.
//!
//! Servers report files and folders in one loosely-typed shape with many
//! optional fields. Normalization fills defaults, derives the content
//! category, and rejects records that cannot be placed.

use chrono::{DateTime, Utc};

use docvault_core::types::{DepartmentId, FileId, FolderId, FolderPath, GroupId, UserId};
use docvault_core::{AppError, AppResult};
use docvault_entity::file::{ContentCategory, File};
use docvault_entity::folder::Folder;
use docvault_entity::group::{DEFAULT_GROUP_COLOR, Group, is_valid_color};
use docvault_entity::object::{FileSystemObject, ObjectMeta, Visibility};
use docvault_entity::record::{GroupRecord, LockFields, ObjectRecord};

fn parse_parent(raw: Option<&str>, fallback: &FolderPath) -> AppResult<FolderPath> {
    match raw {
        Some(raw) => FolderPath::parse(raw),
        None => Ok(fallback.clone()),
    }
}

fn parse_visibility(
    raw: Option<&str>,
    department_id: Option<DepartmentId>,
) -> AppResult<(Visibility, Option<DepartmentId>)> {
    let visibility = match raw {
        Some(raw) => raw.parse::<Visibility>()?,
        None => Visibility::Department,
    };
    let department_id = match visibility {
        Visibility::Department => department_id,
        Visibility::Private => None,
    };
    Ok((visibility, department_id))
}

fn build_meta(
    name: &str,
    owner_id: UserId,
    owner_display_name: Option<&str>,
    created_at: DateTime<Utc>,
    modified_at: Option<DateTime<Utc>>,
    lock: &LockFields,
) -> AppResult<ObjectMeta> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Record has an empty name"));
    }
    Ok(ObjectMeta {
        name: name.to_string(),
        owner_id,
        owner_display_name: owner_display_name.unwrap_or_default().to_string(),
        created_at,
        modified_at: modified_at.unwrap_or(created_at),
        is_starred: false,
        lock: lock.to_lock(owner_id, created_at),
    })
}

/// Normalize a listing record into a file or folder.
///
/// `fallback_path` is used when the record omits its parent path.
pub fn normalize_record(
    record: &ObjectRecord,
    fallback_path: &FolderPath,
) -> AppResult<FileSystemObject> {
    let meta = build_meta(
        &record.name,
        record.owner_id,
        record.owner_display_name.as_deref(),
        record.created_at,
        record.modified_at,
        &record.lock,
    )?;
    let parent_path = parse_parent(record.parent_path.as_deref(), fallback_path)?;
    let (visibility, department_id) =
        parse_visibility(record.visibility.as_deref(), record.department_id)?;

    if record.is_directory {
        return Ok(FileSystemObject::Folder(Folder {
            id: FolderId::from_uuid(record.id),
            meta,
            parent_path,
            is_company_folder: record.is_company_folder.unwrap_or(false),
            visibility,
            department_id,
        }));
    }

    let content_category = ContentCategory::derive(&meta.name, record.content_type.as_deref());
    Ok(FileSystemObject::File(File {
        id: FileId::from_uuid(record.id),
        meta,
        size_bytes: record.size_bytes.unwrap_or(0),
        content_type: record.content_type.clone(),
        content_category,
        visibility,
        department_id,
        group_id: record.group_id,
        parent_path,
    }))
}

/// Normalize a groups-listing record.
pub fn normalize_group(record: &GroupRecord, fallback_path: &FolderPath) -> AppResult<Group> {
    let meta = build_meta(
        &record.name,
        record.owner_id,
        record.owner_display_name.as_deref(),
        record.created_at,
        record.modified_at,
        &record.lock,
    )?;
    let (visibility, department_id) =
        parse_visibility(record.visibility.as_deref(), record.department_id)?;
    let color = record
        .color
        .as_deref()
        .filter(|c| is_valid_color(c))
        .unwrap_or(DEFAULT_GROUP_COLOR)
        .to_string();

    Ok(Group {
        id: GroupId::from_uuid(record.id),
        meta,
        file_count: record.file_count.unwrap_or(0),
        total_size_bytes: record.total_size_bytes.unwrap_or(0),
        color,
        description: record.description.clone(),
        parent_path: parse_parent(record.parent_path.as_deref(), fallback_path)?,
        department_id,
        visibility,
    })
}
