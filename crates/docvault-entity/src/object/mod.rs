//! The file-system object sum type and the fields shared by every variant.

pub mod lock;
pub mod visibility;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docvault_core::types::{DepartmentId, FolderPath, ObjectId, ObjectKind, UserId};

use crate::file::File;
use crate::folder::Folder;
use crate::group::Group;

pub use lock::LockInfo;
pub use visibility::{Visibility, VisibilityScope, crosses_department};

/// Fields common to files, folders, and groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Display name (file name including extension).
    pub name: String,
    /// The owning user.
    pub owner_id: UserId,
    /// Owner name for display.
    #[serde(default)]
    pub owner_display_name: String,
    /// When the object was created.
    pub created_at: DateTime<Utc>,
    /// When the object was last modified.
    pub modified_at: DateTime<Utc>,
    /// Per-viewer star overlay. Not server-authoritative.
    #[serde(default)]
    pub is_starred: bool,
    /// The active lock, if any.
    #[serde(default)]
    pub lock: Option<LockInfo>,
}

impl ObjectMeta {
    /// Create metadata for a fresh, unlocked, unstarred object.
    pub fn new(name: impl Into<String>, owner_id: UserId, owner_display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            owner_id,
            owner_display_name: owner_display_name.into(),
            created_at: now,
            modified_at: now,
            is_starred: false,
            lock: None,
        }
    }

    /// Whether a lock is currently held.
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }
}

/// Anything carrying [`ObjectMeta`]: the owner and lock inputs of every
/// access decision.
pub trait Lockable {
    /// Shared metadata.
    fn meta(&self) -> &ObjectMeta;

    /// The owning user.
    fn owner_id(&self) -> UserId {
        self.meta().owner_id
    }

    /// The active lock, if any.
    fn lock(&self) -> Option<&LockInfo> {
        self.meta().lock.as_ref()
    }
}

impl Lockable for ObjectMeta {
    fn meta(&self) -> &ObjectMeta {
        self
    }
}

impl Lockable for File {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
}

impl Lockable for Folder {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
}

impl Lockable for Group {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
}

impl Lockable for FileSystemObject {
    fn meta(&self) -> &ObjectMeta {
        FileSystemObject::meta(self)
    }
}

/// Which shared operations an object kind supports.
///
/// Lock and move code paths are shared across kinds and consult this
/// descriptor instead of branching per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Can carry a lock.
    pub lockable: bool,
    /// Can be relocated.
    pub movable: bool,
    /// Can be duplicated.
    pub copyable: bool,
}

impl CapabilityDescriptor {
    /// The descriptor for an object kind.
    pub const fn for_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::File => Self {
                lockable: true,
                movable: true,
                copyable: true,
            },
            ObjectKind::Folder | ObjectKind::Group => Self {
                lockable: true,
                movable: true,
                copyable: false,
            },
        }
    }
}

/// A file, folder, or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FileSystemObject {
    /// A regular file.
    File(File),
    /// A folder.
    Folder(Folder),
    /// A file group.
    Group(Group),
}

impl FileSystemObject {
    /// The tagged identifier.
    pub fn id(&self) -> ObjectId {
        match self {
            Self::File(f) => f.id.into(),
            Self::Folder(f) => f.id.into(),
            Self::Group(g) => g.id.into(),
        }
    }

    /// The object kind.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::File(_) => ObjectKind::File,
            Self::Folder(_) => ObjectKind::Folder,
            Self::Group(_) => ObjectKind::Group,
        }
    }

    /// Shared metadata.
    pub fn meta(&self) -> &ObjectMeta {
        match self {
            Self::File(f) => &f.meta,
            Self::Folder(f) => &f.meta,
            Self::Group(g) => &g.meta,
        }
    }

    /// Mutable shared metadata.
    pub fn meta_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Self::File(f) => &mut f.meta,
            Self::Folder(f) => &mut f.meta,
            Self::Group(g) => &mut g.meta,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn owner_id(&self) -> UserId {
        self.meta().owner_id
    }

    pub fn lock(&self) -> Option<&LockInfo> {
        self.meta().lock.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.meta().is_locked()
    }

    pub fn is_starred(&self) -> bool {
        self.meta().is_starred
    }

    pub fn set_starred(&mut self, starred: bool) {
        self.meta_mut().is_starred = starred;
    }

    /// The folder the object lives in.
    pub fn parent_path(&self) -> &FolderPath {
        match self {
            Self::File(f) => &f.parent_path,
            Self::Folder(f) => &f.parent_path,
            Self::Group(g) => &g.parent_path,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            Self::File(f) => f.visibility,
            Self::Folder(f) => f.visibility,
            Self::Group(g) => g.visibility,
        }
    }

    pub fn department_id(&self) -> Option<DepartmentId> {
        match self {
            Self::File(f) => f.department_id,
            Self::Folder(f) => f.department_id,
            Self::Group(g) => g.department_id,
        }
    }

    /// The scope this object lives in.
    pub fn scope(&self) -> VisibilityScope {
        VisibilityScope::of(self.visibility(), self.department_id())
    }

    /// Size in bytes; folders report zero.
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::File(f) => f.size_bytes,
            Self::Folder(_) => 0,
            Self::Group(g) => g.total_size_bytes,
        }
    }

    /// Operations this object's kind supports.
    pub fn capabilities(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::for_kind(self.kind())
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Self::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Self::Folder(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }
}

impl From<File> for FileSystemObject {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

impl From<Folder> for FileSystemObject {
    fn from(folder: Folder) -> Self {
        Self::Folder(folder)
    }
}

impl From<Group> for FileSystemObject {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_files_are_copyable() {
        assert!(CapabilityDescriptor::for_kind(ObjectKind::File).copyable);
        assert!(!CapabilityDescriptor::for_kind(ObjectKind::Folder).copyable);
        assert!(!CapabilityDescriptor::for_kind(ObjectKind::Group).copyable);
        for kind in [ObjectKind::File, ObjectKind::Folder, ObjectKind::Group] {
            let caps = CapabilityDescriptor::for_kind(kind);
            assert!(caps.lockable && caps.movable);
        }
    }

    #[test]
    fn test_object_serde_is_tagged() {
        let file = File::new(ObjectMeta::new("a.txt", UserId::new(), "Ann"), FolderPath::root());
        let object = FileSystemObject::from(file);
        let json = serde_json::to_value(&object).expect("serialize");
        assert_eq!(json["kind"], "file");
        assert_eq!(json["name"], "a.txt");
        let back: FileSystemObject = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, object);
    }
}
