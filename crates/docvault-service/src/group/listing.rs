//! The merged presentation listing.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use docvault_core::types::{ObjectId, ObjectKind, SortKey, SortSpec};
use docvault_entity::file::File;
use docvault_entity::folder::Folder;
use docvault_entity::group::Group;
use docvault_entity::object::FileSystemObject;

/// Folders, then groups, then files, each ordered by the active sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderListing {
    items: Vec<FileSystemObject>,
}

fn kind_rank(kind: ObjectKind) -> u8 {
    match kind {
        ObjectKind::Folder => 0,
        ObjectKind::Group => 1,
        ObjectKind::File => 2,
    }
}

fn compare_within_kind(a: &FileSystemObject, b: &FileSystemObject, sort: SortSpec) -> Ordering {
    let primary = match sort.key {
        SortKey::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
        SortKey::Modified => a.meta().modified_at.cmp(&b.meta().modified_at),
        SortKey::Created => a.meta().created_at.cmp(&b.meta().created_at),
        SortKey::Size => a.size_bytes().cmp(&b.size_bytes()),
    };
    sort.direction.apply(primary).then_with(|| {
        a.name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
    })
}

impl FolderListing {
    /// Merge and order the three kinds.
    pub fn build(folders: Vec<Folder>, groups: Vec<Group>, files: Vec<File>, sort: SortSpec) -> Self {
        let mut items: Vec<FileSystemObject> = folders
            .into_iter()
            .map(FileSystemObject::from)
            .chain(groups.into_iter().map(FileSystemObject::from))
            .chain(files.into_iter().map(FileSystemObject::from))
            .collect();
        items.sort_by(|a, b| {
            kind_rank(a.kind())
                .cmp(&kind_rank(b.kind()))
                .then_with(|| compare_within_kind(a, b, sort))
        });
        Self { items }
    }

    /// A listing of group members, all files.
    pub fn of_files(files: Vec<File>, sort: SortSpec) -> Self {
        Self::build(Vec::new(), Vec::new(), files, sort)
    }

    pub fn items(&self) -> &[FileSystemObject] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.items.iter().filter_map(FileSystemObject::as_folder)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.items.iter().filter_map(FileSystemObject::as_group)
    }

    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.items.iter().filter_map(FileSystemObject::as_file)
    }

    pub fn find(&self, id: ObjectId) -> Option<&FileSystemObject> {
        self.items.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut FileSystemObject> {
        self.items.iter_mut().find(|o| o.id() == id)
    }

    /// Find by exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&FileSystemObject> {
        self.items.iter().find(|o| o.name() == name)
    }

    /// Drop the given ids from the visible list.
    pub fn remove_ids(&mut self, ids: &[ObjectId]) {
        self.items.retain(|o| !ids.contains(&o.id()));
    }
}
