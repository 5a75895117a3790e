//! Newtype wrappers around [`uuid::Uuid`] for all domain identifiers.
//!
//! Using distinct types prevents accidentally passing a `GroupId` where a
//! `FolderId` is expected. [`ObjectId`] is the tagged identifier of any
//! file-system object.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return the inner UUID value.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }

            /// Return a reference to the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user (principal).
    UserId
);

define_id!(
    /// Unique identifier for a file.
    FileId
);

define_id!(
    /// Unique identifier for a folder.
    FolderId
);

define_id!(
    /// Unique identifier for a file group.
    GroupId
);

define_id!(
    /// Unique identifier for a department.
    DepartmentId
);

/// The three kinds of file-system object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A regular file.
    File,
    /// A folder in the path tree.
    Folder,
    /// A flat, virtual collection of files.
    Group,
}

impl ObjectKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque identifier of any file-system object, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ObjectId {
    /// A file identifier.
    File(FileId),
    /// A folder identifier.
    Folder(FolderId),
    /// A group identifier.
    Group(GroupId),
}

impl ObjectId {
    /// The kind of object this identifier refers to.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::File(_) => ObjectKind::File,
            Self::Folder(_) => ObjectKind::Folder,
            Self::Group(_) => ObjectKind::Group,
        }
    }

    /// The underlying UUID regardless of kind.
    pub fn as_uuid(&self) -> &Uuid {
        match self {
            Self::File(id) => id.as_uuid(),
            Self::Folder(id) => id.as_uuid(),
            Self::Group(id) => id.as_uuid(),
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.as_uuid())
    }
}

impl FromStr for ObjectId {
    type Err = crate::error::AppError;

    /// Parses `file:<uuid>`, `folder:<uuid>`, or `group:<uuid>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, raw) = s.split_once(':').ok_or_else(|| {
            crate::error::AppError::validation(format!(
                "Invalid object id '{s}'. Expected '<file|folder|group>:<uuid>'"
            ))
        })?;
        let uuid = Uuid::parse_str(raw).map_err(|e| {
            crate::error::AppError::validation(format!("Invalid object id '{s}': {e}"))
        })?;
        match kind {
            "file" => Ok(Self::File(FileId(uuid))),
            "folder" => Ok(Self::Folder(FolderId(uuid))),
            "group" => Ok(Self::Group(GroupId(uuid))),
            other => Err(crate::error::AppError::validation(format!(
                "Unknown object kind '{other}'"
            ))),
        }
    }
}

impl From<FileId> for ObjectId {
    fn from(id: FileId) -> Self {
        Self::File(id)
    }
}

impl From<FolderId> for ObjectId {
    fn from(id: FolderId) -> Self {
        Self::Folder(id)
    }
}

impl From<GroupId> for ObjectId {
    fn from(id: GroupId) -> Self {
        Self::Group(id)
    }
}
