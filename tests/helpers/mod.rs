//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use docvault_core::config::AppConfig;
use docvault_core::types::{DepartmentId, FolderPath, SortSpec, UserId};
use docvault_entity::file::File;
use docvault_entity::folder::Folder;
use docvault_entity::group::{DEFAULT_GROUP_COLOR, Group};
use docvault_entity::object::{FileSystemObject, LockInfo, ObjectMeta, Visibility, VisibilityScope};
use docvault_entity::principal::{Principal, Role};
use docvault_service::{BrowserSession, MemoryDocumentApi, RequestContext, Services, Snapshot};

/// A seeded in-memory vault with one department and a cast of users.
pub struct TestVault {
    pub api: Arc<MemoryDocumentApi>,
    pub services: Services,
    pub config: AppConfig,
    pub department: DepartmentId,
    /// Employee who owns the seeded objects.
    pub owner: Principal,
    /// Another employee in the same department.
    pub colleague: Principal,
    pub manager: Principal,
    pub admin: Principal,
}

impl TestVault {
    /// A vault with listing caching turned off so direct seeding is
    /// always visible.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.cache.enabled = false;
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> Self {
        let department = DepartmentId::new();
        let person = |name: &str, role: Role| {
            Principal::new(UserId::new(), role)
                .with_display_name(name)
                .with_department(department)
        };
        let owner = person("Olive", Role::Employee);
        let colleague = person("Casey", Role::Employee);
        let manager = person("Morgan", Role::Manager);
        let admin = person("Avery", Role::Admin);

        let snapshot = Snapshot {
            users: vec![owner.clone(), colleague.clone(), manager.clone(), admin.clone()],
            ..Snapshot::default()
        };
        let api = Arc::new(MemoryDocumentApi::new(snapshot, &config.operations));
        let services = Services::new(api.clone(), &config).expect("Failed to build services");

        Self {
            api,
            services,
            config,
            department,
            owner,
            colleague,
            manager,
            admin,
        }
    }

    pub fn ctx(&self, principal: &Principal) -> RequestContext {
        RequestContext::new(principal.clone())
    }

    pub fn scope(&self) -> VisibilityScope {
        VisibilityScope::department(Some(self.department))
    }

    fn meta(&self, name: &str) -> ObjectMeta {
        ObjectMeta::new(name, self.owner.id, self.owner.display_name.clone())
    }

    /// A department folder owned by `owner`.
    pub async fn folder(&self, name: &str, parent: &str) -> Folder {
        let mut folder = Folder::new(self.meta(name), path(parent));
        folder.department_id = Some(self.department);
        self.api.insert_folder(folder.clone()).await;
        folder
    }

    /// A department file owned by `owner`.
    pub async fn file(&self, name: &str, parent: &str, size: u64) -> File {
        let file = File::new(self.meta(name), path(parent))
            .with_size(size)
            .with_department(Some(self.department));
        self.api.insert_file(file.clone()).await;
        file
    }

    /// A department group owned by `owner`.
    pub async fn group(&self, name: &str, parent: &str) -> Group {
        let mut group = Group::new(self.meta(name), path(parent), DEFAULT_GROUP_COLOR);
        group.department_id = Some(self.department);
        self.api.insert_group(group.clone()).await;
        group
    }

    /// A private root folder owned by `principal`, holding one
    /// private file.
    pub async fn private_folder_with_file(
        &self,
        principal: &Principal,
        name: &str,
        file_name: &str,
    ) -> (Folder, File) {
        let mut folder = Folder::new(
            ObjectMeta::new(name, principal.id, principal.display_name.clone()),
            path(""),
        );
        folder.visibility = Visibility::Private;
        folder.department_id = None;
        self.api.insert_folder(folder.clone()).await;

        let file = File::new(
            ObjectMeta::new(file_name, principal.id, principal.display_name.clone()),
            path(name),
        )
        .with_size(1)
        .with_visibility(Visibility::Private);
        self.api.insert_file(file.clone()).await;
        (folder, file)
    }

    /// Lock an object server-side as if `locker` had locked it.
    pub async fn lock(
        &self,
        object: &FileSystemObject,
        locker: &Principal,
        requires_role: Option<Role>,
        password: Option<&str>,
    ) -> FileSystemObject {
        self.api
            .seed_lock(object.id(), LockInfo::new(locker.id, requires_role, false), password)
            .await
            .expect("Failed to seed lock");
        let mut locked = object.clone();
        locked.meta_mut().lock = Some(LockInfo::new(
            locker.id,
            requires_role,
            password.is_some(),
        ));
        locked
    }

    /// A browsing session at the department root.
    pub async fn session(&self, principal: &Principal) -> BrowserSession {
        BrowserSession::open(
            self.services.clone(),
            self.ctx(principal),
            self.scope(),
            SortSpec::default(),
        )
        .await
        .expect("Failed to open session")
    }
}

pub fn path(raw: &str) -> FolderPath {
    FolderPath::parse(raw).expect("Invalid test path")
}
