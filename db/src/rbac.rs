//! Role and permission catalogue.
//!
//! Routes name the [`Permission`] they need at compile time. The check itself is
//! still a case-insensitive membership test over the permission strings carried
//! by the caller, so tokens minted before a grant change keep behaving the same.

use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tracing::info;
use uuid::Uuid;

use crate::models::{permission, role, role_permission};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RoleName {
    Admin,
    /// Academic advisor.
    Lecturer,
    Student,
}

impl RoleName {
    /// Parses a stored role name; anything unrecognised is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        name.trim().parse().ok()
    }

    pub fn description(&self) -> &'static str {
        match self {
            RoleName::Admin => "Full system access",
            RoleName::Lecturer => "Academic advisor who reviews advisee achievements",
            RoleName::Student => "Records and submits own achievements",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Permission {
    #[strum(serialize = "achievement:list")]
    AchievementList,
    #[strum(serialize = "achievement:view")]
    AchievementView,
    #[strum(serialize = "achievement:create")]
    AchievementCreate,
    #[strum(serialize = "achievement:update")]
    AchievementUpdate,
    #[strum(serialize = "achievement:delete")]
    AchievementDelete,
    #[strum(serialize = "achievement:submit")]
    AchievementSubmit,
    #[strum(serialize = "achievement:upload_attachment")]
    AchievementUploadAttachment,
    #[strum(serialize = "achievement:verify")]
    AchievementVerify,
    #[strum(serialize = "achievement:reject")]
    AchievementReject,
    #[strum(serialize = "report:view")]
    ReportView,
    #[strum(serialize = "user:manage")]
    UserManage,
    #[strum(serialize = "student:list")]
    StudentList,
    #[strum(serialize = "student:read")]
    StudentRead,
    #[strum(serialize = "student:achievements")]
    StudentAchievements,
    #[strum(serialize = "student:update_advisor")]
    StudentUpdateAdvisor,
    #[strum(serialize = "lecturer:list")]
    LecturerList,
    #[strum(serialize = "lecturer:advisees")]
    LecturerAdvisees,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn resource(&self) -> &'static str {
        self.as_str().split_once(':').map_or("", |(resource, _)| resource)
    }

    pub fn action(&self) -> &'static str {
        self.as_str().split_once(':').map_or("", |(_, action)| action)
    }

    /// Case-insensitive exact match against a granted permission list.
    /// No wildcards, no hierarchy.
    pub fn is_granted<S: AsRef<str>>(&self, granted: &[S]) -> bool {
        granted
            .iter()
            .any(|p| p.as_ref().trim().eq_ignore_ascii_case(self.as_str()))
    }
}

/// Default grants written by [`ensure_defaults`].
pub fn default_permissions(role: RoleName) -> Vec<Permission> {
    use Permission::*;

    match role {
        RoleName::Admin => Permission::iter().collect(),
        RoleName::Lecturer => vec![
            AchievementList,
            AchievementView,
            AchievementVerify,
            AchievementReject,
            ReportView,
            StudentList,
            StudentRead,
            StudentAchievements,
            LecturerList,
            LecturerAdvisees,
        ],
        RoleName::Student => vec![
            AchievementList,
            AchievementView,
            AchievementCreate,
            AchievementUpdate,
            AchievementDelete,
            AchievementSubmit,
            AchievementUploadAttachment,
        ],
    }
}

pub async fn find_role(db: &DatabaseConnection, name: RoleName) -> Result<Option<role::Model>, DbErr> {
    role::Model::find_by_name(db, name.into()).await
}

/// Inserts the role catalogue, the permission catalogue and the default grants.
/// Rows that already exist are left alone, so this is safe to run on every start.
pub async fn ensure_defaults(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut permission_ids = Vec::new();
    for p in Permission::iter() {
        let existing = permission::Entity::find()
            .filter(permission::Column::Name.eq(p.as_str()))
            .one(db)
            .await?;

        let id = match existing {
            Some(model) => model.id,
            None => {
                permission::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    name: Set(p.as_str().to_owned()),
                    resource: Set(p.resource().to_owned()),
                    action: Set(p.action().to_owned()),
                    description: Set(None),
                }
                .insert(db)
                .await?
                .id
            }
        };
        permission_ids.push((p, id));
    }

    let mut inserted_grants = 0usize;
    for name in RoleName::iter() {
        let role = match find_role(db, name).await? {
            Some(role) => role,
            None => role::Model::create(db, name.into(), Some(name.description())).await?,
        };

        let granted: HashSet<String> = role_permission::Entity::find()
            .filter(role_permission::Column::RoleId.eq(role.id.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|rp| rp.permission_id)
            .collect();

        let wanted = default_permissions(name);
        let missing: Vec<role_permission::ActiveModel> = permission_ids
            .iter()
            .filter(|(p, id)| wanted.contains(p) && !granted.contains(id))
            .map(|(_, id)| role_permission::ActiveModel {
                role_id: Set(role.id.clone()),
                permission_id: Set(id.clone()),
            })
            .collect();

        if !missing.is_empty() {
            inserted_grants += missing.len();
            role_permission::Entity::insert_many(missing).exec(db).await?;
        }
    }

    if inserted_grants > 0 {
        info!(grants = inserted_grants, "Seeded role permissions");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn permission_strings_split_into_resource_and_action() {
        let p = Permission::AchievementUploadAttachment;
        assert_eq!(p.as_str(), "achievement:upload_attachment");
        assert_eq!(p.resource(), "achievement");
        assert_eq!(p.action(), "upload_attachment");
        assert_eq!("REPORT:VIEW".parse::<Permission>().unwrap(), Permission::ReportView);
    }

    #[test]
    fn grant_check_is_case_insensitive_and_exact() {
        let granted = vec!["Achievement:Verify".to_string(), "report".to_string()];
        assert!(Permission::AchievementVerify.is_granted(&granted));
        assert!(!Permission::ReportView.is_granted(&granted));
        assert!(!Permission::AchievementReject.is_granted::<String>(&[]));
    }

    #[test]
    fn role_names_parse_loosely() {
        assert_eq!(RoleName::from_name(" Lecturer "), Some(RoleName::Lecturer));
        assert_eq!(RoleName::from_name("Dosen Wali"), None);
        assert_eq!(RoleName::Student.to_string(), "student");
    }

    #[tokio::test]
    async fn ensure_defaults_is_idempotent() {
        let db = setup_test_db().await;
        ensure_defaults(&db).await.unwrap();

        let roles = role::Entity::find().all(&db).await.unwrap();
        assert_eq!(roles.len(), 3);
        let grants = role_permission::Entity::find().all(&db).await.unwrap();
        let expected: usize = RoleName::iter().map(|r| default_permissions(r).len()).sum();
        assert_eq!(grants.len(), expected);

        let lecturer = find_role(&db, RoleName::Lecturer).await.unwrap().unwrap();
        let names = role::Model::permission_names(&db, &lecturer.id).await.unwrap();
        assert!(names.contains(&"achievement:verify".to_string()));
        assert!(!names.contains(&"achievement:create".to_string()));
    }
}
