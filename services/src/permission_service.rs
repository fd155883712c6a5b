use db::models::{role, user};
use db::rbac::Permission;
use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

/// A user together with their role name and granted permissions.
#[derive(Debug, Clone)]
pub struct ResolvedUser {
    pub user: user::Model,
    pub role: String,
    pub permissions: Vec<String>,
}

/// Maps users to their role and permission strings.
#[derive(Clone)]
pub struct PermissionResolver {
    db: DatabaseConnection,
}

impl PermissionResolver {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn resolve_user(&self, user: user::Model) -> ServiceResult<ResolvedUser> {
        let role = role::Entity::find_by_id(user.role_id.clone())
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::Internal(format!("user {} has no role", user.id)))?;

        let mut permissions = role::Model::permission_names(&self.db, &role.id).await?;
        permissions.sort();

        Ok(ResolvedUser {
            user,
            role: role.name,
            permissions,
        })
    }

    /// Permission list for a user id; used when a token carries none.
    pub async fn permissions_for_user(&self, user_id: &str) -> ServiceResult<Vec<String>> {
        let user = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("User no longer exists".into()))?;

        let resolved = self.resolve_user(user).await?;
        debug!(user_id, count = resolved.permissions.len(), "Loaded permissions from role");
        Ok(resolved.permissions)
    }

    pub fn authorize<S: AsRef<str>>(granted: &[S], required: Permission) -> bool {
        required.is_granted(granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::rbac::RoleName;
    use db::test_utils::{create_user, setup_test_db};

    #[tokio::test]
    async fn resolves_role_and_permissions_for_user() {
        let db = setup_test_db().await;
        let user = create_user(&db, "lect", RoleName::Lecturer).await;
        let resolver = PermissionResolver::new(db.clone());

        let resolved = resolver.resolve_user(user.clone()).await.unwrap();
        assert_eq!(resolved.role, "lecturer");
        assert!(resolved.permissions.contains(&"report:view".to_string()));

        let loaded = resolver.permissions_for_user(&user.id).await.unwrap();
        assert_eq!(loaded, resolved.permissions);
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let db = setup_test_db().await;
        let resolver = PermissionResolver::new(db);
        assert!(matches!(
            resolver.permissions_for_user("ghost").await,
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn authorize_matches_case_insensitively() {
        let granted = ["ACHIEVEMENT:LIST"];
        assert!(PermissionResolver::authorize(&granted, Permission::AchievementList));
        assert!(!PermissionResolver::authorize(&granted, Permission::AchievementView));
    }
}
