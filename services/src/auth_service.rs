use std::sync::Arc;

use db::models::{lecturer, refresh_token, student, user};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::permission_service::PermissionResolver;
use crate::token::TokenIssuer;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResult {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub user: user::Model,
    pub role: String,
    pub permissions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<student::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecturer: Option<lecturer::Model>,
}

pub struct AuthService {
    db: DatabaseConnection,
    tokens: Arc<TokenIssuer>,
    resolver: PermissionResolver,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, tokens: Arc<TokenIssuer>) -> Self {
        let resolver = PermissionResolver::new(db.clone());
        Self { db, tokens, resolver }
    }

    /// `login` may be a username or an email address.
    pub async fn login(&self, login: &str, password: &str) -> ServiceResult<LoginResult> {
        let Some(user) = user::Model::find_by_login(&self.db, login.trim()).await? else {
            user::Model::verify_against_dummy(password);
            warn!(login, "Login failed: unknown user");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        if !user.verify_password(password) {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        if !user.is_active {
            warn!(user_id = %user.id, "Login failed: account inactive");
            return Err(ServiceError::Unauthorized("Account is inactive".into()));
        }

        let resolved = self.resolver.resolve_user(user).await?;
        let tokens = self
            .issue_pair(
                &resolved.user.id,
                &resolved.user.username,
                &resolved.role,
                resolved.permissions.clone(),
            )
            .await?;

        info!(user_id = %resolved.user.id, role = %resolved.role, "User logged in");
        Ok(LoginResult {
            tokens,
            user: UserSummary {
                id: resolved.user.id,
                username: resolved.user.username,
                full_name: resolved.user.full_name,
                email: resolved.user.email,
                role: resolved.role,
                permissions: resolved.permissions,
            },
        })
    }

    /// Rotates a refresh token. The presented token must be the one currently
    /// stored for its subject.
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<TokenPair> {
        let claims = self
            .tokens
            .decode_refresh(refresh_token)
            .map_err(|_| ServiceError::Unauthorized("Invalid or expired refresh token".into()))?;

        let stored = refresh_token::Model::find_for_user(&self.db, &claims.sub).await?;
        if !stored.is_some_and(|s| s.matches(refresh_token)) {
            warn!(user_id = %claims.sub, "Refresh with revoked token");
            return Err(ServiceError::Unauthorized("Refresh token has been revoked".into()));
        }

        let user = user::Entity::find_by_id(claims.sub.clone())
            .one(&self.db)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| ServiceError::Unauthorized("Account is no longer active".into()))?;

        let resolved = self.resolver.resolve_user(user).await?;
        self.issue_pair(
            &resolved.user.id,
            &resolved.user.username,
            &resolved.role,
            resolved.permissions,
        )
        .await
    }

    pub async fn logout(&self, user_id: &str) -> ServiceResult<()> {
        refresh_token::Model::revoke(&self.db, user_id).await?;
        info!(user_id, "User logged out");
        Ok(())
    }

    pub async fn profile(&self, user_id: &str) -> ServiceResult<Profile> {
        let user = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let resolved = self.resolver.resolve_user(user).await?;
        let student = student::Model::find_by_user_id(&self.db, user_id).await?;
        let lecturer = lecturer::Model::find_by_user_id(&self.db, user_id).await?;

        Ok(Profile {
            user: resolved.user,
            role: resolved.role,
            permissions: resolved.permissions,
            student,
            lecturer,
        })
    }

    async fn issue_pair(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        permissions: Vec<String>,
    ) -> ServiceResult<TokenPair> {
        let access = self.tokens.issue_access(user_id, username, role, permissions)?;
        let refresh = self.tokens.issue_refresh(user_id)?;
        refresh_token::Model::store(&self.db, user_id, &refresh.token, refresh.expires_at).await?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "Bearer",
            expires_in: self.tokens.access_ttl().num_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tests::test_issuer;
    use db::rbac::RoleName;
    use db::test_utils::{create_student, create_user, setup_test_db};
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, IntoActiveModel};

    async fn service() -> (AuthService, DatabaseConnection) {
        let db = setup_test_db().await;
        (AuthService::new(db.clone(), Arc::new(test_issuer())), db)
    }

    #[tokio::test]
    async fn login_with_username_or_email() {
        let (auth, db) = service().await;
        create_user(&db, "admin1", RoleName::Admin).await;

        let by_name = auth.login("admin1", "password123").await.unwrap();
        assert_eq!(by_name.user.role, "admin");
        assert!(by_name.user.permissions.contains(&"user:manage".to_string()));

        let by_email = auth.login("admin1@test.com", "password123").await.unwrap();
        assert_eq!(by_email.user.id, by_name.user.id);
    }

    #[tokio::test]
    async fn login_failures_are_unauthorized() {
        let (auth, db) = service().await;
        let user = create_user(&db, "sleepy", RoleName::Student).await;

        assert_eq!(
            auth.login("nobody", "password123").await.unwrap_err(),
            ServiceError::Unauthorized(INVALID_CREDENTIALS.into())
        );
        assert_eq!(
            auth.login("sleepy", "wrong").await.unwrap_err(),
            ServiceError::Unauthorized(INVALID_CREDENTIALS.into())
        );

        let mut am = user.into_active_model();
        am.is_active = Set(false);
        am.update(&db).await.unwrap();
        assert!(matches!(
            auth.login("sleepy", "password123").await,
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn access_token_embeds_resolved_permissions() {
        let (auth, db) = service().await;
        create_user(&db, "stud", RoleName::Student).await;

        let result = auth.login("stud", "password123").await.unwrap();
        let claims = test_issuer().decode_access(&result.tokens.access_token).unwrap();
        assert_eq!(claims.username, "stud");
        assert_eq!(claims.role, "student");
        assert!(claims.permissions.contains(&"achievement:create".to_string()));
        assert!(!claims.permissions.contains(&"achievement:verify".to_string()));
    }

    #[tokio::test]
    async fn refresh_rotates_and_revokes_previous_token() {
        let (auth, db) = service().await;
        create_user(&db, "rot", RoleName::Student).await;

        let login = auth.login("rot", "password123").await.unwrap();
        let first = login.tokens.refresh_token;

        let rotated = auth.refresh(&first).await.unwrap();
        assert_ne!(rotated.refresh_token, first);

        assert_eq!(
            auth.refresh(&first).await.unwrap_err(),
            ServiceError::Unauthorized("Refresh token has been revoked".into())
        );
        assert!(auth.refresh(&rotated.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn logout_revokes_refresh_token() {
        let (auth, db) = service().await;
        let user = create_user(&db, "bye", RoleName::Student).await;

        let login = auth.login("bye", "password123").await.unwrap();
        auth.logout(&user.id).await.unwrap();

        assert_eq!(
            auth.refresh(&login.tokens.refresh_token).await.unwrap_err(),
            ServiceError::Unauthorized("Refresh token has been revoked".into())
        );
    }

    #[tokio::test]
    async fn garbage_refresh_token_is_invalid_not_revoked() {
        let (auth, _) = service().await;
        assert_eq!(
            auth.refresh("not-a-jwt").await.unwrap_err(),
            ServiceError::Unauthorized("Invalid or expired refresh token".into())
        );
    }

    #[tokio::test]
    async fn profile_includes_student_extension() {
        let (auth, db) = service().await;
        let (user, student) = create_student(&db, "prof", None).await;

        let profile = auth.profile(&user.id).await.unwrap();
        assert_eq!(profile.role, "student");
        assert_eq!(profile.student.map(|s| s.id), Some(student.id));
        assert!(profile.lecturer.is_none());
    }
}
