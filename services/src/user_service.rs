use chrono::{DateTime, Utc};
use db::models::{lecturer, role, student, user};
use db::rbac::RoleName;
use db::repositories::AchievementReferenceRepository;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::{info, warn};
use util::pagination::{Page, Pagination};

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role_id: String,
    pub role: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<(user::Model, Option<role::Model>)> for UserView {
    fn from((user, role): (user::Model, Option<role::Model>)) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            role_id: user.role_id,
            role: role.map(|r| r.name),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewStudentProfile {
    pub student_number: String,
    pub program_study: String,
    pub academic_year: String,
    pub advisor_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewLecturerProfile {
    pub lecturer_number: String,
    pub department: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role_id: String,
    /// Only used when the role is `student`.
    pub student: Option<NewStudentProfile>,
    /// Only used when the role is `lecturer`.
    pub lecturer: Option<NewLecturerProfile>,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

pub struct UserService {
    db: DatabaseConnection,
    references: AchievementReferenceRepository,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        let references = AchievementReferenceRepository::new(db.clone());
        Self { db, references }
    }

    pub async fn list(&self, pagination: &Pagination) -> ServiceResult<Page<UserView>> {
        let rows = user::Entity::find()
            .find_also_related(role::Entity)
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await?;

        Ok(pagination.apply(rows.into_iter().map(UserView::from).collect()))
    }

    pub async fn get(&self, id: &str) -> ServiceResult<UserView> {
        user::Entity::find_by_id(id)
            .find_also_related(role::Entity)
            .one(&self.db)
            .await?
            .map(UserView::from)
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Creates the account and, when the role calls for one, its profile. If
    /// the profile insert fails the account is removed again.
    pub async fn create(&self, input: NewUser) -> ServiceResult<UserView> {
        let username = input.username.trim();
        let email = input.email.trim();
        let role = self.find_role(&input.role_id).await?;
        self.ensure_unique(None, Some(username), Some(email)).await?;

        if let Some(advisor_id) = input.student.as_ref().and_then(|s| s.advisor_id.as_deref()) {
            lecturer::Entity::find_by_id(advisor_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| ServiceError::Validation("advisor_id does not match any lecturer".into()))?;
        }

        let created = user::Model::create(
            &self.db,
            username,
            email,
            &input.password,
            input.full_name.trim(),
            &role.id,
        )
        .await?;

        let profile = match RoleName::from_name(&role.name) {
            Some(RoleName::Student) => match &input.student {
                Some(p) => student::Model::create(
                    &self.db,
                    &created.id,
                    &p.student_number,
                    &p.program_study,
                    &p.academic_year,
                    p.advisor_id.as_deref(),
                )
                .await
                .map(|_| ()),
                None => Ok(()),
            },
            Some(RoleName::Lecturer) => match &input.lecturer {
                Some(p) => lecturer::Model::create(&self.db, &created.id, &p.lecturer_number, &p.department)
                    .await
                    .map(|_| ()),
                None => Ok(()),
            },
            _ => Ok(()),
        };

        if let Err(err) = profile {
            warn!(user_id = %created.id, error = %err, "Profile insert failed; removing user");
            if let Err(cleanup) = created.clone().delete(&self.db).await {
                warn!(user_id = %created.id, error = %cleanup, "Failed to remove user after profile failure");
            }
            return Err(ServiceError::Validation(format!("could not create profile: {err}")));
        }

        info!(user_id = %created.id, role = %role.name, "User created");
        Ok(UserView::from((created, Some(role))))
    }

    pub async fn update(&self, id: &str, changes: UserChanges) -> ServiceResult<UserView> {
        let existing = user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let username = changes.username.as_deref().map(str::trim);
        let email = changes.email.as_deref().map(str::trim);
        self.ensure_unique(Some(id), username, email).await?;

        let mut active: user::ActiveModel = existing.into();
        if let Some(username) = username {
            active.username = Set(username.to_owned());
        }
        if let Some(email) = email {
            active.email = Set(email.to_owned());
        }
        if let Some(full_name) = changes.full_name {
            active.full_name = Set(full_name.trim().to_owned());
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;

        info!(user_id = id, "User updated");
        self.get(id).await
    }

    /// Refuses to delete a student that still owns achievement records. A
    /// lecturer's advisees are detached first.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let existing = user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        if let Some(student) = student::Model::find_by_user_id(&self.db, id).await? {
            if self.references.count_for_student(&student.id).await? > 0 {
                return Err(ServiceError::InvalidState(
                    "User still owns achievement records and cannot be deleted".into(),
                ));
            }
        }

        if let Some(lecturer) = lecturer::Model::find_by_user_id(&self.db, id).await? {
            let detached = student::Model::clear_advisor(&self.db, &lecturer.id).await?;
            info!(lecturer_id = %lecturer.id, detached, "Advisees detached from lecturer");
        }

        existing.delete(&self.db).await?;
        info!(user_id = id, "User deleted");
        Ok(())
    }

    pub async fn assign_role(&self, id: &str, role_id: &str) -> ServiceResult<UserView> {
        let role = self.find_role(role_id).await?;
        let existing = user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let mut active: user::ActiveModel = existing.into();
        active.role_id = Set(role.id.clone());
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;

        info!(user_id = id, role = %role.name, "Role assigned");
        Ok(UserView::from((updated, Some(role))))
    }

    async fn find_role(&self, role_id: &str) -> ServiceResult<role::Model> {
        role::Entity::find_by_id(role_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::Validation("role_id does not match any role".into()))
    }

    /// Username and email must stay unique; `exclude` is the user being edited.
    async fn ensure_unique(&self, exclude: Option<&str>, username: Option<&str>, email: Option<&str>) -> ServiceResult<()> {
        let mut condition = Condition::any();
        if let Some(username) = username {
            condition = condition.add(user::Column::Username.eq(username));
        }
        if let Some(email) = email {
            condition = condition.add(user::Column::Email.eq(email));
        }
        if username.is_none() && email.is_none() {
            return Ok(());
        }

        let mut query = user::Entity::find().filter(condition);
        if let Some(exclude) = exclude {
            query = query.filter(user::Column::Id.ne(exclude));
        }

        if query.one(&self.db).await?.is_some() {
            return Err(ServiceError::Validation("Username or email is already in use".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::rbac::find_role;
    use db::repositories::AchievementReferenceRepository;
    use db::test_utils::{create_lecturer, create_student, create_user, setup_test_db};

    async fn role_id(db: &DatabaseConnection, name: RoleName) -> String {
        find_role(db, name).await.unwrap().unwrap().id
    }

    fn new_user(username: &str, role_id: String) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@uni.test"),
            password: "secret123".to_string(),
            full_name: format!("{username} person"),
            role_id,
            student: None,
            lecturer: None,
        }
    }

    #[tokio::test]
    async fn create_student_user_with_profile() {
        let db = setup_test_db().await;
        let (_, advisor) = create_lecturer(&db, "prof").await;
        let service = UserService::new(db.clone());

        let mut input = new_user("newbie", role_id(&db, RoleName::Student).await);
        input.student = Some(NewStudentProfile {
            student_number: "S-100".into(),
            program_study: "Physics".into(),
            academic_year: "2025".into(),
            advisor_id: Some(advisor.id.clone()),
        });
        input.lecturer = Some(NewLecturerProfile {
            lecturer_number: "ignored".into(),
            department: "ignored".into(),
        });

        let created = service.create(input).await.unwrap();
        assert_eq!(created.role.as_deref(), Some("student"));

        let profile = student::Model::find_by_user_id(&db, &created.id).await.unwrap().unwrap();
        assert_eq!(profile.advisor_id.as_deref(), Some(advisor.id.as_str()));
        assert!(lecturer::Model::find_by_user_id(&db, &created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_unknown_role_and_duplicates() {
        let db = setup_test_db().await;
        create_user(&db, "taken", RoleName::Student).await;
        let service = UserService::new(db.clone());

        assert!(matches!(
            service.create(new_user("fresh", "no-such-role".into())).await,
            Err(ServiceError::Validation(_))
        ));

        let admin_role = role_id(&db, RoleName::Admin).await;
        assert!(matches!(
            service.create(new_user("taken", admin_role.clone())).await,
            Err(ServiceError::Validation(_))
        ));

        let mut padded = new_user("taken", admin_role);
        padded.username = "  taken ".into();
        padded.email = " taken@test.com".into();
        assert!(matches!(service.create(padded).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let db = setup_test_db().await;
        let user = create_user(&db, "edit", RoleName::Student).await;
        create_user(&db, "other", RoleName::Student).await;
        let service = UserService::new(db);

        let updated = service
            .update(
                &user.id,
                UserChanges {
                    full_name: Some("Edited Name".into()),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Edited Name");
        assert!(!updated.is_active);
        assert_eq!(updated.username, "edit");

        let err = service
            .update(
                &user.id,
                UserChanges {
                    email: Some("other@test.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_refuses_students_with_achievements() {
        let db = setup_test_db().await;
        let (user, student) = create_student(&db, "owner", None).await;
        let (empty_user, _) = create_student(&db, "empty", None).await;
        AchievementReferenceRepository::new(db.clone())
            .create(&student.id, "doc-1")
            .await
            .unwrap();
        let service = UserService::new(db.clone());

        assert!(matches!(
            service.delete(&user.id).await,
            Err(ServiceError::InvalidState(_))
        ));

        service.delete(&empty_user.id).await.unwrap();
        assert!(matches!(service.get(&empty_user.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn deleting_a_lecturer_detaches_advisees() {
        let db = setup_test_db().await;
        let (prof_user, prof) = create_lecturer(&db, "prof").await;
        let (_, advisee) = create_student(&db, "kid", Some(&prof.id)).await;
        let service = UserService::new(db.clone());

        service.delete(&prof_user.id).await.unwrap();

        let advisee = student::Entity::find_by_id(advisee.id).one(&db).await.unwrap().unwrap();
        assert!(advisee.advisor_id.is_none());
    }

    #[tokio::test]
    async fn assign_role_requires_existing_role() {
        let db = setup_test_db().await;
        let user = create_user(&db, "promote", RoleName::Student).await;
        let service = UserService::new(db.clone());

        assert!(matches!(
            service.assign_role(&user.id, "nope").await,
            Err(ServiceError::Validation(_))
        ));

        let updated = service
            .assign_role(&user.id, &role_id(&db, RoleName::Lecturer).await)
            .await
            .unwrap();
        assert_eq!(updated.role.as_deref(), Some("lecturer"));

        assert!(matches!(
            service.assign_role("ghost", &role_id(&db, RoleName::Admin).await).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_is_paginated() {
        let db = setup_test_db().await;
        for name in ["u1", "u2", "u3"] {
            create_user(&db, name, RoleName::Student).await;
        }
        let service = UserService::new(db);
        let page = service.list(&Pagination::new(Some(1), Some(2))).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|u| u.role.as_deref() == Some("student")));
    }
}
