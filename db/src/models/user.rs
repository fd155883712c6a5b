use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::Condition;
use serde::Serialize;
use std::sync::OnceLock;

/// Represents a user in the `users` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key (UUID v4 string).
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Unique login name.
    pub username: String,
    /// User's unique email address.
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    /// Foreign key to `roles`.
    pub role_id: String,
    /// Inactive users cannot log in.
    pub is_active: bool,
    /// Timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the user was last updated.
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id"
    )]
    Role,

    #[sea_orm(has_one = "super::student::Entity")]
    Student,

    #[sea_orm(has_one = "super::lecturer::Entity")]
    Lecturer,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::lecturer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lecturer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        username: &str,
        email: &str,
        password: &str,
        full_name: &str,
        role_id: &str,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            username: Set(username.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(Self::hash_password(password)?),
            full_name: Set(full_name.to_owned()),
            role_id: Set(role_id.to_owned()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
    }

    /// Looks a user up by username, falling back to email.
    pub async fn find_by_login(db: &DatabaseConnection, login: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(login))
                    .add(Column::Email.eq(login)),
            )
            .one(db)
            .await
    }

    pub fn hash_password(password: &str) -> Result<String, DbErr> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DbErr::Custom(format!("password hashing failed: {}", e)))
    }

    pub fn verify_password(&self, password: &str) -> bool {
        verify_hash(&self.password_hash, password)
    }

    /// Burns the same Argon2 work as a real check so that unknown usernames
    /// take as long to reject as wrong passwords.
    pub fn verify_against_dummy(password: &str) {
        static DUMMY: OnceLock<Option<String>> = OnceLock::new();
        if let Some(hash) = DUMMY.get_or_init(|| Self::hash_password("dummy-password").ok()) {
            let _ = verify_hash(hash, password);
        }
    }
}

fn verify_hash(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::RoleName;
    use crate::test_utils::{create_user, setup_test_db};

    #[tokio::test]
    async fn test_password_hash_roundtrip() {
        let db = setup_test_db().await;
        let user = create_user(&db, "alice", RoleName::Student).await;

        assert_ne!(user.password_hash, "password123");
        assert!(user.verify_password("password123"));
        assert!(!user.verify_password("wrong"));
    }

    #[tokio::test]
    async fn test_find_by_login_matches_username_or_email() {
        let db = setup_test_db().await;
        let user = create_user(&db, "bob", RoleName::Student).await;

        let by_name = Model::find_by_login(&db, "bob").await.unwrap().unwrap();
        let by_email = Model::find_by_login(&db, "bob@test.com").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_email.id, user.id);
        assert!(Model::find_by_login(&db, "nobody").await.unwrap().is_none());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let now = Utc::now();
        let model = Model {
            id: "u1".into(),
            username: "carol".into(),
            email: "carol@test.com".into(),
            password_hash: "secret".into(),
            full_name: "Carol".into(),
            role_id: "r1".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&model).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "carol");
    }
}
