use crate::models::{lecturer, student, user};
use crate::rbac::{self, RoleName};
use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// Fresh in-memory database with the schema applied and the role catalogue seeded.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    rbac::ensure_defaults(&db)
        .await
        .expect("Failed to seed roles and permissions");

    db
}

/// Creates an active user with the given role. The password is always `password123`.
pub async fn create_user(db: &DatabaseConnection, username: &str, role: RoleName) -> user::Model {
    let role = rbac::find_role(db, role)
        .await
        .expect("role lookup failed")
        .expect("role missing from catalogue");

    user::Model::create(
        db,
        username,
        &format!("{username}@test.com"),
        "password123",
        &format!("{username} test"),
        &role.id,
    )
    .await
    .expect("Failed to create user")
}

pub async fn create_lecturer(db: &DatabaseConnection, username: &str) -> (user::Model, lecturer::Model) {
    let user = create_user(db, username, RoleName::Lecturer).await;
    let lecturer = lecturer::Model::create(db, &user.id, &format!("L-{username}"), "Computer Science")
        .await
        .expect("Failed to create lecturer");
    (user, lecturer)
}

pub async fn create_student(
    db: &DatabaseConnection,
    username: &str,
    advisor_id: Option<&str>,
) -> (user::Model, student::Model) {
    let user = create_user(db, username, RoleName::Student).await;
    let student = student::Model::create(
        db,
        &user.id,
        &format!("S-{username}"),
        "Informatics",
        "2024",
        advisor_id,
    )
    .await
    .expect("Failed to create student");
    (user, student)
}
