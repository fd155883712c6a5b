use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202510010001_create_roles::Migration),
            Box::new(migrations::m202510010002_create_permissions::Migration),
            Box::new(migrations::m202510010003_create_users::Migration),
            Box::new(migrations::m202510010004_create_lecturers::Migration),
            Box::new(migrations::m202510010005_create_students::Migration),
            Box::new(migrations::m202510010006_create_achievement_references::Migration),
            Box::new(migrations::m202510010007_create_achievement_status_history::Migration),
            Box::new(migrations::m202510010008_create_refresh_tokens::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Database;

    #[tokio::test]
    async fn migrations_apply_and_roll_back_cleanly() {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        Migrator::up(&db, None).await.unwrap();
        let manager = SchemaManager::new(&db);
        for table in [
            "roles",
            "permissions",
            "role_permissions",
            "users",
            "lecturers",
            "students",
            "achievement_references",
            "achievement_status_history",
            "refresh_tokens",
        ] {
            assert!(manager.has_table(table).await.unwrap(), "missing {table}");
        }

        Migrator::down(&db, None).await.unwrap();
        assert!(!manager.has_table("users").await.unwrap());
    }
}
