use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};

use crate::seed::Seeder;

pub struct RbacSeeder;

#[async_trait]
impl Seeder for RbacSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        db::rbac::ensure_defaults(db).await
    }
}
