use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{JoinType, QuerySelect};
use serde::{Deserialize, Serialize};

/// A named role. Every user holds exactly one.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Lowercase role name (`admin`, `lecturer`, `student`).
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,

    #[sea_orm(has_many = "super::role_permission::Entity")]
    RolePermissions,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::role_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RolePermissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        name: &str,
        description: Option<&str>,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_lowercase()),
            description: Set(description.map(str::to_owned)),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
    }

    pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Name.eq(name.to_lowercase()))
            .one(db)
            .await
    }

    /// Names of every permission granted to this role.
    pub async fn permission_names(db: &DatabaseConnection, role_id: &str) -> Result<Vec<String>, DbErr> {
        super::permission::Entity::find()
            .join(
                JoinType::InnerJoin,
                super::permission::Relation::RolePermissions.def(),
            )
            .filter(super::role_permission::Column::RoleId.eq(role_id))
            .select_only()
            .column(super::permission::Column::Name)
            .into_tuple::<String>()
            .all(db)
            .await
    }
}
