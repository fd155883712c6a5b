use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::QueryOrder;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::achievement_reference::AchievementStatus;

/// One row per workflow transition of an achievement reference.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "achievement_status_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub reference_id: String,
    /// `None` for the creating transition.
    pub from_status: Option<String>,
    pub to_status: String,
    pub changed_by: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::achievement_reference::Entity",
        from = "Column::ReferenceId",
        to = "super::achievement_reference::Column::Id",
        on_delete = "Cascade"
    )]
    Reference,
}

impl Related<super::achievement_reference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reference.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn record(
        db: &DatabaseConnection,
        reference_id: &str,
        from: Option<AchievementStatus>,
        to: AchievementStatus,
        changed_by: Option<&str>,
        note: Option<&str>,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: NotSet,
            reference_id: Set(reference_id.to_owned()),
            from_status: Set(from.map(|s| s.to_string())),
            to_status: Set(to.to_string()),
            changed_by: Set(changed_by.map(str::to_owned)),
            note: Set(note.map(str::to_owned)),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
    }

    /// Oldest first.
    pub async fn for_reference(db: &DatabaseConnection, reference_id: &str) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ReferenceId.eq(reference_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }
}
