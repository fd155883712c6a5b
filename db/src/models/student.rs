use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryOrder;
use sea_orm::sea_query::Expr;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student profile, 1:1 with a user, optionally advised by one lecturer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub student_number: String,
    pub program_study: String,
    pub academic_year: String,
    /// Foreign key to `lecturers`. Cleared (not cascaded) when the lecturer goes away.
    pub advisor_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::lecturer::Entity",
        from = "Column::AdvisorId",
        to = "super::lecturer::Column::Id",
        on_delete = "SetNull"
    )]
    Advisor,

    #[sea_orm(has_many = "super::achievement_reference::Entity")]
    AchievementReferences,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::lecturer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Advisor.def()
    }
}

impl Related<super::achievement_reference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AchievementReferences.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        user_id: &str,
        student_number: &str,
        program_study: &str,
        academic_year: &str,
        advisor_id: Option<&str>,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_owned()),
            student_number: Set(student_number.to_owned()),
            program_study: Set(program_study.to_owned()),
            academic_year: Set(academic_year.to_owned()),
            advisor_id: Set(advisor_id.map(str::to_owned)),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
    }

    pub async fn find_by_user_id(db: &DatabaseConnection, user_id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    pub async fn find_by_advisor(db: &DatabaseConnection, lecturer_id: &str) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::AdvisorId.eq(lecturer_id))
            .order_by_asc(Column::StudentNumber)
            .all(db)
            .await
    }

    pub async fn set_advisor(
        db: &DatabaseConnection,
        student_id: &str,
        advisor_id: Option<&str>,
    ) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(student_id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Student not found".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        active_model.advisor_id = Set(advisor_id.map(str::to_owned));
        active_model.update(db).await
    }

    /// Detaches every advisee from a lecturer that is about to be removed.
    pub async fn clear_advisor(db: &DatabaseConnection, lecturer_id: &str) -> Result<u64, DbErr> {
        let result = Entity::update_many()
            .col_expr(Column::AdvisorId, Expr::value(Option::<String>::None))
            .filter(Column::AdvisorId.eq(lecturer_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
