use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The single live refresh token of a user, stored as a SHA-256 digest.
///
/// Keyed by `user_id`, so storing a new token replaces the previous one.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "refresh_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

impl Model {
    /// Stores `token` for the user, replacing whatever was stored before.
    pub async fn store(
        db: &DatabaseConnection,
        user_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let active_model = ActiveModel {
            user_id: Set(user_id.to_owned()),
            token_hash: Set(hash_token(token)),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now()),
        };

        Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(Column::UserId)
                    .update_columns([Column::TokenHash, Column::ExpiresAt, Column::CreatedAt])
                    .to_owned(),
            )
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn find_for_user(db: &DatabaseConnection, user_id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(user_id).one(db).await
    }

    pub async fn revoke(db: &DatabaseConnection, user_id: &str) -> Result<(), DbErr> {
        Entity::delete_by_id(user_id).exec(db).await?;
        Ok(())
    }

    pub fn matches(&self, token: &str) -> bool {
        self.token_hash == hash_token(token) && self.expires_at > Utc::now()
    }
}
