use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010007_create_achievement_status_history"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("achievement_status_history"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("reference_id")).string().not_null())
                    .col(ColumnDef::new(Alias::new("from_status")).string())
                    .col(ColumnDef::new(Alias::new("to_status")).string().not_null())
                    .col(ColumnDef::new(Alias::new("changed_by")).string())
                    .col(ColumnDef::new(Alias::new("note")).text())
                    .col(ColumnDef::new(Alias::new("created_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_history_reference")
                            .from(Alias::new("achievement_status_history"), Alias::new("reference_id"))
                            .to(Alias::new("achievement_references"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("achievement_status_history")).to_owned())
            .await
    }
}
