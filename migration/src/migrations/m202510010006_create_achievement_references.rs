use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010006_create_achievement_references"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("achievement_references"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).string().not_null().primary_key())
                    .col(ColumnDef::new(Alias::new("student_id")).string().not_null())
                    .col(ColumnDef::new(Alias::new("document_id")).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .enumeration(
                                Alias::new("achievement_status"),
                                vec![
                                    Alias::new("draft"),
                                    Alias::new("submitted"),
                                    Alias::new("verified"),
                                    Alias::new("rejected"),
                                    Alias::new("deleted"),
                                ],
                            )
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Alias::new("submitted_at")).timestamp())
                    .col(ColumnDef::new(Alias::new("verified_at")).timestamp())
                    .col(ColumnDef::new(Alias::new("verified_by")).string())
                    .col(ColumnDef::new(Alias::new("rejection_note")).text())
                    .col(ColumnDef::new(Alias::new("created_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Alias::new("updated_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_achievement_references_student")
                            .from(Alias::new("achievement_references"), Alias::new("student_id"))
                            .to(Alias::new("students"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_achievement_references_verifier")
                            .from(Alias::new("achievement_references"), Alias::new("verified_by"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_achievement_references_student_status")
                    .table(Alias::new("achievement_references"))
                    .col(Alias::new("student_id"))
                    .col(Alias::new("status"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("achievement_references")).to_owned())
            .await
    }
}
