use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010001_create_users"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010011_create_accessibility_preferences"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("accessibility_preferences"))
                    .col(common::id())
                    .col(ColumnDef::new(Alias::new("user_id")).integer().not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("font_scale")).double().not_null().default(1.0))
                    .col(ColumnDef::new(Alias::new("high_contrast")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("dyslexia_font")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("screen_reader")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("reduce_motion")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("text_to_speech")).boolean().not_null().default(false))
                    .col(common::created_now("updated_at"))
                    .foreign_key(&mut common::fk(
                        "accessibility_preferences",
                        "user_id",
                        "users",
                        ForeignKeyAction::Cascade,
                    ))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("accessibility_preferences")).to_owned())
            .await
    }
}
