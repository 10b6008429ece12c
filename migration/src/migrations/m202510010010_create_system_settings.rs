use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010001_create_users"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010010_create_system_settings"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("system_settings"))
                    .col(common::id())
                    .col(ColumnDef::new(Alias::new("site_name")).string().not_null().default("Learning Platform"))
                    .col(ColumnDef::new(Alias::new("maintenance_mode")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("allow_registration")).boolean().not_null().default(true))
                    .col(ColumnDef::new(Alias::new("ai_flag_threshold")).double().not_null().default(70.0))
                    .col(ColumnDef::new(Alias::new("max_upload_mb")).integer().not_null().default(10))
                    .col(ColumnDef::new(Alias::new("updated_by")).integer().null())
                    .col(common::created_now("updated_at"))
                    .foreign_key(&mut common::fk(
                        "system_settings",
                        "updated_by",
                        "users",
                        ForeignKeyAction::SetNull,
                    ))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("system_settings")).to_owned())
            .await
    }
}
