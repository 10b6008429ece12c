use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &[];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010001_create_users"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("users"))
                    .col(common::id())
                    .col(ColumnDef::new(Alias::new("username")).string().not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("email")).string().not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("password_hash")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("role"))
                            .enumeration(
                                Alias::new("user_role"),
                                vec![Alias::new("student"), Alias::new("teacher"), Alias::new("admin")],
                            )
                            .not_null()
                            .default("student"),
                    )
                    .col(ColumnDef::new(Alias::new("first_name")).string().not_null().default(""))
                    .col(ColumnDef::new(Alias::new("last_name")).string().not_null().default(""))
                    .col(ColumnDef::new(Alias::new("is_active")).boolean().not_null().default(true))
                    .col(common::created_now("created_at"))
                    .col(common::created_now("updated_at"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("users")).to_owned())
            .await
    }
}
