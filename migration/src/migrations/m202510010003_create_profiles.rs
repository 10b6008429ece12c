use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010001_create_users"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010003_create_profiles"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("student_profiles"))
                    .col(common::id())
                    .col(ColumnDef::new(Alias::new("user_id")).integer().not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("grade_level")).string().null())
                    .col(ColumnDef::new(Alias::new("learning_goals")).text().not_null().default(""))
                    .col(common::created_now("created_at"))
                    .foreign_key(&mut common::fk(
                        "student_profiles",
                        "user_id",
                        "users",
                        ForeignKeyAction::Cascade,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("teacher_profiles"))
                    .col(common::id())
                    .col(ColumnDef::new(Alias::new("user_id")).integer().not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("specialization")).string().not_null().default(""))
                    .col(ColumnDef::new(Alias::new("bio")).text().not_null().default(""))
                    .col(common::created_now("created_at"))
                    .foreign_key(&mut common::fk(
                        "teacher_profiles",
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
            .drop_table(Table::drop().table(Alias::new("teacher_profiles")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("student_profiles")).to_owned())
            .await
    }
}
