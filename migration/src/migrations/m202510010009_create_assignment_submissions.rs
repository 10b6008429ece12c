use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010008_create_assignments"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010009_create_assignment_submissions"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("assignment_submissions"))
                    .col(common::id())
                    .col(ColumnDef::new(Alias::new("assignment_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("student_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("content")).text().not_null().default(""))
                    .col(ColumnDef::new(Alias::new("score")).double().null())
                    .col(ColumnDef::new(Alias::new("feedback")).text().null())
                    .col(common::created_now("submitted_at"))
                    .foreign_key(&mut common::fk(
                        "assignment_submissions",
                        "assignment_id",
                        "assignments",
                        ForeignKeyAction::Cascade,
                    ))
                    .foreign_key(&mut common::fk(
                        "assignment_submissions",
                        "student_id",
                        "users",
                        ForeignKeyAction::Cascade,
                    ))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("assignment_submissions")).to_owned())
            .await
    }
}
