use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010006_create_assessments"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010007_create_student_answers"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("student_answers"))
                    .col(common::id())
                    .col(ColumnDef::new(Alias::new("assessment_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("student_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("answer_text")).text().not_null().default(""))
                    .col(ColumnDef::new(Alias::new("score")).double().null())
                    .col(common::created_now("submitted_at"))
                    .foreign_key(&mut common::fk(
                        "student_answers",
                        "assessment_id",
                        "assessments",
                        ForeignKeyAction::Cascade,
                    ))
                    .foreign_key(&mut common::fk(
                        "student_answers",
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
            .drop_table(Table::drop().table(Alias::new("student_answers")).to_owned())
            .await
    }
}
