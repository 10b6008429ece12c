use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510120001_create_exams", "m202510010001_create_users"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510120002_create_exam_attempts"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table
            .table(Alias::new("exam_attempts"))
            .col(common::id())
            .col(ColumnDef::new(Alias::new("exam_id")).integer().not_null())
            .col(ColumnDef::new(Alias::new("student_id")).integer().not_null())
            .col(ColumnDef::new(Alias::new("graded_by")).integer().null())
            .col(common::created_now("started_at"))
            .col(ColumnDef::new(Alias::new("submitted_at")).timestamp().null())
            .col(ColumnDef::new(Alias::new("time_taken_minutes")).integer().null())
            .col(ColumnDef::new(Alias::new("score")).double().null())
            .col(ColumnDef::new(Alias::new("percentage")).double().null())
            .col(ColumnDef::new(Alias::new("answer_file")).string().null())
            .col(ColumnDef::new(Alias::new("answer_filename")).string().null())
            .col(ColumnDef::new(Alias::new("answer_file_size")).big_integer().not_null().default(0))
            .col(ColumnDef::new(Alias::new("answer_text")).text().null());

        for column in common::ai_detection_columns() {
            table.col(column);
        }

        table
            .col(ColumnDef::new(Alias::new("feedback")).text().null())
            .col(ColumnDef::new(Alias::new("graded_at")).timestamp().null())
            .foreign_key(&mut common::fk("exam_attempts", "exam_id", "exams", ForeignKeyAction::Cascade))
            .foreign_key(&mut common::fk("exam_attempts", "student_id", "users", ForeignKeyAction::Cascade))
            .foreign_key(&mut common::fk("exam_attempts", "graded_by", "users", ForeignKeyAction::SetNull));

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("exam_attempts")).to_owned())
            .await
    }
}
