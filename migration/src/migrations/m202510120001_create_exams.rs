use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010004_create_courses"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510120001_create_exams"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("exams"))
                    .col(common::id())
                    .col(ColumnDef::new(Alias::new("course_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("title")).string().not_null())
                    .col(ColumnDef::new(Alias::new("description")).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Alias::new("exam_type"))
                            .enumeration(
                                Alias::new("exam_type"),
                                vec![Alias::new("Quiz"), Alias::new("Mid"), Alias::new("Final")],
                            )
                            .not_null()
                            .default("Quiz"),
                    )
                    .col(ColumnDef::new(Alias::new("total_marks")).integer().not_null().default(100))
                    .col(ColumnDef::new(Alias::new("duration_minutes")).integer().not_null().default(60))
                    .col(ColumnDef::new(Alias::new("due_date")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("question_count")).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .enumeration(
                                Alias::new("exam_status"),
                                vec![Alias::new("draft"), Alias::new("published"), Alias::new("completed")],
                            )
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Alias::new("questions_file")).string().null())
                    .col(ColumnDef::new(Alias::new("questions_filename")).string().null())
                    .col(common::created_now("created_at"))
                    .col(common::created_now("updated_at"))
                    .foreign_key(&mut common::fk("exams", "course_id", "courses", ForeignKeyAction::Cascade))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("exams")).to_owned())
            .await
    }
}
