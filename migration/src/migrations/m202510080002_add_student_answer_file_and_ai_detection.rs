use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &[
    "m202510010007_create_student_answers",
    "m202510080001_add_assessment_questions_file",
];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510080002_add_student_answer_file_and_ai_detection"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let file_columns = [
            ColumnDef::new(Alias::new("answer_file")).string().null().to_owned(),
            ColumnDef::new(Alias::new("answer_filename")).string().null().to_owned(),
            ColumnDef::new(Alias::new("answer_file_size"))
                .big_integer()
                .not_null()
                .default(0)
                .to_owned(),
        ];

        for column in file_columns.into_iter().chain(common::ai_detection_columns()) {
            common::add_column(manager, "student_answers", column).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for column in common::AI_DETECTION_COLUMN_NAMES
            .iter()
            .chain(["answer_file_size", "answer_filename", "answer_file"].iter())
        {
            common::drop_column(manager, "student_answers", column).await?;
        }
        Ok(())
    }
}
