use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010009_create_assignment_submissions"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510080003_add_assignment_files_and_ai_detection"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        common::add_column(
            manager,
            "assignments",
            ColumnDef::new(Alias::new("attachment")).string().null().to_owned(),
        )
        .await?;
        common::add_column(
            manager,
            "assignments",
            ColumnDef::new(Alias::new("attachment_name")).string().null().to_owned(),
        )
        .await?;

        let file_columns = [
            ColumnDef::new(Alias::new("submission_file")).string().null().to_owned(),
            ColumnDef::new(Alias::new("submission_filename")).string().null().to_owned(),
            ColumnDef::new(Alias::new("submission_file_size"))
                .big_integer()
                .not_null()
                .default(0)
                .to_owned(),
        ];

        for column in file_columns.into_iter().chain(common::ai_detection_columns()) {
            common::add_column(manager, "assignment_submissions", column).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for column in common::AI_DETECTION_COLUMN_NAMES
            .iter()
            .chain(["submission_file_size", "submission_filename", "submission_file"].iter())
        {
            common::drop_column(manager, "assignment_submissions", column).await?;
        }
        common::drop_column(manager, "assignments", "attachment_name").await?;
        common::drop_column(manager, "assignments", "attachment").await
    }
}
