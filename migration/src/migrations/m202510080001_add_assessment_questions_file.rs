use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010006_create_assessments"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510080001_add_assessment_questions_file"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        common::add_column(
            manager,
            "assessments",
            ColumnDef::new(Alias::new("questions_file")).string().null().to_owned(),
        )
        .await?;
        common::add_column(
            manager,
            "assessments",
            ColumnDef::new(Alias::new("questions_filename")).string().null().to_owned(),
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        common::drop_column(manager, "assessments", "questions_filename").await?;
        common::drop_column(manager, "assessments", "questions_file").await
    }
}
