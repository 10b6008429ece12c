use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010003_create_profiles"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510150001_add_teacher_approval_status"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        common::add_column(
            manager,
            "teacher_profiles",
            ColumnDef::new(Alias::new("approval_status"))
                .enumeration(
                    Alias::new("teacher_approval_status"),
                    vec![Alias::new("pending"), Alias::new("approved"), Alias::new("rejected")],
                )
                .not_null()
                .default("pending")
                .to_owned(),
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        common::drop_column(manager, "teacher_profiles", "approval_status").await
    }
}
