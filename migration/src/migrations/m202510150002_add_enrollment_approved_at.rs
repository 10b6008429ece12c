use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &[
    "m202510010005_create_course_enrollments",
    "m202510150001_add_teacher_approval_status",
];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510150002_add_enrollment_approved_at"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        common::add_column(
            manager,
            "course_enrollments",
            ColumnDef::new(Alias::new("approved_at")).timestamp().null().to_owned(),
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        common::drop_column(manager, "course_enrollments", "approved_at").await
    }
}
