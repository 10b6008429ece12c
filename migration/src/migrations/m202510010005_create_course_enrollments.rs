use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010004_create_courses"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010005_create_course_enrollments"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("course_enrollments"))
                    .col(common::id())
                    .col(ColumnDef::new(Alias::new("course_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("student_id")).integer().not_null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .enumeration(
                                Alias::new("enrollment_status"),
                                vec![Alias::new("pending"), Alias::new("approved"), Alias::new("rejected")],
                            )
                            .not_null()
                            .default("pending"),
                    )
                    .col(common::created_now("enrolled_at"))
                    .foreign_key(&mut common::fk(
                        "course_enrollments",
                        "course_id",
                        "courses",
                        ForeignKeyAction::Cascade,
                    ))
                    .foreign_key(&mut common::fk(
                        "course_enrollments",
                        "student_id",
                        "users",
                        ForeignKeyAction::Cascade,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_enrollments_course_student")
                    .table(Alias::new("course_enrollments"))
                    .col(Alias::new("course_id"))
                    .col(Alias::new("student_id"))
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("course_enrollments")).to_owned())
            .await
    }
}
