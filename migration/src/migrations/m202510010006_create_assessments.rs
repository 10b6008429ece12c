use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010004_create_courses"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010006_create_assessments"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("assessments"))
                    .col(common::id())
                    .col(ColumnDef::new(Alias::new("course_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("title")).string().not_null())
                    .col(ColumnDef::new(Alias::new("description")).text().not_null().default(""))
                    .col(ColumnDef::new(Alias::new("total_marks")).integer().not_null().default(100))
                    .col(ColumnDef::new(Alias::new("due_date")).timestamp().null())
                    .col(common::created_now("created_at"))
                    .col(common::created_now("updated_at"))
                    .foreign_key(&mut common::fk("assessments", "course_id", "courses", ForeignKeyAction::Cascade))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("assessments")).to_owned())
            .await
    }
}
