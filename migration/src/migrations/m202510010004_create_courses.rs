use super::common;
use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &["m202510010001_create_users", "m202510010002_create_subjects"];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010004_create_courses"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("courses"))
                    .col(common::id())
                    .col(ColumnDef::new(Alias::new("title")).string().not_null())
                    .col(ColumnDef::new(Alias::new("description")).text().not_null().default(""))
                    .col(ColumnDef::new(Alias::new("subject_id")).integer().null())
                    .col(ColumnDef::new(Alias::new("teacher_id")).integer().not_null())
                    .col(common::created_now("created_at"))
                    .col(common::created_now("updated_at"))
                    .foreign_key(&mut common::fk("courses", "subject_id", "subjects", ForeignKeyAction::SetNull))
                    .foreign_key(&mut common::fk("courses", "teacher_id", "users", ForeignKeyAction::Cascade))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("courses")).to_owned())
            .await
    }
}
