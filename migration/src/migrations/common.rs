//! Column builders shared by several ledger units.

use sea_orm_migration::prelude::*;

pub fn id() -> ColumnDef {
    ColumnDef::new(Alias::new("id"))
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

pub fn created_now(name: &str) -> ColumnDef {
    ColumnDef::new(Alias::new(name))
        .timestamp()
        .not_null()
        .default(Expr::cust("CURRENT_TIMESTAMP"))
        .to_owned()
}

pub fn fk(from_table: &str, column: &str, to_table: &str, on_delete: ForeignKeyAction) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .from(Alias::new(from_table), Alias::new(column))
        .to(Alias::new(to_table), Alias::new("id"))
        .on_delete(on_delete)
        .to_owned()
}

/// Columns recording the outcome of an external AI-writing check.
/// All nullable or defaulted so rows are valid before any check runs.
pub fn ai_detection_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new(Alias::new("ai_detection_score")).double().null().to_owned(),
        ColumnDef::new(Alias::new("ai_detection_result"))
            .json()
            .not_null()
            .default("{}")
            .to_owned(),
        ColumnDef::new(Alias::new("ai_detection_performed"))
            .boolean()
            .not_null()
            .default(false)
            .to_owned(),
        ColumnDef::new(Alias::new("ai_detection_timestamp"))
            .timestamp()
            .null()
            .to_owned(),
        ColumnDef::new(Alias::new("is_flagged_ai"))
            .boolean()
            .not_null()
            .default(false)
            .to_owned(),
        ColumnDef::new(Alias::new("flag_reason")).text().null().to_owned(),
    ]
}

/// Adds one column per `ALTER TABLE`; SQLite rejects multi-column alters.
pub async fn add_column(manager: &SchemaManager<'_>, table: &str, column: ColumnDef) -> Result<(), DbErr> {
    manager
        .alter_table(
            Table::alter()
                .table(Alias::new(table))
                .add_column(column)
                .to_owned(),
        )
        .await
}

pub async fn drop_column(manager: &SchemaManager<'_>, table: &str, column: &str) -> Result<(), DbErr> {
    manager
        .alter_table(
            Table::alter()
                .table(Alias::new(table))
                .drop_column(Alias::new(column))
                .to_owned(),
        )
        .await
}

pub const AI_DETECTION_COLUMN_NAMES: [&str; 6] = [
    "ai_detection_score",
    "ai_detection_result",
    "ai_detection_performed",
    "ai_detection_timestamp",
    "is_flagged_ai",
    "flag_reason",
];
