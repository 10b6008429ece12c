//! Applies pending ledger units against a live connection.
//!
//! Applied unit names are kept in `seaql_migrations`, the same table SeaORM's
//! own migrator uses. Each unit runs in a transaction together with its
//! bookkeeping row, so a failing unit leaves neither schema changes nor a
//! ledger entry behind, and the run stops at the first failure.

use crate::ledger::{self, LedgerError, Unit};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use sea_orm_migration::prelude::*;
use std::collections::HashSet;
use std::time::{Duration, Instant};

pub const LEDGER_TABLE: &str = "seaql_migrations";

/// Progress notifications emitted while applying units.
#[derive(Debug)]
pub enum UnitEvent<'a> {
    Skipped(&'a str),
    Started(&'a str),
    Applied(&'a str, Duration),
    Failed(&'a str, &'a DbErr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitStatus {
    pub name: String,
    pub applied: bool,
}

pub async fn ensure_ledger_table(db: &DatabaseConnection) -> Result<(), DbErr> {
    SchemaManager::new(db)
        .create_table(
            Table::create()
                .table(Alias::new(LEDGER_TABLE))
                .if_not_exists()
                .col(
                    ColumnDef::new(Alias::new("version"))
                        .string()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(Alias::new("applied_at")).big_integer().not_null())
                .to_owned(),
        )
        .await
}

pub async fn applied_versions(db: &DatabaseConnection) -> Result<HashSet<String>, DbErr> {
    let select = Query::select()
        .column(Alias::new("version"))
        .from(Alias::new(LEDGER_TABLE))
        .to_owned();
    let backend = db.get_database_backend();

    db.query_all(backend.build(&select))
        .await?
        .iter()
        .map(|row| row.try_get::<String>("", "version"))
        .collect()
}

/// Applies one unit and records it, atomically.
pub async fn apply_unit(db: &DatabaseConnection, unit: &Unit) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    unit.migration().up(&SchemaManager::new(&txn)).await?;

    let insert = Query::insert()
        .into_table(Alias::new(LEDGER_TABLE))
        .columns([Alias::new("version"), Alias::new("applied_at")])
        .values_panic([unit.name().into(), chrono::Utc::now().timestamp().into()])
        .to_owned();
    let backend = txn.get_database_backend();
    txn.execute(backend.build(&insert)).await?;

    txn.commit().await
}

/// Applies every unit of `units` that is not yet recorded, in order.
/// Returns the names of the units applied by this call.
pub async fn apply_units<F>(
    db: &DatabaseConnection,
    units: &[Unit],
    mut observe: F,
) -> Result<Vec<String>, LedgerError>
where
    F: FnMut(UnitEvent<'_>),
{
    ensure_ledger_table(db).await?;
    let applied = applied_versions(db).await?;
    let mut newly_applied = Vec::new();

    for unit in units {
        if applied.contains(unit.name()) {
            observe(UnitEvent::Skipped(unit.name()));
            continue;
        }

        observe(UnitEvent::Started(unit.name()));
        let start = Instant::now();

        match apply_unit(db, unit).await {
            Ok(()) => {
                observe(UnitEvent::Applied(unit.name(), start.elapsed()));
                tracing::info!(migration = unit.name(), "Applied migration");
                newly_applied.push(unit.name().to_string());
            }
            Err(source) => {
                observe(UnitEvent::Failed(unit.name(), &source));
                tracing::error!(migration = unit.name(), error = %source, "Migration failed");
                return Err(LedgerError::Apply {
                    unit: unit.name().to_string(),
                    source,
                });
            }
        }
    }

    Ok(newly_applied)
}

/// Resolves the declared ledger and applies everything pending.
pub async fn apply_pending(db: &DatabaseConnection) -> Result<Vec<String>, LedgerError> {
    let units = ledger::ordered()?;
    apply_units(db, &units, |_| {}).await
}

/// Applied/pending state of every declared unit, in apply order.
pub async fn status(db: &DatabaseConnection) -> Result<Vec<UnitStatus>, LedgerError> {
    let units = ledger::ordered()?;
    ensure_ledger_table(db).await?;
    let applied = applied_versions(db).await?;

    Ok(units
        .iter()
        .map(|u| UnitStatus {
            name: u.name().to_string(),
            applied: applied.contains(u.name()),
        })
        .collect())
}
