use sea_orm_migration::prelude::*;

use crate::ledger::{self, Unit};

/// SeaORM view of the ledger, in resolved dependency order.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        match ledger::ordered() {
            Ok(units) => units.into_iter().map(Unit::into_migration).collect(),
            Err(e) => panic!("migration ledger is invalid: {e}"),
        }
    }
}
