pub mod ledger;
pub mod migrations;
pub mod migrator;
pub mod runner;

pub use ledger::LedgerError;
pub use migrator::Migrator;
