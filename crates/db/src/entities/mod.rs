//! `SeaORM` entity definitions.

pub mod account_balances;
pub mod adjustments;
pub mod chart_of_accounts;
pub mod journal_entries;
pub mod ledger_entries;
pub mod number_sequences;
pub mod reconciliations;
pub mod sea_orm_active_enums;
