//! Double-entry posting rules.
//!
//! This module implements the core ledger functionality:
//! - Chart of accounts typing and hierarchy rules
//! - Journal entry domain types
//! - Posting validation (balance, account, period-lock checks)
//! - Reversal mirroring
//! - Balance calculations
//! - Error types for ledger operations

pub mod account;
pub mod balance;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use account::{AccountRules, AccountType, NormalBalance};
pub use balance::{signed_balance, PeriodSummary};
pub use error::LedgerError;
pub use service::{AccountInfo, PostingService, ValidatedLine};
pub use types::{
    EntryLineInput, EntryType, JournalStatus, PostEntryInput, PostingTotals, ReferenceType,
};
