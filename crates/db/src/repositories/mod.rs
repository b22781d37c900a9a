//! Repository abstractions for data access.
//!
//! Each repository owns one aggregate's queries; domain rules live in
//! `rentra-core` and are invoked here with account state injected as
//! closures over prefetched rows.

pub mod account;
pub mod adjustment;
pub mod balance;
pub mod journal;
pub mod numbering;
pub mod reconciliation;

pub use account::AccountRepository;
pub use adjustment::AdjustmentRepository;
pub use balance::BalanceRepository;
pub use journal::JournalRepository;
pub use numbering::NumberingRepository;
pub use reconciliation::ReconciliationRepository;
