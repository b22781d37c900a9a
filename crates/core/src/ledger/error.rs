//! Ledger error types for validation and state errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use rentra_shared::types::Currency;

use super::account::{AccountType, NormalBalance};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Posting Validation Errors ==========
    /// Journal entry must have at least one line.
    #[error("Journal entry must have at least one line")]
    EmptyEntry,

    /// Entry does not balance within a currency bucket.
    #[error("Entry is not balanced in {currency}. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// The currency bucket that fails to balance.
        currency: Currency,
        /// Total debits in that currency.
        debit: Decimal,
        /// Total credits in that currency.
        credit: Decimal,
    },

    /// Line amount must be positive.
    #[error("Line amount must be positive")]
    InvalidLineAmount,

    /// Line currency does not match the account's home currency.
    #[error("Line currency {line} does not match account {account_id} home currency {account}")]
    CurrencyMismatch {
        /// The account being posted to.
        account_id: Uuid,
        /// The currency on the line.
        line: Currency,
        /// The account's home currency.
        account: Currency,
    },

    // ========== Account Errors ==========
    /// Account not found or belongs to another landlord.
    #[error("Invalid account: {0}")]
    InvalidAccount(Uuid),

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    /// Account is referenced by postings or reserved by the system.
    #[error("Account {0} is in use and cannot be deactivated or retyped")]
    AccountInUse(Uuid),

    /// Account code already exists for this landlord.
    #[error("Account code '{0}' already exists")]
    DuplicateAccountCode(String),

    /// Declared normal balance contradicts the account type.
    #[error("Normal balance {normal_balance:?} does not match account type {account_type:?}")]
    NormalBalanceMismatch {
        /// The declared account type.
        account_type: AccountType,
        /// The declared normal balance.
        normal_balance: NormalBalance,
    },

    /// Parent chain would revisit the account.
    #[error("Account {0} cannot be its own ancestor")]
    ParentCycle(Uuid),

    /// Parent account belongs to a different landlord.
    #[error("Parent account {0} belongs to a different landlord")]
    ParentWrongLandlord(Uuid),

    // ========== Period Errors ==========
    /// Entry date falls inside a reconciled (locked) period.
    #[error("Period containing {entry_date} is locked for account {account_id}")]
    PeriodLocked {
        /// The account whose window is locked.
        account_id: Uuid,
        /// The rejected entry date.
        entry_date: NaiveDate,
    },

    // ========== Entry State Errors ==========
    /// Entry is already posted; void is no longer legal.
    #[error("Entry is already posted; use reversal instead of void")]
    EntryAlreadyPosted,

    /// Operation requires a posted entry.
    #[error("Entry {0} is not posted")]
    EntryNotPosted(Uuid),

    /// Entry has already been reversed.
    #[error("Entry {0} has already been reversed")]
    AlreadyReversed(Uuid),

    // ========== Numbering Errors ==========
    /// A document number collided. Indicates a concurrency bug; fatal.
    #[error("Duplicate document number issued: {0}")]
    DuplicateNumber(String),

    // ========== Period Window Errors ==========
    /// Period start falls after period end.
    #[error("Invalid period: {start} is after {end}")]
    InvalidPeriod {
        /// Requested window start.
        start: NaiveDate,
        /// Requested window end.
        end: NaiveDate,
    },

    // ========== Reconciliation Errors ==========
    /// Completion requested while the statement still disagrees.
    #[error("Reconciliation {0} has an unresolved discrepancy of {1}")]
    DiscrepancyUnresolved(Uuid, Decimal),

    /// Reconciliation window overlaps an existing one for the account.
    #[error("Reconciliation period overlaps an existing reconciliation for account {0}")]
    OverlappingReconciliation(Uuid),

    /// Illegal reconciliation state transition.
    #[error("Reconciliation cannot move from {from} to {to}")]
    InvalidReconciliationTransition {
        /// Current status.
        from: &'static str,
        /// Requested status.
        to: &'static str,
    },

    // ========== Adjustment Errors ==========
    /// Original and adjusted amounts are equal; no entry to build.
    #[error("Adjustment delta is zero; nothing to post")]
    NothingToAdjust,

    /// Illegal adjustment state transition.
    #[error("Adjustment cannot move from {from} to {to}")]
    InvalidAdjustmentTransition {
        /// Current status.
        from: &'static str,
        /// Requested status.
        to: &'static str,
    },

    /// Adjustment marked approved but its journal entry is missing.
    #[error("Adjustment {0} is approved but has no posted entry")]
    AdjustmentMissingEntry(Uuid),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::InvalidLineAmount => "INVALID_LINE_AMOUNT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::InvalidAccount(_) => "INVALID_ACCOUNT",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AccountInUse(_) => "ACCOUNT_IN_USE",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::NormalBalanceMismatch { .. } => "NORMAL_BALANCE_MISMATCH",
            Self::ParentCycle(_) => "PARENT_CYCLE",
            Self::ParentWrongLandlord(_) => "PARENT_WRONG_LANDLORD",
            Self::PeriodLocked { .. } => "PERIOD_LOCKED",
            Self::EntryAlreadyPosted => "ENTRY_ALREADY_POSTED",
            Self::EntryNotPosted(_) => "ENTRY_NOT_POSTED",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::DuplicateNumber(_) => "DUPLICATE_NUMBER",
            Self::DiscrepancyUnresolved(_, _) => "DISCREPANCY_UNRESOLVED",
            Self::OverlappingReconciliation(_) => "OVERLAPPING_RECONCILIATION",
            Self::InvalidReconciliationTransition { .. } => "INVALID_RECONCILIATION_TRANSITION",
            Self::NothingToAdjust => "NOTHING_TO_ADJUST",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::InvalidAdjustmentTransition { .. } => "INVALID_ADJUSTMENT_TRANSITION",
            Self::AdjustmentMissingEntry(_) => "ADJUSTMENT_MISSING_ENTRY",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::EmptyEntry
            | Self::UnbalancedEntry { .. }
            | Self::InvalidLineAmount
            | Self::CurrencyMismatch { .. }
            | Self::AccountInactive(_)
            | Self::NormalBalanceMismatch { .. }
            | Self::ParentCycle(_)
            | Self::ParentWrongLandlord(_)
            | Self::InvalidPeriod { .. }
            | Self::NothingToAdjust => 400,

            // 404 Not Found
            Self::InvalidAccount(_) | Self::EntryNotPosted(_) => 404,

            // 409 Conflict - state conflicts
            Self::AccountInUse(_)
            | Self::DuplicateAccountCode(_)
            | Self::EntryAlreadyPosted
            | Self::AlreadyReversed(_)
            | Self::OverlappingReconciliation(_)
            | Self::InvalidReconciliationTransition { .. }
            | Self::InvalidAdjustmentTransition { .. } => 409,

            // 422 Unprocessable - business rule violations
            Self::PeriodLocked { .. } | Self::DiscrepancyUnresolved(_, _) => 422,

            // 500 - internal invariant breaches
            Self::DuplicateNumber(_) | Self::AdjustmentMissingEntry(_) => 500,
        }
    }

    /// Returns true if this error indicates an internal invariant breach
    /// that should page rather than be retried.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateNumber(_) | Self::AdjustmentMissingEntry(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::UnbalancedEntry {
                currency: Currency::Ghs,
                debit: dec!(100),
                credit: dec!(50),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(LedgerError::EmptyEntry.error_code(), "EMPTY_ENTRY");
        assert_eq!(
            LedgerError::EntryAlreadyPosted.error_code(),
            "ENTRY_ALREADY_POSTED"
        );
        assert_eq!(
            LedgerError::DuplicateNumber("JE-2024-000045".into()).error_code(),
            "DUPLICATE_NUMBER"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::EmptyEntry.http_status_code(), 400);
        assert_eq!(
            LedgerError::InvalidAccount(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(LedgerError::EntryAlreadyPosted.http_status_code(), 409);
        assert_eq!(
            LedgerError::PeriodLocked {
                account_id: Uuid::nil(),
                entry_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::DuplicateNumber(String::new()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_duplicate_number_is_fatal() {
        assert!(LedgerError::DuplicateNumber(String::new()).is_fatal());
        assert!(!LedgerError::EmptyEntry.is_fatal());
        assert!(!LedgerError::EntryAlreadyPosted.is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedEntry {
            currency: Currency::Ghs,
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Entry is not balanced in GHS. Debit: 100.00, Credit: 50.00"
        );
    }
}
