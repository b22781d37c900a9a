//! Postgres enum types mapped to Rust enums.
//!
//! Each enum mirrors a pure type in `rentra-core`; the `From` impls at the
//! bottom are the only place the two worlds convert.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account category (`account_type` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Obligations owed.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Owner's residual interest.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Income earned.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Costs incurred.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Side on which an account accumulates (`normal_balance` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "normal_balance")]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Grows with debits.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Grows with credits.
    #[sea_orm(string_value = "credit")]
    Credit,
}

/// Journal entry lifecycle (`journal_status` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_status")]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Drafted, not yet part of the ledger.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Committed; lines immutable.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Cancelled by a mirror entry.
    #[sea_orm(string_value = "reversed")]
    Reversed,
}

/// Business object a journal entry references (`reference_type` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reference_type")]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// A rent or service invoice.
    #[sea_orm(string_value = "invoice")]
    Invoice,
    /// A recorded payment.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// An approved financial adjustment.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    /// A correcting entry tied to a reconciliation.
    #[sea_orm(string_value = "reconciliation")]
    Reconciliation,
    /// A reversal of a previously posted entry.
    #[sea_orm(string_value = "reversal")]
    Reversal,
    /// A manually keyed entry.
    #[sea_orm(string_value = "manual")]
    Manual,
}

/// Reconciliation lifecycle (`reconciliation_status` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reconciliation_status")]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    /// Created, not yet evaluated.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Under investigation after a reopen.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Statement and system agree; period locked.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Statement and system disagree.
    #[sea_orm(string_value = "discrepancy")]
    Discrepancy,
}

/// Kind of financial adjustment (`adjustment_type` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "adjustment_type")]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// Correction of a billed rent amount.
    #[sea_orm(string_value = "rent_correction")]
    RentCorrection,
    /// Waiver of an assessed late fee.
    #[sea_orm(string_value = "late_fee_waiver")]
    LateFeeWaiver,
    /// Goodwill or promotional discount.
    #[sea_orm(string_value = "discount")]
    Discount,
    /// Amount written off as uncollectable.
    #[sea_orm(string_value = "write_off")]
    WriteOff,
    /// Refund owed back to a renter.
    #[sea_orm(string_value = "refund")]
    Refund,
}

/// Adjustment approval state (`adjustment_status` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "adjustment_status")]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    /// Awaiting an approver's decision.
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    /// Approved and posted.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected; terminal.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

// ============================================================================
// Conversions to/from the pure core types
// ============================================================================

impl From<rentra_core::ledger::AccountType> for AccountType {
    fn from(value: rentra_core::ledger::AccountType) -> Self {
        match value {
            rentra_core::ledger::AccountType::Asset => Self::Asset,
            rentra_core::ledger::AccountType::Liability => Self::Liability,
            rentra_core::ledger::AccountType::Equity => Self::Equity,
            rentra_core::ledger::AccountType::Revenue => Self::Revenue,
            rentra_core::ledger::AccountType::Expense => Self::Expense,
        }
    }
}

impl From<AccountType> for rentra_core::ledger::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<rentra_core::ledger::NormalBalance> for NormalBalance {
    fn from(value: rentra_core::ledger::NormalBalance) -> Self {
        match value {
            rentra_core::ledger::NormalBalance::Debit => Self::Debit,
            rentra_core::ledger::NormalBalance::Credit => Self::Credit,
        }
    }
}

impl From<NormalBalance> for rentra_core::ledger::NormalBalance {
    fn from(value: NormalBalance) -> Self {
        match value {
            NormalBalance::Debit => Self::Debit,
            NormalBalance::Credit => Self::Credit,
        }
    }
}

impl From<rentra_core::ledger::JournalStatus> for JournalStatus {
    fn from(value: rentra_core::ledger::JournalStatus) -> Self {
        match value {
            rentra_core::ledger::JournalStatus::Pending => Self::Pending,
            rentra_core::ledger::JournalStatus::Posted => Self::Posted,
            rentra_core::ledger::JournalStatus::Reversed => Self::Reversed,
        }
    }
}

impl From<JournalStatus> for rentra_core::ledger::JournalStatus {
    fn from(value: JournalStatus) -> Self {
        match value {
            JournalStatus::Pending => Self::Pending,
            JournalStatus::Posted => Self::Posted,
            JournalStatus::Reversed => Self::Reversed,
        }
    }
}

impl From<rentra_core::ledger::ReferenceType> for ReferenceType {
    fn from(value: rentra_core::ledger::ReferenceType) -> Self {
        match value {
            rentra_core::ledger::ReferenceType::Invoice => Self::Invoice,
            rentra_core::ledger::ReferenceType::Payment => Self::Payment,
            rentra_core::ledger::ReferenceType::Adjustment => Self::Adjustment,
            rentra_core::ledger::ReferenceType::Reconciliation => Self::Reconciliation,
            rentra_core::ledger::ReferenceType::Reversal => Self::Reversal,
            rentra_core::ledger::ReferenceType::Manual => Self::Manual,
        }
    }
}

impl From<ReferenceType> for rentra_core::ledger::ReferenceType {
    fn from(value: ReferenceType) -> Self {
        match value {
            ReferenceType::Invoice => Self::Invoice,
            ReferenceType::Payment => Self::Payment,
            ReferenceType::Adjustment => Self::Adjustment,
            ReferenceType::Reconciliation => Self::Reconciliation,
            ReferenceType::Reversal => Self::Reversal,
            ReferenceType::Manual => Self::Manual,
        }
    }
}

impl From<rentra_core::reconciliation::ReconciliationStatus> for ReconciliationStatus {
    fn from(value: rentra_core::reconciliation::ReconciliationStatus) -> Self {
        match value {
            rentra_core::reconciliation::ReconciliationStatus::Pending => Self::Pending,
            rentra_core::reconciliation::ReconciliationStatus::InProgress => Self::InProgress,
            rentra_core::reconciliation::ReconciliationStatus::Completed => Self::Completed,
            rentra_core::reconciliation::ReconciliationStatus::Discrepancy => Self::Discrepancy,
        }
    }
}

impl From<ReconciliationStatus> for rentra_core::reconciliation::ReconciliationStatus {
    fn from(value: ReconciliationStatus) -> Self {
        match value {
            ReconciliationStatus::Pending => Self::Pending,
            ReconciliationStatus::InProgress => Self::InProgress,
            ReconciliationStatus::Completed => Self::Completed,
            ReconciliationStatus::Discrepancy => Self::Discrepancy,
        }
    }
}

impl From<rentra_core::adjustment::AdjustmentType> for AdjustmentType {
    fn from(value: rentra_core::adjustment::AdjustmentType) -> Self {
        match value {
            rentra_core::adjustment::AdjustmentType::RentCorrection => Self::RentCorrection,
            rentra_core::adjustment::AdjustmentType::LateFeeWaiver => Self::LateFeeWaiver,
            rentra_core::adjustment::AdjustmentType::Discount => Self::Discount,
            rentra_core::adjustment::AdjustmentType::WriteOff => Self::WriteOff,
            rentra_core::adjustment::AdjustmentType::Refund => Self::Refund,
        }
    }
}

impl From<AdjustmentType> for rentra_core::adjustment::AdjustmentType {
    fn from(value: AdjustmentType) -> Self {
        match value {
            AdjustmentType::RentCorrection => Self::RentCorrection,
            AdjustmentType::LateFeeWaiver => Self::LateFeeWaiver,
            AdjustmentType::Discount => Self::Discount,
            AdjustmentType::WriteOff => Self::WriteOff,
            AdjustmentType::Refund => Self::Refund,
        }
    }
}

impl From<rentra_core::adjustment::AdjustmentStatus> for AdjustmentStatus {
    fn from(value: rentra_core::adjustment::AdjustmentStatus) -> Self {
        match value {
            rentra_core::adjustment::AdjustmentStatus::PendingApproval => Self::PendingApproval,
            rentra_core::adjustment::AdjustmentStatus::Approved => Self::Approved,
            rentra_core::adjustment::AdjustmentStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<AdjustmentStatus> for rentra_core::adjustment::AdjustmentStatus {
    fn from(value: AdjustmentStatus) -> Self {
        match value {
            AdjustmentStatus::PendingApproval => Self::PendingApproval,
            AdjustmentStatus::Approved => Self::Approved,
            AdjustmentStatus::Rejected => Self::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_roundtrip() {
        for core in [
            rentra_core::ledger::AccountType::Asset,
            rentra_core::ledger::AccountType::Liability,
            rentra_core::ledger::AccountType::Equity,
            rentra_core::ledger::AccountType::Revenue,
            rentra_core::ledger::AccountType::Expense,
        ] {
            let db: AccountType = core.into();
            let back: rentra_core::ledger::AccountType = db.into();
            assert_eq!(back, core);
        }
    }

    #[test]
    fn test_journal_status_roundtrip() {
        for core in [
            rentra_core::ledger::JournalStatus::Pending,
            rentra_core::ledger::JournalStatus::Posted,
            rentra_core::ledger::JournalStatus::Reversed,
        ] {
            let db: JournalStatus = core.into();
            let back: rentra_core::ledger::JournalStatus = db.into();
            assert_eq!(back, core);
        }
    }

    #[test]
    fn test_reconciliation_status_roundtrip() {
        for core in [
            rentra_core::reconciliation::ReconciliationStatus::Pending,
            rentra_core::reconciliation::ReconciliationStatus::InProgress,
            rentra_core::reconciliation::ReconciliationStatus::Completed,
            rentra_core::reconciliation::ReconciliationStatus::Discrepancy,
        ] {
            let db: ReconciliationStatus = core.into();
            let back: rentra_core::reconciliation::ReconciliationStatus = db.into();
            assert_eq!(back, core);
        }
    }
}
