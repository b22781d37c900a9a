//! Ledger domain types for journal entry creation and validation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentra_shared::types::Currency;

/// Entry type: either Debit or Credit.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

/// Journal entry status.
///
/// Entries are immutable once posted; correction is always a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Drafted, not yet part of the ledger. May be voided (deleted).
    Pending,
    /// Committed to the ledger. Line set is immutable.
    Posted,
    /// Posted and subsequently cancelled by a mirror entry. Lines untouched.
    Reversed,
}

impl JournalStatus {
    /// Returns true if the entry may be voided (deleted outright).
    #[must_use]
    pub fn can_void(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if the entry may be reversed.
    #[must_use]
    pub fn can_reverse(self) -> bool {
        matches!(self, Self::Posted)
    }

    /// Returns true if the entry's lines contribute to balances.
    #[must_use]
    pub fn affects_balances(self) -> bool {
        matches!(self, Self::Posted | Self::Reversed)
    }
}

/// The kind of business object that caused a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// A rent or service invoice.
    Invoice,
    /// A recorded payment.
    Payment,
    /// An approved financial adjustment.
    Adjustment,
    /// A correcting entry tied to a reconciliation.
    Reconciliation,
    /// A reversal of a previously posted entry.
    Reversal,
    /// A manually keyed journal entry.
    Manual,
}

/// Input for a single ledger line in a journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLineInput {
    /// The account to post to.
    pub account_id: Uuid,
    /// Line currency. Must match the account's home currency.
    pub currency: Currency,
    /// The amount (must be positive).
    pub amount: Decimal,
    /// Whether this is a debit or credit line.
    pub entry_type: EntryType,
    /// Optional memo/description for this line.
    pub memo: Option<String>,
    /// Optional property tag for reporting.
    pub property_id: Option<Uuid>,
    /// Optional unit tag for reporting.
    pub unit_id: Option<Uuid>,
    /// Optional renter tag for reporting.
    pub renter_id: Option<Uuid>,
}

/// Input for posting a journal entry.
#[derive(Debug, Clone)]
pub struct PostEntryInput {
    /// The landlord this entry belongs to.
    pub landlord_id: Uuid,
    /// The effective date of the entry.
    pub entry_date: NaiveDate,
    /// A description of the transaction.
    pub description: String,
    /// Optional reference to the business object that caused it.
    pub reference: Option<(ReferenceType, Uuid)>,
    /// The ledger lines (must balance per currency).
    pub lines: Vec<EntryLineInput>,
    /// The user creating the entry.
    pub created_by: Uuid,
}

/// Per-currency debit/credit totals for a batch of lines.
///
/// An entry balances when every currency bucket balances on its own;
/// cross-currency movements must be transacted through an explicit FX
/// account so each bucket still nets to zero.
#[derive(Debug, Clone, Default)]
pub struct PostingTotals {
    buckets: BTreeMap<Currency, (Decimal, Decimal)>,
}

impl PostingTotals {
    /// Accumulates a line into its currency bucket.
    pub fn add(&mut self, currency: Currency, debit: Decimal, credit: Decimal) {
        let bucket = self.buckets.entry(currency).or_default();
        bucket.0 += debit;
        bucket.1 += credit;
    }

    /// Returns true if every currency bucket has equal debits and credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.buckets.values().all(|(debit, credit)| debit == credit)
    }

    /// Returns the first unbalanced bucket, if any.
    #[must_use]
    pub fn first_imbalance(&self) -> Option<(Currency, Decimal, Decimal)> {
        self.buckets
            .iter()
            .find(|(_, (debit, credit))| debit != credit)
            .map(|(currency, (debit, credit))| (*currency, *debit, *credit))
    }

    /// Returns the (debit, credit) totals for a currency, if present.
    #[must_use]
    pub fn totals_for(&self, currency: Currency) -> Option<(Decimal, Decimal)> {
        self.buckets.get(&currency).copied()
    }

    /// Iterates over all currency buckets.
    pub fn iter(&self) -> impl Iterator<Item = (Currency, Decimal, Decimal)> + '_ {
        self.buckets
            .iter()
            .map(|(currency, (debit, credit))| (*currency, *debit, *credit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_can_void() {
        assert!(JournalStatus::Pending.can_void());
        assert!(!JournalStatus::Posted.can_void());
        assert!(!JournalStatus::Reversed.can_void());
    }

    #[test]
    fn test_status_can_reverse() {
        assert!(!JournalStatus::Pending.can_reverse());
        assert!(JournalStatus::Posted.can_reverse());
        assert!(!JournalStatus::Reversed.can_reverse());
    }

    #[test]
    fn test_status_affects_balances() {
        assert!(!JournalStatus::Pending.affects_balances());
        assert!(JournalStatus::Posted.affects_balances());
        assert!(JournalStatus::Reversed.affects_balances());
    }

    #[test]
    fn test_totals_balanced_single_currency() {
        let mut totals = PostingTotals::default();
        totals.add(Currency::Ghs, dec!(1500), Decimal::ZERO);
        totals.add(Currency::Ghs, Decimal::ZERO, dec!(1500));
        assert!(totals.is_balanced());
        assert!(totals.first_imbalance().is_none());
    }

    #[test]
    fn test_totals_unbalanced() {
        let mut totals = PostingTotals::default();
        totals.add(Currency::Ghs, dec!(100), Decimal::ZERO);
        totals.add(Currency::Ghs, Decimal::ZERO, dec!(50));
        assert!(!totals.is_balanced());

        let (currency, debit, credit) = totals.first_imbalance().unwrap();
        assert_eq!(currency, Currency::Ghs);
        assert_eq!(debit, dec!(100));
        assert_eq!(credit, dec!(50));
    }

    #[test]
    fn test_totals_per_currency_buckets() {
        // Balanced GHS bucket plus balanced USD bucket is balanced overall.
        let mut totals = PostingTotals::default();
        totals.add(Currency::Ghs, dec!(100), Decimal::ZERO);
        totals.add(Currency::Ghs, Decimal::ZERO, dec!(100));
        totals.add(Currency::Usd, dec!(40), Decimal::ZERO);
        totals.add(Currency::Usd, Decimal::ZERO, dec!(40));
        assert!(totals.is_balanced());

        // Buckets do not net against each other across currencies.
        let mut cross = PostingTotals::default();
        cross.add(Currency::Ghs, dec!(100), Decimal::ZERO);
        cross.add(Currency::Usd, Decimal::ZERO, dec!(100));
        assert!(!cross.is_balanced());
    }
}
