//! Posting validation and reversal mirroring.
//!
//! This module provides the core business logic for validating journal
//! entries before they are persisted. It is pure: account state and
//! period-lock information are injected as closures so the same rules run
//! identically in the repository layer and in tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use rentra_shared::types::Currency;

use super::error::LedgerError;
use super::types::{EntryType, JournalStatus, PostEntryInput, PostingTotals};

/// Information about an account needed for posting validation.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// The landlord that owns the account.
    pub landlord_id: Uuid,
    /// Whether the account is active.
    pub is_active: bool,
    /// The account's home currency.
    pub currency: Currency,
}

/// A validated ledger line ready for persistence.
#[derive(Debug, Clone)]
pub struct ValidatedLine {
    /// The account to post to.
    pub account_id: Uuid,
    /// Line currency (equal to the account's home currency).
    pub currency: Currency,
    /// Debit amount (zero for credit lines).
    pub debit: Decimal,
    /// Credit amount (zero for debit lines).
    pub credit: Decimal,
    /// Optional memo.
    pub memo: Option<String>,
    /// Optional property tag.
    pub property_id: Option<Uuid>,
    /// Optional unit tag.
    pub unit_id: Option<Uuid>,
    /// Optional renter tag.
    pub renter_id: Option<Uuid>,
}

/// Posting validation service.
///
/// All checks run before any write; a failed validation leaves no trace.
pub struct PostingService;

impl PostingService {
    /// Validates a proposed journal entry.
    ///
    /// Steps, in order:
    /// 1. Lines are non-empty
    /// 2. Every line amount is positive, exactly one side per line
    /// 3. Every account exists under the posting landlord and is active
    /// 4. Every line currency matches its account's home currency
    /// 5. No referenced account has a reconciled window covering the entry date
    /// 6. Per-currency debit/credit sums are equal
    ///
    /// # Arguments
    ///
    /// * `input` - The proposed entry
    /// * `account_lookup` - Resolves an account ID to its posting info
    /// * `period_locked` - True when the account has a completed
    ///   reconciliation whose window contains or follows the entry date
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` encountered; no partial state exists.
    pub fn validate_posting<A, L>(
        input: &PostEntryInput,
        account_lookup: A,
        period_locked: L,
    ) -> Result<(Vec<ValidatedLine>, PostingTotals), LedgerError>
    where
        A: Fn(Uuid) -> Result<AccountInfo, LedgerError>,
        L: Fn(Uuid, NaiveDate) -> bool,
    {
        if input.lines.is_empty() {
            return Err(LedgerError::EmptyEntry);
        }

        let mut validated = Vec::with_capacity(input.lines.len());
        let mut totals = PostingTotals::default();

        for line in &input.lines {
            if line.amount <= Decimal::ZERO {
                return Err(LedgerError::InvalidLineAmount);
            }

            let account = account_lookup(line.account_id)?;
            if account.landlord_id != input.landlord_id {
                return Err(LedgerError::InvalidAccount(line.account_id));
            }
            if !account.is_active {
                return Err(LedgerError::AccountInactive(line.account_id));
            }
            if account.currency != line.currency {
                return Err(LedgerError::CurrencyMismatch {
                    account_id: line.account_id,
                    line: line.currency,
                    account: account.currency,
                });
            }

            if period_locked(line.account_id, input.entry_date) {
                return Err(LedgerError::PeriodLocked {
                    account_id: line.account_id,
                    entry_date: input.entry_date,
                });
            }

            let (debit, credit) = match line.entry_type {
                EntryType::Debit => (line.amount, Decimal::ZERO),
                EntryType::Credit => (Decimal::ZERO, line.amount),
            };

            totals.add(line.currency, debit, credit);
            validated.push(ValidatedLine {
                account_id: line.account_id,
                currency: line.currency,
                debit,
                credit,
                memo: line.memo.clone(),
                property_id: line.property_id,
                unit_id: line.unit_id,
                renter_id: line.renter_id,
            });
        }

        if let Some((currency, debit, credit)) = totals.first_imbalance() {
            return Err(LedgerError::UnbalancedEntry {
                currency,
                debit,
                credit,
            });
        }

        Ok((validated, totals))
    }

    /// Builds the mirror lines for a reversal entry.
    ///
    /// Debits and credits are swapped; accounts, currencies, tags, and
    /// memos carry over. The mirror of a balanced entry is balanced.
    #[must_use]
    pub fn mirror_lines(lines: &[ValidatedLine]) -> Vec<ValidatedLine> {
        lines
            .iter()
            .map(|line| ValidatedLine {
                account_id: line.account_id,
                currency: line.currency,
                debit: line.credit,
                credit: line.debit,
                memo: line.memo.clone(),
                property_id: line.property_id,
                unit_id: line.unit_id,
                renter_id: line.renter_id,
            })
            .collect()
    }

    /// Validates that an entry may be voided.
    ///
    /// # Errors
    ///
    /// Returns `EntryAlreadyPosted` once the entry has left `pending`.
    pub fn validate_can_void(status: JournalStatus) -> Result<(), LedgerError> {
        if status.can_void() {
            Ok(())
        } else {
            Err(LedgerError::EntryAlreadyPosted)
        }
    }

    /// Validates that an entry may be reversed.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotPosted` for pending entries and `AlreadyReversed`
    /// for entries already carrying reversal metadata.
    pub fn validate_can_reverse(
        entry_id: Uuid,
        status: JournalStatus,
    ) -> Result<(), LedgerError> {
        match status {
            JournalStatus::Posted => Ok(()),
            JournalStatus::Reversed => Err(LedgerError::AlreadyReversed(entry_id)),
            JournalStatus::Pending => Err(LedgerError::EntryNotPosted(entry_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::EntryLineInput;
    use rust_decimal_macros::dec;

    fn landlord() -> Uuid {
        Uuid::now_v7()
    }

    fn make_line(entry_type: EntryType, amount: Decimal) -> EntryLineInput {
        EntryLineInput {
            account_id: Uuid::now_v7(),
            currency: Currency::Ghs,
            amount,
            entry_type,
            memo: None,
            property_id: None,
            unit_id: None,
            renter_id: None,
        }
    }

    fn make_input(landlord_id: Uuid, lines: Vec<EntryLineInput>) -> PostEntryInput {
        PostEntryInput {
            landlord_id,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            description: "January rent".to_string(),
            reference: None,
            lines,
            created_by: Uuid::now_v7(),
        }
    }

    fn ok_lookup(landlord_id: Uuid) -> impl Fn(Uuid) -> Result<AccountInfo, LedgerError> {
        move |id| {
            Ok(AccountInfo {
                id,
                landlord_id,
                is_active: true,
                currency: Currency::Ghs,
            })
        }
    }

    fn never_locked(_account: Uuid, _date: NaiveDate) -> bool {
        false
    }

    #[test]
    fn test_balanced_entry_validates() {
        let landlord_id = landlord();
        let input = make_input(
            landlord_id,
            vec![
                make_line(EntryType::Debit, dec!(1500)),
                make_line(EntryType::Credit, dec!(1500)),
            ],
        );

        let (lines, totals) =
            PostingService::validate_posting(&input, ok_lookup(landlord_id), never_locked)
                .unwrap();
        assert_eq!(lines.len(), 2);
        assert!(totals.is_balanced());
        assert_eq!(lines[0].debit, dec!(1500));
        assert_eq!(lines[0].credit, Decimal::ZERO);
        assert_eq!(lines[1].credit, dec!(1500));
    }

    #[test]
    fn test_unbalanced_entry_rejected() {
        let landlord_id = landlord();
        let input = make_input(
            landlord_id,
            vec![
                make_line(EntryType::Debit, dec!(100)),
                make_line(EntryType::Credit, dec!(50)),
            ],
        );

        let result =
            PostingService::validate_posting(&input, ok_lookup(landlord_id), never_locked);
        assert!(matches!(result, Err(LedgerError::UnbalancedEntry { .. })));
    }

    #[test]
    fn test_empty_entry_rejected() {
        let landlord_id = landlord();
        let input = make_input(landlord_id, vec![]);
        let result =
            PostingService::validate_posting(&input, ok_lookup(landlord_id), never_locked);
        assert!(matches!(result, Err(LedgerError::EmptyEntry)));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let landlord_id = landlord();
        let input = make_input(
            landlord_id,
            vec![
                make_line(EntryType::Debit, Decimal::ZERO),
                make_line(EntryType::Credit, dec!(100)),
            ],
        );
        let result =
            PostingService::validate_posting(&input, ok_lookup(landlord_id), never_locked);
        assert!(matches!(result, Err(LedgerError::InvalidLineAmount)));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let landlord_id = landlord();
        let input = make_input(
            landlord_id,
            vec![
                make_line(EntryType::Debit, dec!(-100)),
                make_line(EntryType::Credit, dec!(100)),
            ],
        );
        let result =
            PostingService::validate_posting(&input, ok_lookup(landlord_id), never_locked);
        assert!(matches!(result, Err(LedgerError::InvalidLineAmount)));
    }

    #[test]
    fn test_foreign_landlord_account_rejected() {
        let landlord_id = landlord();
        let other_landlord = landlord();
        let input = make_input(
            landlord_id,
            vec![
                make_line(EntryType::Debit, dec!(100)),
                make_line(EntryType::Credit, dec!(100)),
            ],
        );

        let result =
            PostingService::validate_posting(&input, ok_lookup(other_landlord), never_locked);
        assert!(matches!(result, Err(LedgerError::InvalidAccount(_))));
    }

    #[test]
    fn test_inactive_account_rejected() {
        let landlord_id = landlord();
        let input = make_input(
            landlord_id,
            vec![
                make_line(EntryType::Debit, dec!(100)),
                make_line(EntryType::Credit, dec!(100)),
            ],
        );

        let inactive = move |id: Uuid| {
            Ok(AccountInfo {
                id,
                landlord_id,
                is_active: false,
                currency: Currency::Ghs,
            })
        };
        let result = PostingService::validate_posting(&input, inactive, never_locked);
        assert!(matches!(result, Err(LedgerError::AccountInactive(_))));
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let landlord_id = landlord();
        let mut lines = vec![
            make_line(EntryType::Debit, dec!(100)),
            make_line(EntryType::Credit, dec!(100)),
        ];
        lines[0].currency = Currency::Usd;
        let input = make_input(landlord_id, lines);

        let result =
            PostingService::validate_posting(&input, ok_lookup(landlord_id), never_locked);
        assert!(matches!(result, Err(LedgerError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_locked_period_rejected() {
        let landlord_id = landlord();
        let input = make_input(
            landlord_id,
            vec![
                make_line(EntryType::Debit, dec!(100)),
                make_line(EntryType::Credit, dec!(100)),
            ],
        );

        let always_locked = |_account: Uuid, _date: NaiveDate| true;
        let result =
            PostingService::validate_posting(&input, ok_lookup(landlord_id), always_locked);
        assert!(matches!(result, Err(LedgerError::PeriodLocked { .. })));
    }

    #[test]
    fn test_mirror_swaps_sides() {
        let landlord_id = landlord();
        let input = make_input(
            landlord_id,
            vec![
                make_line(EntryType::Debit, dec!(1500)),
                make_line(EntryType::Credit, dec!(1500)),
            ],
        );
        let (lines, _) =
            PostingService::validate_posting(&input, ok_lookup(landlord_id), never_locked)
                .unwrap();

        let mirror = PostingService::mirror_lines(&lines);
        assert_eq!(mirror.len(), lines.len());
        assert_eq!(mirror[0].debit, lines[0].credit);
        assert_eq!(mirror[0].credit, lines[0].debit);
        assert_eq!(mirror[0].account_id, lines[0].account_id);

        // Mirror of a balanced entry is balanced.
        let mut totals = PostingTotals::default();
        for line in &mirror {
            totals.add(line.currency, line.debit, line.credit);
        }
        assert!(totals.is_balanced());
    }

    #[test]
    fn test_void_only_while_pending() {
        assert!(PostingService::validate_can_void(JournalStatus::Pending).is_ok());
        assert!(matches!(
            PostingService::validate_can_void(JournalStatus::Posted),
            Err(LedgerError::EntryAlreadyPosted)
        ));
        assert!(matches!(
            PostingService::validate_can_void(JournalStatus::Reversed),
            Err(LedgerError::EntryAlreadyPosted)
        ));
    }

    #[test]
    fn test_reverse_only_when_posted() {
        let id = Uuid::now_v7();
        assert!(PostingService::validate_can_reverse(id, JournalStatus::Posted).is_ok());
        assert!(matches!(
            PostingService::validate_can_reverse(id, JournalStatus::Pending),
            Err(LedgerError::EntryNotPosted(_))
        ));
        assert!(matches!(
            PostingService::validate_can_reverse(id, JournalStatus::Reversed),
            Err(LedgerError::AlreadyReversed(_))
        ));
    }
}
