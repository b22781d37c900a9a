//! Property-based tests for posting validation and reversal.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use rentra_shared::types::Currency;

use super::account::NormalBalance;
use super::balance::{signed_balance, PeriodSummary};
use super::error::LedgerError;
use super::service::{AccountInfo, PostingService};
use super::types::{EntryLineInput, EntryType, PostEntryInput, PostingTotals};

/// Strategy for positive line amounts (two decimal places).
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a list of positive amounts.
fn amounts_strategy(max_len: usize) -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(amount_strategy(), 1..=max_len)
}

/// Builds a balanced entry: each amount appears once as a debit and once
/// as a credit on fresh accounts.
fn balanced_input(landlord_id: Uuid, amounts: &[Decimal]) -> PostEntryInput {
    let mut lines = Vec::with_capacity(amounts.len() * 2);
    for &amount in amounts {
        for entry_type in [EntryType::Debit, EntryType::Credit] {
            lines.push(EntryLineInput {
                account_id: Uuid::now_v7(),
                currency: Currency::Ghs,
                amount,
                entry_type,
                memo: None,
                property_id: None,
                unit_id: None,
                renter_id: None,
            });
        }
    }
    PostEntryInput {
        landlord_id,
        entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        description: "generated".to_string(),
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

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every balanced batch of positive lines validates, and the validated
    /// totals balance per currency.
    #[test]
    fn prop_balanced_entries_validate(amounts in amounts_strategy(8)) {
        let landlord_id = Uuid::now_v7();
        let input = balanced_input(landlord_id, &amounts);

        let result = PostingService::validate_posting(&input, ok_lookup(landlord_id), never_locked);
        prop_assert!(result.is_ok());

        let (lines, totals) = result.unwrap();
        prop_assert_eq!(lines.len(), amounts.len() * 2);
        prop_assert!(totals.is_balanced());
    }

    /// Perturbing any single line of a balanced entry breaks the balance
    /// and always fails with `UnbalancedEntry`, leaving nothing behind.
    #[test]
    fn prop_perturbed_entries_rejected(
        amounts in amounts_strategy(6),
        extra in amount_strategy(),
    ) {
        let landlord_id = Uuid::now_v7();
        let mut input = balanced_input(landlord_id, &amounts);
        if let Some(first) = input.lines.first_mut() {
            first.amount += extra;
        }

        let result = PostingService::validate_posting(&input, ok_lookup(landlord_id), never_locked);
        let is_unbalanced = matches!(result, Err(LedgerError::UnbalancedEntry { .. }));
        prop_assert!(is_unbalanced);
    }

    /// Every validated line has exactly one non-zero side and both sides
    /// non-negative.
    #[test]
    fn prop_exactly_one_side_per_line(amounts in amounts_strategy(8)) {
        let landlord_id = Uuid::now_v7();
        let input = balanced_input(landlord_id, &amounts);

        let (lines, _) = PostingService::validate_posting(
            &input,
            ok_lookup(landlord_id),
            never_locked,
        ).unwrap();

        for line in &lines {
            prop_assert!(line.debit >= Decimal::ZERO);
            prop_assert!(line.credit >= Decimal::ZERO);
            prop_assert!(
                (line.debit > Decimal::ZERO) ^ (line.credit > Decimal::ZERO),
                "exactly one of debit/credit must be non-zero"
            );
        }
    }

    /// Reversal cancellation: for every account, the mirror entry's signed
    /// movement is the exact negative of the original's, so balances return
    /// to their pre-entry values.
    #[test]
    fn prop_mirror_cancels_original(amounts in amounts_strategy(8)) {
        let landlord_id = Uuid::now_v7();
        let input = balanced_input(landlord_id, &amounts);

        let (lines, _) = PostingService::validate_posting(
            &input,
            ok_lookup(landlord_id),
            never_locked,
        ).unwrap();
        let mirror = PostingService::mirror_lines(&lines);

        for (original, mirrored) in lines.iter().zip(mirror.iter()) {
            prop_assert_eq!(original.account_id, mirrored.account_id);
            for normal in [NormalBalance::Debit, NormalBalance::Credit] {
                let net = signed_balance(normal, original.debit, original.credit)
                    + signed_balance(normal, mirrored.debit, mirrored.credit);
                prop_assert_eq!(net, Decimal::ZERO);
            }
        }

        // The mirror itself is a balanced entry.
        let mut totals = PostingTotals::default();
        for line in &mirror {
            totals.add(line.currency, line.debit, line.credit);
        }
        prop_assert!(totals.is_balanced());
    }

    /// Period summary reconstruction is deterministic: recomputing from the
    /// same raw sums always reproduces the identical summary, and closing
    /// equals opening plus the signed window activity.
    #[test]
    fn prop_summary_reconstruction_idempotent(
        opening in (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        debits in amount_strategy(),
        credits in amount_strategy(),
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        for normal in [NormalBalance::Debit, NormalBalance::Credit] {
            let first = PeriodSummary::from_sums(normal, start, end, opening, debits, credits);
            let second = PeriodSummary::from_sums(normal, start, end, opening, debits, credits);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(
                first.closing_balance,
                opening + signed_balance(normal, debits, credits)
            );
        }
    }
}
