//! Account balance calculations.
//!
//! Balances are always derived from posted ledger lines; cached snapshots
//! are a convenience that must reproduce exactly what these functions
//! compute from the raw sums.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::NormalBalance;

/// Computes the signed balance from raw debit/credit sums.
///
/// Debit-normal accounts: balance = debits − credits.
/// Credit-normal accounts: balance = credits − debits.
#[must_use]
pub fn signed_balance(normal_balance: NormalBalance, debits: Decimal, credits: Decimal) -> Decimal {
    match normal_balance {
        NormalBalance::Debit => debits - credits,
        NormalBalance::Credit => credits - debits,
    }
}

/// Summary of an account's activity over a period.
///
/// The opening balance is the balance as of the instant before
/// `period_start`; closing = opening + signed window activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// First day of the window (inclusive).
    pub period_start: NaiveDate,
    /// Last day of the window (inclusive).
    pub period_end: NaiveDate,
    /// Balance immediately before the window.
    pub opening_balance: Decimal,
    /// Total debits within the window.
    pub total_debits: Decimal,
    /// Total credits within the window.
    pub total_credits: Decimal,
    /// Balance at the end of the window.
    pub closing_balance: Decimal,
}

impl PeriodSummary {
    /// Builds a summary from the opening balance and window sums.
    #[must_use]
    pub fn from_sums(
        normal_balance: NormalBalance,
        period_start: NaiveDate,
        period_end: NaiveDate,
        opening_balance: Decimal,
        total_debits: Decimal,
        total_credits: Decimal,
    ) -> Self {
        let closing_balance =
            opening_balance + signed_balance(normal_balance, total_debits, total_credits);

        Self {
            period_start,
            period_end,
            opening_balance,
            total_debits,
            total_credits,
            closing_balance,
        }
    }

    /// Net signed movement within the window.
    #[must_use]
    pub fn net_change(&self) -> Decimal {
        self.closing_balance - self.opening_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn jan() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_signed_balance_debit_normal() {
        assert_eq!(
            signed_balance(NormalBalance::Debit, dec!(1500), dec!(0)),
            dec!(1500)
        );
        assert_eq!(
            signed_balance(NormalBalance::Debit, dec!(100), dec!(30)),
            dec!(70)
        );
        assert_eq!(
            signed_balance(NormalBalance::Debit, dec!(0), dec!(50)),
            dec!(-50)
        );
    }

    #[test]
    fn test_signed_balance_credit_normal() {
        assert_eq!(
            signed_balance(NormalBalance::Credit, dec!(0), dec!(1500)),
            dec!(1500)
        );
        assert_eq!(
            signed_balance(NormalBalance::Credit, dec!(30), dec!(100)),
            dec!(70)
        );
        assert_eq!(
            signed_balance(NormalBalance::Credit, dec!(50), dec!(0)),
            dec!(-50)
        );
    }

    #[test]
    fn test_period_summary_closing() {
        let (start, end) = jan();
        let summary = PeriodSummary::from_sums(
            NormalBalance::Debit,
            start,
            end,
            dec!(200),
            dec!(1500),
            dec!(300),
        );
        assert_eq!(summary.closing_balance, dec!(1400));
        assert_eq!(summary.net_change(), dec!(1200));
    }

    #[test]
    fn test_period_summary_credit_normal_closing() {
        let (start, end) = jan();
        let summary = PeriodSummary::from_sums(
            NormalBalance::Credit,
            start,
            end,
            dec!(0),
            dec!(100),
            dec!(1600),
        );
        assert_eq!(summary.closing_balance, dec!(1500));
    }

    #[test]
    fn test_quiet_period_preserves_opening() {
        let (start, end) = jan();
        let summary = PeriodSummary::from_sums(
            NormalBalance::Debit,
            start,
            end,
            dec!(750),
            Decimal::ZERO,
            Decimal::ZERO,
        );
        assert_eq!(summary.closing_balance, dec!(750));
        assert_eq!(summary.net_change(), Decimal::ZERO);
    }
}
