//! Reconciliation state machine and difference math.
//!
//! A reconciliation compares an external statement balance against the
//! system balance for one account over one period. The repository computes
//! the system balance and persists rows; this module owns the status
//! lifecycle and the difference rules.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ledger::error::LedgerError;

/// Status of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    /// Created but not yet evaluated.
    Pending,
    /// Under active investigation after a reopen.
    InProgress,
    /// Statement and system agree; the period is locked.
    Completed,
    /// Statement and system disagree; awaiting correcting entries.
    Discrepancy,
}

impl ReconciliationStatus {
    /// Returns the status name used in the database and API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Discrepancy => "discrepancy",
        }
    }

    /// Only a completed reconciliation locks its period against posting.
    #[must_use]
    pub const fn locks_period(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Completion may be requested while investigating or disputing.
    #[must_use]
    pub const fn can_complete(self) -> bool {
        matches!(self, Self::InProgress | Self::Discrepancy)
    }

    /// Reopening is only meaningful for a completed reconciliation.
    #[must_use]
    pub const fn can_reopen(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating a statement balance against the system balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    /// statement − system.
    pub difference: Decimal,
    /// `Completed` on exact agreement, otherwise `Discrepancy`.
    pub status: ReconciliationStatus,
}

/// Evaluates a statement against the system balance.
///
/// The difference is always statement minus system, so a positive value
/// means the statement shows more than the ledger.
#[must_use]
pub fn evaluate(statement_balance: Decimal, system_balance: Decimal) -> ReconciliationOutcome {
    let difference = statement_balance - system_balance;
    let status = if difference.is_zero() {
        ReconciliationStatus::Completed
    } else {
        ReconciliationStatus::Discrepancy
    };
    ReconciliationOutcome { difference, status }
}

/// Validates a reconciliation window: start must not follow end.
pub fn validate_period(period_start: NaiveDate, period_end: NaiveDate) -> Result<(), LedgerError> {
    if period_start > period_end {
        return Err(LedgerError::InvalidPeriod {
            start: period_start,
            end: period_end,
        });
    }
    Ok(())
}

/// Checks the completion transition; recomputed difference must be zero.
pub fn validate_completion(
    reconciliation_id: Uuid,
    status: ReconciliationStatus,
    recomputed_difference: Decimal,
) -> Result<(), LedgerError> {
    if !status.can_complete() {
        return Err(LedgerError::InvalidReconciliationTransition {
            from: status.as_str(),
            to: ReconciliationStatus::Completed.as_str(),
        });
    }
    if !recomputed_difference.is_zero() {
        return Err(LedgerError::DiscrepancyUnresolved(
            reconciliation_id,
            recomputed_difference,
        ));
    }
    Ok(())
}

/// Checks the reopen transition.
pub fn validate_reopen(status: ReconciliationStatus) -> Result<(), LedgerError> {
    if !status.can_reopen() {
        return Err(LedgerError::InvalidReconciliationTransition {
            from: status.as_str(),
            to: ReconciliationStatus::InProgress.as_str(),
        });
    }
    Ok(())
}

/// Returns true when a completed reconciliation ending on `period_end`
/// locks a posting dated `entry_date`.
///
/// The window end is inclusive: an entry dated exactly on `period_end`
/// would change the reconciled balance, so it is locked.
#[must_use]
pub fn locks_entry_date(period_end: NaiveDate, entry_date: NaiveDate) -> bool {
    entry_date <= period_end
}

/// Returns true when two inclusive date windows overlap.
#[must_use]
pub fn periods_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_evaluate_exact_match_completes() {
        let outcome = evaluate(dec!(1500.00), dec!(1500.00));
        assert_eq!(outcome.status, ReconciliationStatus::Completed);
        assert_eq!(outcome.difference, Decimal::ZERO);
        assert!(outcome.status.locks_period());
    }

    #[test]
    fn test_evaluate_discrepancy_statement_short() {
        // System shows 1500, statement shows 1400: difference is -100.
        let outcome = evaluate(dec!(1400.00), dec!(1500.00));
        assert_eq!(outcome.status, ReconciliationStatus::Discrepancy);
        assert_eq!(outcome.difference, dec!(-100.00));
        assert!(!outcome.status.locks_period());
    }

    #[test]
    fn test_evaluate_discrepancy_statement_over() {
        let outcome = evaluate(dec!(1600.00), dec!(1500.00));
        assert_eq!(outcome.difference, dec!(100.00));
        assert_eq!(outcome.status, ReconciliationStatus::Discrepancy);
    }

    #[test]
    fn test_completion_requires_zero_difference() {
        let id = Uuid::now_v7();
        let err = validate_completion(id, ReconciliationStatus::Discrepancy, dec!(-100.00))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::DiscrepancyUnresolved(eid, d) if eid == id && d == dec!(-100.00)
        ));

        validate_completion(id, ReconciliationStatus::Discrepancy, Decimal::ZERO).unwrap();
        validate_completion(id, ReconciliationStatus::InProgress, Decimal::ZERO).unwrap();
    }

    #[test]
    fn test_pending_cannot_complete() {
        // Pending rows are never persisted; the transition is still closed.
        let err = validate_completion(Uuid::now_v7(), ReconciliationStatus::Pending, Decimal::ZERO)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidReconciliationTransition {
                from: "pending",
                to: "completed",
            }
        ));
    }

    #[test]
    fn test_completed_cannot_complete_again() {
        let err = validate_completion(
            Uuid::now_v7(),
            ReconciliationStatus::Completed,
            Decimal::ZERO,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidReconciliationTransition {
                from: "completed",
                to: "completed",
            }
        ));
    }

    #[test]
    fn test_reopen_only_from_completed() {
        validate_reopen(ReconciliationStatus::Completed).unwrap();
        assert!(validate_reopen(ReconciliationStatus::Pending).is_err());
        assert!(validate_reopen(ReconciliationStatus::Discrepancy).is_err());
        assert!(validate_reopen(ReconciliationStatus::InProgress).is_err());
    }

    #[test]
    fn test_period_validation() {
        validate_period(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        validate_period(date(2024, 1, 15), date(2024, 1, 15)).unwrap();
        assert!(validate_period(date(2024, 2, 1), date(2024, 1, 31)).is_err());
    }

    #[test]
    fn test_lock_boundary_is_inclusive() {
        let period_end = date(2024, 1, 31);
        assert!(locks_entry_date(period_end, date(2024, 1, 15)));
        assert!(locks_entry_date(period_end, date(2024, 1, 31)));
        assert!(!locks_entry_date(period_end, date(2024, 2, 1)));
    }

    #[test]
    fn test_periods_overlap() {
        // Adjacent months do not overlap.
        assert!(!periods_overlap(
            date(2024, 1, 1),
            date(2024, 1, 31),
            date(2024, 2, 1),
            date(2024, 2, 29),
        ));
        // Shared boundary day overlaps.
        assert!(periods_overlap(
            date(2024, 1, 1),
            date(2024, 1, 31),
            date(2024, 1, 31),
            date(2024, 2, 29),
        ));
        // Containment overlaps.
        assert!(periods_overlap(
            date(2024, 1, 1),
            date(2024, 3, 31),
            date(2024, 2, 1),
            date(2024, 2, 29),
        ));
    }
}
