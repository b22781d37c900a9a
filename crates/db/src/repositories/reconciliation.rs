//! Reconciliation repository.
//!
//! Persists reconciliation rows and enforces the state machine from
//! `rentra-core`: evaluation on start, recomputation on completion, and
//! the period lock that a completed reconciliation implies.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use rentra_core::ledger::{signed_balance, LedgerError, NormalBalance};
use rentra_core::reconciliation::{
    evaluate, periods_overlap, validate_completion, validate_period, validate_reopen,
    ReconciliationStatus,
};

use crate::entities::{account_balances, chart_of_accounts, reconciliations,
    sea_orm_active_enums};
use crate::repositories::balance::BalanceRepository;

/// Error types for reconciliation operations.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    /// Reconciliation not found.
    #[error("Reconciliation not found: {0}")]
    NotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for starting a reconciliation.
#[derive(Debug, Clone)]
pub struct StartReconciliationInput {
    /// Owning landlord.
    pub landlord_id: Uuid,
    /// Account being reconciled.
    pub account_id: Uuid,
    /// First day of the statement period (inclusive).
    pub period_start: NaiveDate,
    /// Last day of the statement period (inclusive).
    pub period_end: NaiveDate,
    /// Closing balance reported by the external statement.
    pub statement_balance: Decimal,
    /// Optional free-form notes.
    pub notes: Option<String>,
}

/// Reconciliation repository.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Starts a reconciliation for an account period.
    ///
    /// The system balance as of `period_end` is computed and compared to
    /// the statement: exact agreement completes (and locks the period)
    /// immediately, anything else lands in `discrepancy`. Overlapping
    /// windows for the same account are rejected.
    ///
    /// # Errors
    ///
    /// Returns `OverlappingReconciliation`, `InvalidPeriod`,
    /// `AccountNotFound`, or a database error.
    pub async fn start_reconciliation(
        &self,
        input: StartReconciliationInput,
    ) -> Result<reconciliations::Model, ReconciliationError> {
        validate_period(input.period_start, input.period_end)?;

        let txn = self.db.begin().await?;

        // The exclusive account lock serializes concurrent starts for the
        // same account; without it two overlapping windows could both pass
        // the check below and both insert.
        let account =
            Self::load_account_locked(&txn, input.landlord_id, input.account_id).await?;

        let existing = reconciliations::Entity::find()
            .filter(reconciliations::Column::AccountId.eq(input.account_id))
            .all(&txn)
            .await?;
        if overlaps_existing(&existing, input.period_start, input.period_end) {
            return Err(LedgerError::OverlappingReconciliation(input.account_id).into());
        }

        let system_balance =
            Self::system_balance(&txn, &account, input.period_end).await?;
        let outcome = evaluate(input.statement_balance, system_balance);

        let now = Utc::now().into();
        let row = reconciliations::ActiveModel {
            id: Set(Uuid::now_v7()),
            landlord_id: Set(input.landlord_id),
            account_id: Set(input.account_id),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            statement_balance: Set(input.statement_balance),
            system_balance: Set(system_balance),
            difference: Set(outcome.difference),
            status: Set(outcome.status.into()),
            completed_by: Set(None),
            completed_at: Set(outcome.status.locks_period().then_some(now)),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let row = row.insert(&txn).await?;

        if outcome.status.locks_period() {
            Self::mark_window_reconciled(&txn, &row, true).await?;
        }

        txn.commit().await?;
        Ok(row)
    }

    /// Completes a reconciliation after recomputing the system balance.
    ///
    /// Correcting entries may have landed since the discrepancy was
    /// recorded; completion only succeeds when the recomputed difference is
    /// exactly zero.
    ///
    /// # Errors
    ///
    /// Returns `DiscrepancyUnresolved` when the statement still disagrees,
    /// `InvalidReconciliationTransition` for illegal states, or a database
    /// error.
    pub async fn complete_reconciliation(
        &self,
        landlord_id: Uuid,
        reconciliation_id: Uuid,
        completed_by: Uuid,
    ) -> Result<reconciliations::Model, ReconciliationError> {
        let txn = self.db.begin().await?;

        let row = Self::load_locked(&txn, landlord_id, reconciliation_id).await?;
        let status: ReconciliationStatus = row.status.into();

        let account = self.load_account(landlord_id, row.account_id).await?;
        let system_balance = Self::system_balance(&txn, &account, row.period_end).await?;
        let difference = row.statement_balance - system_balance;

        validate_completion(reconciliation_id, status, difference)?;

        let now = Utc::now().into();
        let mut active: reconciliations::ActiveModel = row.into();
        active.system_balance = Set(system_balance);
        active.difference = Set(difference);
        active.status = Set(sea_orm_active_enums::ReconciliationStatus::Completed);
        active.completed_by = Set(Some(completed_by));
        active.completed_at = Set(Some(now));
        active.updated_at = Set(now);
        let row = active.update(&txn).await?;

        Self::mark_window_reconciled(&txn, &row, true).await?;

        txn.commit().await?;
        Ok(row)
    }

    /// Reopens a completed reconciliation, releasing the period lock.
    ///
    /// The reason is appended to the notes for the audit trail.
    ///
    /// # Errors
    ///
    /// Returns `InvalidReconciliationTransition` for non-completed rows, or
    /// a database error.
    pub async fn reopen_reconciliation(
        &self,
        landlord_id: Uuid,
        reconciliation_id: Uuid,
        reason: &str,
    ) -> Result<reconciliations::Model, ReconciliationError> {
        let txn = self.db.begin().await?;

        let row = Self::load_locked(&txn, landlord_id, reconciliation_id).await?;
        let status: ReconciliationStatus = row.status.into();
        validate_reopen(status)?;

        let notes = match &row.notes {
            Some(existing) => format!("{existing}\nReopened: {reason}"),
            None => format!("Reopened: {reason}"),
        };

        let now = Utc::now().into();
        let mut active: reconciliations::ActiveModel = row.into();
        active.status = Set(sea_orm_active_enums::ReconciliationStatus::InProgress);
        active.completed_by = Set(None);
        active.completed_at = Set(None);
        active.notes = Set(Some(notes));
        active.updated_at = Set(now);
        let row = active.update(&txn).await?;

        Self::mark_window_reconciled(&txn, &row, false).await?;

        txn.commit().await?;
        Ok(row)
    }

    /// Gets a reconciliation by ID, scoped to the landlord.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing or foreign.
    pub async fn get_reconciliation(
        &self,
        landlord_id: Uuid,
        reconciliation_id: Uuid,
    ) -> Result<reconciliations::Model, ReconciliationError> {
        reconciliations::Entity::find_by_id(reconciliation_id)
            .filter(reconciliations::Column::LandlordId.eq(landlord_id))
            .one(&self.db)
            .await?
            .ok_or(ReconciliationError::NotFound(reconciliation_id))
    }

    /// Lists reconciliations, optionally for one account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_reconciliations(
        &self,
        landlord_id: Uuid,
        account_id: Option<Uuid>,
    ) -> Result<Vec<reconciliations::Model>, ReconciliationError> {
        let mut query = reconciliations::Entity::find()
            .filter(reconciliations::Column::LandlordId.eq(landlord_id));
        if let Some(account_id) = account_id {
            query = query.filter(reconciliations::Column::AccountId.eq(account_id));
        }

        Ok(query
            .order_by_desc(reconciliations::Column::PeriodEnd)
            .all(&self.db)
            .await?)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn system_balance<C: ConnectionTrait>(
        conn: &C,
        account: &chart_of_accounts::Model,
        as_of: NaiveDate,
    ) -> Result<Decimal, DbErr> {
        let normal: NormalBalance = account.normal_balance.into();
        let (debits, credits) = BalanceRepository::sums(conn, account.id, None, Some(as_of)).await?;
        Ok(signed_balance(normal, debits, credits))
    }

    /// Flips `is_reconciled` on any cached balance rows matching the
    /// reconciliation window.
    async fn mark_window_reconciled(
        txn: &DatabaseTransaction,
        row: &reconciliations::Model,
        reconciled: bool,
    ) -> Result<(), DbErr> {
        let matching = account_balances::Entity::find()
            .filter(account_balances::Column::AccountId.eq(row.account_id))
            .filter(account_balances::Column::PeriodStart.eq(row.period_start))
            .filter(account_balances::Column::PeriodEnd.eq(row.period_end))
            .all(txn)
            .await?;

        for snapshot in matching {
            let mut active: account_balances::ActiveModel = snapshot.into();
            active.is_reconciled = Set(reconciled);
            active.reconciliation_id = Set(reconciled.then_some(row.id));
            active.update(txn).await?;
        }
        Ok(())
    }

    async fn load_locked(
        txn: &DatabaseTransaction,
        landlord_id: Uuid,
        reconciliation_id: Uuid,
    ) -> Result<reconciliations::Model, ReconciliationError> {
        reconciliations::Entity::find_by_id(reconciliation_id)
            .filter(reconciliations::Column::LandlordId.eq(landlord_id))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(ReconciliationError::NotFound(reconciliation_id))
    }

    async fn load_account(
        &self,
        landlord_id: Uuid,
        account_id: Uuid,
    ) -> Result<chart_of_accounts::Model, ReconciliationError> {
        chart_of_accounts::Entity::find_by_id(account_id)
            .filter(chart_of_accounts::Column::LandlordId.eq(landlord_id))
            .one(&self.db)
            .await?
            .ok_or(ReconciliationError::AccountNotFound(account_id))
    }

    async fn load_account_locked(
        txn: &DatabaseTransaction,
        landlord_id: Uuid,
        account_id: Uuid,
    ) -> Result<chart_of_accounts::Model, ReconciliationError> {
        chart_of_accounts::Entity::find_by_id(account_id)
            .filter(chart_of_accounts::Column::LandlordId.eq(landlord_id))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(ReconciliationError::AccountNotFound(account_id))
    }
}

/// True when any of the account's existing windows overlaps the candidate.
fn overlaps_existing(
    existing: &[reconciliations::Model],
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> bool {
    existing
        .iter()
        .any(|r| periods_overlap(r.period_start, r.period_end, period_start, period_end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(start: NaiveDate, end: NaiveDate) -> reconciliations::Model {
        let now = Utc::now().into();
        reconciliations::Model {
            id: Uuid::now_v7(),
            landlord_id: Uuid::now_v7(),
            account_id: Uuid::now_v7(),
            period_start: start,
            period_end: end,
            statement_balance: dec!(1500.00),
            system_balance: dec!(1500.00),
            difference: Decimal::ZERO,
            status: sea_orm_active_enums::ReconciliationStatus::Completed,
            completed_by: None,
            completed_at: Some(now),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_adjacent_windows_do_not_overlap() {
        let existing = vec![window(date(2024, 1, 1), date(2024, 1, 31))];
        assert!(!overlaps_existing(
            &existing,
            date(2024, 2, 1),
            date(2024, 2, 29),
        ));
    }

    #[test]
    fn test_shared_boundary_day_overlaps() {
        let existing = vec![window(date(2024, 1, 1), date(2024, 1, 31))];
        assert!(overlaps_existing(
            &existing,
            date(2024, 1, 31),
            date(2024, 2, 29),
        ));
    }

    #[test]
    fn test_any_existing_window_blocks() {
        let existing = vec![
            window(date(2024, 1, 1), date(2024, 1, 31)),
            window(date(2024, 3, 1), date(2024, 3, 31)),
        ];
        assert!(overlaps_existing(
            &existing,
            date(2024, 3, 15),
            date(2024, 4, 15),
        ));
        assert!(!overlaps_existing(
            &existing,
            date(2024, 2, 1),
            date(2024, 2, 29),
        ));
    }

    #[test]
    fn test_no_existing_windows() {
        assert!(!overlaps_existing(&[], date(2024, 1, 1), date(2024, 1, 31)));
    }
}
