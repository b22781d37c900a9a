//! Balance repository for derived account balances and period snapshots.
//!
//! Balances are computed from the ledger rows of posted (or reversed)
//! entries; the `account_balances` table is a cache that any recomputation
//! must reproduce exactly.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::JoinType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use rentra_core::ledger::{signed_balance, LedgerError, NormalBalance, PeriodSummary};

use crate::entities::{account_balances, chart_of_accounts, journal_entries, ledger_entries,
    sea_orm_active_enums};

/// Error types for balance operations.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Balance repository.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes an account's signed balance as of a date (inclusive).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing or foreign account, or a database
    /// error.
    pub async fn get_balance(
        &self,
        landlord_id: Uuid,
        account_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Decimal, BalanceError> {
        let account = self.load_account(landlord_id, account_id).await?;
        let normal: NormalBalance = account.normal_balance.into();

        let (debits, credits) =
            Self::sums(&self.db, account_id, None, Some(as_of)).await?;
        Ok(signed_balance(normal, debits, credits))
    }

    /// Computes an account's activity summary over a period.
    ///
    /// Opening balance is the balance immediately before `period_start`;
    /// closing is opening plus the signed window activity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriod` for a backwards window, `NotFound` for a
    /// missing account, or a database error.
    pub async fn get_period_summary(
        &self,
        landlord_id: Uuid,
        account_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<PeriodSummary, BalanceError> {
        if period_start > period_end {
            return Err(LedgerError::InvalidPeriod {
                start: period_start,
                end: period_end,
            }
            .into());
        }

        let account = self.load_account(landlord_id, account_id).await?;
        let normal: NormalBalance = account.normal_balance.into();

        let opening = match period_start.pred_opt() {
            Some(day_before) => {
                let (debits, credits) =
                    Self::sums(&self.db, account_id, None, Some(day_before)).await?;
                signed_balance(normal, debits, credits)
            }
            None => Decimal::ZERO,
        };

        let (window_debits, window_credits) =
            Self::sums(&self.db, account_id, Some(period_start), Some(period_end)).await?;

        Ok(PeriodSummary::from_sums(
            normal,
            period_start,
            period_end,
            opening,
            window_debits,
            window_credits,
        ))
    }

    /// Recomputes a period summary and upserts it into `account_balances`.
    ///
    /// # Errors
    ///
    /// Returns an error if the computation or write fails.
    pub async fn snapshot_period(
        &self,
        landlord_id: Uuid,
        account_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<account_balances::Model, BalanceError> {
        let summary = self
            .get_period_summary(landlord_id, account_id, period_start, period_end)
            .await?;

        let now = Utc::now().into();
        let existing = account_balances::Entity::find()
            .filter(account_balances::Column::AccountId.eq(account_id))
            .filter(account_balances::Column::PeriodStart.eq(period_start))
            .filter(account_balances::Column::PeriodEnd.eq(period_end))
            .one(&self.db)
            .await?;

        let model = if let Some(row) = existing {
            let mut active: account_balances::ActiveModel = row.into();
            active.opening_balance = Set(summary.opening_balance);
            active.total_debits = Set(summary.total_debits);
            active.total_credits = Set(summary.total_credits);
            active.closing_balance = Set(summary.closing_balance);
            active.computed_at = Set(now);
            active.update(&self.db).await?
        } else {
            let active = account_balances::ActiveModel {
                id: Set(Uuid::now_v7()),
                landlord_id: Set(landlord_id),
                account_id: Set(account_id),
                period_start: Set(period_start),
                period_end: Set(period_end),
                opening_balance: Set(summary.opening_balance),
                total_debits: Set(summary.total_debits),
                total_credits: Set(summary.total_credits),
                closing_balance: Set(summary.closing_balance),
                is_reconciled: Set(false),
                reconciliation_id: Set(None),
                computed_at: Set(now),
            };
            active.insert(&self.db).await?
        };

        Ok(model)
    }

    /// Sums debit/credit over lines of balance-affecting entries in a date
    /// window. Reversed originals still count; their mirrors cancel them.
    pub(crate) async fn sums<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<(Decimal, Decimal), DbErr> {
        let mut query = ledger_entries::Entity::find()
            .select_only()
            .column_as(ledger_entries::Column::Debit.sum(), "total_debit")
            .column_as(ledger_entries::Column::Credit.sum(), "total_credit")
            .join(
                JoinType::InnerJoin,
                ledger_entries::Relation::JournalEntries.def(),
            )
            .filter(ledger_entries::Column::AccountId.eq(account_id))
            .filter(journal_entries::Column::Status.is_in([
                sea_orm_active_enums::JournalStatus::Posted,
                sea_orm_active_enums::JournalStatus::Reversed,
            ]));

        if let Some(from) = from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }

        let totals: Option<(Option<Decimal>, Option<Decimal>)> =
            query.into_tuple().one(conn).await?;

        let (debits, credits) = totals.unwrap_or((None, None));
        Ok((
            debits.unwrap_or(Decimal::ZERO),
            credits.unwrap_or(Decimal::ZERO),
        ))
    }

    async fn load_account(
        &self,
        landlord_id: Uuid,
        account_id: Uuid,
    ) -> Result<chart_of_accounts::Model, BalanceError> {
        chart_of_accounts::Entity::find_by_id(account_id)
            .filter(chart_of_accounts::Column::LandlordId.eq(landlord_id))
            .one(&self.db)
            .await?
            .ok_or(BalanceError::NotFound(account_id))
    }
}
