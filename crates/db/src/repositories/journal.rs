//! Journal repository for posting, reversing, and voiding entries.
//!
//! All validation runs through `rentra-core` before any write; each
//! mutating operation is a single database transaction, so a failure leaves
//! no partial entry behind.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use rentra_core::ledger::{
    AccountInfo, EntryLineInput, EntryType, JournalStatus, LedgerError, PostEntryInput,
    PostingService, ValidatedLine,
};
use rentra_core::numbering::DocumentSeries;
use rentra_core::reconciliation::locks_entry_date;
use rentra_shared::types::{Currency, PageRequest, PageResponse};

use crate::entities::{chart_of_accounts, journal_entries, ledger_entries, reconciliations,
    sea_orm_active_enums};
use crate::repositories::account::account_info;
use crate::repositories::numbering::NumberingRepository;

/// Error types for journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    NotFound(Uuid),

    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filter options for listing journal entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Filter by status.
    pub status: Option<JournalStatus>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
    /// Filter by referenced business object.
    pub reference_id: Option<Uuid>,
}

/// A journal entry with its ledger lines.
#[derive(Debug, Clone)]
pub struct EntryWithLines {
    /// Entry header.
    pub entry: journal_entries::Model,
    /// Ledger lines.
    pub lines: Vec<ledger_entries::Model>,
}

/// Rebuilds validation input lines from stored ledger rows.
///
/// Used when posting a draft: the stored lines are re-validated against
/// current account state before the entry leaves `pending`.
///
/// # Errors
///
/// Returns an error if a stored currency code is unreadable or a stored
/// line has both sides zero.
pub fn rows_to_line_inputs(
    rows: &[ledger_entries::Model],
) -> Result<Vec<EntryLineInput>, JournalError> {
    rows.iter()
        .map(|row| {
            let currency = Currency::from_str(&row.currency)
                .map_err(|e| DbErr::Custom(format!("line {}: {e}", row.id)))?;
            let (amount, entry_type) = if row.debit > rust_decimal::Decimal::ZERO {
                (row.debit, EntryType::Debit)
            } else {
                (row.credit, EntryType::Credit)
            };
            Ok(EntryLineInput {
                account_id: row.account_id,
                currency,
                amount,
                entry_type,
                memo: row.memo.clone(),
                property_id: row.property_id,
                unit_id: row.unit_id,
                renter_id: row.renter_id,
            })
        })
        .collect()
}

/// Converts stored ledger rows into validated lines for mirroring.
///
/// # Errors
///
/// Returns an error if a stored currency code is unreadable.
pub fn rows_to_validated(
    rows: &[ledger_entries::Model],
) -> Result<Vec<ValidatedLine>, JournalError> {
    rows.iter()
        .map(|row| {
            let currency = Currency::from_str(&row.currency)
                .map_err(|e| DbErr::Custom(format!("line {}: {e}", row.id)))?;
            Ok(ValidatedLine {
                account_id: row.account_id,
                currency,
                debit: row.debit,
                credit: row.credit,
                memo: row.memo.clone(),
                property_id: row.property_id,
                unit_id: row.unit_id,
                renter_id: row.renter_id,
            })
        })
        .collect()
}

/// Builds the mirror entry header for a reversal.
///
/// The mirror is dated at `reversal_date`, never at the original entry
/// date: an original inside a completed reconciliation's window stays in
/// that window's balance, and the mirror lands after it, so the
/// reconciled figures remain exactly what was signed off.
fn reversal_header(
    original: &journal_entries::Model,
    number: String,
    reason: &str,
    reversed_by: Uuid,
    reversal_date: NaiveDate,
) -> journal_entries::ActiveModel {
    let original_label = original
        .entry_number
        .clone()
        .unwrap_or_else(|| original.id.to_string());
    let now = Utc::now().into();
    journal_entries::ActiveModel {
        id: Set(Uuid::now_v7()),
        landlord_id: Set(original.landlord_id),
        entry_number: Set(Some(number)),
        entry_date: Set(reversal_date),
        description: Set(format!("Reversal of {original_label}: {reason}")),
        status: Set(sea_orm_active_enums::JournalStatus::Posted),
        reference_type: Set(Some(sea_orm_active_enums::ReferenceType::Reversal)),
        reference_id: Set(Some(original.id)),
        created_by: Set(reversed_by),
        posted_at: Set(Some(now)),
        posted_by: Set(Some(reversed_by)),
        reversed_at: Set(None),
        reversed_by: Set(None),
        reversal_reason: Set(None),
        reversal_of: Set(Some(original.id)),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates and posts a journal entry atomically.
    ///
    /// Allocates the entry number and writes the header plus all lines in
    /// one transaction; nothing commits on validation failure.
    ///
    /// # Errors
    ///
    /// Returns the first ledger rule violation, or a database error.
    pub async fn post_entry(&self, input: PostEntryInput) -> Result<EntryWithLines, JournalError> {
        let txn = self.db.begin().await?;
        let result = self.post_entry_in(&txn, input).await?;
        txn.commit().await?;
        Ok(result)
    }

    /// Posts an entry inside an existing transaction.
    ///
    /// The adjustment approval flow uses this so the adjustment update and
    /// the posting commit or roll back together.
    ///
    /// # Errors
    ///
    /// Returns the first ledger rule violation, or a database error.
    pub async fn post_entry_in(
        &self,
        txn: &DatabaseTransaction,
        input: PostEntryInput,
    ) -> Result<EntryWithLines, JournalError> {
        let (validated, _totals) = self.validate(txn, &input, true).await?;

        let number = NumberingRepository::allocate(
            txn,
            input.landlord_id,
            DocumentSeries::JournalEntry,
            input.entry_date.year(),
        )
        .await?;

        let now = Utc::now().into();
        let entry = journal_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            landlord_id: Set(input.landlord_id),
            entry_number: Set(Some(number.clone())),
            entry_date: Set(input.entry_date),
            description: Set(input.description.clone()),
            status: Set(sea_orm_active_enums::JournalStatus::Posted),
            reference_type: Set(input.reference.map(|(kind, _)| kind.into())),
            reference_id: Set(input.reference.map(|(_, id)| id)),
            created_by: Set(input.created_by),
            posted_at: Set(Some(now)),
            posted_by: Set(Some(input.created_by)),
            reversed_at: Set(None),
            reversed_by: Set(None),
            reversal_reason: Set(None),
            reversal_of: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let entry = Self::insert_entry(txn, entry, &number).await?;
        let lines = Self::insert_lines(txn, entry.id, &validated).await?;

        Ok(EntryWithLines { entry, lines })
    }

    /// Creates a pending draft entry without an entry number.
    ///
    /// The draft is validated for shape and account state; the period-lock
    /// check is deferred to posting time, since reconciliations may change
    /// while the draft sits.
    ///
    /// # Errors
    ///
    /// Returns the first ledger rule violation, or a database error.
    pub async fn create_draft(
        &self,
        input: PostEntryInput,
    ) -> Result<EntryWithLines, JournalError> {
        let txn = self.db.begin().await?;
        let (validated, _totals) = self.validate(&txn, &input, false).await?;

        let now = Utc::now().into();
        let entry = journal_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            landlord_id: Set(input.landlord_id),
            entry_number: Set(None),
            entry_date: Set(input.entry_date),
            description: Set(input.description.clone()),
            status: Set(sea_orm_active_enums::JournalStatus::Pending),
            reference_type: Set(input.reference.map(|(kind, _)| kind.into())),
            reference_id: Set(input.reference.map(|(_, id)| id)),
            created_by: Set(input.created_by),
            posted_at: Set(None),
            posted_by: Set(None),
            reversed_at: Set(None),
            reversed_by: Set(None),
            reversal_reason: Set(None),
            reversal_of: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let entry = entry.insert(&txn).await?;
        let lines = Self::insert_lines(&txn, entry.id, &validated).await?;
        txn.commit().await?;

        Ok(EntryWithLines { entry, lines })
    }

    /// Posts a pending draft, assigning its entry number.
    ///
    /// Stored lines are re-validated against current account and
    /// reconciliation state before the status flips.
    ///
    /// # Errors
    ///
    /// Returns `EntryAlreadyPosted` for non-pending entries, any ledger
    /// rule violation from re-validation, or a database error.
    pub async fn post_draft(
        &self,
        landlord_id: Uuid,
        entry_id: Uuid,
        posted_by: Uuid,
    ) -> Result<EntryWithLines, JournalError> {
        let txn = self.db.begin().await?;

        let entry = Self::load_entry_locked(&txn, landlord_id, entry_id).await?;
        if entry.status != sea_orm_active_enums::JournalStatus::Pending {
            return Err(LedgerError::EntryAlreadyPosted.into());
        }

        let rows = Self::load_lines(&txn, entry_id).await?;
        let input = PostEntryInput {
            landlord_id,
            entry_date: entry.entry_date,
            description: entry.description.clone(),
            reference: None,
            lines: rows_to_line_inputs(&rows)?,
            created_by: entry.created_by,
        };
        self.validate(&txn, &input, true).await?;

        let number = NumberingRepository::allocate(
            &txn,
            landlord_id,
            DocumentSeries::JournalEntry,
            entry.entry_date.year(),
        )
        .await?;

        let now = Utc::now().into();
        let mut active: journal_entries::ActiveModel = entry.into();
        active.entry_number = Set(Some(number.clone()));
        active.status = Set(sea_orm_active_enums::JournalStatus::Posted);
        active.posted_at = Set(Some(now));
        active.posted_by = Set(Some(posted_by));
        active.updated_at = Set(now);

        let entry = active
            .update(&txn)
            .await
            .map_err(|e| Self::map_number_conflict(e, &number))?;
        txn.commit().await?;

        Ok(EntryWithLines { entry, lines: rows })
    }

    /// Reverses a posted entry by posting its mirror.
    ///
    /// The mirror is dated at reversal time with its own number, so it
    /// never lands inside a window a completed reconciliation has locked;
    /// the original keeps its lines and gains reversal metadata. Both
    /// changes commit together.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotPosted` / `AlreadyReversed` for illegal states, or
    /// a database error.
    pub async fn reverse_entry(
        &self,
        landlord_id: Uuid,
        entry_id: Uuid,
        reason: String,
        reversed_by: Uuid,
    ) -> Result<EntryWithLines, JournalError> {
        let txn = self.db.begin().await?;

        let original = Self::load_entry_locked(&txn, landlord_id, entry_id).await?;
        PostingService::validate_can_reverse(entry_id, original.status.into())?;

        let rows = Self::load_lines(&txn, entry_id).await?;
        let mirror = PostingService::mirror_lines(&rows_to_validated(&rows)?);

        let reversal_date = Utc::now().date_naive();
        let number = NumberingRepository::allocate(
            &txn,
            landlord_id,
            DocumentSeries::JournalEntry,
            reversal_date.year(),
        )
        .await?;

        let reversal =
            reversal_header(&original, number.clone(), &reason, reversed_by, reversal_date);
        let reversal = Self::insert_entry(&txn, reversal, &number).await?;
        let reversal_lines = Self::insert_lines(&txn, reversal.id, &mirror).await?;

        let now = Utc::now().into();
        let mut active: journal_entries::ActiveModel = original.into();
        active.status = Set(sea_orm_active_enums::JournalStatus::Reversed);
        active.reversed_at = Set(Some(now));
        active.reversed_by = Set(Some(reversed_by));
        active.reversal_reason = Set(Some(reason));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;

        Ok(EntryWithLines {
            entry: reversal,
            lines: reversal_lines,
        })
    }

    /// Voids (deletes) a pending entry and its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryAlreadyPosted` once the entry has left `pending`, or a
    /// database error.
    pub async fn void_entry(&self, landlord_id: Uuid, entry_id: Uuid) -> Result<(), JournalError> {
        let txn = self.db.begin().await?;

        let entry = Self::load_entry_locked(&txn, landlord_id, entry_id).await?;
        PostingService::validate_can_void(entry.status.into())?;

        // Lines cascade on the foreign key.
        journal_entries::Entity::delete_by_id(entry.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    /// Gets an entry with its lines, scoped to the landlord.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry is missing or foreign.
    pub async fn get_entry(
        &self,
        landlord_id: Uuid,
        entry_id: Uuid,
    ) -> Result<EntryWithLines, JournalError> {
        let entry = journal_entries::Entity::find_by_id(entry_id)
            .filter(journal_entries::Column::LandlordId.eq(landlord_id))
            .one(&self.db)
            .await?
            .ok_or(JournalError::NotFound(entry_id))?;

        let lines = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::JournalEntryId.eq(entry_id))
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(EntryWithLines { entry, lines })
    }

    /// Lists entries with optional filters, newest first, one page at a
    /// time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_entries(
        &self,
        landlord_id: Uuid,
        filter: EntryFilter,
        page: PageRequest,
    ) -> Result<PageResponse<journal_entries::Model>, JournalError> {
        let mut query = journal_entries::Entity::find()
            .filter(journal_entries::Column::LandlordId.eq(landlord_id));

        if let Some(status) = filter.status {
            let db_status: sea_orm_active_enums::JournalStatus = status.into();
            query = query.filter(journal_entries::Column::Status.eq(db_status));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(journal_entries::Column::EntryDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(journal_entries::Column::EntryDate.lte(date_to));
        }
        if let Some(reference_id) = filter.reference_id {
            query = query.filter(journal_entries::Column::ReferenceId.eq(reference_id));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(journal_entries::Column::EntryDate)
            .order_by_desc(journal_entries::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Runs core posting validation with account and lock state from the
    /// database.
    async fn validate(
        &self,
        txn: &DatabaseTransaction,
        input: &PostEntryInput,
        check_period_lock: bool,
    ) -> Result<(Vec<ValidatedLine>, rentra_core::ledger::PostingTotals), JournalError> {
        let account_ids: Vec<Uuid> = input.lines.iter().map(|l| l.account_id).collect();

        let accounts = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::Id.is_in(account_ids.clone()))
            .all(txn)
            .await?;
        let mut infos: HashMap<Uuid, AccountInfo> = HashMap::with_capacity(accounts.len());
        for model in &accounts {
            infos.insert(model.id, account_info(model)?);
        }

        let locked: HashSet<Uuid> = if check_period_lock {
            reconciliations::Entity::find()
                .filter(reconciliations::Column::AccountId.is_in(account_ids))
                .filter(
                    reconciliations::Column::Status
                        .eq(sea_orm_active_enums::ReconciliationStatus::Completed),
                )
                .all(txn)
                .await?
                .into_iter()
                .filter(|r| locks_entry_date(r.period_end, input.entry_date))
                .map(|r| r.account_id)
                .collect()
        } else {
            HashSet::new()
        };

        let result = PostingService::validate_posting(
            input,
            |id| {
                infos
                    .get(&id)
                    .cloned()
                    .ok_or(LedgerError::InvalidAccount(id))
            },
            |account_id, _date| locked.contains(&account_id),
        )?;

        Ok(result)
    }

    async fn load_entry_locked(
        txn: &DatabaseTransaction,
        landlord_id: Uuid,
        entry_id: Uuid,
    ) -> Result<journal_entries::Model, JournalError> {
        journal_entries::Entity::find_by_id(entry_id)
            .filter(journal_entries::Column::LandlordId.eq(landlord_id))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(JournalError::NotFound(entry_id))
    }

    async fn load_lines(
        txn: &DatabaseTransaction,
        entry_id: Uuid,
    ) -> Result<Vec<ledger_entries::Model>, JournalError> {
        Ok(ledger_entries::Entity::find()
            .filter(ledger_entries::Column::JournalEntryId.eq(entry_id))
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(txn)
            .await?)
    }

    async fn insert_entry(
        txn: &DatabaseTransaction,
        entry: journal_entries::ActiveModel,
        number: &str,
    ) -> Result<journal_entries::Model, JournalError> {
        entry
            .insert(txn)
            .await
            .map_err(|e| Self::map_number_conflict(e, number))
    }

    async fn insert_lines(
        txn: &DatabaseTransaction,
        entry_id: Uuid,
        lines: &[ValidatedLine],
    ) -> Result<Vec<ledger_entries::Model>, JournalError> {
        let now = Utc::now().into();
        let mut inserted = Vec::with_capacity(lines.len());
        for line in lines {
            let row = ledger_entries::ActiveModel {
                id: Set(Uuid::now_v7()),
                journal_entry_id: Set(entry_id),
                account_id: Set(line.account_id),
                debit: Set(line.debit),
                credit: Set(line.credit),
                currency: Set(line.currency.to_string()),
                property_id: Set(line.property_id),
                unit_id: Set(line.unit_id),
                renter_id: Set(line.renter_id),
                memo: Set(line.memo.clone()),
                created_at: Set(now),
            };
            inserted.push(row.insert(txn).await?);
        }
        Ok(inserted)
    }

    /// Maps a unique violation on the entry number index to the fatal
    /// `DuplicateNumber` error; the sequence lock should make this
    /// unreachable.
    fn map_number_conflict(err: DbErr, number: &str) -> JournalError {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            LedgerError::DuplicateNumber(number.to_string()).into()
        } else {
            err.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line_row(debit: rust_decimal::Decimal, credit: rust_decimal::Decimal) -> ledger_entries::Model {
        ledger_entries::Model {
            id: Uuid::now_v7(),
            journal_entry_id: Uuid::now_v7(),
            account_id: Uuid::now_v7(),
            debit,
            credit,
            currency: "GHS".to_string(),
            property_id: None,
            unit_id: None,
            renter_id: None,
            memo: Some("January rent".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_rows_to_line_inputs_recovers_sides() {
        let rows = vec![
            line_row(dec!(1500), rust_decimal::Decimal::ZERO),
            line_row(rust_decimal::Decimal::ZERO, dec!(1500)),
        ];
        let inputs = rows_to_line_inputs(&rows).unwrap();

        assert_eq!(inputs[0].entry_type, EntryType::Debit);
        assert_eq!(inputs[0].amount, dec!(1500));
        assert_eq!(inputs[1].entry_type, EntryType::Credit);
        assert_eq!(inputs[1].amount, dec!(1500));
        assert_eq!(inputs[0].currency, Currency::Ghs);
    }

    #[test]
    fn test_rows_to_validated_preserves_amounts() {
        let rows = vec![line_row(dec!(250.50), rust_decimal::Decimal::ZERO)];
        let validated = rows_to_validated(&rows).unwrap();
        assert_eq!(validated[0].debit, dec!(250.50));
        assert_eq!(validated[0].credit, rust_decimal::Decimal::ZERO);
        assert_eq!(validated[0].memo.as_deref(), Some("January rent"));
    }

    #[test]
    fn test_rows_with_bad_currency_rejected() {
        let mut row = line_row(dec!(10), rust_decimal::Decimal::ZERO);
        row.currency = "???".to_string();
        assert!(rows_to_line_inputs(std::slice::from_ref(&row)).is_err());
        assert!(rows_to_validated(std::slice::from_ref(&row)).is_err());
    }

    fn posted_entry(entry_date: NaiveDate) -> journal_entries::Model {
        let now = Utc::now().into();
        journal_entries::Model {
            id: Uuid::now_v7(),
            landlord_id: Uuid::now_v7(),
            entry_number: Some("JE-2024-000007".to_string()),
            entry_date,
            description: "January rent".to_string(),
            status: sea_orm_active_enums::JournalStatus::Posted,
            reference_type: None,
            reference_id: None,
            created_by: Uuid::now_v7(),
            posted_at: Some(now),
            posted_by: None,
            reversed_at: None,
            reversed_by: None,
            reversal_reason: None,
            reversal_of: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reversal_header_dated_at_reversal_time() {
        use sea_orm::ActiveValue;

        let original_date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let reversal_date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let original = posted_entry(original_date);
        let actor = Uuid::now_v7();

        let header = reversal_header(
            &original,
            "JE-2024-000031".to_string(),
            "rent posted twice",
            actor,
            reversal_date,
        );

        // Dated at reversal time, not at the original's (possibly
        // reconciled) entry date.
        assert!(matches!(header.entry_date, ActiveValue::Set(d) if d == reversal_date));
        assert!(matches!(header.reversal_of, ActiveValue::Set(Some(id)) if id == original.id));
        assert!(matches!(header.reference_id, ActiveValue::Set(Some(id)) if id == original.id));
        assert!(matches!(
            header.reference_type,
            ActiveValue::Set(Some(sea_orm_active_enums::ReferenceType::Reversal))
        ));
        assert!(matches!(
            header.status,
            ActiveValue::Set(sea_orm_active_enums::JournalStatus::Posted)
        ));
        assert!(matches!(
            header.description,
            ActiveValue::Set(ref d) if d == "Reversal of JE-2024-000007: rent posted twice"
        ));
    }
}
