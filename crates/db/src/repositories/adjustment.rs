//! Adjustment repository.
//!
//! Stores adjustments awaiting approval and, on approval, resolves the
//! delta into a journal entry through the posting engine. The adjustment
//! update and the posting share one transaction; approval is idempotent.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use rentra_core::adjustment::{
    resolve_delta, validate_approval, validate_rejection, AdjustmentStatus, AdjustmentType,
    ApprovalAction,
};
use rentra_core::ledger::{LedgerError, PostEntryInput, ReferenceType};
use rentra_shared::types::Currency;

use crate::entities::{adjustments, sea_orm_active_enums};
use crate::repositories::journal::JournalRepository;

/// Error types for adjustment operations.
#[derive(Debug, thiserror::Error)]
pub enum AdjustmentError {
    /// Adjustment not found.
    #[error("Adjustment not found: {0}")]
    NotFound(Uuid),

    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<crate::repositories::journal::JournalError> for AdjustmentError {
    fn from(err: crate::repositories::journal::JournalError) -> Self {
        match err {
            crate::repositories::journal::JournalError::NotFound(id) => {
                Self::Ledger(LedgerError::InvalidAccount(id))
            }
            crate::repositories::journal::JournalError::Ledger(e) => Self::Ledger(e),
            crate::repositories::journal::JournalError::Database(e) => Self::Database(e),
        }
    }
}

/// Input for creating an adjustment.
#[derive(Debug, Clone)]
pub struct CreateAdjustmentInput {
    /// Owning landlord.
    pub landlord_id: Uuid,
    /// Optional business object this adjustment corrects.
    pub reference: Option<(ReferenceType, Uuid)>,
    /// Kind of adjustment.
    pub adjustment_type: AdjustmentType,
    /// Account debited when the delta is positive.
    pub debit_account_id: Uuid,
    /// Account credited when the delta is positive.
    pub credit_account_id: Uuid,
    /// Amount before the adjustment.
    pub original_amount: Decimal,
    /// Amount after the adjustment.
    pub adjusted_amount: Decimal,
    /// Currency of both amounts.
    pub currency: Currency,
    /// Why the adjustment is needed.
    pub reason: String,
    /// Requesting user.
    pub created_by: Uuid,
    /// Free-form typed metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Adjustment repository.
#[derive(Debug, Clone)]
pub struct AdjustmentRepository {
    db: DatabaseConnection,
    journal: JournalRepository,
}

impl AdjustmentRepository {
    /// Creates a new adjustment repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let journal = JournalRepository::new(db.clone());
        Self { db, journal }
    }

    /// Creates an adjustment in `pending_approval`.
    ///
    /// The delta is resolved up front so an adjustment that would post
    /// nothing is rejected at creation rather than at approval.
    ///
    /// # Errors
    ///
    /// Returns `NothingToAdjust` for a zero delta, or a database error.
    pub async fn create_adjustment(
        &self,
        input: CreateAdjustmentInput,
    ) -> Result<adjustments::Model, AdjustmentError> {
        resolve_delta(
            input.debit_account_id,
            input.credit_account_id,
            input.original_amount,
            input.adjusted_amount,
            input.currency,
            None,
        )?;

        let now = Utc::now().into();
        let row = adjustments::ActiveModel {
            id: Set(Uuid::now_v7()),
            landlord_id: Set(input.landlord_id),
            reference_type: Set(input.reference.map(|(kind, _)| kind.into())),
            reference_id: Set(input.reference.map(|(_, id)| id)),
            adjustment_type: Set(input.adjustment_type.into()),
            debit_account_id: Set(input.debit_account_id),
            credit_account_id: Set(input.credit_account_id),
            original_amount: Set(input.original_amount),
            adjusted_amount: Set(input.adjusted_amount),
            currency: Set(input.currency.to_string()),
            reason: Set(input.reason),
            status: Set(sea_orm_active_enums::AdjustmentStatus::PendingApproval),
            created_by: Set(input.created_by),
            approved_by: Set(None),
            approved_at: Set(None),
            rejection_reason: Set(None),
            journal_entry_id: Set(None),
            metadata: Set(input.metadata),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(row.insert(&self.db).await?)
    }

    /// Approves an adjustment, posting its delta to the ledger.
    ///
    /// Idempotent: an adjustment already approved with a posted entry is
    /// returned unchanged, so caller retries after a timeout are safe.
    ///
    /// # Errors
    ///
    /// Returns an error for rejected adjustments, any posting rule
    /// violation, or a database failure.
    pub async fn approve_adjustment(
        &self,
        landlord_id: Uuid,
        adjustment_id: Uuid,
        approved_by: Uuid,
    ) -> Result<adjustments::Model, AdjustmentError> {
        let txn = self.db.begin().await?;

        let row = Self::load_locked(&txn, landlord_id, adjustment_id).await?;
        let status: AdjustmentStatus = row.status.into();

        match validate_approval(adjustment_id, status, row.journal_entry_id)? {
            ApprovalAction::AlreadyApproved => {
                txn.commit().await?;
                return Ok(row);
            }
            ApprovalAction::Post => {}
        }

        let currency = row
            .currency
            .parse::<Currency>()
            .map_err(|e| DbErr::Custom(format!("adjustment {adjustment_id}: {e}")))?;
        let resolved = resolve_delta(
            row.debit_account_id,
            row.credit_account_id,
            row.original_amount,
            row.adjusted_amount,
            currency,
            Some(row.reason.clone()),
        )?;

        let adjustment_type: AdjustmentType = row.adjustment_type.into();
        let posted = self
            .journal
            .post_entry_in(
                &txn,
                PostEntryInput {
                    landlord_id,
                    entry_date: Utc::now().date_naive(),
                    description: format!("{}: {}", adjustment_type, row.reason),
                    reference: Some((ReferenceType::Adjustment, adjustment_id)),
                    lines: resolved.lines,
                    created_by: approved_by,
                },
            )
            .await?;

        let now = Utc::now().into();
        let mut active: adjustments::ActiveModel = row.into();
        active.status = Set(sea_orm_active_enums::AdjustmentStatus::Approved);
        active.approved_by = Set(Some(approved_by));
        active.approved_at = Set(Some(now));
        active.journal_entry_id = Set(Some(posted.entry.id));
        active.updated_at = Set(now);
        let row = active.update(&txn).await?;

        txn.commit().await?;
        Ok(row)
    }

    /// Rejects a pending adjustment. Terminal; nothing is posted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAdjustmentTransition` for decided adjustments, or a
    /// database error.
    pub async fn reject_adjustment(
        &self,
        landlord_id: Uuid,
        adjustment_id: Uuid,
        reason: String,
    ) -> Result<adjustments::Model, AdjustmentError> {
        let txn = self.db.begin().await?;

        let row = Self::load_locked(&txn, landlord_id, adjustment_id).await?;
        let status: AdjustmentStatus = row.status.into();
        validate_rejection(status)?;

        let now = Utc::now().into();
        let mut active: adjustments::ActiveModel = row.into();
        active.status = Set(sea_orm_active_enums::AdjustmentStatus::Rejected);
        active.rejection_reason = Set(Some(reason));
        active.updated_at = Set(now);
        let row = active.update(&txn).await?;

        txn.commit().await?;
        Ok(row)
    }

    /// Gets an adjustment by ID, scoped to the landlord.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing or foreign.
    pub async fn get_adjustment(
        &self,
        landlord_id: Uuid,
        adjustment_id: Uuid,
    ) -> Result<adjustments::Model, AdjustmentError> {
        adjustments::Entity::find_by_id(adjustment_id)
            .filter(adjustments::Column::LandlordId.eq(landlord_id))
            .one(&self.db)
            .await?
            .ok_or(AdjustmentError::NotFound(adjustment_id))
    }

    /// Lists adjustments, optionally by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_adjustments(
        &self,
        landlord_id: Uuid,
        status: Option<AdjustmentStatus>,
    ) -> Result<Vec<adjustments::Model>, AdjustmentError> {
        let mut query = adjustments::Entity::find()
            .filter(adjustments::Column::LandlordId.eq(landlord_id));
        if let Some(status) = status {
            let db_status: sea_orm_active_enums::AdjustmentStatus = status.into();
            query = query.filter(adjustments::Column::Status.eq(db_status));
        }

        Ok(query
            .order_by_desc(adjustments::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn load_locked(
        txn: &DatabaseTransaction,
        landlord_id: Uuid,
        adjustment_id: Uuid,
    ) -> Result<adjustments::Model, AdjustmentError> {
        adjustments::Entity::find_by_id(adjustment_id)
            .filter(adjustments::Column::LandlordId.eq(landlord_id))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(AdjustmentError::NotFound(adjustment_id))
    }
}
