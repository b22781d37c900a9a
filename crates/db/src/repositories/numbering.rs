//! Numbering repository for document number allocation.
//!
//! Sequence rows are keyed (landlord, series, year) and locked `FOR UPDATE`
//! inside the transaction that consumes the number, so concurrent posters
//! serialize only when they share a sequence. Gaps can appear when a
//! transaction aborts after allocation; duplicates cannot.

use chrono::{Datelike, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use rentra_core::numbering::{format_number, DocumentSeries};

use crate::entities::number_sequences;

/// Numbering repository.
#[derive(Debug, Clone)]
pub struct NumberingRepository {
    db: DatabaseConnection,
}

impl NumberingRepository {
    /// Creates a new numbering repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Allocates the next number in a series for the current year.
    ///
    /// Used by the standalone numbering endpoint; posting flows call
    /// [`Self::allocate`] inside their own transaction instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn next_number(
        &self,
        landlord_id: Uuid,
        series: DocumentSeries,
    ) -> Result<String, DbErr> {
        let txn = self.db.begin().await?;
        let year = Utc::now().date_naive().year();
        let number = Self::allocate(&txn, landlord_id, series, year).await?;
        txn.commit().await?;
        Ok(number)
    }

    /// Allocates the next number inside an existing transaction.
    ///
    /// Seeds the (landlord, series, year) row if absent, locks it, bumps
    /// `next_value`, and returns the formatted number. The caller's commit
    /// is what makes the consumption durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn allocate(
        txn: &DatabaseTransaction,
        landlord_id: Uuid,
        series: DocumentSeries,
        year: i32,
    ) -> Result<String, DbErr> {
        let now = Utc::now().into();
        let seed = number_sequences::ActiveModel {
            id: Set(Uuid::now_v7()),
            landlord_id: Set(landlord_id),
            series: Set(series.as_str().to_string()),
            year: Set(year),
            next_value: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        };

        number_sequences::Entity::insert(seed)
            .on_conflict(
                OnConflict::columns([
                    number_sequences::Column::LandlordId,
                    number_sequences::Column::Series,
                    number_sequences::Column::Year,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        let row = number_sequences::Entity::find()
            .filter(number_sequences::Column::LandlordId.eq(landlord_id))
            .filter(number_sequences::Column::Series.eq(series.as_str()))
            .filter(number_sequences::Column::Year.eq(year))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| DbErr::Custom("number sequence row vanished under lock".to_string()))?;

        let value = row.next_value;
        let mut active: number_sequences::ActiveModel = row.into();
        active.next_value = Set(value + 1);
        active.update(txn).await?;

        Ok(format_number(series, year, value))
    }
}
