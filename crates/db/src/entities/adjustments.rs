//! `SeaORM` Entity for the adjustments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AdjustmentStatus, AdjustmentType, ReferenceType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<Uuid>,
    pub adjustment_type: AdjustmentType,
    pub debit_account_id: Uuid,
    pub credit_account_id: Uuid,
    pub original_amount: Decimal,
    pub adjusted_amount: Decimal,
    pub currency: String,
    pub reason: String,
    pub status: AdjustmentStatus,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub rejection_reason: Option<String>,
    /// Set once the approval posting commits; the idempotence anchor.
    pub journal_entry_id: Option<Uuid>,
    pub metadata: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::JournalEntryId",
        to = "super::journal_entries::Column::Id"
    )]
    JournalEntries,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
