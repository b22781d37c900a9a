//! `SeaORM` Entity for the journal_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{JournalStatus, ReferenceType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub landlord_id: Uuid,
    /// Assigned at posting time; null while pending.
    pub entry_number: Option<String>,
    pub entry_date: Date,
    pub description: String,
    pub status: JournalStatus,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<Uuid>,
    pub created_by: Uuid,
    pub posted_at: Option<DateTimeWithTimeZone>,
    pub posted_by: Option<Uuid>,
    pub reversed_at: Option<DateTimeWithTimeZone>,
    pub reversed_by: Option<Uuid>,
    pub reversal_reason: Option<String>,
    /// Set on the mirror entry, pointing back at the original.
    pub reversal_of: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
