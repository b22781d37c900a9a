//! `SeaORM` Entity for the number_sequences table.
//!
//! One row per (landlord, series, year); the row is locked `FOR UPDATE`
//! inside the transaction that consumes a number.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "number_sequences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub landlord_id: Uuid,
    /// Series key, e.g. "journal_entry".
    pub series: String,
    pub year: i32,
    /// The next value to hand out.
    pub next_value: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
