//! `SeaORM` Entity for the activity_accounting ledger table.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::reports::LedgerEntry;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_accounting")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub date: DateTimeWithTimeZone,
    pub user_email: String,
    pub admin: Option<String>,
    pub status: String,
    #[sea_orm(column_name = "type")]
    pub transaction_type: String,
    pub original_id: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LedgerEntry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            date: model.date.with_timezone(&Utc),
            user_email: model.user_email,
            admin: model.admin,
            status: model.status,
            transaction_type: model.transaction_type,
            original_id: model.original_id,
            amount: model.amount,
            currency: model.currency,
            description: model.description,
        }
    }
}
