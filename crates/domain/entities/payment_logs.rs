use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::payment_log_statuses::PaymentLogStatus,
    infra::db::postgres::schema::payment_logs,
};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payment_logs)]
pub struct PaymentLogEntity {
    pub id: Uuid,
    pub transaction_id: String,
    pub amount: i64,
    pub content: String,
    pub bank_code: Option<String>,
    pub status: String,
    pub reason: Option<String>,
    pub booking_id: Option<Uuid>,
    pub booking_code: Option<String>,
    pub raw_payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentLogEntity {
    pub fn log_status(&self) -> Option<PaymentLogStatus> {
        PaymentLogStatus::from_str(&self.status)
    }
}

/// Row written on first sight of a transaction id, and re-applied on redelivery.
///
/// `None` columns are written as NULL so a redelivery clears the previous outcome.
#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = payment_logs, treat_none_as_null = true)]
pub struct UpsertPaymentLogEntity {
    pub transaction_id: String,
    pub amount: i64,
    pub content: String,
    pub bank_code: Option<String>,
    pub status: String,
    pub reason: Option<String>,
    pub booking_id: Option<Uuid>,
    pub booking_code: Option<String>,
    pub raw_payload: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Outcome patch; `None` linkage columns are left untouched.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = payment_logs)]
pub struct UpdatePaymentLogEntity {
    pub status: String,
    pub reason: Option<String>,
    pub booking_id: Option<Uuid>,
    pub booking_code: Option<String>,
    pub updated_at: DateTime<Utc>,
}
