use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::payments;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub booking_id: Uuid,
    pub amount: i64,
    pub payment_method: String,
    pub payment_status: String,
    pub transaction_ref: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}
