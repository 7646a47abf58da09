use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    entities::bookings::BookingEntity, value_objects::enums::payment_methods::PaymentMethod,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmPaymentModel {
    pub booking_id: Uuid,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub transaction_ref: String,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    /// No booking row was still awaiting payment; another delivery got there first.
    AlreadyHandled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmationDetails {
    pub booking: BookingEntity,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub room_name: String,
    pub room_type: Option<String>,
}
