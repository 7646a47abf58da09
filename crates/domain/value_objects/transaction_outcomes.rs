use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::payment_logs::UpdatePaymentLogEntity,
    value_objects::enums::payment_log_statuses::PaymentLogStatus,
};

pub const REASON_OUT_TRANSACTION: &str = "OUT transaction";
pub const REASON_UNSUPPORTED_TRANSFER_TYPE: &str = "Unsupported transfer type";
pub const REASON_MISSING_CONTENT: &str = "Missing transfer content";
pub const REASON_NO_BOOKING_CODE: &str = "Booking code not found in transfer content";
pub const REASON_BOOKING_NOT_FOUND: &str = "Booking not found";
pub const REASON_BOOKING_LOOKUP_FAILED: &str = "Booking lookup failed";
pub const REASON_ALREADY_CONFIRMED: &str = "Already confirmed";
pub const REASON_ALREADY_PROCESSED: &str = "Already processed";
pub const REASON_CONFIRMATION_FAILED: &str = "Confirmation failed";
pub const REASON_LOG_WRITE_FAILED: &str = "Failed to record transaction";
pub const REASON_INVALID_TRANSACTION: &str = "Invalid transaction payload";
pub const REASON_INVALID_AMOUNT: &str = "Invalid transfer amount";

/// Per-transaction result returned to the caller and mirrored into `payment_logs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionOutcome {
    pub transaction_id: String,
    pub status: PaymentLogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_code: Option<String>,
}

impl TransactionOutcome {
    pub fn new(transaction_id: impl Into<String>, status: PaymentLogStatus) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            status,
            reason: None,
            booking_id: None,
            booking_code: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_booking_code(mut self, booking_code: impl Into<String>) -> Self {
        self.booking_code = Some(booking_code.into());
        self
    }

    pub fn with_booking(mut self, booking_id: Uuid, booking_code: impl Into<String>) -> Self {
        self.booking_id = Some(booking_id);
        self.booking_code = Some(booking_code.into());
        self
    }

    pub fn to_update_entity(&self, now: DateTime<Utc>) -> UpdatePaymentLogEntity {
        UpdatePaymentLogEntity {
            status: self.status.to_string(),
            reason: self.reason.clone(),
            booking_id: self.booking_id,
            booking_code: self.booking_code.clone(),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_without_empty_linkage() {
        let outcome = TransactionOutcome::new("TX-1", PaymentLogStatus::Skipped)
            .with_reason(REASON_OUT_TRANSACTION);

        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "transaction_id": "TX-1",
                "status": "skipped",
                "reason": "OUT transaction",
            })
        );
    }
}
