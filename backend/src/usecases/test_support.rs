use chrono::{NaiveDate, Utc};
use crates::domain::{
    entities::{bookings::BookingEntity, payment_logs::PaymentLogEntity},
    value_objects::{
        bookings::BookingConfirmationDetails,
        enums::{booking_statuses::BookingStatus, payment_log_statuses::PaymentLogStatus},
    },
};
use serde_json::json;
use uuid::Uuid;

pub fn booking_in(status: BookingStatus, booking_code: &str, total_amount: i64) -> BookingEntity {
    BookingEntity {
        id: Uuid::new_v4(),
        booking_code: booking_code.to_string(),
        customer_id: Uuid::new_v4(),
        room_id: Uuid::new_v4(),
        check_in: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        check_out: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        status: status.to_string(),
        total_amount,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn details_for(booking: BookingEntity) -> BookingConfirmationDetails {
    BookingConfirmationDetails {
        booking,
        customer_name: "Nguyen Van A".to_string(),
        customer_email: Some("guest@example.com".to_string()),
        customer_phone: Some("0900000000".to_string()),
        room_name: "Deluxe 301".to_string(),
        room_type: Some("deluxe".to_string()),
    }
}

fn log_in(transaction_id: &str, status: PaymentLogStatus) -> PaymentLogEntity {
    PaymentLogEntity {
        id: Uuid::new_v4(),
        transaction_id: transaction_id.to_string(),
        amount: 1_500_000,
        content: "YH12345".to_string(),
        bank_code: Some("MBBank".to_string()),
        status: status.to_string(),
        reason: None,
        booking_id: None,
        booking_code: None,
        raw_payload: json!({ "id": transaction_id }),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn success_log(transaction_id: &str, booking_id: Uuid, booking_code: &str) -> PaymentLogEntity {
    PaymentLogEntity {
        booking_id: Some(booking_id),
        booking_code: Some(booking_code.to_string()),
        ..log_in(transaction_id, PaymentLogStatus::Success)
    }
}

pub fn failed_log(transaction_id: &str) -> PaymentLogEntity {
    PaymentLogEntity {
        reason: Some("Booking lookup failed".to_string()),
        ..log_in(transaction_id, PaymentLogStatus::Error)
    }
}
