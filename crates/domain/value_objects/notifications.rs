use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::{
    bookings::BookingConfirmationDetails, enums::payment_channels::PaymentChannel,
};

pub const BOOKING_CONFIRMED_EMAIL: &str = "booking_confirmed";

/// Body posted to the email function after a booking is confirmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmationEmail {
    #[serde(rename = "type")]
    pub kind: String,
    pub booking_id: Uuid,
    pub booking_code: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_amount: i64,
    pub paid_amount: i64,
    pub payment_channel: PaymentChannel,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub room_name: String,
    pub room_type: Option<String>,
}

impl BookingConfirmationEmail {
    pub fn from_details(
        details: BookingConfirmationDetails,
        paid_amount: i64,
        payment_channel: PaymentChannel,
    ) -> Self {
        let booking = details.booking;
        Self {
            kind: BOOKING_CONFIRMED_EMAIL.to_string(),
            booking_id: booking.id,
            booking_code: booking.booking_code,
            check_in: booking.check_in,
            check_out: booking.check_out,
            total_amount: booking.total_amount,
            paid_amount,
            payment_channel,
            customer_name: details.customer_name,
            customer_email: details.customer_email,
            customer_phone: details.customer_phone,
            room_name: details.room_name,
            room_type: details.room_type,
        }
    }
}
