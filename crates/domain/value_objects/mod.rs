pub mod amounts;
pub mod booking_code;
pub mod bookings;
pub mod enums;
pub mod notifications;
pub mod pay2s;
pub mod transaction_outcomes;
