pub mod bookings;
pub mod payment_logs;
