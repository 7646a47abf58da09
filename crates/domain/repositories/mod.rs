pub mod booking_notifier;
pub mod bookings;
pub mod payment_logs;
