pub mod booking_statuses;
pub mod payment_channels;
pub mod payment_log_statuses;
pub mod payment_methods;
pub mod payment_statuses;
pub mod transfer_types;
