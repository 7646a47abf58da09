use mockall::automock;

use crate::domain::value_objects::notifications::BookingConfirmationEmail;

/// Hands a confirmation email off for delivery without waiting on it.
#[automock]
pub trait BookingNotifier: Send + Sync {
    fn notify_booking_confirmed(&self, email: BookingConfirmationEmail);
}
