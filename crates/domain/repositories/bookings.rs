use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::bookings::BookingEntity,
    value_objects::bookings::{BookingConfirmationDetails, ConfirmOutcome, ConfirmPaymentModel},
};

#[automock]
#[async_trait]
pub trait BookingRepository {
    /// Exactly one non-deleted booking with this code, `None` when missing or ambiguous.
    async fn find_active_by_code(&self, booking_code: &str) -> Result<Option<BookingEntity>>;

    async fn find_confirmation_details(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<BookingConfirmationDetails>>;

    /// Moves an awaiting booking to `confirmed` and settles its payments in one transaction.
    async fn confirm_payment(&self, model: ConfirmPaymentModel) -> Result<ConfirmOutcome>;

    /// Marks the booking's pending payments as failed, returning how many rows changed.
    async fn mark_payment_failed(&self, booking_id: Uuid, transaction_ref: &str) -> Result<usize>;
}
